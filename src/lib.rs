//! Ephemeral Multiplayer Room Server Library
//!
//! A WebSocket server that coordinates short-lived game rooms identified
//! by 4-character codes, built with tokio-tungstenite using the Actor
//! pattern for state management.
//!
//! # Features
//! - Room creation with unambiguous 4-character codes
//! - Room probing before joining
//! - Room joining with a per-room unique emoji ("spirit animal")
//! - Emoji updates broadcast to the whole room
//! - Host authority: the room closes when its host disconnects
//! - Idle room reaping and periodic metrics logging
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `RoomServer` is the central actor; it owns the `RoomCoordinator`
//! - `RoomCoordinator` applies intents to the `RoomRegistry` and fans
//!   results out through the `Gateway`
//! - Each connection has a `handler` task pair communicating with the server
//! - No locks needed - all state access goes through message passing, so
//!   check-then-act sequences (code allocation, emoji claims) are atomic
//!
//! # Example
//! ```ignore
//! use tokio::net::TcpListener;
//! use tokio::sync::mpsc;
//! use room_server::{serve, RoomServer, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig::default();
//!     let listener = TcpListener::bind(&config.addr).await.unwrap();
//!     let (cmd_tx, cmd_rx) = mpsc::channel(256);
//!
//!     tokio::spawn(RoomServer::new(cmd_rx, config).run());
//!     serve(listener, cmd_tx).await;
//! }
//! ```

pub mod client_view;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod gateway;
pub mod handler;
pub mod message;
pub mod player;
pub mod registry;
pub mod room;
pub mod server;
pub mod session;
pub mod types;

// Re-export main types for convenience
pub use client_view::RoomView;
pub use config::ServerConfig;
pub use coordinator::{RegistryStats, RoomCoordinator};
pub use error::{AppError, RoomError, SendError};
pub use gateway::Gateway;
pub use handler::{handle_connection, serve};
pub use message::{ClientMessage, ErrorType, ServerMessage};
pub use player::Player;
pub use registry::RoomRegistry;
pub use room::{Room, RoomStatus};
pub use server::{RoomServer, ServerCommand};
pub use session::Session;
pub use types::{PlayerId, RoomCode, SessionId};
