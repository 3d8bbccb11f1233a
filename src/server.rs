//! RoomServer Actor implementation
//!
//! The central actor that owns the room coordinator. Every command from
//! every connection goes through its single event loop, so all mutations
//! of a room (and of the whole registry) are serialized. The loop also
//! drives the idle-room reaper and periodic metrics logging.

use std::time::Instant;

use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use crate::config::ServerConfig;
use crate::coordinator::RoomCoordinator;
use crate::gateway::Gateway;
use crate::message::ServerMessage;
use crate::registry::RoomRegistry;
use crate::types::SessionId;

/// Commands sent from handlers to the RoomServer actor
#[derive(Debug)]
pub enum ServerCommand {
    /// New connection accepted
    Connect {
        session_id: SessionId,
        sender: mpsc::Sender<ServerMessage>,
    },
    /// Connection closed
    Disconnect { session_id: SessionId },
    /// Create a new room
    CreateRoom {
        session_id: SessionId,
        player_name: String,
        emoji: Option<String>,
        max_players: Option<usize>,
    },
    /// Look up a room
    CheckRoom {
        session_id: SessionId,
        room_code: String,
    },
    /// Join an existing room
    JoinRoom {
        session_id: SessionId,
        room_code: String,
        player_name: String,
        emoji: String,
    },
    /// Change a player's emoji
    UpdateSpiritAnimal {
        session_id: SessionId,
        room_code: String,
        player_id: String,
        emoji: String,
    },
    /// Leave the current room
    LeaveRoom { session_id: SessionId },
}

/// The main RoomServer actor
pub struct RoomServer {
    coordinator: RoomCoordinator,
    config: ServerConfig,
    /// Command receiver channel
    receiver: mpsc::Receiver<ServerCommand>,
    started_at: Instant,
}

impl RoomServer {
    /// Create a RoomServer with an empty registry
    pub fn new(receiver: mpsc::Receiver<ServerCommand>, config: ServerConfig) -> Self {
        let coordinator = RoomCoordinator::new(RoomRegistry::new(), Gateway::new(), &config);
        Self::with_coordinator(receiver, config, coordinator)
    }

    pub fn with_coordinator(
        receiver: mpsc::Receiver<ServerCommand>,
        config: ServerConfig,
        coordinator: RoomCoordinator,
    ) -> Self {
        Self {
            coordinator,
            config,
            receiver,
            started_at: Instant::now(),
        }
    }

    /// Run the RoomServer event loop
    ///
    /// Continuously receives and processes commands until all senders are dropped.
    pub async fn run(mut self) {
        info!("RoomServer started");

        let mut reap_tick = time::interval(self.config.reap_interval());
        reap_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut metrics_tick = time::interval(self.config.metrics_interval());
        metrics_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => {
                    let Some(cmd) = cmd else { break };
                    self.handle_command(cmd);
                }
                _ = reap_tick.tick() => {
                    let reaped = self.coordinator.reap_idle(Instant::now());
                    if !reaped.is_empty() {
                        info!("Reaped {} idle room(s)", reaped.len());
                    }
                }
                _ = metrics_tick.tick() => self.log_metrics(),
            }
        }

        info!("RoomServer shutting down");
    }

    /// Process a single command
    fn handle_command(&mut self, cmd: ServerCommand) {
        match cmd {
            ServerCommand::Connect { session_id, sender } => {
                self.coordinator.connect(session_id, sender);
                debug!("Session {} connected ({:?})", session_id, self.coordinator.stats());
            }
            ServerCommand::Disconnect { session_id } => {
                self.coordinator.disconnect(session_id);
                debug!("Session {} disconnected ({:?})", session_id, self.coordinator.stats());
            }
            ServerCommand::CreateRoom {
                session_id,
                player_name,
                emoji,
                max_players,
            } => {
                if let Err(e) =
                    self.coordinator
                        .create_room(session_id, &player_name, emoji, max_players)
                {
                    self.coordinator.reject(session_id, e);
                }
            }
            ServerCommand::CheckRoom {
                session_id,
                room_code,
            } => {
                self.coordinator.check_room(session_id, &room_code);
            }
            ServerCommand::JoinRoom {
                session_id,
                room_code,
                player_name,
                emoji,
            } => {
                if let Err(e) =
                    self.coordinator
                        .join_room(session_id, &room_code, &player_name, emoji)
                {
                    self.coordinator.reject(session_id, e);
                }
            }
            ServerCommand::UpdateSpiritAnimal {
                session_id,
                room_code,
                player_id,
                emoji,
            } => {
                if let Err(e) =
                    self.coordinator
                        .update_emoji(session_id, &room_code, &player_id, emoji)
                {
                    self.coordinator.reject(session_id, e);
                }
            }
            ServerCommand::LeaveRoom { session_id } => {
                if let Err(e) = self.coordinator.leave_room(session_id) {
                    self.coordinator.reject(session_id, e);
                }
            }
        }
    }

    fn log_metrics(&self) {
        let stats = self.coordinator.stats();
        info!(
            rooms = stats.rooms,
            total_players = stats.players,
            sessions = stats.sessions,
            uptime_secs = self.started_at.elapsed().as_secs(),
            "ops metrics"
        );
    }
}
