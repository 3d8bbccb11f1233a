//! Error types for the room server
//!
//! Defines connection-level errors, room business errors and
//! message send errors. Uses thiserror for ergonomic error definitions.

use thiserror::Error;

use crate::types::{PlayerId, RoomCode};

/// Connection-level errors
///
/// These end the connection handler; they never reach the room state.
#[derive(Debug, Error)]
pub enum AppError {
    /// WebSocket protocol error (fatal)
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Channel send error (fatal - internal channel broken)
    #[error("Channel send error")]
    ChannelSend,
}

/// Room business errors
///
/// Every rejected intent maps to exactly one of these, and none of them
/// leaves a partial mutation behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    /// No live room has the given code
    #[error("Room not found: {0}")]
    RoomNotFound(String),

    /// Another player in the room already holds this emoji
    #[error("Emoji already taken: {0}")]
    EmojiConflict(String),

    /// Room reached its player capacity
    #[error("Room {0} is full")]
    RoomFull(RoomCode),

    /// Session is already attached to a room
    #[error("Already in room {0}")]
    AlreadyInRoom(RoomCode),

    /// Session is not attached to any room
    #[error("Not in room")]
    NotInRoom,

    /// Update targets a room or player that no longer exists
    #[error("Stale reference to player {player_id} in room {room_code}")]
    StaleReference { room_code: String, player_id: String },

    /// Requesting session does not own the target player
    #[error("Player {0} is owned by another session")]
    NotOwner(PlayerId),

    /// No free room code found within the attempt limit
    #[error("Room code space exhausted after {0} attempts")]
    CodeSpaceExhausted(usize),
}

impl RoomError {
    /// Whether the error is dropped without notifying the client
    pub fn is_silent(&self) -> bool {
        matches!(self, RoomError::StaleReference { .. } | RoomError::NotOwner(_))
    }
}

/// Message send errors
///
/// Occurs when a session's outbound channel can no longer take messages.
#[derive(Debug, Error)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,

    /// The client is not draining its queue fast enough
    #[error("Channel full")]
    ChannelFull,
}
