//! Message protocol definitions
//!
//! JSON-based bidirectional event protocol. Every frame is an
//! `{"event": ..., "data": {...}}` envelope built with Serde's adjacently
//! tagged enums; payload fields use camelCase.

use serde::{Deserialize, Serialize};

use crate::error::RoomError;
use crate::player::Player;
use crate::types::{RoomCode, SessionId};

/// Client → Server message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Create a new room and become its host
    #[serde(rename_all = "camelCase")]
    CreateRoom {
        #[serde(default)]
        player_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        emoji: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_players: Option<usize>,
    },
    /// Look up a room before joining
    #[serde(rename_all = "camelCase")]
    CheckRoom { room_code: String },
    /// Join an existing room by code
    #[serde(rename_all = "camelCase")]
    JoinRoom {
        room_code: String,
        #[serde(default)]
        player_name: String,
        #[serde(default)]
        emoji: String,
    },
    /// Change the caller's emoji
    ///
    /// Fields are kept raw; a malformed reference is a stale request, not
    /// a protocol error.
    #[serde(rename_all = "camelCase")]
    UpdateSpiritAnimal {
        #[serde(default)]
        room_code: String,
        #[serde(default)]
        player_id: String,
        #[serde(default)]
        emoji: String,
    },
    /// Leave the current room without disconnecting
    LeaveRoom,
}

/// Server → Client message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Connection accepted, session ID issued
    #[serde(rename_all = "camelCase")]
    Connected { session_id: SessionId },
    /// Room created; sent to the host only
    #[serde(rename_all = "camelCase")]
    RoomCreated {
        room_code: RoomCode,
        player: Player,
        is_host: bool,
    },
    /// Result of a room check
    #[serde(rename_all = "camelCase")]
    RoomChecked {
        exists: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        used_emojis: Option<Vec<String>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player_count: Option<usize>,
    },
    /// Join accepted; full roster for the joiner
    #[serde(rename_all = "camelCase")]
    RoomJoined {
        room_code: RoomCode,
        player: Player,
        players: Vec<Player>,
        is_host: bool,
        used_emojis: Vec<String>,
    },
    /// Someone else joined
    #[serde(rename_all = "camelCase")]
    PlayerJoined {
        players: Vec<Player>,
        player: Player,
        all_players: Vec<Player>,
    },
    /// Emojis currently taken in the room
    UsedEmojis { emojis: Vec<String> },
    /// Roster or emoji change
    #[serde(rename_all = "camelCase")]
    RoomUpdate {
        room_code: RoomCode,
        players: Vec<Player>,
        used_emojis: Vec<String>,
    },
    /// A guest left; remaining roster
    PlayerLeft { players: Vec<Player> },
    /// Leave acknowledged
    #[serde(rename_all = "camelCase")]
    RoomLeft { room_code: RoomCode },
    /// Room no longer exists
    RoomClosed { message: String },
    /// Recoverable game rule violation
    GameError {
        message: String,
        #[serde(rename = "type")]
        kind: ErrorType,
    },
    /// Generic failure
    Error { message: String },
}

/// Machine-readable kind of a `game_error`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorType {
    /// Emoji held by another player in the room
    EmojiConflict,
    /// Room at capacity
    RoomFull,
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }
}

/// Convert RoomError to ServerMessage for client notification
impl From<RoomError> for ServerMessage {
    fn from(err: RoomError) -> Self {
        match err {
            RoomError::EmojiConflict(_) => ServerMessage::GameError {
                message: "Emoji already taken. Please choose another one.".to_string(),
                kind: ErrorType::EmojiConflict,
            },
            RoomError::RoomFull(_) => ServerMessage::GameError {
                message: "Room is full".to_string(),
                kind: ErrorType::RoomFull,
            },
            RoomError::RoomNotFound(_) => ServerMessage::error("Room not found"),
            RoomError::AlreadyInRoom(_) => ServerMessage::error("You are already in a room"),
            RoomError::NotInRoom => ServerMessage::error("You are not in a room"),
            RoomError::CodeSpaceExhausted(_) => ServerMessage::error("Failed to create room"),
            // Silent errors are normally dropped before reaching here
            RoomError::StaleReference { .. } | RoomError::NotOwner(_) => {
                ServerMessage::error("Request is no longer valid")
            }
        }
    }
}
