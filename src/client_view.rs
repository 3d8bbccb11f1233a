//! Client-side room view
//!
//! Folds server messages into the state a client renders: its own player,
//! the roster and the emojis already taken. Useful for clients written in
//! Rust and for checking that every session converges on the same roster.

use crate::message::{ErrorType, ServerMessage};
use crate::player::Player;
use crate::types::{RoomCode, SessionId};

/// Local view of one session's room membership
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomView {
    pub session_id: Option<SessionId>,
    pub room_code: Option<RoomCode>,
    /// This session's own player
    pub player: Option<Player>,
    pub players: Vec<Player>,
    pub is_host: bool,
    pub used_emojis: Vec<String>,
    /// Result of the last `room_checked`
    pub room_exists: Option<bool>,
    pub error: Option<String>,
    pub error_type: Option<ErrorType>,
    /// Reason given by the last `room_closed`
    pub closed_reason: Option<String>,
}

impl RoomView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_room(&self) -> bool {
        self.room_code.is_some()
    }

    /// Apply one server message
    pub fn apply(&mut self, msg: &ServerMessage) {
        match msg {
            ServerMessage::Connected { session_id } => {
                self.session_id = Some(*session_id);
            }
            ServerMessage::RoomCreated {
                room_code,
                player,
                is_host,
            } => {
                self.enter(room_code, player, *is_host);
                self.players = vec![player.clone()];
                self.used_emojis = emojis_of(&self.players);
            }
            ServerMessage::RoomChecked {
                exists,
                used_emojis,
                ..
            } => {
                self.room_exists = Some(*exists);
                if !self.in_room() {
                    self.used_emojis = used_emojis.clone().unwrap_or_default();
                }
            }
            ServerMessage::RoomJoined {
                room_code,
                player,
                players,
                is_host,
                used_emojis,
            } => {
                self.enter(room_code, player, *is_host);
                self.players = players.clone();
                self.used_emojis = used_emojis.clone();
            }
            ServerMessage::PlayerJoined { all_players, .. } => {
                self.set_roster(all_players);
            }
            ServerMessage::UsedEmojis { emojis } => {
                self.used_emojis = emojis.clone();
            }
            ServerMessage::RoomUpdate {
                players,
                used_emojis,
                ..
            } => {
                self.set_roster(players);
                self.used_emojis = used_emojis.clone();
            }
            ServerMessage::PlayerLeft { players } => {
                self.set_roster(players);
            }
            ServerMessage::RoomLeft { .. } => {
                self.leave();
            }
            ServerMessage::RoomClosed { message } => {
                self.leave();
                self.closed_reason = Some(message.clone());
            }
            ServerMessage::GameError { message, kind } => {
                self.error = Some(message.clone());
                self.error_type = Some(*kind);
            }
            ServerMessage::Error { message } => {
                self.error = Some(message.clone());
                self.error_type = None;
            }
        }
    }

    pub fn clear_error(&mut self) {
        self.error = None;
        self.error_type = None;
    }

    fn enter(&mut self, room_code: &RoomCode, player: &Player, is_host: bool) {
        self.room_code = Some(room_code.clone());
        self.player = Some(player.clone());
        self.is_host = is_host;
        self.closed_reason = None;
        self.clear_error();
    }

    fn leave(&mut self) {
        self.room_code = None;
        self.player = None;
        self.players.clear();
        self.is_host = false;
        self.used_emojis.clear();
    }

    /// Replace the roster and refresh our own entry from it
    fn set_roster(&mut self, players: &[Player]) {
        self.players = players.to_vec();
        self.used_emojis = emojis_of(&self.players);
        let my_id = self.player.as_ref().map(|p| p.id);
        if let Some(updated) = my_id.and_then(|id| self.players.iter().find(|p| p.id == id)) {
            self.player = Some(updated.clone());
        }
    }
}

fn emojis_of(players: &[Player]) -> Vec<String> {
    players
        .iter()
        .filter(|p| p.has_emoji())
        .map(|p| p.emoji.clone())
        .collect()
}
