//! Room struct definition
//!
//! Represents one ephemeral game room: a host, any number of guests up to
//! capacity, and the emoji each of them picked.

use std::time::{Duration, Instant};

use crate::player::Player;
use crate::types::{PlayerId, RoomCode, SessionId};

/// Lifecycle state of a room
///
/// Only `Waiting` is produced today; the others belong to the game loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomStatus {
    Waiting,
    Playing,
    Ended,
}

/// What removing a session left behind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Departure {
    /// Session had no player here
    NotPresent,
    /// A guest left; the room lives on
    Left(Player),
    /// The host left or the room emptied; the room must be deleted
    Closed { player: Player, host_left: bool },
}

/// Game room
///
/// Players are kept in join order. The host is fixed for the lifetime of
/// the room; there is no host migration.
#[derive(Debug, Clone)]
pub struct Room {
    /// Room code for identification
    pub code: RoomCode,
    /// Players in join order
    pub players: Vec<Player>,
    /// Session of the creator
    pub host_session: SessionId,
    pub status: RoomStatus,
    /// Capacity
    pub max_players: usize,
    /// Room creation time
    pub created_at: Instant,
    /// Last roster or emoji change
    pub last_activity: Instant,
}

impl Room {
    /// Create a new room around its host player
    pub fn new(code: RoomCode, host: Player, max_players: usize) -> Self {
        let now = Instant::now();
        Self {
            code,
            host_session: host.session_id,
            players: vec![host],
            status: RoomStatus::Waiting,
            max_players,
            created_at: now,
            last_activity: now,
        }
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.max_players
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Non-empty emojis in join order
    pub fn used_emojis(&self) -> Vec<String> {
        self.players
            .iter()
            .filter(|p| p.has_emoji())
            .map(|p| p.emoji.clone())
            .collect()
    }

    /// Whether a player other than `except` already holds `emoji`
    ///
    /// An empty emoji never conflicts.
    pub fn emoji_taken(&self, emoji: &str, except: Option<PlayerId>) -> bool {
        !emoji.is_empty()
            && self
                .players
                .iter()
                .any(|p| p.emoji == emoji && Some(p.id) != except)
    }

    pub fn player(&self, player_id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn player_mut(&mut self, player_id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == player_id)
    }

    /// Sessions attached to this room
    pub fn sessions(&self) -> impl Iterator<Item = SessionId> + '_ {
        self.players.iter().map(|p| p.session_id)
    }

    /// Append a player at the end of the roster
    pub fn add_player(&mut self, player: Player) {
        self.players.push(player);
        self.touch();
    }

    /// Remove the player owned by `session_id`
    ///
    /// Returns `Departure::Closed` when the room must be deleted: the host
    /// left, or nobody is left.
    pub fn remove_session(&mut self, session_id: SessionId) -> Departure {
        let Some(index) = self.players.iter().position(|p| p.session_id == session_id) else {
            return Departure::NotPresent;
        };

        let player = self.players.remove(index);
        self.touch();

        if player.is_host || self.players.is_empty() {
            self.status = RoomStatus::Ended;
            let host_left = player.is_host;
            Departure::Closed { player, host_left }
        } else {
            Departure::Left(player)
        }
    }

    /// Record activity now
    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    /// How long the room has been idle at `now`
    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_activity)
    }

    /// How long the room has existed at `now`
    pub fn lifetime(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }
}
