//! Player record
//!
//! A player is one session's presence inside a room.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::types::{PlayerId, SessionId};

/// Number of avatar tokens in the catalog (`avatar-1` ..= `avatar-8`)
pub const AVATAR_COUNT: u32 = 8;

/// A player inside a room
///
/// Serialized with the camelCase field names clients expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    /// Display name, not unique
    pub name: String,
    pub is_host: bool,
    /// Owning connection
    #[serde(rename = "socketId")]
    pub session_id: SessionId,
    pub avatar: String,
    /// Spirit animal; empty means "not chosen yet"
    pub emoji: String,
}

impl Player {
    /// Create a player with a fresh id and a random avatar
    pub fn new<R: Rng + ?Sized>(
        rng: &mut R,
        session_id: SessionId,
        name: String,
        emoji: String,
        is_host: bool,
    ) -> Self {
        Self {
            id: PlayerId::new(),
            name,
            is_host,
            session_id,
            avatar: random_avatar(rng),
            emoji,
        }
    }

    /// Whether the player has picked an emoji
    pub fn has_emoji(&self) -> bool {
        !self.emoji.is_empty()
    }
}

fn random_avatar<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("avatar-{}", rng.gen_range(1..=AVATAR_COUNT))
}
