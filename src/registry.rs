//! Room registry
//!
//! Key-value store of room code to room, plus the session to room index.
//! It holds no business rules; the coordinator enforces invariants and
//! only reaches rooms through these primitives.

use std::collections::HashMap;

use rand::Rng;

use crate::error::RoomError;
use crate::room::Room;
use crate::types::{RoomCode, SessionId};

/// Default number of draws before code allocation gives up
pub const DEFAULT_MAX_CODE_ATTEMPTS: usize = 1000;

/// In-memory room store
///
/// Owned by a single writer (the server actor), so every primitive runs
/// to completion before the next one starts.
#[derive(Debug)]
pub struct RoomRegistry {
    /// All live rooms: RoomCode -> Room
    rooms: HashMap<RoomCode, Room>,
    /// Session to room mapping for fast lookup: SessionId -> RoomCode
    session_rooms: HashMap<SessionId, RoomCode>,
    max_code_attempts: usize,
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::with_max_code_attempts(DEFAULT_MAX_CODE_ATTEMPTS)
    }

    pub fn with_max_code_attempts(max_code_attempts: usize) -> Self {
        Self {
            rooms: HashMap::new(),
            session_rooms: HashMap::new(),
            max_code_attempts,
        }
    }

    pub fn get(&self, code: &RoomCode) -> Option<&Room> {
        self.rooms.get(code)
    }

    pub fn get_mut(&mut self, code: &RoomCode) -> Option<&mut Room> {
        self.rooms.get_mut(code)
    }

    pub fn contains(&self, code: &RoomCode) -> bool {
        self.rooms.contains_key(code)
    }

    /// Remove a room and every session index entry pointing at it
    pub fn remove(&mut self, code: &RoomCode) -> Option<Room> {
        let room = self.rooms.remove(code)?;
        for session_id in room.sessions() {
            self.session_rooms.remove(&session_id);
        }
        Some(room)
    }

    /// Generate a free code and register the room built for it
    ///
    /// Drawing and inserting happen in one step, so the code cannot be
    /// claimed by anyone else in between. The room's sessions are indexed.
    pub fn allocate<R, F>(&mut self, rng: &mut R, build: F) -> Result<&Room, RoomError>
    where
        R: Rng + ?Sized,
        F: FnOnce(RoomCode) -> Room,
    {
        let code = (0..self.max_code_attempts)
            .map(|_| RoomCode::generate(rng))
            .find(|code| !self.rooms.contains_key(code))
            .ok_or(RoomError::CodeSpaceExhausted(self.max_code_attempts))?;

        let room = build(code.clone());
        for session_id in room.sessions() {
            self.session_rooms.insert(session_id, code.clone());
        }
        let room = self.rooms.entry(code).or_insert(room);
        Ok(&*room)
    }

    /// Record that a session belongs to a room
    pub fn attach(&mut self, session_id: SessionId, code: RoomCode) {
        self.session_rooms.insert(session_id, code);
    }

    /// Forget a session's room membership
    pub fn detach(&mut self, session_id: SessionId) -> Option<RoomCode> {
        self.session_rooms.remove(&session_id)
    }

    /// Room the session currently belongs to
    pub fn room_of(&self, session_id: SessionId) -> Option<&RoomCode> {
        self.session_rooms.get(&session_id)
    }

    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Players across all rooms
    pub fn total_players(&self) -> usize {
        self.rooms.values().map(Room::player_count).sum()
    }
}
