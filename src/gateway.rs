//! Broadcast gateway
//!
//! Keeps the table of connected sessions and fans server messages out to
//! them. Delivery is fire-and-forget: a full or closed channel is logged
//! and skipped, never retried. A client that stops draining its queue can
//! therefore miss `room_closed` and keep showing a room that is gone; it
//! resyncs on its next request, which will fail with `Room not found` or be
//! dropped as stale.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::message::ServerMessage;
use crate::room::Room;
use crate::session::Session;
use crate::types::SessionId;

#[derive(Debug, Default)]
pub struct Gateway {
    /// All connected sessions: SessionId -> Session
    sessions: HashMap<SessionId, Session>,
}

impl Gateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, session_id: SessionId, sender: mpsc::Sender<ServerMessage>) {
        self.sessions
            .insert(session_id, Session::new(sender));
    }

    /// Drop a session; its write task ends once the sender is gone
    pub fn unregister(&mut self, session_id: SessionId) -> Option<Session> {
        self.sessions.remove(&session_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Direct reply to one session
    pub fn send_to(&self, session_id: SessionId, msg: ServerMessage) {
        let Some(session) = self.sessions.get(&session_id) else {
            debug!("Session {} gone, dropping message", session_id);
            return;
        };
        if let Err(e) = session.send(msg) {
            warn!("Failed to deliver to session {}: {}", session_id, e);
        }
    }

    /// Deliver to every session attached to the room
    pub fn broadcast_to_room(&self, room: &Room, msg: &ServerMessage) {
        self.broadcast_to_sessions(room.sessions(), None, msg);
    }

    /// Deliver to every session attached to the room except `except`
    pub fn broadcast_to_room_except(&self, room: &Room, except: SessionId, msg: &ServerMessage) {
        self.broadcast_to_sessions(room.sessions(), Some(except), msg);
    }

    /// Deliver to an explicit set of sessions
    pub fn broadcast_to_sessions(
        &self,
        sessions: impl IntoIterator<Item = SessionId>,
        except: Option<SessionId>,
        msg: &ServerMessage,
    ) {
        for session_id in sessions {
            if Some(session_id) != except {
                self.send_to(session_id, msg.clone());
            }
        }
    }
}
