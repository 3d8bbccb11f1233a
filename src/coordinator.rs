//! Room coordinator
//!
//! Applies client intents to the registry and decides who hears about
//! them. Every operation validates first and mutates last, so a rejected
//! intent leaves no trace. The coordinator is owned by the server actor;
//! two intents never interleave.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::error::RoomError;
use crate::gateway::Gateway;
use crate::message::ServerMessage;
use crate::player::Player;
use crate::registry::RoomRegistry;
use crate::room::{Departure, Room};
use crate::types::{PlayerId, RoomCode, SessionId};

const HOST_LEFT_MESSAGE: &str = "Host left the game";
const ROOM_EMPTY_MESSAGE: &str = "Room is empty";
const ROOM_IDLE_MESSAGE: &str = "Room closed due to inactivity";

/// Snapshot of registry size for operational logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryStats {
    pub rooms: usize,
    pub players: usize,
    pub sessions: usize,
}

pub struct RoomCoordinator {
    registry: RoomRegistry,
    gateway: Gateway,
    rng: StdRng,
    default_max_players: usize,
    idle_timeout: Duration,
}

impl RoomCoordinator {
    pub fn new(registry: RoomRegistry, gateway: Gateway, config: &ServerConfig) -> Self {
        Self::with_rng(registry, gateway, config, StdRng::from_entropy())
    }

    /// Build with a caller-supplied RNG (deterministic codes in tests)
    pub fn with_rng(
        registry: RoomRegistry,
        gateway: Gateway,
        config: &ServerConfig,
        rng: StdRng,
    ) -> Self {
        Self {
            registry,
            gateway,
            rng,
            default_max_players: config.default_max_players,
            idle_timeout: config.idle_timeout(),
        }
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            rooms: self.registry.len(),
            players: self.registry.total_players(),
            sessions: self.gateway.len(),
        }
    }

    /// Register a new connection; it belongs to no room yet
    pub fn connect(&mut self, session_id: SessionId, sender: mpsc::Sender<ServerMessage>) {
        self.gateway.register(session_id, sender);
        self.gateway
            .send_to(session_id, ServerMessage::Connected { session_id });
    }

    /// Tear down a connection, removing its player if it had one
    pub fn disconnect(&mut self, session_id: SessionId) {
        self.remove_session(session_id);
        self.gateway.unregister(session_id);
    }

    /// Report a rejected intent to its originator
    ///
    /// Stale and foreign updates are only logged.
    pub fn reject(&self, session_id: SessionId, err: RoomError) {
        if err.is_silent() {
            warn!("Dropping request from {}: {}", session_id, err);
            return;
        }
        debug!("Rejecting request from {}: {}", session_id, err);
        self.gateway.send_to(session_id, err.into());
    }

    /// Create a room with the caller as host
    pub fn create_room(
        &mut self,
        session_id: SessionId,
        player_name: &str,
        emoji: Option<String>,
        max_players: Option<usize>,
    ) -> Result<RoomCode, RoomError> {
        if let Some(code) = self.registry.room_of(session_id) {
            return Err(RoomError::AlreadyInRoom(code.clone()));
        }

        let name = player_name.trim().to_string();
        let max_players = max_players.unwrap_or(self.default_max_players).max(1);
        let host = Player::new(
            &mut self.rng,
            session_id,
            name,
            emoji.unwrap_or_default(),
            true,
        );
        let room = self
            .registry
            .allocate(&mut self.rng, |code| Room::new(code, host, max_players))?;

        let code = room.code.clone();
        let player = room.players[0].clone();
        info!(
            "Session {} created room {} as '{}' (max {})",
            session_id, code, player.name, max_players
        );

        self.gateway.send_to(
            session_id,
            ServerMessage::RoomCreated {
                room_code: code.clone(),
                player,
                is_host: true,
            },
        );
        Ok(code)
    }

    /// Read-only room lookup; replies to the caller only
    pub fn check_room(&self, session_id: SessionId, room_code: &str) -> bool {
        let room = RoomCode::parse(room_code).and_then(|code| self.registry.get(&code));

        let reply = match room {
            Some(room) => ServerMessage::RoomChecked {
                exists: true,
                used_emojis: Some(room.used_emojis()),
                player_count: Some(room.player_count()),
            },
            None => ServerMessage::RoomChecked {
                exists: false,
                used_emojis: None,
                player_count: None,
            },
        };
        let exists = room.is_some();
        debug!("Session {} checked room {}: exists={}", session_id, room_code, exists);

        self.gateway.send_to(session_id, reply);
        exists
    }

    /// Admit the caller as a guest
    pub fn join_room(
        &mut self,
        session_id: SessionId,
        room_code: &str,
        player_name: &str,
        emoji: String,
    ) -> Result<PlayerId, RoomError> {
        if let Some(code) = self.registry.room_of(session_id) {
            return Err(RoomError::AlreadyInRoom(code.clone()));
        }

        let code = RoomCode::parse(room_code)
            .ok_or_else(|| RoomError::RoomNotFound(room_code.trim().to_string()))?;
        let room = self
            .registry
            .get_mut(&code)
            .ok_or_else(|| RoomError::RoomNotFound(code.to_string()))?;

        if room.is_full() {
            return Err(RoomError::RoomFull(code));
        }
        if room.emoji_taken(&emoji, None) {
            return Err(RoomError::EmojiConflict(emoji));
        }

        let player = Player::new(
            &mut self.rng,
            session_id,
            player_name.trim().to_string(),
            emoji,
            false,
        );
        room.add_player(player.clone());

        let players = room.players.clone();
        let used_emojis = room.used_emojis();
        info!(
            "Session {} joined room {} as '{}' ({} players)",
            session_id,
            code,
            player.name,
            players.len()
        );

        let update = ServerMessage::RoomUpdate {
            room_code: code.clone(),
            players: players.clone(),
            used_emojis: used_emojis.clone(),
        };
        self.gateway.broadcast_to_room(room, &update);

        let emojis = ServerMessage::UsedEmojis {
            emojis: used_emojis.clone(),
        };
        self.gateway.broadcast_to_room(room, &emojis);

        let announcement = ServerMessage::PlayerJoined {
            players: players.clone(),
            player: player.clone(),
            all_players: players.clone(),
        };
        self.gateway
            .broadcast_to_room_except(room, session_id, &announcement);

        let player_id = player.id;
        self.gateway.send_to(
            session_id,
            ServerMessage::RoomJoined {
                room_code: code.clone(),
                player,
                players,
                is_host: false,
                used_emojis,
            },
        );
        self.registry.attach(session_id, code);
        Ok(player_id)
    }

    /// Change a player's emoji; only the owning session may do so
    pub fn update_emoji(
        &mut self,
        session_id: SessionId,
        room_code: &str,
        player_id: &str,
        emoji: String,
    ) -> Result<(), RoomError> {
        let stale = || RoomError::StaleReference {
            room_code: room_code.to_string(),
            player_id: player_id.to_string(),
        };

        let player_id = PlayerId::parse(player_id).ok_or_else(stale)?;
        let code = RoomCode::parse(room_code).ok_or_else(stale)?;
        let room = self.registry.get_mut(&code).ok_or_else(stale)?;
        let player = room.player(player_id).ok_or_else(stale)?;

        if player.session_id != session_id {
            return Err(RoomError::NotOwner(player_id));
        }
        if room.emoji_taken(&emoji, Some(player_id)) {
            return Err(RoomError::EmojiConflict(emoji));
        }

        if let Some(player) = room.player_mut(player_id) {
            info!(
                "Room {}: '{}' changed emoji '{}' -> '{}'",
                code, player.name, player.emoji, emoji
            );
            player.emoji = emoji;
        }
        room.touch();

        let update = ServerMessage::RoomUpdate {
            room_code: code,
            players: room.players.clone(),
            used_emojis: room.used_emojis(),
        };
        self.gateway.broadcast_to_room(room, &update);
        Ok(())
    }

    /// Leave the current room but keep the connection
    pub fn leave_room(&mut self, session_id: SessionId) -> Result<RoomCode, RoomError> {
        let code = self
            .remove_session(session_id)
            .ok_or(RoomError::NotInRoom)?;
        self.gateway.send_to(
            session_id,
            ServerMessage::RoomLeft {
                room_code: code.clone(),
            },
        );
        Ok(code)
    }

    /// Close rooms idle for at least the configured timeout
    pub fn reap_idle(&mut self, now: Instant) -> Vec<RoomCode> {
        let idle: Vec<RoomCode> = self
            .registry
            .rooms()
            .filter(|room| room.idle_for(now) >= self.idle_timeout)
            .map(|room| room.code.clone())
            .collect();

        for code in &idle {
            if let Some(room) = self.registry.remove(code) {
                self.close(&room, ROOM_IDLE_MESSAGE, now);
            }
        }
        idle
    }

    /// Remove the session's player, closing the room when required
    ///
    /// Returns the room the session was in.
    fn remove_session(&mut self, session_id: SessionId) -> Option<RoomCode> {
        let code = self.registry.detach(session_id)?;
        let Some(room) = self.registry.get_mut(&code) else {
            warn!("Session {} indexed to missing room {}", session_id, code);
            return None;
        };

        match room.remove_session(session_id) {
            Departure::NotPresent => {
                warn!("Session {} not found among players of {}", session_id, code);
            }
            Departure::Left(player) => {
                info!(
                    "Room {}: '{}' left ({} remaining)",
                    code,
                    player.name,
                    room.player_count()
                );
                let msg = ServerMessage::PlayerLeft {
                    players: room.players.clone(),
                };
                self.gateway.broadcast_to_room(room, &msg);
            }
            Departure::Closed { player, host_left } => {
                let reason = if host_left {
                    HOST_LEFT_MESSAGE
                } else {
                    ROOM_EMPTY_MESSAGE
                };
                debug!("Room {}: '{}' left, closing", code, player.name);
                if let Some(room) = self.registry.remove(&code) {
                    self.close(&room, reason, Instant::now());
                }
            }
        }
        Some(code)
    }

    /// Tell everyone still in a removed room that it is gone
    fn close(&self, room: &Room, reason: &str, now: Instant) {
        info!(
            room = %room.code,
            reason,
            lifetime_ms = room.lifetime(now).as_millis() as u64,
            final_players = room.player_count(),
            "Room closed"
        );
        let msg = ServerMessage::RoomClosed {
            message: reason.to_string(),
        };
        self.gateway.broadcast_to_room(room, &msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ErrorType;

    struct Client {
        id: SessionId,
        rx: mpsc::Receiver<ServerMessage>,
    }

    impl Client {
        fn drain(&mut self) -> Vec<ServerMessage> {
            let mut out = Vec::new();
            while let Ok(msg) = self.rx.try_recv() {
                out.push(msg);
            }
            out
        }
    }

    fn coordinator() -> RoomCoordinator {
        RoomCoordinator::with_rng(
            RoomRegistry::new(),
            Gateway::new(),
            &ServerConfig::default(),
            StdRng::seed_from_u64(42),
        )
    }

    fn connect(coord: &mut RoomCoordinator) -> Client {
        let (tx, rx) = mpsc::channel(64);
        let id = SessionId::new();
        coord.connect(id, tx);
        let mut client = Client { id, rx };
        assert_eq!(client.drain(), vec![ServerMessage::Connected { session_id: id }]);
        client
    }

    fn emojis_of(coord: &RoomCoordinator, code: &RoomCode) -> Vec<String> {
        coord.registry().get(code).unwrap().used_emojis()
    }

    #[test]
    fn test_create_room_replies_to_host() {
        let mut coord = coordinator();
        let mut ann = connect(&mut coord);

        let code = coord.create_room(ann.id, "  Ann ", None, None).unwrap();

        let msgs = ann.drain();
        assert_eq!(msgs.len(), 1);
        let ServerMessage::RoomCreated {
            room_code,
            player,
            is_host,
        } = &msgs[0]
        else {
            panic!("expected room_created, got {:?}", msgs[0]);
        };
        assert_eq!(room_code, &code);
        assert!(*is_host);
        assert!(player.is_host);
        assert_eq!(player.name, "Ann");
        assert_eq!(player.emoji, "");

        let room = coord.registry().get(&code).unwrap();
        assert_eq!(room.max_players, 8);
        assert_eq!(room.host_session, ann.id);
    }

    #[test]
    fn test_blank_names_are_accepted() {
        let mut coord = coordinator();
        let mut ann = connect(&mut coord);
        let bob = connect(&mut coord);

        let code = coord.create_room(ann.id, "   ", None, None).unwrap();
        assert!(matches!(ann.drain().as_slice(), [ServerMessage::RoomCreated { player, .. }]
            if player.name.is_empty()));

        coord.join_room(bob.id, code.as_str(), "", "🐶".into()).unwrap();
        let room = coord.registry().get(&code).unwrap();
        assert_eq!(room.player_count(), 2);
        assert_eq!(room.players[1].name, "");
    }

    #[test]
    fn test_session_holds_one_room() {
        let mut coord = coordinator();
        let ann = connect(&mut coord);
        let code = coord.create_room(ann.id, "Ann", None, None).unwrap();

        assert_eq!(
            coord.create_room(ann.id, "Ann", None, None),
            Err(RoomError::AlreadyInRoom(code.clone()))
        );
        assert_eq!(
            coord.join_room(ann.id, code.as_str(), "Ann", "🐶".into()),
            Err(RoomError::AlreadyInRoom(code))
        );
        assert_eq!(coord.registry().len(), 1);
    }

    #[test]
    fn test_check_room_is_read_only() {
        let mut coord = coordinator();
        let mut ann = connect(&mut coord);
        let mut visitor = connect(&mut coord);
        let code = coord
            .create_room(ann.id, "Ann", Some("🦊".into()), None)
            .unwrap();
        ann.drain();

        assert!(coord.check_room(visitor.id, &code.as_str().to_lowercase()));
        assert_eq!(
            visitor.drain(),
            vec![ServerMessage::RoomChecked {
                exists: true,
                used_emojis: Some(vec!["🦊".to_string()]),
                player_count: Some(1),
            }]
        );
        assert!(ann.drain().is_empty());
        assert!(coord.registry().room_of(visitor.id).is_none());

        assert!(!coord.check_room(visitor.id, "ZZZZ"));
        assert_eq!(
            visitor.drain(),
            vec![ServerMessage::RoomChecked {
                exists: false,
                used_emojis: None,
                player_count: None,
            }]
        );
    }

    #[test]
    fn test_join_unknown_room() {
        let mut coord = coordinator();
        let bob = connect(&mut coord);

        assert_eq!(
            coord.join_room(bob.id, "ZZZZ", "Bob", "🐶".into()),
            Err(RoomError::RoomNotFound("ZZZZ".into()))
        );
        assert_eq!(
            coord.join_room(bob.id, "not-a-code", "Bob", "🐶".into()),
            Err(RoomError::RoomNotFound("not-a-code".into()))
        );
        assert!(coord.registry().room_of(bob.id).is_none());
    }

    #[test]
    fn test_join_broadcasts() {
        let mut coord = coordinator();
        let mut ann = connect(&mut coord);
        let mut bob = connect(&mut coord);
        let code = coord.create_room(ann.id, "Ann", None, None).unwrap();
        ann.drain();

        let bob_id = coord
            .join_room(bob.id, code.as_str(), "Bob", "🐶".into())
            .unwrap();
        let roster = coord.registry().get(&code).unwrap().players.clone();
        assert_eq!(roster.len(), 2);
        assert_eq!(roster[1].id, bob_id);
        assert_ne!(bob_id.0, bob.id.0);

        let ann_msgs = ann.drain();
        assert_eq!(ann_msgs.len(), 3);
        assert!(matches!(&ann_msgs[0], ServerMessage::RoomUpdate { players, .. } if *players == roster));
        assert_eq!(
            ann_msgs[1],
            ServerMessage::UsedEmojis {
                emojis: vec!["🐶".into()]
            }
        );
        assert!(matches!(&ann_msgs[2], ServerMessage::PlayerJoined { player, all_players, .. }
            if player.id == bob_id && *all_players == roster));

        let bob_msgs = bob.drain();
        assert_eq!(bob_msgs.len(), 3);
        assert!(!bob_msgs
            .iter()
            .any(|m| matches!(m, ServerMessage::PlayerJoined { .. })));
        assert_eq!(
            bob_msgs[2],
            ServerMessage::RoomJoined {
                room_code: code,
                player: roster[1].clone(),
                players: roster,
                is_host: false,
                used_emojis: vec!["🐶".into()],
            }
        );
    }

    #[test]
    fn test_join_emoji_conflict_leaves_room_unchanged() {
        let mut coord = coordinator();
        let mut ann = connect(&mut coord);
        let bob = connect(&mut coord);
        let mut cy = connect(&mut coord);
        let code = coord.create_room(ann.id, "Ann", None, None).unwrap();
        coord
            .join_room(bob.id, code.as_str(), "Bob", "🐶".into())
            .unwrap();
        ann.drain();
        let before = coord.registry().get(&code).unwrap().players.clone();

        let err = coord
            .join_room(cy.id, code.as_str(), "Cy", "🐶".into())
            .unwrap_err();
        assert_eq!(err, RoomError::EmojiConflict("🐶".into()));
        coord.reject(cy.id, err);

        assert_eq!(coord.registry().get(&code).unwrap().players, before);
        assert!(coord.registry().room_of(cy.id).is_none());
        assert!(ann.drain().is_empty());
        assert!(matches!(
            cy.drain().as_slice(),
            [ServerMessage::GameError {
                kind: ErrorType::EmojiConflict,
                ..
            }]
        ));
    }

    #[test]
    fn test_empty_emojis_never_conflict() {
        let mut coord = coordinator();
        let ann = connect(&mut coord);
        let bob = connect(&mut coord);
        let cy = connect(&mut coord);
        let code = coord.create_room(ann.id, "Ann", None, None).unwrap();

        coord
            .join_room(bob.id, code.as_str(), "Bob", String::new())
            .unwrap();
        coord
            .join_room(cy.id, code.as_str(), "Cy", String::new())
            .unwrap();
        assert_eq!(coord.registry().get(&code).unwrap().player_count(), 3);
        assert!(emojis_of(&coord, &code).is_empty());
    }

    #[test]
    fn test_join_full_room() {
        let mut coord = coordinator();
        let ann = connect(&mut coord);
        let bob = connect(&mut coord);
        let cy = connect(&mut coord);
        let code = coord.create_room(ann.id, "Ann", None, Some(2)).unwrap();
        coord
            .join_room(bob.id, code.as_str(), "Bob", "🐶".into())
            .unwrap();

        assert_eq!(
            coord.join_room(cy.id, code.as_str(), "Cy", "🦊".into()),
            Err(RoomError::RoomFull(code.clone()))
        );
        assert_eq!(coord.registry().get(&code).unwrap().player_count(), 2);
    }

    #[test]
    fn test_update_emoji_broadcasts_roster() {
        let mut coord = coordinator();
        let mut ann = connect(&mut coord);
        let mut bob = connect(&mut coord);
        let code = coord.create_room(ann.id, "Ann", None, None).unwrap();
        coord
            .join_room(bob.id, code.as_str(), "Bob", "🐶".into())
            .unwrap();
        let ann_player = coord.registry().get(&code).unwrap().players[0].id;
        ann.drain();
        bob.drain();

        coord
            .update_emoji(ann.id, code.as_str(), &ann_player.to_string(), "🦊".into())
            .unwrap();

        for client in [&mut ann, &mut bob] {
            let msgs = client.drain();
            assert_eq!(msgs.len(), 1);
            let ServerMessage::RoomUpdate { used_emojis, .. } = &msgs[0] else {
                panic!("expected room_update, got {:?}", msgs[0]);
            };
            assert!(used_emojis.contains(&"🐶".to_string()));
            assert!(used_emojis.contains(&"🦊".to_string()));
        }
    }

    #[test]
    fn test_update_emoji_to_own_emoji_is_allowed() {
        let mut coord = coordinator();
        let ann = connect(&mut coord);
        let code = coord
            .create_room(ann.id, "Ann", Some("🦊".into()), None)
            .unwrap();
        let ann_player = coord.registry().get(&code).unwrap().players[0].id;

        assert!(coord
            .update_emoji(ann.id, code.as_str(), &ann_player.to_string(), "🦊".into())
            .is_ok());
    }

    #[test]
    fn test_update_emoji_conflict() {
        let mut coord = coordinator();
        let ann = connect(&mut coord);
        let mut bob = connect(&mut coord);
        let code = coord.create_room(ann.id, "Ann", None, None).unwrap();
        let bob_player = coord
            .join_room(bob.id, code.as_str(), "Bob", "🐶".into())
            .unwrap();
        let ann_player = coord.registry().get(&code).unwrap().players[0].id;
        coord
            .update_emoji(ann.id, code.as_str(), &ann_player.to_string(), "🦊".into())
            .unwrap();
        bob.drain();

        assert_eq!(
            coord.update_emoji(bob.id, code.as_str(), &bob_player.to_string(), "🦊".into()),
            Err(RoomError::EmojiConflict("🦊".into()))
        );
        assert_eq!(emojis_of(&coord, &code), vec!["🦊".to_string(), "🐶".to_string()]);
        assert!(bob.drain().is_empty());
    }

    #[test]
    fn test_update_emoji_stale_and_foreign_are_silent() {
        let mut coord = coordinator();
        let mut ann = connect(&mut coord);
        let mut bob = connect(&mut coord);
        let code = coord.create_room(ann.id, "Ann", None, None).unwrap();
        let bob_player = coord
            .join_room(bob.id, code.as_str(), "Bob", "🐶".into())
            .unwrap();
        ann.drain();
        bob.drain();

        let stale = coord
            .update_emoji(bob.id, "ZZZZ", &bob_player.to_string(), "🦊".into())
            .unwrap_err();
        assert!(matches!(stale, RoomError::StaleReference { .. }));
        coord.reject(bob.id, stale);

        let missing = coord
            .update_emoji(bob.id, code.as_str(), &PlayerId::new().to_string(), "🦊".into())
            .unwrap_err();
        assert!(matches!(missing, RoomError::StaleReference { .. }));

        let malformed = coord
            .update_emoji(bob.id, code.as_str(), "stale-id", "🦊".into())
            .unwrap_err();
        assert!(malformed.is_silent());
        coord.reject(bob.id, malformed);

        let foreign = coord
            .update_emoji(ann.id, code.as_str(), &bob_player.to_string(), "🦊".into())
            .unwrap_err();
        assert_eq!(foreign, RoomError::NotOwner(bob_player));
        coord.reject(ann.id, foreign);

        assert_eq!(emojis_of(&coord, &code), vec!["🐶".to_string()]);
        assert!(ann.drain().is_empty());
        assert!(bob.drain().is_empty());
    }

    #[test]
    fn test_guest_disconnect_keeps_room() {
        let mut coord = coordinator();
        let mut ann = connect(&mut coord);
        let bob = connect(&mut coord);
        let code = coord.create_room(ann.id, "Ann", None, None).unwrap();
        coord
            .join_room(bob.id, code.as_str(), "Bob", "🐶".into())
            .unwrap();
        ann.drain();

        coord.disconnect(bob.id);

        let room = coord.registry().get(&code).unwrap();
        assert_eq!(room.player_count(), 1);
        assert!(coord.registry().room_of(bob.id).is_none());
        assert_eq!(
            ann.drain(),
            vec![ServerMessage::PlayerLeft {
                players: room.players.clone()
            }]
        );
        assert_eq!(coord.stats().sessions, 1);
    }

    #[test]
    fn test_host_disconnect_closes_room() {
        let mut coord = coordinator();
        let ann = connect(&mut coord);
        let mut bob = connect(&mut coord);
        let mut cy = connect(&mut coord);
        let code = coord.create_room(ann.id, "Ann", None, None).unwrap();
        coord
            .join_room(bob.id, code.as_str(), "Bob", "🐶".into())
            .unwrap();
        coord
            .join_room(cy.id, code.as_str(), "Cy", "🐱".into())
            .unwrap();
        bob.drain();
        cy.drain();

        coord.disconnect(ann.id);

        assert!(!coord.registry().contains(&code));
        assert!(coord.registry().room_of(bob.id).is_none());
        assert!(coord.registry().room_of(cy.id).is_none());
        for client in [&mut bob, &mut cy] {
            assert_eq!(
                client.drain(),
                vec![ServerMessage::RoomClosed {
                    message: HOST_LEFT_MESSAGE.into()
                }]
            );
        }
    }

    #[test]
    fn test_last_player_leaving_deletes_room() {
        let mut coord = coordinator();
        let ann = connect(&mut coord);
        let code = coord.create_room(ann.id, "Ann", None, None).unwrap();

        coord.disconnect(ann.id);

        assert!(coord.registry().is_empty());
        assert!(!coord.registry().contains(&code));
        assert_eq!(coord.stats().sessions, 0);
    }

    #[test]
    fn test_disconnect_without_room_is_noop() {
        let mut coord = coordinator();
        let ann = connect(&mut coord);
        let code = coord.create_room(ann.id, "Ann", None, None).unwrap();
        let idle = connect(&mut coord);

        coord.disconnect(idle.id);

        assert!(coord.registry().contains(&code));
        assert_eq!(coord.stats().sessions, 1);
    }

    #[test]
    fn test_leave_room_keeps_session() {
        let mut coord = coordinator();
        let mut ann = connect(&mut coord);
        let mut bob = connect(&mut coord);
        let code = coord.create_room(ann.id, "Ann", None, None).unwrap();
        coord
            .join_room(bob.id, code.as_str(), "Bob", "🐶".into())
            .unwrap();
        ann.drain();
        bob.drain();

        assert_eq!(coord.leave_room(bob.id), Ok(code.clone()));
        assert_eq!(
            bob.drain(),
            vec![ServerMessage::RoomLeft {
                room_code: code.clone()
            }]
        );
        assert!(matches!(ann.drain().as_slice(), [ServerMessage::PlayerLeft { .. }]));

        // free to join again, even with the same emoji
        assert!(coord
            .join_room(bob.id, code.as_str(), "Bob", "🐶".into())
            .is_ok());
        let idle = connect(&mut coord);
        assert_eq!(coord.leave_room(idle.id), Err(RoomError::NotInRoom));
    }

    #[test]
    fn test_reap_idle_rooms() {
        let mut coord = coordinator();
        let ann = connect(&mut coord);
        let mut bob = connect(&mut coord);
        let cy = connect(&mut coord);
        let stale = coord.create_room(ann.id, "Ann", None, None).unwrap();
        coord
            .join_room(bob.id, stale.as_str(), "Bob", "🐶".into())
            .unwrap();
        bob.drain();

        let timeout = ServerConfig::default().idle_timeout();
        let later = Instant::now() + timeout + Duration::from_secs(1);
        let fresh = coord.create_room(cy.id, "Cy", None, None).unwrap();
        coord.registry.get_mut(&fresh).unwrap().last_activity = later;

        assert_eq!(coord.reap_idle(later), vec![stale.clone()]);
        assert!(!coord.registry().contains(&stale));
        assert!(coord.registry().contains(&fresh));
        assert!(coord.registry().room_of(bob.id).is_none());
        assert_eq!(
            bob.drain(),
            vec![ServerMessage::RoomClosed {
                message: ROOM_IDLE_MESSAGE.into()
            }]
        );
    }

    #[test]
    fn test_codes_unique_across_many_rooms() {
        let mut coord = coordinator();
        let mut codes = std::collections::HashSet::new();
        for _ in 0..300 {
            let host = connect(&mut coord);
            codes.insert(coord.create_room(host.id, "Host", None, None).unwrap());
        }
        assert_eq!(codes.len(), 300);
        assert_eq!(coord.stats().rooms, 300);
    }

    #[test]
    fn test_walkthrough() {
        let mut coord = coordinator();
        let mut ann = connect(&mut coord);
        let mut bob = connect(&mut coord);
        let mut cy = connect(&mut coord);

        let code = coord.create_room(ann.id, "Ann", None, None).unwrap();
        coord
            .join_room(bob.id, code.as_str(), "Bob", "🐶".into())
            .unwrap();
        let bob_msgs = bob.drain();
        assert!(matches!(bob_msgs.last(), Some(ServerMessage::RoomJoined { is_host: false, used_emojis, .. })
            if *used_emojis == vec!["🐶".to_string()]));

        let err = coord
            .join_room(cy.id, code.as_str(), "Cy", "🐶".into())
            .unwrap_err();
        coord.reject(cy.id, err);
        assert!(matches!(
            cy.drain().as_slice(),
            [ServerMessage::GameError {
                kind: ErrorType::EmojiConflict,
                ..
            }]
        ));

        ann.drain();
        let ann_player = coord.registry().get(&code).unwrap().players[0].id;
        coord
            .update_emoji(ann.id, code.as_str(), &ann_player.to_string(), "🦊".into())
            .unwrap();
        for client in [&mut ann, &mut bob] {
            assert!(matches!(client.drain().as_slice(), [ServerMessage::RoomUpdate { used_emojis, .. }]
                if used_emojis.len() == 2));
        }

        coord.disconnect(ann.id);
        assert_eq!(
            bob.drain(),
            vec![ServerMessage::RoomClosed {
                message: HOST_LEFT_MESSAGE.into()
            }]
        );
        assert!(coord.registry().is_empty());
    }
}
