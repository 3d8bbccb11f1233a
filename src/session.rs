//! Session struct definition
//!
//! Represents one live connection and its outbound message channel.

use tokio::sync::mpsc;

use crate::error::SendError;
use crate::message::ServerMessage;

/// Connected session
///
/// Holds no room state; room membership lives in the registry.
#[derive(Debug)]
pub struct Session {
    /// Server → Client message channel
    pub sender: mpsc::Sender<ServerMessage>,
}

impl Session {
    pub fn new(sender: mpsc::Sender<ServerMessage>) -> Self {
        Self { sender }
    }

    /// Queue a message for this session without waiting
    ///
    /// Returns an error if the channel is closed (client disconnected) or
    /// the client has fallen too far behind.
    pub fn send(&self, msg: ServerMessage) -> Result<(), SendError> {
        self.sender.try_send(msg).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SendError::ChannelFull,
            mpsc::error::TrySendError::Closed(_) => SendError::ChannelClosed,
        })
    }
}
