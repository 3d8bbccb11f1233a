//! WebSocket connection handler
//!
//! Handles individual client connections: WebSocket handshake,
//! message parsing, and bidirectional communication with the RoomServer.

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use crate::error::AppError;
use crate::message::{ClientMessage, ServerMessage};
use crate::server::ServerCommand;
use crate::types::SessionId;

/// Outbound queue depth per session
const SESSION_BUFFER_SIZE: usize = 64;

/// Connection accept loop
///
/// Spawns one handler task per accepted connection. Accept errors are
/// logged and the loop keeps going; it only ends when dropped.
pub async fn serve(listener: TcpListener, cmd_tx: mpsc::Sender<ServerCommand>) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                debug!("Accepted connection from {}", addr);
                let cmd_tx = cmd_tx.clone();

                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, cmd_tx).await {
                        error!("Connection handler error: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}

/// Handle a new TCP connection
///
/// Performs WebSocket handshake, sets up bidirectional communication,
/// and manages the connection lifecycle. Exactly one `Disconnect` is sent
/// for every session that was registered.
pub async fn handle_connection(
    stream: TcpStream,
    cmd_tx: mpsc::Sender<ServerCommand>,
) -> Result<(), AppError> {
    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    debug!("New TCP connection from {}", peer_addr);

    // WebSocket handshake
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let session_id = SessionId::new();
    info!("Session {} connected from {}", session_id, peer_addr);

    // Channel for server -> client messages
    let (msg_tx, mut msg_rx) = mpsc::channel::<ServerMessage>(SESSION_BUFFER_SIZE);

    // Register with RoomServer; it replies with `connected`
    if cmd_tx
        .send(ServerCommand::Connect {
            session_id,
            sender: msg_tx.clone(),
        })
        .await
        .is_err()
    {
        error!("Failed to register session {} - server closed", session_id);
        return Err(AppError::ChannelSend);
    }

    let cmd_tx_read = cmd_tx.clone();

    // Read task (WebSocket -> ServerCommand)
    let mut read_task = tokio::spawn(async move {
        while let Some(msg_result) = ws_receiver.next().await {
            match msg_result {
                Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_msg) => {
                        let cmd = client_message_to_command(session_id, client_msg);
                        if cmd_tx_read.send(cmd).await.is_err() {
                            debug!("Server closed, ending read task for {}", session_id);
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Invalid message from {}: {}", session_id, e);
                        if let Err(e) =
                            msg_tx.try_send(ServerMessage::error("Invalid message format"))
                        {
                            warn!("Failed to deliver to session {}: {}", session_id, e);
                        }
                    }
                },
                Ok(Message::Close(_)) => {
                    debug!("Session {} sent close frame", session_id);
                    break;
                }
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                    // Pong replies are handled by tungstenite
                }
                Ok(_) => {
                    // Binary or other message types - ignore
                }
                Err(e) => {
                    error!("WebSocket error for {}: {}", session_id, e);
                    break;
                }
            }
        }
        debug!("Read task ended for {}", session_id);
    });

    // Write task (ServerMessage -> WebSocket)
    let mut write_task = tokio::spawn(async move {
        while let Some(msg) = msg_rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if ws_sender.send(Message::Text(json.into())).await.is_err() {
                        debug!("WebSocket send failed, ending write task");
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to serialize message: {}", e);
                }
            }
        }
        debug!("Write task ended for session");

        let _ = ws_sender.close().await;
    });

    // Wait for either task to complete, then stop the other
    tokio::select! {
        _ = &mut read_task => {
            debug!("Read task completed for {}", session_id);
            write_task.abort();
        }
        _ = &mut write_task => {
            debug!("Write task completed for {}", session_id);
            read_task.abort();
        }
    }

    let _ = cmd_tx.send(ServerCommand::Disconnect { session_id }).await;

    info!("Session {} disconnected", session_id);

    Ok(())
}

/// Convert a ClientMessage to a ServerCommand
fn client_message_to_command(session_id: SessionId, msg: ClientMessage) -> ServerCommand {
    match msg {
        ClientMessage::CreateRoom {
            player_name,
            emoji,
            max_players,
        } => ServerCommand::CreateRoom {
            session_id,
            player_name,
            emoji,
            max_players,
        },
        ClientMessage::CheckRoom { room_code } => ServerCommand::CheckRoom {
            session_id,
            room_code,
        },
        ClientMessage::JoinRoom {
            room_code,
            player_name,
            emoji,
        } => ServerCommand::JoinRoom {
            session_id,
            room_code,
            player_name,
            emoji,
        },
        ClientMessage::UpdateSpiritAnimal {
            room_code,
            player_id,
            emoji,
        } => ServerCommand::UpdateSpiritAnimal {
            session_id,
            room_code,
            player_id,
            emoji,
        },
        ClientMessage::LeaveRoom => ServerCommand::LeaveRoom { session_id },
    }
}
