use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};

use crate::events::DisconnectReason;
use crate::relay::{RelayError, SharedRelay};

/// Accepts connections until the task is aborted.
pub async fn serve(listener: TcpListener, relay: SharedRelay) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let relay = relay.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, addr, relay.clone()).await {
                        log::debug!("Connection from {} ended: {}", addr, e);
                        if !matches!(e, RelayError::Full { .. }) {
                            relay.lock().report_error(format!("{addr}: {e}"));
                        }
                    }
                });
            }
            Err(e) => {
                relay.lock().report_error(format!("Accept failed: {e}"));
            }
        }
    }
}

async fn handle_connection(stream: TcpStream, addr: SocketAddr, relay: SharedRelay) -> Result<(), RelayError> {
    let mut ws_stream = accept_async(stream).await?;

    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<String>();
    let joined = relay.lock().join(addr, outbound_tx);
    let peer_id = match joined {
        Ok(peer_id) => peer_id,
        Err(e) => {
            let _ = ws_stream.close(None).await;
            return Err(e);
        }
    };

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let outgoing = async {
        while let Some(text) = outbound_rx.recv().await {
            if let Err(e) = ws_sender.send(Message::Text(text.into())).await {
                log::debug!("Failed to send to {}: {}", peer_id, e);
                return DisconnectReason::Dropped;
            }
        }
        let _ = ws_sender.close().await;
        DisconnectReason::Shutdown
    };

    let incoming = async {
        while let Some(frame) = ws_receiver.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    let relayed = relay.lock().relay(&peer_id, text.as_str());
                    if let Err(e) = relayed {
                        log::warn!("Rejected frame from {}: {}", peer_id, e);
                    }
                }
                Ok(Message::Close(_)) => return DisconnectReason::Graceful,
                Ok(_) => {}
                Err(e) => {
                    log::debug!("WebSocket error for {}: {}", peer_id, e);
                    return DisconnectReason::Dropped;
                }
            }
        }
        DisconnectReason::Dropped
    };

    let reason = tokio::select! {
        reason = incoming => reason,
        reason = outgoing => reason,
    };

    relay.lock().leave(&peer_id, reason);
    Ok(())
}
