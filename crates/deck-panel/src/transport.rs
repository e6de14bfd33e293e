//! Websocket link to the agent server.
//!
//! One task owns the socket for the lifetime of the panel. The link is
//! re-dialed forever on a fixed delay; commands that arrive while the link
//! is down are dropped, matching the fire-and-forget contract.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, warn};
use url::Url;

use deck_core::{Command, RemoteEvent};

/// Link lifecycle notifications delivered to the panel thread.
#[derive(Debug)]
pub enum LinkEvent {
    Connecting,
    Up,
    Down,
    Remote(RemoteEvent),
}

pub async fn run(
    url: Url,
    reconnect_delay: Duration,
    events: mpsc::UnboundedSender<LinkEvent>,
    mut commands: mpsc::UnboundedReceiver<Command>,
) {
    loop {
        if events.send(LinkEvent::Connecting).is_err() {
            return;
        }
        match connect_async(url.as_str()).await {
            Ok((mut ws, _)) => {
                debug!("link established");
                if events.send(LinkEvent::Up).is_err() {
                    let _ = ws.close(None).await;
                    return;
                }
                loop {
                    tokio::select! {
                        inbound = ws.next() => match inbound {
                            Some(Ok(Message::Text(frame))) => match RemoteEvent::parse(&frame) {
                                Ok(event) => {
                                    if events.send(LinkEvent::Remote(event)).is_err() {
                                        let _ = ws.close(None).await;
                                        return;
                                    }
                                }
                                Err(err) => debug!("dropping inbound frame: {err}"),
                            },
                            Some(Ok(Message::Close(_))) | None => break,
                            Some(Ok(_)) => {}
                            Some(Err(err)) => {
                                warn!("link error: {err}");
                                break;
                            }
                        },
                        outbound = commands.recv() => match outbound {
                            Some(command) => {
                                let frame = match serde_json::to_string(&command) {
                                    Ok(frame) => frame,
                                    Err(err) => {
                                        warn!("command serialization failed: {err}");
                                        continue;
                                    }
                                };
                                if ws.send(Message::Text(frame)).await.is_err() {
                                    break;
                                }
                            }
                            None => {
                                let _ = ws.close(None).await;
                                return;
                            }
                        },
                    }
                }
                let _ = ws.close(None).await;
            }
            Err(err) => warn!("connect failed: {err}"),
        }
        if events.send(LinkEvent::Down).is_err() {
            return;
        }
        if !wait_for_retry(reconnect_delay, &mut commands).await {
            return;
        }
    }
}

/// Sleep out one reconnect delay, draining and dropping any commands issued
/// while the link is down. Returns false once the panel side has gone away.
async fn wait_for_retry(
    delay: Duration,
    commands: &mut mpsc::UnboundedReceiver<Command>,
) -> bool {
    let retry = tokio::time::sleep(delay);
    tokio::pin!(retry);
    loop {
        tokio::select! {
            () = &mut retry => return true,
            outbound = commands.recv() => match outbound {
                Some(command) => debug!("dropping {command:?}: link down"),
                None => return false,
            },
        }
    }
}
