use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{mpsc, Notify};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::global::is_debug_websocket_enabled;
use crate::logger::{log, LogTag};
use crate::rpc::mask_endpoint;
use crate::utils::{delay_with_shutdown, truncate_address};

/// Bound on the initial connect + TLS handshake
const CONNECT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Lifecycle of the streaming subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Subscribing,
    Listening,
}

/// WebSocket client streaming log events that mention the tracked authority
pub struct LaunchLogsClient {
    authority: String,
    sig_sender: mpsc::UnboundedSender<String>, // Channel to send new transaction signatures
}

/// logsSubscribe request frame
#[derive(Serialize)]
struct LogsSubscribe {
    jsonrpc: String,
    id: u64,
    method: String,
    params: Vec<serde_json::Value>,
}

impl LaunchLogsClient {
    pub fn new(authority: String, sig_sender: mpsc::UnboundedSender<String>) -> Self {
        Self {
            authority,
            sig_sender,
        }
    }

    /// Run one subscription session: connect, subscribe, listen until the
    /// connection drops. Returns Ok on a server-side close, Err on failure.
    pub async fn run_once(&self, ws_url: &str) -> Result<(), String> {
        let mut state = ConnectionState::Disconnected;

        let (ws_stream, _) = tokio::time::timeout(CONNECT_TIMEOUT, connect_async(ws_url))
            .await
            .map_err(|_| format!("WebSocket connect timed out after {:?}", CONNECT_TIMEOUT))?
            .map_err(|e| format!("Failed to connect to WebSocket: {}", e))?;

        let (mut ws_sender, mut ws_receiver) = ws_stream.split();

        let subscribe_message = LogsSubscribe {
            jsonrpc: "2.0".to_string(),
            id: 1,
            method: "logsSubscribe".to_string(),
            params: vec![
                serde_json::json!({
                    "mentions": [self.authority]
                }),
                serde_json::json!({
                    "commitment": "confirmed"
                }),
            ],
        };

        let subscribe_text = serde_json::to_string(&subscribe_message)
            .map_err(|e| format!("Failed to serialize subscription: {}", e))?;

        self.transition(&mut state, ConnectionState::Subscribing);

        ws_sender
            .send(Message::Text(subscribe_text))
            .await
            .map_err(|e| format!("Failed to send subscription: {}", e))?;

        while let Some(message) = ws_receiver.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    if let Err(e) = self.handle_message(&text, &mut state) {
                        if is_debug_websocket_enabled() {
                            log(
                                LogTag::Websocket,
                                "ERROR",
                                &format!("Failed to handle WebSocket message: {}", e),
                            );
                        }
                    }
                }
                Ok(Message::Close(_)) => {
                    if is_debug_websocket_enabled() {
                        log(
                            LogTag::Websocket,
                            "CLOSE",
                            "WebSocket connection closed by server",
                        );
                    }
                    break;
                }
                Ok(_) => {
                    // Ignore other message types (binary, ping, pong)
                }
                Err(e) => {
                    self.transition(&mut state, ConnectionState::Disconnected);
                    return Err(format!("WebSocket error: {}", e));
                }
            }
        }

        self.transition(&mut state, ConnectionState::Disconnected);
        Ok(())
    }

    /// Parse one frame: subscription confirmations flip the state to
    /// Listening, log notifications yield a transaction signature.
    pub fn handle_message(&self, text: &str, state: &mut ConnectionState) -> Result<(), String> {
        let Ok(frame) = serde_json::from_str::<serde_json::Value>(text) else {
            return Ok(()); // heartbeats and other non-JSON noise
        };

        // Subscription confirmation: {"id":..., "result": <sub id>}
        if frame.get("id").is_some() {
            if let Some(result) = frame.get("result") {
                if result.is_number() {
                    self.transition(state, ConnectionState::Listening);
                    if is_debug_websocket_enabled() {
                        log(
                            LogTag::Websocket,
                            "SUBSCRIBED",
                            &format!("✅ Subscription confirmed: {}", result),
                        );
                    }
                    return Ok(());
                }
            }
        }

        let method = frame.get("method").and_then(|v| v.as_str());
        if method != Some("logsNotification") {
            return Ok(());
        }

        let Some(result) = frame.get("params").and_then(|p| p.get("result")) else {
            return Ok(());
        };

        // Providers nest the payload under "value"; some flatten it
        let signature = result
            .get("value")
            .and_then(|v| v.get("signature"))
            .or_else(|| result.get("signature"))
            .and_then(|v| v.as_str());

        if let Some(signature) = signature {
            if is_debug_websocket_enabled() {
                log(
                    LogTag::Websocket,
                    "NEW_TX",
                    &format!("🆕 New transaction detected: {}", truncate_address(signature)),
                );
            }
            if self.sig_sender.send(signature.to_string()).is_err() {
                return Err("Signature channel closed".to_string());
            }
        }

        Ok(())
    }

    fn transition(&self, state: &mut ConnectionState, next: ConnectionState) {
        if *state == next {
            return;
        }
        if is_debug_websocket_enabled() {
            log(
                LogTag::Websocket,
                "STATE",
                &format!("{:?} -> {:?}", state, next),
            );
        }
        *state = next;
    }
}

/// Start the streaming ingestion path as a background task.
///
/// Reconnects forever with the configured delay; only a shutdown signal
/// ends the loop.
pub fn start_logs_monitoring(
    authority: String,
    ws_url: String,
    reconnect_delay: std::time::Duration,
    sig_sender: mpsc::UnboundedSender<String>,
    shutdown: Arc<Notify>,
) -> tokio::task::JoinHandle<()> {
    let client = LaunchLogsClient::new(authority, sig_sender);

    tokio::spawn(async move {
        loop {
            if is_debug_websocket_enabled() {
                log(
                    LogTag::Websocket,
                    "CONNECT",
                    &format!("🔄 Connecting to WebSocket: {}", mask_endpoint(&ws_url)),
                );
            }

            let session = tokio::select! {
                result = client.run_once(&ws_url) => result,
                _ = shutdown.notified() => {
                    log(LogTag::Websocket, "STOP", "WebSocket monitoring shutting down");
                    break;
                }
            };

            match session {
                Ok(()) => {
                    if is_debug_websocket_enabled() {
                        log(
                            LogTag::Websocket,
                            "RECONNECT",
                            &format!("Connection closed - reconnecting in {:?}", reconnect_delay),
                        );
                    }
                }
                Err(e) => {
                    log(
                        LogTag::Websocket,
                        "ERROR",
                        &format!("WebSocket disconnected: {} - reconnecting in {:?}", e, reconnect_delay),
                    );
                }
            }

            delay_with_shutdown(&shutdown, reconnect_delay).await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> (LaunchLogsClient, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (LaunchLogsClient::new("Auth111".to_string(), tx), rx)
    }

    #[test]
    fn subscription_confirmation_enters_listening() {
        let (client, _rx) = test_client();
        let mut state = ConnectionState::Subscribing;
        client
            .handle_message(r#"{"jsonrpc":"2.0","id":1,"result":23084}"#, &mut state)
            .unwrap();
        assert_eq!(state, ConnectionState::Listening);
    }

    #[test]
    fn notification_yields_signature() {
        let (client, mut rx) = test_client();
        let mut state = ConnectionState::Listening;
        let frame = r#"{
            "jsonrpc": "2.0",
            "method": "logsNotification",
            "params": {
                "result": {
                    "context": { "slot": 1 },
                    "value": { "signature": "5h4sig", "err": null, "logs": [] }
                },
                "subscription": 23084
            }
        }"#;
        client.handle_message(frame, &mut state).unwrap();
        assert_eq!(rx.try_recv().unwrap(), "5h4sig");
    }

    #[test]
    fn flattened_notification_shape_is_accepted() {
        let (client, mut rx) = test_client();
        let mut state = ConnectionState::Listening;
        let frame = r#"{
            "method": "logsNotification",
            "params": { "result": { "signature": "flatsig", "logs": [] } }
        }"#;
        client.handle_message(frame, &mut state).unwrap();
        assert_eq!(rx.try_recv().unwrap(), "flatsig");
    }

    #[test]
    fn unrelated_frames_are_ignored() {
        let (client, mut rx) = test_client();
        let mut state = ConnectionState::Listening;
        client.handle_message("not json", &mut state).unwrap();
        client
            .handle_message(r#"{"method":"accountNotification","params":{}}"#, &mut state)
            .unwrap();
        assert!(rx.try_recv().is_err());
        assert_eq!(state, ConnectionState::Listening);
    }
}
