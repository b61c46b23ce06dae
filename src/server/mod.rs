use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;
use futures_util::{SinkExt, StreamExt};
use anyhow::{Context, Result};

use travel_health_core::config::Config;
use travel_health_core::llm::CompletionService;
use travel_health_core::protocol::{ClientMessage, MessageEnvelope, ServerEvent};
use travel_health_core::session::relay::{on_chat_start, on_message};
use travel_health_core::session::{ChatSession, DriverState, RelaySink};

pub struct AppState {
    pub config: Config,
    pub service: Arc<dyn CompletionService>,
}

pub async fn start_server(port: u16, state: Arc<AppState>) -> Result<()> {
    let addr = format!("127.0.0.1:{}", port);
    let listener = TcpListener::bind(&addr).await.context("Failed to bind server")?;

    tracing::info!(%addr, "relay listening");
    println!("Health agent relay listening on: ws://{}", addr);

    serve(listener, state).await
}

/// Accept connections on `listener` forever, one task and one session each.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> Result<()> {
    loop {
        let (stream, peer) = listener.accept().await.context("Failed to accept connection")?;
        let state = state.clone();
        tokio::spawn(async move {
            match accept_async(stream).await {
                Ok(ws_stream) => {
                    if let Err(e) = handle_connection(ws_stream, state).await {
                        tracing::warn!(%peer, error = %e, "connection ended with error");
                    }
                }
                Err(e) => tracing::warn!(%peer, error = %e, "websocket handshake failed"),
            }
        });
    }
}

async fn handle_connection(
    ws_stream: tokio_tungstenite::WebSocketStream<TcpStream>,
    state: Arc<AppState>,
) -> Result<()> {
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();

    // Forward ServerEvents to the socket
    let send_task = tokio::spawn(async move {
        let mut event_id = 0;
        while let Some(event) = rx.recv().await {
            event_id += 1;
            let closing = event == ServerEvent::SessionClosed;
            match serde_json::to_string(&MessageEnvelope::event(event_id, event)) {
                Ok(json) => {
                    if ws_sender.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                Err(e) => tracing::error!(error = %e, "failed to encode event"),
            }
            if closing {
                if let Err(e) = ws_sender.close().await {
                    tracing::debug!(error = %e, "socket close failed");
                }
                break;
            }
        }
    });

    let mut session = ChatSession::new(&state.config, state.service.clone())?;
    let mut sink = RelaySink::new(tx);
    on_chat_start(&session, &state.config.server.welcome, &sink);

    while let Some(frame) = ws_receiver.next().await {
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!(session = %session.id(), error = %e, "socket read failed");
                break;
            }
        };

        let envelope = match serde_json::from_str::<MessageEnvelope<ClientMessage>>(&text) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(session = %session.id(), error = %e, "ignoring unparseable frame");
                continue;
            }
        };

        match envelope.payload {
            ClientMessage::SendMessage { text } => {
                if on_message(&mut session, &text, &mut sink).await == DriverState::Terminated {
                    break;
                }
            }
        }
    }

    // Dropping the sink closes the channel so the writer drains and exits
    drop(sink);
    if let Err(e) = send_task.await {
        tracing::debug!(session = %session.id(), error = %e, "event writer task failed");
    }
    tracing::info!(session = %session.id(), "connection closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio_tungstenite::connect_async;
    use travel_health_core::config::TerminationMode;
    use travel_health_core::testing::ScriptedService;

    type Client = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<TcpStream>,
    >;

    async fn spawn_relay(service: Arc<ScriptedService>) -> String {
        let mut config = Config::default();
        config.chat.agents = vec!["disease".to_string()];
        config.termination.mode = TerminationMode::Rounds;
        config.server.welcome = "hello traveller".to_string();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(AppState { config, service });
        tokio::spawn(serve(listener, state));
        format!("ws://{}", addr)
    }

    /// Next text frame as JSON, `None` once the server closes
    async fn next_event(client: &mut Client) -> Option<serde_json::Value> {
        loop {
            let frame = tokio::time::timeout(Duration::from_secs(5), client.next())
                .await
                .expect("relay timed out");
            match frame {
                Some(Ok(Message::Text(text))) => return Some(serde_json::from_str(&text).unwrap()),
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => return None,
                Some(Ok(_)) => continue,
            }
        }
    }

    async fn send_text(client: &mut Client, text: &str) {
        let frame = serde_json::json!({
            "v": 1,
            "type": "request",
            "payload": { "type": "send_message", "text": text }
        });
        client.send(Message::Text(frame.to_string())).await.unwrap();
    }

    #[tokio::test]
    async fn test_garbage_ignored_then_exit_closes_socket() {
        let service = ScriptedService::new(["Malaria and yellow fever."]);
        let url = spawn_relay(service.clone()).await;
        let (mut client, _) = connect_async(url.as_str()).await.unwrap();

        let welcome = next_event(&mut client).await.unwrap();
        assert_eq!(welcome["payload"]["type"], "welcome");
        assert_eq!(welcome["payload"]["text"], "hello traveller");

        client.send(Message::Text("{not json".to_string())).await.unwrap();
        send_text(&mut client, "Nigeria, Lagos").await;

        let reply = next_event(&mut client).await.unwrap();
        assert_eq!(reply["payload"]["type"], "agent_message");
        assert_eq!(reply["payload"]["agent"], "disease_intelligent");
        assert_eq!(
            reply["payload"]["text"],
            "# DISEASE_INTELLIGENT:\nMalaria and yellow fever."
        );
        let done = next_event(&mut client).await.unwrap();
        assert_eq!(done["payload"]["type"], "turn_complete");
        assert_eq!(done["payload"]["outcome"], "terminated");

        send_text(&mut client, "exit").await;
        let closed = next_event(&mut client).await.unwrap();
        assert_eq!(closed["payload"]["type"], "session_closed");
        assert!(next_event(&mut client).await.is_none());
        assert_eq!(service.call_count(), 1);
    }

    #[tokio::test]
    async fn test_each_connection_gets_own_session() {
        let service = ScriptedService::new(Vec::<String>::new());
        let url = spawn_relay(service).await;

        let (mut first, _) = connect_async(url.as_str()).await.unwrap();
        let (mut second, _) = connect_async(url.as_str()).await.unwrap();
        let a = next_event(&mut first).await.unwrap();
        let b = next_event(&mut second).await.unwrap();
        assert_ne!(a["payload"]["session_id"], b["payload"]["session_id"]);
    }
}
