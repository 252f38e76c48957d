//! Gateway connection
//!
//! Holds one WebSocket session at a time: waits for Hello, identifies (or
//! resumes), heartbeats, and forwards decoded dispatches over an mpsc
//! channel. Dropped connections are re-established with exponential backoff
//! until a fatal close code is received or shutdown is signalled.

use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, instrument, warn};

use super::events::{names, GatewayEvent};
use crate::protocol::{CloseCode, GatewayMessage, IdentifyPayload, Intents, OpCode, ResumePayload};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, WsMessage>;
type WsSource = SplitStream<WsStream>;

const API_VERSION: u8 = 10;
const HELLO_TIMEOUT: Duration = Duration::from_secs(20);
const BACKOFF_BASE: Duration = Duration::from_secs(1);
const BACKOFF_MAX: Duration = Duration::from_secs(60);

/// Gateway connection errors
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("websocket error: {0}")]
    WebSocket(Box<tokio_tungstenite::tungstenite::Error>),

    #[error("malformed gateway frame: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("gateway refused the session: {} ({})", .0.description(), .0.as_u16())]
    Fatal(CloseCode),
}

impl GatewayError {
    /// Whether reconnecting is pointless
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for GatewayError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::WebSocket(Box::new(err))
    }
}

/// How a single connection ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    Shutdown,
    Reconnect,
}

/// Resumable session state
#[derive(Debug, Clone)]
struct Session {
    id: String,
    resume_url: String,
}

/// Gateway client
pub struct GatewayClient {
    token: String,
    intents: Intents,
    url: String,
    events: mpsc::Sender<GatewayEvent>,
    shutdown: watch::Receiver<bool>,
    session: Option<Session>,
    sequence: Option<u64>,
}

impl GatewayClient {
    /// Create a client for the given gateway URL
    pub fn new(
        token: impl Into<String>,
        url: impl Into<String>,
        events: mpsc::Sender<GatewayEvent>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            token: token.into(),
            intents: Intents::required(),
            url: url.into(),
            events,
            shutdown,
            session: None,
            sequence: None,
        }
    }

    /// Override the identify intents
    #[must_use]
    pub fn with_intents(mut self, intents: Intents) -> Self {
        self.intents = intents;
        self
    }

    /// Stay connected until shutdown or a fatal close
    pub async fn run(mut self) -> Result<(), GatewayError> {
        let mut failures: u32 = 0;

        loop {
            if self.is_shutting_down() {
                return Ok(());
            }

            match self.connect_once().await {
                Ok(SessionEnd::Shutdown) => {
                    info!("Gateway connection closed");
                    return Ok(());
                }
                Ok(SessionEnd::Reconnect) => failures = 0,
                Err(e) if e.is_fatal() => {
                    error!(error = %e, "Gateway session cannot continue");
                    return Err(e);
                }
                Err(e) => {
                    failures = failures.saturating_add(1);
                    warn!(error = %e, failures, "Gateway connection failed");
                }
            }

            let delay = backoff(failures);
            debug!(delay_ms = delay.as_millis() as u64, "Reconnecting to gateway");
            tokio::select! {
                () = time::sleep(delay) => {}
                _ = self.shutdown.changed() => {}
            }
        }
    }

    fn is_shutting_down(&self) -> bool {
        *self.shutdown.borrow() || self.shutdown.has_changed().is_err() || self.events.is_closed()
    }

    fn connect_url(&self) -> String {
        let base = self
            .session
            .as_ref()
            .map_or(self.url.as_str(), |s| s.resume_url.as_str());
        format!(
            "{}/?v={API_VERSION}&encoding=json",
            base.trim_end_matches('/')
        )
    }

    #[instrument(skip(self), fields(resuming = self.session.is_some()))]
    async fn connect_once(&mut self) -> Result<SessionEnd, GatewayError> {
        let (socket, _) = connect_async(self.connect_url()).await?;
        let (mut sink, mut source) = socket.split();

        let interval = Duration::from_millis(await_hello(&mut source).await?.max(1));
        debug!(interval_ms = interval.as_millis() as u64, "Received Hello");

        self.authenticate(&mut sink).await?;

        // First beat is jittered so reconnecting shards do not beat in lockstep
        let first = interval.mul_f64(rand::random::<f64>());
        let mut heartbeat = time::interval_at(Instant::now() + first, interval);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut acked = true;

        loop {
            tokio::select! {
                frame = source.next() => {
                    let Some(frame) = frame else {
                        debug!("Gateway stream ended");
                        return Ok(SessionEnd::Reconnect);
                    };
                    match frame? {
                        WsMessage::Text(text) => {
                            if let Some(end) = self.handle_frame(&text, &mut sink, &mut acked).await? {
                                return Ok(end);
                            }
                        }
                        WsMessage::Close(frame) => return self.handle_close(frame),
                        _ => {}
                    }
                }
                _ = heartbeat.tick() => {
                    if !acked {
                        warn!("Heartbeat not acknowledged; reconnecting");
                        let _ = sink.close().await;
                        return Ok(SessionEnd::Reconnect);
                    }
                    acked = false;
                    send(&mut sink, &GatewayMessage::heartbeat(self.sequence)).await?;
                }
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        let _ = sink.send(WsMessage::Close(None)).await;
                        return Ok(SessionEnd::Shutdown);
                    }
                }
            }
        }
    }

    async fn authenticate(&self, sink: &mut WsSink) -> Result<(), GatewayError> {
        match (&self.session, self.sequence) {
            (Some(session), Some(seq)) => {
                debug!(session_id = %session.id, seq, "Resuming session");
                let payload = ResumePayload {
                    token: self.token.clone(),
                    session_id: session.id.clone(),
                    seq,
                };
                send(sink, &GatewayMessage::resume(&payload)?).await
            }
            _ => {
                debug!(intents = self.intents.bits(), "Identifying");
                let payload = IdentifyPayload::new(self.token.clone(), self.intents);
                send(sink, &GatewayMessage::identify(&payload)?).await
            }
        }
    }

    /// Returns `Some` when the connection should end
    async fn handle_frame(
        &mut self,
        text: &str,
        sink: &mut WsSink,
        acked: &mut bool,
    ) -> Result<Option<SessionEnd>, GatewayError> {
        let message = GatewayMessage::from_json(text)?;

        match message.op {
            OpCode::Dispatch => {
                if message.s.is_some() {
                    self.sequence = message.s;
                }
                return Ok(self.dispatch(message).await);
            }
            OpCode::Heartbeat => {
                send(sink, &GatewayMessage::heartbeat(self.sequence)).await?;
            }
            OpCode::HeartbeatAck => *acked = true,
            OpCode::Reconnect => {
                info!("Gateway requested reconnect");
                let _ = sink.close().await;
                return Ok(Some(SessionEnd::Reconnect));
            }
            OpCode::InvalidSession => {
                let resumable = message.as_invalid_session().unwrap_or(false);
                warn!(resumable, "Session invalidated");
                if !resumable {
                    self.clear_session();
                }
                let _ = sink.close().await;
                return Ok(Some(SessionEnd::Reconnect));
            }
            op => debug!(op = %op, "Ignoring gateway frame"),
        }

        Ok(None)
    }

    async fn dispatch(&mut self, message: GatewayMessage) -> Option<SessionEnd> {
        let event = match message.t.as_deref() {
            Some(names::READY) => {
                let Some(ready) = message.as_ready() else {
                    warn!("Malformed READY payload");
                    return None;
                };
                info!(user = %ready.user.username, "Gateway session ready");
                self.session = Some(Session {
                    id: ready.session_id.clone(),
                    resume_url: ready.resume_gateway_url,
                });
                GatewayEvent::Ready {
                    user_id: ready.user.id,
                    session_id: ready.session_id,
                }
            }
            Some(names::RESUMED) => {
                info!("Gateway session resumed");
                return None;
            }
            Some(name) => match GatewayEvent::from_dispatch(name, message.d) {
                Ok(Some(event)) => event,
                Ok(None) => return None,
                Err(e) => {
                    warn!(event = name, error = %e, "Undecodable dispatch");
                    return None;
                }
            },
            None => return None,
        };

        if self.events.send(event).await.is_err() {
            debug!("Event receiver dropped");
            return Some(SessionEnd::Shutdown);
        }
        None
    }

    fn handle_close(&mut self, frame: Option<CloseFrame<'static>>) -> Result<SessionEnd, GatewayError> {
        let Some(frame) = frame else {
            return Ok(SessionEnd::Reconnect);
        };

        let raw = u16::from(frame.code);
        match CloseCode::from_u16(raw) {
            Some(code) if code.is_fatal() => Err(GatewayError::Fatal(code)),
            Some(code) => {
                warn!(code = raw, reason = code.description(), "Gateway closed the connection");
                if code.invalidates_session() {
                    self.clear_session();
                }
                Ok(SessionEnd::Reconnect)
            }
            None => {
                debug!(code = raw, reason = %frame.reason, "Connection closed");
                Ok(SessionEnd::Reconnect)
            }
        }
    }

    fn clear_session(&mut self) {
        self.session = None;
        self.sequence = None;
    }
}

async fn await_hello(source: &mut WsSource) -> Result<u64, GatewayError> {
    let frame = time::timeout(HELLO_TIMEOUT, source.next())
        .await
        .map_err(|_| GatewayError::Protocol("no Hello received".into()))?;

    match frame {
        Some(Ok(WsMessage::Text(text))) => GatewayMessage::from_json(&text)?
            .as_hello()
            .map(|hello| hello.heartbeat_interval)
            .ok_or_else(|| GatewayError::Protocol("first frame was not Hello".into())),
        Some(Ok(other)) => Err(GatewayError::Protocol(format!(
            "unexpected first frame: {other:?}"
        ))),
        Some(Err(e)) => Err(e.into()),
        None => Err(GatewayError::Protocol("closed before Hello".into())),
    }
}

async fn send(sink: &mut WsSink, message: &GatewayMessage) -> Result<(), GatewayError> {
    sink.send(WsMessage::Text(message.to_json()?)).await?;
    Ok(())
}

/// Exponential backoff with jitter; zero failures reconnects promptly
fn backoff(failures: u32) -> Duration {
    let exp = BACKOFF_BASE.saturating_mul(1 << failures.min(6));
    let capped = exp.min(BACKOFF_MAX);
    capped.mul_f64(0.5 + rand::random::<f64>() / 2.0)
}
