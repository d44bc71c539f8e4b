//! Backend transport and the offline mock responder

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;
use tokio::sync::{RwLock, broadcast};

use crate::protocol::{BackendMessage, ConnectionState, Reply, Request, RequestKind, Response};

/// Balance the mock reports for every account
pub const MOCK_BALANCE: f64 = 10000.00;

/// Balance the mock reports after a spin
pub const MOCK_BALANCE_AFTER_SPIN: f64 = 9990.00;

/// Stops per spin response, one per reel
pub const MOCK_STOP_COUNT: usize = 5;

/// Stops are drawn from `0..MOCK_STOP_RANGE`
pub const MOCK_STOP_RANGE: u32 = 10;

/// Typed request/response channel to a gaming backend
///
/// The reel engine never calls this; hosts use it for login and balance
/// sync around the game.
pub trait Transport {
    /// Current connection state
    fn state(&self) -> impl Future<Output = ConnectionState> + Send;

    /// Open the connection
    fn connect(&self) -> impl Future<Output = Result<(), ConnectorError>> + Send;

    /// Send a request and wait for its reply
    fn send(&self, request: Request) -> impl Future<Output = Result<Reply, ConnectorError>> + Send;
}

/// In-process stand-in for the gaming backend
///
/// Connects after a fixed delay and answers every request after another
/// fixed delay. `send` hands the reply back to the caller; `post` publishes
/// it on the message channel instead.
pub struct MockTransport {
    /// Socket identifier, fresh per instance
    socket_id: String,

    /// Current connection state
    state: Arc<RwLock<ConnectionState>>,

    /// Channel for replies to posted requests
    message_tx: broadcast::Sender<BackendMessage>,

    /// Stop generator for spin responses
    rng: Mutex<StdRng>,

    sequence: Arc<AtomicU64>,
    connect_delay: Duration,
    reply_delay: Duration,
}

impl MockTransport {
    /// Create with the stock delays (100 ms connect, 50 ms reply)
    pub fn new() -> Self {
        MockTransportBuilder::new().build()
    }

    pub fn builder() -> MockTransportBuilder {
        MockTransportBuilder::new()
    }

    pub fn socket_id(&self) -> &str {
        &self.socket_id
    }

    /// Subscribe to replies of posted requests
    pub fn subscribe_messages(&self) -> broadcast::Receiver<BackendMessage> {
        self.message_tx.subscribe()
    }

    /// Close the connection
    pub async fn disconnect(&self) {
        *self.state.write().await = ConnectionState::Disconnecting;
        *self.state.write().await = ConnectionState::Disconnected;
        log::info!("[MockTransport] {} disconnected", self.socket_id);
    }

    /// Build the reply for a request without any delay
    pub fn respond(&self, request: &Request) -> Reply {
        match request.kind() {
            RequestKind::Login => {
                log::debug!("[MockTransport] Handling auth");
                Reply::Response(Response::LoginResponse {
                    status: "OK".into(),
                    balance: MOCK_BALANCE,
                    currency: "USD".into(),
                    nickname: "OfflinePlayer".into(),
                })
            }
            RequestKind::Balance => {
                log::debug!("[MockTransport] Handling init/balance");
                Reply::Response(Response::BalanceResponse {
                    balance: MOCK_BALANCE,
                    status: "OK".into(),
                })
            }
            RequestKind::Spin => {
                log::debug!("[MockTransport] Handling spin");
                let stops = {
                    let mut rng = self.rng.lock();
                    (0..MOCK_STOP_COUNT)
                        .map(|_| rng.random_range(0..MOCK_STOP_RANGE))
                        .collect()
                };
                Reply::Response(Response::SpinResponse {
                    stops,
                    win: 0.0,
                    balance: MOCK_BALANCE_AFTER_SPIN,
                    status: "OK".into(),
                })
            }
            RequestKind::Unknown => {
                log::warn!("[MockTransport] Unknown message type: {:?}", request.request_type);
                Reply::ack(request.command.clone())
            }
        }
    }

    /// Answer a raw JSON payload; non-object payloads get no reply
    pub async fn send_value(&self, payload: Value) -> Result<Option<Reply>, ConnectorError> {
        let Some(request) = Request::from_value(payload) else {
            log::debug!("[MockTransport] Ignoring non-object payload");
            return Ok(None);
        };
        self.send(request).await.map(Some)
    }

    /// Account channel: verifies nothing and acknowledges every payload
    pub async fn account(&self, payload: Value) -> Result<Reply, ConnectorError> {
        self.ensure_connected().await?;
        log::debug!("[MockTransport] Client sent account {}", payload);
        tokio::time::sleep(self.reply_delay).await;
        Ok(Reply::ack(None))
    }

    /// Fire-and-forget: the reply arrives on the message channel
    ///
    /// Needs a running tokio runtime for the delayed publish.
    pub async fn post(&self, request: Request) -> Result<(), ConnectorError> {
        self.ensure_connected().await?;
        let reply = self.respond(&request);
        let message_tx = self.message_tx.clone();
        let sequence = Arc::clone(&self.sequence);
        let delay = self.reply_delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let seq = sequence.fetch_add(1, Ordering::Relaxed);
            if message_tx.send(BackendMessage::new(reply, seq)).is_err() {
                log::debug!("[MockTransport] Reply {} dropped, no subscribers", seq);
            }
        });
        Ok(())
    }

    async fn ensure_connected(&self) -> Result<(), ConnectorError> {
        match *self.state.read().await {
            ConnectionState::Connected => Ok(()),
            _ => Err(ConnectorError::NotConnected),
        }
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MockTransport {
    async fn state(&self) -> ConnectionState {
        *self.state.read().await
    }

    async fn connect(&self) -> Result<(), ConnectorError> {
        {
            let mut state = self.state.write().await;
            match *state {
                ConnectionState::Connected => return Ok(()),
                ConnectionState::Connecting => return Err(ConnectorError::AlreadyConnecting),
                _ => *state = ConnectionState::Connecting,
            }
        }

        tokio::time::sleep(self.connect_delay).await;
        *self.state.write().await = ConnectionState::Connected;
        log::info!("[MockTransport] {} connected", self.socket_id);
        Ok(())
    }

    async fn send(&self, request: Request) -> Result<Reply, ConnectorError> {
        self.ensure_connected().await?;
        log::debug!("[MockTransport] Client sent {:?}", request.request_type);
        let reply = self.respond(&request);
        tokio::time::sleep(self.reply_delay).await;
        Ok(reply)
    }
}

/// Mock transport builder
pub struct MockTransportBuilder {
    connect_delay: Duration,
    reply_delay: Duration,
    seed: Option<u64>,
    channel_capacity: usize,
}

impl MockTransportBuilder {
    pub fn new() -> Self {
        Self {
            connect_delay: Duration::from_millis(100),
            reply_delay: Duration::from_millis(50),
            seed: None,
            channel_capacity: 64,
        }
    }

    /// Set connect delay
    pub fn connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = delay;
        self
    }

    /// Set reply delay
    pub fn reply_delay(mut self, delay: Duration) -> Self {
        self.reply_delay = delay;
        self
    }

    /// Seed the stop generator
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set message channel capacity
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    /// Build the transport
    pub fn build(self) -> MockTransport {
        let (message_tx, _) = broadcast::channel(self.channel_capacity);
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        MockTransport {
            socket_id: format!("mock_socket_{}", uuid::Uuid::new_v4()),
            state: Arc::new(RwLock::new(ConnectionState::Disconnected)),
            message_tx,
            rng: Mutex::new(rng),
            sequence: Arc::new(AtomicU64::new(0)),
            connect_delay: self.connect_delay,
            reply_delay: self.reply_delay,
        }
    }
}

impl Default for MockTransportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Connector errors
#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    #[error("Not connected")]
    NotConnected,

    #[error("Connection already in progress")]
    AlreadyConnecting,
}
