//! Wire types for the gaming backend

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// Not connected
    #[default]
    Disconnected,
    /// Connection in progress
    Connecting,
    /// Connected and ready
    Connected,
    /// Disconnection in progress
    Disconnecting,
}

/// Outbound request: a `type` plus whatever fields the message carries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    #[serde(rename = "type", default)]
    pub request_type: String,

    /// Command name carried by generic messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Request {
    pub fn new(request_type: &str) -> Self {
        Self {
            request_type: request_type.to_string(),
            command: None,
            fields: Map::new(),
        }
    }

    pub fn login() -> Self {
        Self::new("login")
    }

    pub fn balance() -> Self {
        Self::new("balance")
    }

    pub fn spin(bet: f64) -> Self {
        Self::new("spin").with_field("bet", Value::from(bet))
    }

    /// Untyped command message
    pub fn command(name: &str) -> Self {
        Self {
            command: Some(name.to_string()),
            ..Self::new("command")
        }
    }

    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    /// Decode a raw payload; anything but a JSON object is not a request
    pub fn from_value(payload: Value) -> Option<Self> {
        if !payload.is_object() {
            return None;
        }
        match serde_json::from_value(payload) {
            Ok(request) => Some(request),
            Err(e) => {
                log::warn!("[Protocol] Unreadable request: {}", e);
                None
            }
        }
    }

    pub fn kind(&self) -> RequestKind {
        RequestKind::from_type(&self.request_type)
    }
}

/// Request families the backend understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// `auth` / `login`
    Login,
    /// `init` / `balance`
    Balance,
    /// `spin` / `bet`
    Spin,
    Unknown,
}

impl RequestKind {
    pub fn from_type(request_type: &str) -> Self {
        match request_type {
            "auth" | "login" => Self::Login,
            "init" | "balance" => Self::Balance,
            "spin" | "bet" => Self::Spin,
            _ => Self::Unknown,
        }
    }
}

/// Typed backend responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    LoginResponse {
        status: String,
        balance: f64,
        currency: String,
        nickname: String,
    },
    BalanceResponse {
        balance: f64,
        status: String,
    },
    SpinResponse {
        /// One stop index per reel
        stops: Vec<u32>,
        win: f64,
        balance: f64,
        status: String,
    },
}

/// Anything the backend sends back
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reply {
    Response(Response),
    /// Generic acknowledgement for unrecognised requests
    Ack {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        command: Option<String>,
        status: String,
    },
}

impl Reply {
    pub fn ack(command: Option<String>) -> Self {
        Self::Ack {
            command,
            status: "ok".to_string(),
        }
    }

    pub fn status(&self) -> &str {
        match self {
            Self::Response(Response::LoginResponse { status, .. })
            | Self::Response(Response::BalanceResponse { status, .. })
            | Self::Response(Response::SpinResponse { status, .. })
            | Self::Ack { status, .. } => status.as_str(),
        }
    }

    /// Balance reported by the backend, if the reply carries one
    pub fn balance(&self) -> Option<f64> {
        match self {
            Self::Response(Response::LoginResponse { balance, .. })
            | Self::Response(Response::BalanceResponse { balance, .. })
            | Self::Response(Response::SpinResponse { balance, .. }) => Some(*balance),
            Self::Ack { .. } => None,
        }
    }
}

/// Reply delivered on the message channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendMessage {
    pub reply: Reply,

    /// Timestamp when published
    pub received_at_ms: f64,

    /// Publish order within the transport
    pub sequence: u64,
}

impl BackendMessage {
    pub fn new(reply: Reply, sequence: u64) -> Self {
        Self {
            reply,
            received_at_ms: current_time_ms(),
            sequence,
        }
    }
}

/// Get current time in milliseconds
fn current_time_ms() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_kinds() {
        assert_eq!(RequestKind::from_type("auth"), RequestKind::Login);
        assert_eq!(RequestKind::from_type("login"), RequestKind::Login);
        assert_eq!(RequestKind::from_type("init"), RequestKind::Balance);
        assert_eq!(RequestKind::from_type("balance"), RequestKind::Balance);
        assert_eq!(RequestKind::from_type("spin"), RequestKind::Spin);
        assert_eq!(RequestKind::from_type("bet"), RequestKind::Spin);
        assert_eq!(RequestKind::from_type("jackpot"), RequestKind::Unknown);
        assert_eq!(RequestKind::from_type(""), RequestKind::Unknown);
    }

    #[test]
    fn test_request_from_value() {
        let request = Request::from_value(json!({"type": "bet", "amount": 1.5})).unwrap();
        assert_eq!(request.kind(), RequestKind::Spin);
        assert_eq!(request.fields["amount"], 1.5);

        let untyped = Request::from_value(json!({"command": "ping"})).unwrap();
        assert_eq!(untyped.kind(), RequestKind::Unknown);
        assert_eq!(untyped.command.as_deref(), Some("ping"));

        assert!(Request::from_value(json!("login")).is_none());
        assert!(Request::from_value(json!([1, 2])).is_none());
        assert!(Request::from_value(Value::Null).is_none());
    }

    #[test]
    fn test_request_serialization() {
        let json = serde_json::to_value(Request::spin(2.0)).unwrap();
        assert_eq!(json, json!({"type": "spin", "bet": 2.0}));
    }

    #[test]
    fn test_response_wire_format() {
        let reply = Reply::Response(Response::BalanceResponse {
            balance: 10000.0,
            status: "OK".into(),
        });
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json, json!({"type": "balance_response", "balance": 10000.0, "status": "OK"}));
        assert_eq!(reply.balance(), Some(10000.0));
    }

    #[test]
    fn test_ack_wire_format() {
        assert_eq!(serde_json::to_value(Reply::ack(None)).unwrap(), json!({"status": "ok"}));
        assert_eq!(
            serde_json::to_value(Reply::ack(Some("ping".into()))).unwrap(),
            json!({"command": "ping", "status": "ok"})
        );
    }

    #[test]
    fn test_reply_deserializes_both_shapes() {
        let spin: Reply = serde_json::from_value(json!({
            "type": "spin_response",
            "stops": [1, 2, 3, 4, 5],
            "win": 0,
            "balance": 9990.0,
            "status": "OK"
        }))
        .unwrap();
        assert!(matches!(spin, Reply::Response(Response::SpinResponse { .. })));

        let ack: Reply = serde_json::from_value(json!({"status": "ok"})).unwrap();
        assert_eq!(ack, Reply::ack(None));
        assert_eq!(ack.status(), "ok");
    }
}
