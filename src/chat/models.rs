use serde::{Deserialize, Serialize};

/// Reserved recipient meaning "all active participants".
pub const BROADCAST: &str = "Todos";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub name: String,
    #[serde(rename = "lastSeen")]
    pub last_seen: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Message,
    PrivateMessage,
    Status,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Message => "message",
            MessageKind::PrivateMessage => "private_message",
            MessageKind::Status => "status",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub from: String,
    pub to: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub time: String,
}

impl Message {
    /// Broadcasts are visible to everyone; a private message only to its two
    /// ends. A public message addressed to one specific participant is not
    /// listed for anybody else.
    pub fn visible_to(&self, requester: &str) -> bool {
        self.to == BROADCAST
            || (self.kind == MessageKind::PrivateMessage
                && (self.from == requester || self.to == requester))
    }
}
