use std::fmt;

use serde_json::Value;

pub type QueryId = u64;
pub type DebounceTicket = u64;

/// A search hit as delivered by the server.
///
/// The record is passed through untouched; the accessors only read a few
/// well-known fields for display.
#[derive(Debug, Clone, PartialEq)]
pub struct Message(Value);

impl Message {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }

    pub fn subject(&self) -> Option<&str> {
        self.0.get("subject").and_then(Value::as_str)
    }

    /// Sender display name, falling back to the address.
    pub fn sender(&self) -> Option<&str> {
        let sender = self.0.get("sender")?;
        sender
            .get("name")
            .and_then(Value::as_str)
            .filter(|name| !name.trim().is_empty())
            .or_else(|| sender.get("email").and_then(Value::as_str))
    }

    pub fn send_time(&self) -> Option<&str> {
        self.0.get("send_time").and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchPage {
    pub messages: Vec<Message>,
    pub total_matches: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub term: String,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBody {
    /// Body format as reported by the server (`plain`, `html`, `rtf`).
    pub kind: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFailure {
    pub reason: FailureReason,
    pub message: String,
}

impl SearchFailure {
    pub fn new(reason: FailureReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
        }
    }
}

impl fmt::Display for SearchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.reason)
        } else {
            write!(f, "{}: {}", self.reason, self.message)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    Network,
    Timeout,
    HttpStatus(u16),
    TooLarge,
    Decode,
    NotFound,
    Other,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Network => write!(f, "network error"),
            FailureReason::Timeout => write!(f, "timeout"),
            FailureReason::HttpStatus(code) => write!(f, "http status {code}"),
            FailureReason::TooLarge => write!(f, "response too large"),
            FailureReason::Decode => write!(f, "malformed response"),
            FailureReason::NotFound => write!(f, "not found"),
            FailureReason::Other => write!(f, "error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Message;
    use serde_json::json;

    #[test]
    fn reads_well_known_fields() {
        let message = Message::new(json!({
            "id": "1_4_2",
            "subject": "Quarterly numbers",
            "sender": { "name": "Ada", "email": "ada@example.com" },
            "send_time": "2003-04-01T09:30:00"
        }));
        assert_eq!(message.id(), Some("1_4_2"));
        assert_eq!(message.subject(), Some("Quarterly numbers"));
        assert_eq!(message.sender(), Some("Ada"));
        assert_eq!(message.send_time(), Some("2003-04-01T09:30:00"));
    }

    #[test]
    fn sender_falls_back_to_email() {
        let message = Message::new(json!({ "sender": { "name": " ", "email": "x@example.com" } }));
        assert_eq!(message.sender(), Some("x@example.com"));

        let message = Message::new(json!({ "sender": { "name": null, "email": null } }));
        assert_eq!(message.sender(), None);
    }

    #[test]
    fn unknown_shapes_pass_through() {
        let message = Message::new(json!([1, 2, 3]));
        assert_eq!(message.id(), None);
        assert_eq!(message.as_value(), &json!([1, 2, 3]));
    }
}
