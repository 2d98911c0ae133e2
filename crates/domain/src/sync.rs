use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMessageType {
    /// Sent once to a viewer right after it subscribed
    Connected,
    /// The calendar changed and viewers should fetch their visible window again
    Update,
    /// The number of connected viewers changed
    Viewers,
}

/// JSON payload pushed to viewers:
/// `{"type": "connected" | "update" | "viewers", "connectionId"?: string, "count"?: number}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncMessage {
    #[serde(rename = "type")]
    pub kind: SyncMessageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl SyncMessage {
    pub fn connected() -> Self {
        Self {
            kind: SyncMessageType::Connected,
            connection_id: None,
            count: None,
        }
    }

    /// `origin` is the connection id of the client whose mutation caused the update
    pub fn update(origin: Option<String>) -> Self {
        Self {
            kind: SyncMessageType::Update,
            connection_id: origin,
            count: None,
        }
    }

    pub fn viewers(count: usize) -> Self {
        Self {
            kind: SyncMessageType::Viewers,
            connection_id: None,
            count: Some(count),
        }
    }
}

/// One server sent event frame on the live sync stream
#[derive(Debug, Clone, PartialEq)]
pub enum SyncFrame {
    Message(SyncMessage),
    /// Comment frame used to detect dead connections, ignored by clients
    Heartbeat,
}

impl SyncFrame {
    pub fn encode(&self) -> serde_json::Result<String> {
        match self {
            Self::Message(message) => Ok(format!("data: {}\n\n", serde_json::to_string(message)?)),
            Self::Heartbeat => Ok(": ping\n\n".into()),
        }
    }

    /// Parses one event block, i.e. the text between two blank lines.
    /// Returns `None` for blocks that carry nothing a client understands.
    pub fn parse(block: &str) -> Option<Self> {
        let mut data = Vec::new();
        let mut comment = false;
        for line in block.lines() {
            if let Some(value) = line.strip_prefix("data:") {
                data.push(value.strip_prefix(' ').unwrap_or(value));
            } else if line.starts_with(':') {
                comment = true;
            }
        }
        if data.is_empty() {
            return if comment { Some(Self::Heartbeat) } else { None };
        }
        serde_json::from_str::<SyncMessage>(&data.join("\n"))
            .ok()
            .map(Self::Message)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn encodes_messages_like_the_web_client_expects() {
        let frame = SyncFrame::Message(SyncMessage::update(Some("X".into())));
        assert_eq!(
            frame.encode().unwrap(),
            "data: {\"type\":\"update\",\"connectionId\":\"X\"}\n\n"
        );
        let frame = SyncFrame::Message(SyncMessage::viewers(3));
        assert_eq!(
            frame.encode().unwrap(),
            "data: {\"type\":\"viewers\",\"count\":3}\n\n"
        );
        let frame = SyncFrame::Message(SyncMessage::connected());
        assert_eq!(frame.encode().unwrap(), "data: {\"type\":\"connected\"}\n\n");
        assert_eq!(SyncFrame::Heartbeat.encode().unwrap(), ": ping\n\n");
    }

    #[test]
    fn parses_encoded_frames() -> anyhow::Result<()> {
        let frames = vec![
            SyncFrame::Message(SyncMessage::update(None)),
            SyncFrame::Message(SyncMessage::viewers(1)),
            SyncFrame::Heartbeat,
        ];
        for frame in frames {
            let encoded = frame.encode()?;
            assert_eq!(SyncFrame::parse(encoded.trim_end()), Some(frame));
        }
        Ok(())
    }

    #[test]
    fn ignores_unknown_blocks() {
        assert_eq!(SyncFrame::parse("data: connected"), None);
        assert_eq!(SyncFrame::parse("event: something"), None);
        assert_eq!(SyncFrame::parse(""), None);
    }
}
