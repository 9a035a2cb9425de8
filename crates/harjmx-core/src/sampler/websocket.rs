use crate::har::{Entry, WebSocketMessage};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

pub const OPCODE_TEXT: u8 = 1;
pub const OPCODE_BINARY: u8 = 2;

/// Request headers the WebSocket sampler generates itself during the handshake
pub const HANDSHAKE_HEADERS: &[&str] = &[
    "upgrade",
    "connection",
    "sec-websocket-key",
    "sec-websocket-version",
    "sec-websocket-extensions",
    "sec-websocket-accept",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameDirection {
    Sent,
    Received,
}

/// A data frame of a recorded WebSocket conversation
#[derive(Debug, Clone, PartialEq)]
pub struct WebSocketFrame {
    pub direction: FrameDirection,
    pub opcode: u8,
    /// Text payload, or base64 for binary frames (as recorded in the HAR)
    pub payload: String,
}

impl WebSocketFrame {
    pub fn is_binary(&self) -> bool {
        self.opcode == OPCODE_BINARY
    }

    /// Payload in the `0xca 0xfe` notation used by the WebSocket sampler plugin
    pub fn payload_hex(&self) -> String {
        let bytes = STANDARD
            .decode(self.payload.trim())
            .unwrap_or_else(|_| self.payload.as_bytes().to_vec());
        bytes
            .iter()
            .map(|b| format!("0x{:02x}", b))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Whether the entry is a WebSocket upgrade or carries WebSocket frames
pub fn is_websocket(entry: &Entry) -> bool {
    let scheme_is_ws = url::Url::parse(&entry.request.url)
        .map(|u| matches!(u.scheme(), "ws" | "wss"))
        .unwrap_or(false);
    let upgraded = entry.response.status == 101
        && entry
            .request
            .header("upgrade")
            .is_some_and(|v| v.eq_ignore_ascii_case("websocket"));

    scheme_is_ws || upgraded || !entry.web_socket_messages.is_empty()
}

/// Data frames of the entry in recorded order
///
/// Control frames (close, ping, pong) are left out; the sampler plugin
/// handles those on its own.
pub fn frames(entry: &Entry) -> Vec<WebSocketFrame> {
    entry
        .web_socket_messages
        .iter()
        .filter_map(frame_from_message)
        .collect()
}

fn frame_from_message(message: &WebSocketMessage) -> Option<WebSocketFrame> {
    if message.opcode != OPCODE_TEXT && message.opcode != OPCODE_BINARY {
        tracing::debug!("Skipping WebSocket control frame with opcode {}", message.opcode);
        return None;
    }
    let direction = match message.kind.to_lowercase().as_str() {
        "send" | "sent" => FrameDirection::Sent,
        "receive" | "received" => FrameDirection::Received,
        other => {
            tracing::debug!("Skipping WebSocket frame of unknown type '{}'", other);
            return None;
        }
    };
    Some(WebSocketFrame {
        direction,
        opcode: message.opcode,
        payload: message.data.clone(),
    })
}

/// Rewrite a ws/wss URL into the http/https URL of its handshake
pub fn handshake_url(url: &str) -> String {
    if let Some(rest) = url.strip_prefix("wss://") {
        format!("https://{rest}")
    } else if let Some(rest) = url.strip_prefix("ws://") {
        format!("http://{rest}")
    } else {
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::har::fixtures::entry;

    fn message(kind: &str, opcode: u8, data: &str) -> WebSocketMessage {
        WebSocketMessage {
            kind: kind.to_string(),
            time: 0.0,
            opcode,
            data: data.to_string(),
        }
    }

    #[test]
    fn test_detect_by_scheme() {
        let e = entry("wss://example.com/socket", "2024-01-15T10:30:00.000Z", 0.0);
        assert!(is_websocket(&e));
        let e = entry("https://example.com/socket", "2024-01-15T10:30:00.000Z", 0.0);
        assert!(!is_websocket(&e));
    }

    #[test]
    fn test_detect_by_upgrade() {
        let mut e = entry("https://example.com/socket", "2024-01-15T10:30:00.000Z", 0.0);
        e.request.headers.push(crate::har::Header::new("Upgrade", "WebSocket"));
        e.response.status = 101;
        assert!(is_websocket(&e));
    }

    #[test]
    fn test_frames_skip_control_frames() {
        let mut e = entry("wss://example.com/socket", "2024-01-15T10:30:00.000Z", 0.0);
        e.web_socket_messages = vec![
            message("send", 1, "hello"),
            message("receive", 2, "AQI="),
            message("receive", 9, ""),
            message("send", 8, ""),
        ];
        let frames = frames(&e);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].direction, FrameDirection::Sent);
        assert_eq!(frames[0].payload, "hello");
        assert_eq!(frames[1].direction, FrameDirection::Received);
        assert!(frames[1].is_binary());
        assert_eq!(frames[1].payload_hex(), "0x01 0x02");
    }

    #[test]
    fn test_handshake_url() {
        assert_eq!(handshake_url("wss://example.com/ws?x=1"), "https://example.com/ws?x=1");
        assert_eq!(handshake_url("ws://example.com:8080/ws"), "http://example.com:8080/ws");
        assert_eq!(handshake_url("https://example.com/ws"), "https://example.com/ws");
    }
}
