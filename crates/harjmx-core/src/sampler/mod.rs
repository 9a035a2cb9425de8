mod websocket;

pub use websocket::{
    FrameDirection, OPCODE_BINARY, OPCODE_TEXT, WebSocketFrame, frames, handshake_url, is_websocket,
};

use crate::har::{Entry, Header, PostData};
use crate::transaction::NumberedEntry;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Protocol specific part of a sampler
#[derive(Debug, Clone, PartialEq)]
pub enum SamplerKind {
    Http,
    WebSocket(Vec<WebSocketFrame>),
}

/// Request body of an HTTP sampler
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Body sent verbatim
    Raw { mime_type: String, text: String },
    /// Name/value parameters, urlencoded or multipart
    Form {
        params: Vec<(String, String)>,
        files: Vec<FileParam>,
        multipart: bool,
    },
}

/// A file upload part of a multipart request
#[derive(Debug, Clone, PartialEq)]
pub struct FileParam {
    pub param: String,
    pub file_name: String,
    pub mime_type: String,
}

/// What the server answered during the recording
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordedResponse {
    pub http_version: String,
    pub status: i64,
    pub status_text: String,
    pub headers: Vec<Header>,
    pub mime_type: String,
    pub body: Option<String>,
    pub size: i64,
}

/// One protocol request of the generated test plan
#[derive(Debug, Clone, PartialEq)]
pub struct Sampler {
    pub number: u64,
    pub name: String,
    pub method: String,
    pub url: String,
    pub headers: Vec<Header>,
    pub body: Option<RequestBody>,
    pub response: RecordedResponse,
    /// Start of the recorded request in epoch milliseconds
    pub started_ms: Option<i64>,
    pub elapsed_ms: u64,
    pub latency_ms: u64,
    pub kind: SamplerKind,
}

/// A sampler together with any diagnostic raised while building it
#[derive(Debug, Clone)]
pub struct BuiltSampler {
    pub sampler: Sampler,
    pub diagnostic: Option<String>,
}

pub fn sampler_display_name(number: u64, path: &str) -> String {
    format!("{:03} {}", number, path)
}

/// Maps HAR entries to protocol samplers
#[derive(Debug, Clone, Default)]
pub struct SamplerBuilder {
    pub websocket_enabled: bool,
}

impl SamplerBuilder {
    pub fn new(websocket_enabled: bool) -> Self {
        Self { websocket_enabled }
    }

    pub fn build(&self, numbered: NumberedEntry) -> BuiltSampler {
        let NumberedEntry { number, entry } = numbered;
        let websocket = is_websocket(&entry);
        let mut diagnostic = None;

        let kind = if websocket && self.websocket_enabled {
            SamplerKind::WebSocket(frames(&entry))
        } else {
            if websocket {
                let msg = format!(
                    "Entry {} ({}) is a WebSocket connection; emitting an HTTP sampler for the handshake only, {} frame(s) dropped",
                    number,
                    entry.request.url,
                    entry.web_socket_messages.len()
                );
                tracing::warn!("{}", msg);
                diagnostic = Some(msg);
            }
            SamplerKind::Http
        };

        let url = match kind {
            SamplerKind::Http => handshake_url(&entry.request.url),
            SamplerKind::WebSocket(_) => entry.request.url.clone(),
        };
        let headers = replay_headers(&entry.request.headers, matches!(kind, SamplerKind::WebSocket(_)));
        let body = match kind {
            SamplerKind::Http => entry.request.post_data.as_ref().and_then(request_body),
            SamplerKind::WebSocket(_) => None,
        };

        let sampler = Sampler {
            number,
            name: sampler_display_name(number, &entry.request.path()),
            method: entry.request.method.to_uppercase(),
            url,
            headers,
            body,
            response: recorded_response(&entry),
            started_ms: entry.started_ms().map(|ms| ms.round() as i64),
            elapsed_ms: entry.time.max(0.0).round() as u64,
            latency_ms: entry.timings.latency().round() as u64,
            kind,
        };

        BuiltSampler { sampler, diagnostic }
    }
}

/// Request headers a replayed request should send
///
/// HTTP/2 pseudo headers and `Content-Length` are computed by JMeter at run
/// time; WebSocket samplers additionally generate their own handshake
/// headers.
fn replay_headers(headers: &[Header], websocket: bool) -> Vec<Header> {
    headers
        .iter()
        .filter(|h| !h.name.starts_with(':'))
        .filter(|h| !h.name.eq_ignore_ascii_case("content-length"))
        .filter(|h| {
            !websocket
                || !websocket::HANDSHAKE_HEADERS
                    .iter()
                    .any(|n| h.name.eq_ignore_ascii_case(n))
        })
        .cloned()
        .collect()
}

fn request_body(post: &PostData) -> Option<RequestBody> {
    let mime = post.mime_type.to_lowercase();
    let urlencoded = mime.starts_with("application/x-www-form-urlencoded");
    let multipart = mime.starts_with("multipart/form-data");

    if (urlencoded || multipart) && !post.params.is_empty() {
        let mut params = Vec::new();
        let mut files = Vec::new();
        for param in &post.params {
            match &param.file_name {
                Some(file_name) if multipart => files.push(FileParam {
                    param: param.name.clone(),
                    file_name: file_name.clone(),
                    mime_type: param.content_type.clone().unwrap_or_default(),
                }),
                _ => params.push((param.name.clone(), param.value.clone().unwrap_or_default())),
            }
        }
        return Some(RequestBody::Form {
            params,
            files,
            multipart,
        });
    }

    match &post.text {
        Some(text) if !text.is_empty() => Some(RequestBody::Raw {
            mime_type: post.mime_type.clone(),
            text: text.clone(),
        }),
        _ => None,
    }
}

fn recorded_response(entry: &Entry) -> RecordedResponse {
    let content = &entry.response.content;
    let body = content.text.as_ref().map(|text| {
        match content.encoding.as_deref() {
            // keep binary payloads encoded, decode only what is readable text
            Some(enc) if enc.eq_ignore_ascii_case("base64") => STANDARD
                .decode(text.trim())
                .ok()
                .and_then(|bytes| String::from_utf8(bytes).ok())
                .unwrap_or_else(|| text.clone()),
            _ => text.clone(),
        }
    });

    RecordedResponse {
        http_version: entry.response.http_version.clone(),
        status: entry.response.status,
        status_text: entry.response.status_text.clone(),
        headers: entry.response.headers.clone(),
        mime_type: content.mime_type.clone(),
        body,
        size: content.size,
    }
}
