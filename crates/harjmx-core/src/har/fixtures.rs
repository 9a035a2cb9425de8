use super::types::{Entry, Header};

/// Minimal GET entry for unit tests
pub fn entry(url: &str, started: &str, time: f64) -> Entry {
    serde_json::from_value(serde_json::json!({
        "startedDateTime": started,
        "time": time,
        "request": {"method": "GET", "url": url, "httpVersion": "HTTP/1.1", "headers": []},
        "response": {"status": 200, "statusText": "OK", "headers": [], "content": {"size": 0}}
    }))
    .expect("fixture entry")
}

pub fn with_headers(mut entry: Entry, request: &[(&str, &str)], response: &[(&str, &str)]) -> Entry {
    entry.request.headers = request.iter().map(|(n, v)| Header::new(*n, *v)).collect();
    entry.response.headers = response.iter().map(|(n, v)| Header::new(*n, *v)).collect();
    entry
}
