use super::write_output;
use super::xml::XmlWriter;
use crate::Result;
use crate::har::Header;
use crate::sampler::{FrameDirection, RequestBody, Sampler, SamplerKind};
use crate::transaction::Page;
use std::path::Path;

const THREAD_NAME: &str = "Thread Group 1-1";
const STRING_CLASS: &[(&str, &str)] = &[("class", "java.lang.String")];

/// Writes the recorded responses as a JMeter XML result file, so the View
/// Results Tree listener can show what the server originally answered.
pub struct RecordingWriter;

impl RecordingWriter {
    pub fn to_file(pages: &[Page], path: &Path) -> Result<()> {
        tracing::debug!("Writing recording to: {}", path.display());

        let xml = Self::to_string(pages);
        write_output(path, &xml)?;

        tracing::info!("Successfully wrote recording to {}", path.display());
        Ok(())
    }

    pub fn to_string(pages: &[Page]) -> String {
        let mut w = XmlWriter::new();
        w.open("testResults", &[("version", "1.2")]);
        for sampler in pages.iter().flat_map(|p| p.samplers.iter()) {
            sample(&mut w, sampler);
        }
        w.close("testResults");
        w.finish()
    }
}

fn sample(w: &mut XmlWriter, sampler: &Sampler) {
    let response = &sampler.response;
    let elapsed = sampler.elapsed_ms.to_string();
    let latency = sampler.latency_ms.to_string();
    let timestamp = sampler.started_ms.unwrap_or(0).to_string();
    let success = (100..400).contains(&response.status).to_string();
    let code = response.status.to_string();
    let body = response_data(sampler);
    let bytes = body.len().to_string();
    let data_type = if response.mime_type.starts_with("text") || body.is_empty() {
        "text"
    } else {
        "bin"
    };

    w.open(
        "httpSample",
        &[
            ("t", &elapsed),
            ("lt", &latency),
            ("ts", &timestamp),
            ("s", &success),
            ("lb", &sampler.name),
            ("rc", &code),
            ("rm", &response.status_text),
            ("tn", THREAD_NAME),
            ("dt", data_type),
            ("by", &bytes),
        ],
    );
    w.text("requestHeader", STRING_CLASS, &header_block(None, &sampler.headers));
    w.text(
        "responseHeader",
        STRING_CLASS,
        &header_block(
            Some(&format!(
                "{} {} {}",
                response.http_version, response.status, response.status_text
            )),
            &response.headers,
        ),
    );
    w.text("responseData", STRING_CLASS, &body);
    w.text("cookies", STRING_CLASS, "");
    w.text("method", STRING_CLASS, &sampler.method);
    w.text("queryString", STRING_CLASS, &query_string(sampler));
    w.text("java.net.URL", &[], &sampler.url);
    w.close("httpSample");
}

fn header_block(status_line: Option<&str>, headers: &[Header]) -> String {
    let mut block = String::new();
    if let Some(line) = status_line {
        block.push_str(line.trim());
        block.push('\n');
    }
    for header in headers {
        block.push_str(&header.name);
        block.push_str(": ");
        block.push_str(&header.value);
        block.push('\n');
    }
    block
}

/// Recorded response body; the frame transcript for WebSocket samplers
fn response_data(sampler: &Sampler) -> String {
    match &sampler.kind {
        SamplerKind::Http => sampler.response.body.clone().unwrap_or_default(),
        SamplerKind::WebSocket(frames) => frames
            .iter()
            .map(|f| {
                let marker = match f.direction {
                    FrameDirection::Sent => '>',
                    FrameDirection::Received => '<',
                };
                format!("{} {}\n", marker, f.payload)
            })
            .collect(),
    }
}

fn query_string(sampler: &Sampler) -> String {
    match &sampler.body {
        Some(RequestBody::Raw { text, .. }) => text.clone(),
        Some(RequestBody::Form { params, .. }) => params
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("&"),
        None => url::Url::parse(&sampler.url)
            .ok()
            .and_then(|u| u.query().map(str::to_string))
            .unwrap_or_default(),
    }
}
