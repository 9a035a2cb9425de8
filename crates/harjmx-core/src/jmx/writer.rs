use super::xml::XmlWriter;
use super::write_output;
use crate::Result;
use crate::sampler::{FrameDirection, RequestBody, Sampler, SamplerKind, WebSocketFrame};
use crate::transaction::Page;
use std::path::Path;

const WS_PACKAGE: &str = "eu.luminis.jmeter.wssampler";
const WS_CONNECT_TIMEOUT: &str = "20000";
const WS_READ_TIMEOUT: &str = "6000";

/// Test-plan level switches of the generated JMX
#[derive(Debug, Clone)]
pub struct JmxOptions {
    pub test_plan_name: String,
    /// Attach a Cookie Manager (request cookies were stripped)
    pub cookie_manager: bool,
    /// Attach a Cache Manager (cache headers were stripped)
    pub cache_manager: bool,
    /// Attach a View Results Tree listener
    pub result_tree: bool,
    /// File the View Results Tree listener opens
    pub recording_file: Option<String>,
}

impl Default for JmxOptions {
    fn default() -> Self {
        Self {
            test_plan_name: "HAR Imported".to_string(),
            cookie_manager: true,
            cache_manager: true,
            result_tree: true,
            recording_file: None,
        }
    }
}

pub struct JmxWriter;

impl JmxWriter {
    /// Write the test plan to a file
    pub fn to_file(pages: &[Page], options: &JmxOptions, path: &Path) -> Result<()> {
        tracing::debug!("Writing JMX test plan to: {}", path.display());

        let xml = Self::to_string(pages, options);
        write_output(path, &xml)?;

        tracing::info!(
            "Successfully wrote JMX with {} pages to {}",
            pages.len(),
            path.display()
        );
        Ok(())
    }

    /// Render the complete test plan document
    pub fn to_string(pages: &[Page], options: &JmxOptions) -> String {
        let mut w = XmlWriter::new();
        w.open(
            "jmeterTestPlan",
            &[("version", "1.2"), ("properties", "5.0"), ("jmeter", "5.6.3")],
        );
        w.open("hashTree", &[]);

        test_plan(&mut w, &options.test_plan_name);
        w.open("hashTree", &[]);

        thread_group(&mut w);
        w.open("hashTree", &[]);

        request_defaults(&mut w);
        if options.cookie_manager {
            cookie_manager(&mut w);
        }
        if options.cache_manager {
            cache_manager(&mut w);
        }
        if options.result_tree {
            result_collector(&mut w, options.recording_file.as_deref().unwrap_or(""));
        }
        for page in pages {
            transaction_controller(&mut w, page);
        }

        w.close("hashTree");
        w.close("hashTree");
        w.close("hashTree");
        w.close("jmeterTestPlan");
        w.finish()
    }
}

fn string_prop(w: &mut XmlWriter, name: &str, value: &str) {
    if value.is_empty() {
        w.empty("stringProp", &[("name", name)]);
    } else {
        w.text("stringProp", &[("name", name)], value);
    }
}

fn bool_prop(w: &mut XmlWriter, name: &str, value: bool) {
    w.text("boolProp", &[("name", name)], if value { "true" } else { "false" });
}

fn int_prop(w: &mut XmlWriter, name: &str, value: i64) {
    w.text("intProp", &[("name", name)], &value.to_string());
}

fn element(w: &mut XmlWriter, tag: &str, gui: &str, name: &str) {
    w.open(tag, &[("guiclass", gui), ("testclass", tag), ("testname", name)]);
}

fn empty_arguments(w: &mut XmlWriter, prop: &str, gui: &str) {
    w.open(
        "elementProp",
        &[
            ("name", prop),
            ("elementType", "Arguments"),
            ("guiclass", gui),
            ("testclass", "Arguments"),
            ("testname", "User Defined Variables"),
        ],
    );
    w.empty("collectionProp", &[("name", "Arguments.arguments")]);
    w.close("elementProp");
}

fn test_plan(w: &mut XmlWriter, name: &str) {
    element(w, "TestPlan", "TestPlanGui", name);
    empty_arguments(w, "TestPlan.user_defined_variables", "ArgumentsPanel");
    bool_prop(w, "TestPlan.functional_mode", false);
    bool_prop(w, "TestPlan.serialize_threadgroups", false);
    w.close("TestPlan");
}

fn thread_group(w: &mut XmlWriter) {
    element(w, "ThreadGroup", "ThreadGroupGui", "Thread Group");
    string_prop(w, "ThreadGroup.on_sample_error", "continue");
    w.open(
        "elementProp",
        &[
            ("name", "ThreadGroup.main_controller"),
            ("elementType", "LoopController"),
            ("guiclass", "LoopControlPanel"),
            ("testclass", "LoopController"),
            ("testname", "Loop Controller"),
        ],
    );
    string_prop(w, "LoopController.loops", "1");
    bool_prop(w, "LoopController.continue_forever", false);
    w.close("elementProp");
    string_prop(w, "ThreadGroup.num_threads", "1");
    string_prop(w, "ThreadGroup.ramp_time", "1");
    bool_prop(w, "ThreadGroup.scheduler", false);
    string_prop(w, "ThreadGroup.duration", "");
    string_prop(w, "ThreadGroup.delay", "");
    bool_prop(w, "ThreadGroup.same_user_on_next_iteration", true);
    w.close("ThreadGroup");
}

fn request_defaults(w: &mut XmlWriter) {
    w.open(
        "ConfigTestElement",
        &[
            ("guiclass", "HttpDefaultsGui"),
            ("testclass", "ConfigTestElement"),
            ("testname", "HTTP Request Defaults"),
        ],
    );
    empty_arguments(w, "HTTPsampler.Arguments", "HTTPArgumentsPanel");
    string_prop(w, "HTTPSampler.implementation", "HttpClient4");
    string_prop(w, "HTTPSampler.connect_timeout", "");
    string_prop(w, "HTTPSampler.response_timeout", "");
    w.close("ConfigTestElement");
    w.empty("hashTree", &[]);
}

fn cookie_manager(w: &mut XmlWriter) {
    element(w, "CookieManager", "CookiePanel", "HTTP Cookie Manager");
    w.empty("collectionProp", &[("name", "CookieManager.cookies")]);
    bool_prop(w, "CookieManager.clearEachIteration", true);
    bool_prop(w, "CookieManager.controlledByThreadGroup", false);
    w.close("CookieManager");
    w.empty("hashTree", &[]);
}

fn cache_manager(w: &mut XmlWriter) {
    element(w, "CacheManager", "CacheManagerGui", "HTTP Cache Manager");
    bool_prop(w, "clearEachIteration", true);
    bool_prop(w, "useExpires", true);
    bool_prop(w, "CacheManager.controlledByThread", false);
    w.close("CacheManager");
    w.empty("hashTree", &[]);
}

fn transaction_controller(w: &mut XmlWriter, page: &Page) {
    element(w, "TransactionController", "TransactionControllerGui", &page.name);
    bool_prop(w, "TransactionController.includeTimers", false);
    bool_prop(w, "TransactionController.parent", false);
    w.close("TransactionController");
    w.open("hashTree", &[]);

    if let Some(pause) = page.pause_ms {
        pause_action(w, pause);
    }
    for sampler in &page.samplers {
        match &sampler.kind {
            SamplerKind::Http => http_sampler(w, sampler),
            SamplerKind::WebSocket(frames) => websocket_samplers(w, sampler, frames),
        }
    }

    w.close("hashTree");
}

/// Flow Control Action that only waits for its child timer
fn pause_action(w: &mut XmlWriter, pause_ms: u64) {
    element(w, "TestAction", "TestActionGui", "Flow Control Action PAUSE");
    int_prop(w, "ActionProcessor.action", 1);
    int_prop(w, "ActionProcessor.target", 0);
    string_prop(w, "ActionProcessor.duration", "0");
    w.close("TestAction");
    w.open("hashTree", &[]);
    element(w, "ConstantTimer", "ConstantTimerGui", "Constant Timer");
    string_prop(w, "ConstantTimer.delay", &pause_ms.to_string());
    w.close("ConstantTimer");
    w.empty("hashTree", &[]);
    w.close("hashTree");
}

/// Protocol, host, port (empty when default) and path-with-query of a URL
struct UrlParts {
    protocol: String,
    domain: String,
    port: String,
    path: String,
}

fn split_url(raw: &str) -> UrlParts {
    let parsed = url::Url::parse(raw);
    let rest = raw.split_once("://").map(|(_, rest)| rest);
    match (parsed, rest) {
        // scheme and default port come from the parser, host and path are kept as written
        (Ok(url), Some(rest)) => {
            let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
            let (authority, tail) = rest.split_at(authority_end);
            let host_port = authority.rsplit_once('@').map_or(authority, |(_, h)| h);
            let domain = match host_port.find(']') {
                Some(end) if host_port.starts_with('[') => &host_port[..=end],
                _ => host_port.split(':').next().unwrap_or_default(),
            };
            let tail = tail.split('#').next().unwrap_or_default();
            let path = if tail.starts_with('/') {
                tail.to_string()
            } else {
                format!("/{}", tail)
            };
            UrlParts {
                protocol: url.scheme().to_string(),
                domain: domain.to_string(),
                port: url.port().map(|p| p.to_string()).unwrap_or_default(),
                path,
            }
        }
        // JMeter accepts a full URL in the path field
        _ => UrlParts {
            protocol: String::new(),
            domain: String::new(),
            port: String::new(),
            path: raw.to_string(),
        },
    }
}

fn http_sampler(w: &mut XmlWriter, sampler: &Sampler) {
    let parts = split_url(&sampler.url);
    element(w, "HTTPSamplerProxy", "HttpTestSampleGui", &sampler.name);

    let multipart = matches!(&sampler.body, Some(RequestBody::Form { multipart: true, .. }));
    match &sampler.body {
        Some(RequestBody::Raw { text, .. }) => {
            bool_prop(w, "HTTPSampler.postBodyRaw", true);
            w.open(
                "elementProp",
                &[("name", "HTTPsampler.Arguments"), ("elementType", "Arguments")],
            );
            w.open("collectionProp", &[("name", "Arguments.arguments")]);
            w.open("elementProp", &[("name", ""), ("elementType", "HTTPArgument")]);
            bool_prop(w, "HTTPArgument.always_encode", false);
            string_prop(w, "Argument.value", text);
            string_prop(w, "Argument.metadata", "=");
            w.close("elementProp");
            w.close("collectionProp");
            w.close("elementProp");
        }
        Some(RequestBody::Form { params, files, .. }) => {
            if !files.is_empty() {
                w.open(
                    "elementProp",
                    &[("name", "HTTPsampler.Files"), ("elementType", "HTTPFileArgs")],
                );
                w.open("collectionProp", &[("name", "HTTPFileArgs.files")]);
                for file in files {
                    w.open(
                        "elementProp",
                        &[("name", file.file_name.as_str()), ("elementType", "HTTPFileArg")],
                    );
                    string_prop(w, "File.mimetype", &file.mime_type);
                    string_prop(w, "File.path", &file.file_name);
                    string_prop(w, "File.paramname", &file.param);
                    w.close("elementProp");
                }
                w.close("collectionProp");
                w.close("elementProp");
            }
            w.open(
                "elementProp",
                &[
                    ("name", "HTTPsampler.Arguments"),
                    ("elementType", "Arguments"),
                    ("guiclass", "HTTPArgumentsPanel"),
                    ("testclass", "Arguments"),
                    ("testname", "User Defined Variables"),
                ],
            );
            if params.is_empty() {
                w.empty("collectionProp", &[("name", "Arguments.arguments")]);
            } else {
                w.open("collectionProp", &[("name", "Arguments.arguments")]);
                for (name, value) in params {
                    w.open(
                        "elementProp",
                        &[("name", name.as_str()), ("elementType", "HTTPArgument")],
                    );
                    bool_prop(w, "HTTPArgument.always_encode", false);
                    string_prop(w, "Argument.value", value);
                    string_prop(w, "Argument.metadata", "=");
                    bool_prop(w, "HTTPArgument.use_equals", true);
                    string_prop(w, "Argument.name", name);
                    w.close("elementProp");
                }
                w.close("collectionProp");
            }
            w.close("elementProp");
        }
        None => empty_arguments(w, "HTTPsampler.Arguments", "HTTPArgumentsPanel"),
    }

    string_prop(w, "HTTPSampler.domain", &parts.domain);
    string_prop(w, "HTTPSampler.port", &parts.port);
    string_prop(w, "HTTPSampler.protocol", &parts.protocol);
    string_prop(w, "HTTPSampler.contentEncoding", "");
    string_prop(w, "HTTPSampler.path", &parts.path);
    string_prop(w, "HTTPSampler.method", &sampler.method);
    bool_prop(w, "HTTPSampler.follow_redirects", false);
    bool_prop(w, "HTTPSampler.auto_redirects", false);
    bool_prop(w, "HTTPSampler.use_keepalive", true);
    bool_prop(w, "HTTPSampler.DO_MULTIPART_POST", multipart);
    string_prop(w, "HTTPSampler.embedded_url_re", "");
    w.close("HTTPSamplerProxy");

    sampler_children(w, sampler);
}

/// Child tree of a sampler: its header manager, if any
fn sampler_children(w: &mut XmlWriter, sampler: &Sampler) {
    if sampler.headers.is_empty() {
        w.empty("hashTree", &[]);
        return;
    }
    w.open("hashTree", &[]);
    element(w, "HeaderManager", "HeaderPanel", "HTTP Header Manager");
    w.open("collectionProp", &[("name", "HeaderManager.headers")]);
    for header in &sampler.headers {
        w.open("elementProp", &[("name", ""), ("elementType", "Header")]);
        string_prop(w, "Header.name", &header.name);
        string_prop(w, "Header.value", &header.value);
        w.close("elementProp");
    }
    w.close("collectionProp");
    w.close("HeaderManager");
    w.empty("hashTree", &[]);
    w.close("hashTree");
}

fn ws_element(w: &mut XmlWriter, sampler: &str, name: &str) {
    let tag = format!("{WS_PACKAGE}.{sampler}");
    let gui = format!("{WS_PACKAGE}.{sampler}Gui");
    w.open(&tag, &[("guiclass", &gui), ("testclass", &tag), ("testname", name)]);
}

fn ws_close_element(w: &mut XmlWriter, sampler: &str) {
    w.close(&format!("{WS_PACKAGE}.{sampler}"));
}

/// Connection fields shared by every WebSocket sampler; blank when the
/// sampler reuses the thread's open connection
fn ws_connection(w: &mut XmlWriter, tls: bool, server: &str, port: &str, path: &str) {
    bool_prop(w, "TLS", tls);
    string_prop(w, "server", server);
    string_prop(w, "port", port);
    string_prop(w, "path", path);
    string_prop(w, "connectTimeout", WS_CONNECT_TIMEOUT);
}

fn websocket_samplers(w: &mut XmlWriter, sampler: &Sampler, frames: &[WebSocketFrame]) {
    let parts = split_url(&sampler.url);
    let tls = matches!(parts.protocol.as_str(), "wss" | "https");
    let port = if parts.port.is_empty() {
        if tls { "443" } else { "80" }.to_string()
    } else {
        parts.port.clone()
    };

    ws_element(w, "OpenWebSocketSampler", &format!("{} - open", sampler.name));
    ws_connection(w, tls, &parts.domain, &port, &parts.path);
    string_prop(w, "readTimeout", WS_READ_TIMEOUT);
    ws_close_element(w, "OpenWebSocketSampler");
    sampler_children(w, sampler);

    for frame in frames {
        let payload_type = if frame.is_binary() { "Binary" } else { "Text" };
        let payload = if frame.is_binary() {
            frame.payload_hex()
        } else {
            frame.payload.clone()
        };
        match frame.direction {
            FrameDirection::Sent => {
                ws_element(w, "SingleWriteWebSocketSampler", &format!("{} - send", sampler.name));
                ws_connection(w, false, "", "80", "");
                string_prop(w, "payloadType", payload_type);
                string_prop(w, "requestData", &payload);
                bool_prop(w, "createNewConnection", false);
                bool_prop(w, "loadDataFromFile", false);
                string_prop(w, "dataFile", "");
                ws_close_element(w, "SingleWriteWebSocketSampler");
            }
            FrameDirection::Received => {
                ws_element(w, "SingleReadWebSocketSampler", &format!("{} - read", sampler.name));
                ws_connection(w, false, "", "80", "");
                string_prop(w, "dataType", payload_type);
                bool_prop(w, "createNewConnection", false);
                string_prop(w, "readTimeout", WS_READ_TIMEOUT);
                bool_prop(w, "optional", false);
                ws_close_element(w, "SingleReadWebSocketSampler");
            }
        }
        w.empty("hashTree", &[]);
    }

    ws_element(w, "CloseWebSocketSampler", &format!("{} - close", sampler.name));
    string_prop(w, "statusCode", "1000");
    string_prop(w, "readTimeout", WS_READ_TIMEOUT);
    ws_close_element(w, "CloseWebSocketSampler");
    w.empty("hashTree", &[]);
}

const SAVE_CONFIG: &[(&str, &str)] = &[
    ("time", "true"),
    ("latency", "true"),
    ("timestamp", "true"),
    ("success", "true"),
    ("label", "true"),
    ("code", "true"),
    ("message", "true"),
    ("threadName", "true"),
    ("dataType", "true"),
    ("encoding", "false"),
    ("assertions", "true"),
    ("subresults", "true"),
    ("responseData", "true"),
    ("samplerData", "true"),
    ("xml", "true"),
    ("fieldNames", "true"),
    ("responseHeaders", "true"),
    ("requestHeaders", "true"),
    ("responseDataOnError", "false"),
    ("saveAssertionResultsFailureMessage", "true"),
    ("assertionsResultsToSave", "0"),
    ("bytes", "true"),
    ("sentBytes", "true"),
    ("url", "true"),
    ("threadCounts", "true"),
    ("idleTime", "true"),
    ("connectTime", "true"),
];

fn result_collector(w: &mut XmlWriter, filename: &str) {
    element(w, "ResultCollector", "ViewResultsFullVisualizer", "View Results Tree");
    bool_prop(w, "ResultCollector.error_logging", false);
    w.open("objProp", &[]);
    w.text("name", &[], "saveConfig");
    w.open("value", &[("class", "SampleSaveConfiguration")]);
    for (tag, value) in SAVE_CONFIG {
        w.text(tag, &[], value);
    }
    w.close("value");
    w.close("objProp");
    string_prop(w, "filename", filename);
    w.close("ResultCollector");
    w.empty("hashTree", &[]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::har::Header;
    use crate::sampler::{FileParam, RecordedResponse};

    fn sampler(number: u64, url: &str, kind: SamplerKind) -> Sampler {
        Sampler {
            number,
            name: format!("{:03} /", number),
            method: "GET".to_string(),
            url: url.to_string(),
            headers: vec![],
            body: None,
            response: RecordedResponse::default(),
            started_ms: None,
            elapsed_ms: 0,
            latency_ms: 0,
            kind,
        }
    }

    fn page(number: u64, pause_ms: Option<u64>, samplers: Vec<Sampler>) -> Page {
        Page {
            number,
            name: format!("PAGE_{:02} - /", number),
            har_page_id: None,
            pause_ms,
            samplers,
        }
    }

    #[test]
    fn test_split_url() {
        let parts = split_url("https://example.com:8443/a/b?x=1&y=2");
        assert_eq!(parts.protocol, "https");
        assert_eq!(parts.domain, "example.com");
        assert_eq!(parts.port, "8443");
        assert_eq!(parts.path, "/a/b?x=1&y=2");

        let parts = split_url("http://example.com/");
        assert_eq!(parts.port, "");

        let parts = split_url("https://user@[::1]:443?q=1#top");
        assert_eq!(parts.domain, "[::1]");
        assert_eq!(parts.port, "");
        assert_eq!(parts.path, "/?q=1");
    }

    #[test]
    fn test_split_url_keeps_text_as_recorded() {
        let parts = split_url("https://Example.COM/a/../b?q=1");
        assert_eq!(parts.domain, "Example.COM");
        assert_eq!(parts.path, "/a/../b?q=1");

        let parts = split_url("http://example.com:8080/s?q=a b&x=<1>");
        assert_eq!(parts.port, "8080");
        assert_eq!(parts.path, "/s?q=a b&x=<1>");
    }

    #[test]
    fn test_scaffolding_follows_options() {
        let pages = vec![page(1, None, vec![sampler(1, "https://example.com/", SamplerKind::Http)])];

        let full = JmxWriter::to_string(&pages, &JmxOptions::default());
        assert_eq!(full.matches("<CookieManager ").count(), 1);
        assert_eq!(full.matches("<CacheManager ").count(), 1);
        assert_eq!(full.matches("<ResultCollector ").count(), 1);

        let bare = JmxWriter::to_string(
            &pages,
            &JmxOptions {
                cookie_manager: false,
                cache_manager: false,
                result_tree: false,
                ..Default::default()
            },
        );
        assert!(!bare.contains("CookieManager"));
        assert!(!bare.contains("CacheManager"));
        assert!(!bare.contains("ResultCollector"));
        assert!(bare.ends_with("</jmeterTestPlan>\n"));
    }

    #[test]
    fn test_result_tree_precedes_transactions() {
        let pages = vec![
            page(1, None, vec![sampler(1, "https://example.com/", SamplerKind::Http)]),
            page(2, None, vec![sampler(2, "https://example.com/b", SamplerKind::Http)]),
        ];
        let xml = JmxWriter::to_string(&pages, &JmxOptions::default());

        let cache = xml.find("<CacheManager ").unwrap();
        let collector = xml.find("<ResultCollector ").unwrap();
        let first_transaction = xml.find("<TransactionController ").unwrap();
        assert!(cache < collector);
        assert!(collector < first_transaction);
    }

    #[test]
    fn test_pause_becomes_flow_control_timer() {
        let pages = vec![
            page(1, None, vec![sampler(1, "https://example.com/", SamplerKind::Http)]),
            page(2, Some(2000), vec![sampler(2, "https://example.com/b", SamplerKind::Http)]),
        ];
        let xml = JmxWriter::to_string(&pages, &JmxOptions::default());

        assert_eq!(xml.matches("<TestAction ").count(), 1);
        assert!(xml.contains("<stringProp name=\"ConstantTimer.delay\">2000</stringProp>"));
        let timer = xml.find("ConstantTimer.delay").unwrap();
        let second_page = xml.find("PAGE_02").unwrap();
        assert!(timer > second_page);
    }

    #[test]
    fn test_http_sampler_fields_and_headers() {
        let mut s = sampler(4, "https://example.com/search?q=a%20b&x=<1>", SamplerKind::Http);
        s.method = "POST".to_string();
        s.headers = vec![Header::new("Content-Type", "application/json")];
        s.body = Some(RequestBody::Raw {
            mime_type: "application/json".to_string(),
            text: "{\"q\":\"<x>\"}".to_string(),
        });
        let xml = JmxWriter::to_string(&[page(1, None, vec![s])], &JmxOptions::default());

        assert!(xml.contains("<stringProp name=\"HTTPSampler.domain\">example.com</stringProp>"));
        assert!(xml.contains("<stringProp name=\"HTTPSampler.path\">/search?q=a%20b&amp;x=&lt;1&gt;</stringProp>"));
        assert!(xml.contains("<stringProp name=\"HTTPSampler.method\">POST</stringProp>"));
        assert!(xml.contains("<boolProp name=\"HTTPSampler.postBodyRaw\">true</boolProp>"));
        assert!(xml.contains("{&quot;q&quot;:&quot;&lt;x&gt;&quot;}"));
        assert!(xml.contains("<stringProp name=\"Header.name\">Content-Type</stringProp>"));
    }

    #[test]
    fn test_multipart_form() {
        let mut s = sampler(1, "https://example.com/upload", SamplerKind::Http);
        s.method = "POST".to_string();
        s.body = Some(RequestBody::Form {
            params: vec![("title".to_string(), "Q1".to_string())],
            files: vec![FileParam {
                param: "doc".to_string(),
                file_name: "report.pdf".to_string(),
                mime_type: "application/pdf".to_string(),
            }],
            multipart: true,
        });
        let xml = JmxWriter::to_string(&[page(1, None, vec![s])], &JmxOptions::default());

        assert!(xml.contains("<boolProp name=\"HTTPSampler.DO_MULTIPART_POST\">true</boolProp>"));
        assert!(xml.contains("<stringProp name=\"File.paramname\">doc</stringProp>"));
        assert!(xml.contains("<stringProp name=\"Argument.name\">title</stringProp>"));
    }

    #[test]
    fn test_websocket_elements() {
        let frames = vec![
            WebSocketFrame {
                direction: FrameDirection::Sent,
                opcode: 1,
                payload: "subscribe".to_string(),
            },
            WebSocketFrame {
                direction: FrameDirection::Received,
                opcode: 2,
                payload: "AQI=".to_string(),
            },
        ];
        let s = sampler(9, "wss://example.com/live?v=2", SamplerKind::WebSocket(frames));
        let xml = JmxWriter::to_string(&[page(1, None, vec![s])], &JmxOptions::default());

        assert_eq!(xml.matches("<eu.luminis.jmeter.wssampler.OpenWebSocketSampler ").count(), 1);
        assert_eq!(xml.matches("<eu.luminis.jmeter.wssampler.SingleWriteWebSocketSampler ").count(), 1);
        assert_eq!(xml.matches("<eu.luminis.jmeter.wssampler.SingleReadWebSocketSampler ").count(), 1);
        assert_eq!(xml.matches("<eu.luminis.jmeter.wssampler.CloseWebSocketSampler ").count(), 1);
        assert!(xml.contains("<stringProp name=\"port\">443</stringProp>"));
        assert!(xml.contains("<stringProp name=\"path\">/live?v=2</stringProp>"));
        assert!(xml.contains("<stringProp name=\"requestData\">subscribe</stringProp>"));
        assert!(xml.contains("<stringProp name=\"dataType\">Binary</stringProp>"));
        assert!(!xml.contains("HTTPSamplerProxy"));
    }

    #[test]
    fn test_result_collector_points_at_recording() {
        let options = JmxOptions {
            recording_file: Some("out/record.xml".to_string()),
            ..Default::default()
        };
        let xml = JmxWriter::to_string(&[], &options);
        assert!(xml.contains("<stringProp name=\"filename\">out/record.xml</stringProp>"));
    }
}
