//! Grammar checking: LanguageTool sessions behind a small trait seam.
//!
//! A [`GrammarChecker`] hands out [`GrammarSession`]s; a session is the
//! scoped resource. Whatever it holds (an HTTP client, a spawned
//! LanguageTool server) is released when the session is dropped, so every
//! exit path of the analyzer releases it, including early returns and
//! unwinding.
//!
//! ## Offsets and lines
//!
//! LanguageTool reports matches as `offset`/`length` in UTF-16 code units
//! (Java `char`s). The 0-based line of a match is the number of `\n`
//! characters that precede its offset.

use crate::config::{GrammarBackend, ReviewConfig};
use crate::error::GrammarError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::process::{Child, Command};
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Main class of the LanguageTool HTTP server inside `languagetool-server.jar`.
const SERVER_MAIN_CLASS: &str = "org.languagetool.server.HTTPServer";

/// Delay between readiness polls of a starting local server.
const STARTUP_POLL_MS: u64 = 250;

/// One grammar or style issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarMatch {
    /// 0-based line of the match start.
    pub line: usize,
    pub message: String,
    /// Start, in UTF-16 code units.
    pub offset: usize,
    /// Length, in UTF-16 code units.
    pub length: usize,
    pub rule_id: Option<String>,
    pub replacements: Vec<String>,
}

impl GrammarMatch {
    /// A match with only a line and a message, as a minimal checker reports it.
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
            offset: 0,
            length: 0,
            rule_id: None,
            replacements: Vec::new(),
        }
    }
}

/// Source of grammar-checking sessions for one fixed language.
#[async_trait]
pub trait GrammarChecker: Send + Sync {
    /// Language code every session checks against, e.g. `pt-BR`.
    fn language(&self) -> &str;

    /// Acquire a session. This is where blocking is expected (process
    /// startup, network handshake).
    async fn open_session(&self) -> Result<Box<dyn GrammarSession>, GrammarError>;
}

/// An open checking session. Dropping it releases its resources.
#[async_trait]
pub trait GrammarSession: Send {
    /// Check `text`; matches come back in checker order.
    async fn check(&mut self, text: &str) -> Result<Vec<GrammarMatch>, GrammarError>;
}

/// Pick the configured checker: a pre-built one wins over the backend.
pub fn resolve_grammar_checker(config: &ReviewConfig) -> Arc<dyn GrammarChecker> {
    match config.grammar_checker {
        Some(ref checker) => Arc::clone(checker),
        None => Arc::new(LanguageTool::from_config(config)),
    }
}

// ── LanguageTool ─────────────────────────────────────────────────────────

/// LanguageTool over its HTTP API (`/v2/check`).
#[derive(Debug, Clone)]
pub struct LanguageTool {
    backend: GrammarBackend,
    language: String,
    request_timeout: Duration,
    startup_timeout: Duration,
}

impl LanguageTool {
    pub fn new(backend: GrammarBackend, language: impl Into<String>) -> Self {
        Self {
            backend,
            language: language.into(),
            request_timeout: Duration::from_secs(30),
            startup_timeout: Duration::from_secs(60),
        }
    }

    pub fn from_config(config: &ReviewConfig) -> Self {
        Self {
            backend: config.grammar.clone(),
            language: config.language.clone(),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            startup_timeout: Duration::from_secs(config.startup_timeout_secs),
        }
    }

    fn client(&self) -> Result<reqwest::Client, GrammarError> {
        Ok(reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()?)
    }
}

#[async_trait]
impl GrammarChecker for LanguageTool {
    fn language(&self) -> &str {
        &self.language
    }

    async fn open_session(&self) -> Result<Box<dyn GrammarSession>, GrammarError> {
        let client = self.client()?;

        let (base_url, server) = match &self.backend {
            GrammarBackend::Remote { url } => (url.trim_end_matches('/').to_string(), None),
            GrammarBackend::LocalServer { jar, port } => {
                let mut server = LocalServer::spawn(jar, *port)?;
                let base_url = format!("http://127.0.0.1:{}", server.port);
                wait_until_ready(&client, &base_url, &mut server, self.startup_timeout).await?;
                (base_url, Some(server))
            }
        };

        debug!("LanguageTool session open at {}", base_url);
        Ok(Box::new(LanguageToolSession {
            client,
            base_url,
            language: self.language.clone(),
            _server: server,
        }))
    }
}

/// A session against one LanguageTool endpoint.
struct LanguageToolSession {
    client: reqwest::Client,
    base_url: String,
    language: String,
    /// Kept alive for the session; dropping it stops the server.
    _server: Option<LocalServer>,
}

#[async_trait]
impl GrammarSession for LanguageToolSession {
    async fn check(&mut self, text: &str) -> Result<Vec<GrammarMatch>, GrammarError> {
        let url = format!("{}/v2/check", self.base_url);
        let response = self
            .client
            .post(&url)
            .form(&[("text", text), ("language", self.language.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(GrammarError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let matches = parse_check_response(&body, text)?;
        debug!("LanguageTool: {} matches", matches.len());
        Ok(matches)
    }
}

/// A `languagetool-server.jar` child process.
struct LocalServer {
    child: Child,
    port: u16,
}

impl LocalServer {
    fn spawn(jar: &Path, port: Option<u16>) -> Result<Self, GrammarError> {
        if !jar.is_file() {
            return Err(GrammarError::Unavailable(format!(
                "LanguageTool server jar not found: {}",
                jar.display()
            )));
        }
        let java = which::which("java")
            .map_err(|e| GrammarError::Unavailable(format!("java not found: {e}")))?;
        let port = match port {
            Some(p) => p,
            None => free_local_port()?,
        };

        info!("Starting LanguageTool server on port {}", port);
        let child = Command::new(java)
            .arg("-cp")
            .arg(jar)
            .arg(SERVER_MAIN_CLASS)
            .arg("--port")
            .arg(port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| GrammarError::Startup(format!("spawning java: {e}")))?;

        Ok(Self { child, port })
    }
}

impl Drop for LocalServer {
    fn drop(&mut self) {
        debug!("Stopping LanguageTool server on port {}", self.port);
        if let Err(e) = self.child.start_kill() {
            warn!("Failed to stop LanguageTool server: {}", e);
        }
    }
}

fn free_local_port() -> Result<u16, GrammarError> {
    std::net::TcpListener::bind(("127.0.0.1", 0))
        .and_then(|l| l.local_addr())
        .map(|addr| addr.port())
        .map_err(|e| GrammarError::Startup(format!("no free local port: {e}")))
}

/// Poll `/v2/languages` until the server answers, exits, or `timeout`
/// elapses.
async fn wait_until_ready(
    client: &reqwest::Client,
    base_url: &str,
    server: &mut LocalServer,
    timeout: Duration,
) -> Result<(), GrammarError> {
    let start = Instant::now();
    let languages_url = format!("{base_url}/v2/languages");

    loop {
        match server.child.try_wait() {
            Ok(Some(status)) => {
                return Err(GrammarError::Startup(format!(
                    "LanguageTool server exited before answering ({status})"
                )));
            }
            Ok(None) => {}
            Err(e) => {
                return Err(GrammarError::Startup(format!(
                    "checking LanguageTool server process: {e}"
                )));
            }
        }
        if let Ok(response) = client.get(&languages_url).send().await {
            if response.status().is_success() {
                info!(
                    "LanguageTool server ready after {}ms",
                    start.elapsed().as_millis()
                );
                return Ok(());
            }
        }
        if start.elapsed() >= timeout {
            return Err(GrammarError::Startup(format!(
                "no answer on port {} after {}s",
                server.port,
                timeout.as_secs()
            )));
        }
        sleep(Duration::from_millis(STARTUP_POLL_MS)).await;
    }
}

// ── Response parsing ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct CheckResponse {
    matches: Vec<ApiMatch>,
}

#[derive(Debug, Deserialize)]
struct ApiMatch {
    message: String,
    offset: usize,
    length: usize,
    #[serde(default)]
    rule: Option<ApiRule>,
    #[serde(default)]
    replacements: Vec<ApiReplacement>,
}

#[derive(Debug, Deserialize)]
struct ApiRule {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ApiReplacement {
    value: String,
}

/// Decode a `/v2/check` body into matches with line numbers for `text`.
fn parse_check_response(body: &str, text: &str) -> Result<Vec<GrammarMatch>, GrammarError> {
    let response: CheckResponse =
        serde_json::from_str(body).map_err(|e| GrammarError::Decode(e.to_string()))?;
    let lines = LineIndex::new(text);

    Ok(response
        .matches
        .into_iter()
        .map(|m| GrammarMatch {
            line: lines.line_of(m.offset),
            message: m.message,
            offset: m.offset,
            length: m.length,
            rule_id: m.rule.map(|r| r.id),
            replacements: m.replacements.into_iter().map(|r| r.value).collect(),
        })
        .collect())
}

/// UTF-16 positions of every `\n` in a text.
struct LineIndex {
    newlines: Vec<usize>,
}

impl LineIndex {
    fn new(text: &str) -> Self {
        let mut newlines = Vec::new();
        let mut pos = 0usize;
        for c in text.chars() {
            if c == '\n' {
                newlines.push(pos);
            }
            pos += c.len_utf16();
        }
        Self { newlines }
    }

    /// 0-based line containing UTF-16 `offset`.
    fn line_of(&self, offset: usize) -> usize {
        self.newlines.partition_point(|&p| p < offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "software": {"name": "LanguageTool"},
        "matches": [
            {
                "message": "Possível erro de concordância.",
                "offset": 4,
                "length": 5,
                "replacements": [{"value": "meninos"}],
                "rule": {"id": "PT_AGREEMENT", "description": "x"}
            },
            {
                "message": "Repetição de palavra.",
                "offset": 13,
                "length": 3
            }
        ]
    }"#;

    #[test]
    fn parses_matches_and_lines() {
        let text = "Os menino\ncomem e e\nbem";
        let matches = parse_check_response(BODY, text).unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].line, 0);
        assert_eq!(matches[0].rule_id.as_deref(), Some("PT_AGREEMENT"));
        assert_eq!(matches[0].replacements, vec!["meninos"]);
        assert_eq!(matches[1].line, 1);
        assert_eq!(matches[1].message, "Repetição de palavra.");
        assert!(matches[1].rule_id.is_none());
    }

    #[test]
    fn bad_body_is_decode_error() {
        let err = parse_check_response("<html>502</html>", "x").unwrap_err();
        assert!(matches!(err, GrammarError::Decode(_)));
    }

    #[test]
    fn line_index_counts_preceding_newlines() {
        let idx = LineIndex::new("a\nb\n\nc");
        assert_eq!(idx.line_of(0), 0);
        assert_eq!(idx.line_of(1), 0); // the newline itself belongs to line 0
        assert_eq!(idx.line_of(2), 1);
        assert_eq!(idx.line_of(4), 2);
        assert_eq!(idx.line_of(5), 3);
    }

    #[test]
    fn line_index_uses_utf16_units() {
        // '𝄞' is two UTF-16 units, so the newline sits at unit 2.
        let idx = LineIndex::new("𝄞\nx");
        assert_eq!(idx.line_of(2), 0);
        assert_eq!(idx.line_of(3), 1);
    }

    #[test]
    fn prebuilt_checker_takes_precedence() {
        struct Dummy;

        #[async_trait]
        impl GrammarChecker for Dummy {
            fn language(&self) -> &str {
                "xx"
            }
            async fn open_session(&self) -> Result<Box<dyn GrammarSession>, GrammarError> {
                Err(GrammarError::Other("dummy".into()))
            }
        }

        let config = ReviewConfig::builder()
            .grammar_checker(Arc::new(Dummy))
            .build()
            .unwrap();
        assert_eq!(resolve_grammar_checker(&config).language(), "xx");

        let default = ReviewConfig::default();
        assert_eq!(resolve_grammar_checker(&default).language(), "pt-BR");
    }

    #[tokio::test]
    async fn missing_jar_is_unavailable() {
        let lt = LanguageTool::new(
            GrammarBackend::LocalServer {
                jar: "/nonexistent/languagetool-server.jar".into(),
                port: None,
            },
            "pt-BR",
        );
        let err = lt.open_session().await.err().unwrap();
        assert!(matches!(err, GrammarError::Unavailable(_)), "got {err:?}");
    }

    /// Serve one canned HTTP response on a loopback port and hand back the
    /// raw request it received.
    async fn one_shot_server(
        status: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&raw).to_string();
                if let Some(end) = text.find("\r\n\r\n") {
                    let content_length = text[..end]
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())?
                        })
                        .unwrap_or(0);
                    if raw.len() >= end + 4 + content_length {
                        break;
                    }
                }
            }
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
            String::from_utf8_lossy(&raw).to_string()
        });
        (url, handle)
    }

    fn remote(url: String) -> LanguageTool {
        LanguageTool::new(GrammarBackend::Remote { url }, "pt-BR")
    }

    #[tokio::test]
    async fn session_posts_form_and_parses_matches() {
        let (url, server) = one_shot_server("200 OK", BODY).await;
        let mut session = remote(url).open_session().await.unwrap();

        let matches = session.check("Os menino\ncomem e e\nbem").await.unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].offset, 4);
        assert_eq!(matches[0].length, 5);
        assert_eq!(matches[1].line, 1);

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /v2/check "), "{request}");
        assert!(request.contains("language=pt-BR"), "{request}");
        assert!(request.contains("text=Os+menino"), "{request}");
    }

    #[tokio::test]
    async fn non_success_status_is_api_error() {
        let (url, server) = one_shot_server("500 Internal Server Error", "boom").await;
        let mut session = remote(format!("{url}/")).open_session().await.unwrap();

        let err = session.check("texto").await.unwrap_err();
        match err {
            GrammarError::Api { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
        server.await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn exited_server_fails_fast() {
        let child = Command::new("sh")
            .arg("-c")
            .arg("exit 3")
            .kill_on_drop(true)
            .spawn()
            .unwrap();
        let mut server = LocalServer {
            child,
            port: free_local_port().unwrap(),
        };
        let base_url = format!("http://127.0.0.1:{}", server.port);
        let client = reqwest::Client::new();

        let start = Instant::now();
        let err = wait_until_ready(&client, &base_url, &mut server, Duration::from_secs(30))
            .await
            .unwrap_err();

        assert!(start.elapsed() < Duration::from_secs(10));
        match err {
            GrammarError::Startup(msg) => assert!(msg.contains("exited"), "{msg}"),
            other => panic!("expected Startup error, got {other:?}"),
        }
    }
}
