#![allow(dead_code)]

use hub_config::Config;
use hub_session_store::{MemoryStorage, SessionVault, TokenSet};
use parking_lot::Mutex;
use session_guard::{ApiClient, LoginProvider, SessionContext, UserProfile};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Canned answer for one path.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub body: String,
    pub headers: Vec<(String, String)>,
}

impl MockResponse {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self::raw(status, &body.to_string())
    }

    pub fn raw(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

/// What the backend saw.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path plus query string, exactly as sent.
    pub target: String,
    pub authorization: Option<String>,
    pub cookie: Option<String>,
}

impl RecordedRequest {
    pub fn path(&self) -> &str {
        self.target.split('?').next().unwrap_or("")
    }

    pub fn query(&self) -> HashMap<String, String> {
        let query = self.target.split_once('?').map(|(_, q)| q).unwrap_or("");
        url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect()
    }
}

/// In-process HTTP/1.1 responder for the backend endpoints.
///
/// Unknown paths answer 404 with an empty body.
pub struct MockBackend {
    url: String,
    routes: Arc<Mutex<HashMap<String, MockResponse>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: JoinHandle<()>,
}

impl MockBackend {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock backend");
        let addr = listener.local_addr().expect("no local addr");

        let routes: Arc<Mutex<HashMap<String, MockResponse>>> = Arc::default();
        let requests: Arc<Mutex<Vec<RecordedRequest>>> = Arc::default();

        let handle = tokio::spawn({
            let routes = routes.clone();
            let requests = requests.clone();
            async move {
                while let Ok((socket, _)) = listener.accept().await {
                    let routes = routes.clone();
                    let requests = requests.clone();
                    tokio::spawn(async move {
                        let _ = handle_connection(socket, routes, requests).await;
                    });
                }
            }
        });

        Self {
            url: format!("http://{}", addr),
            routes,
            requests,
            handle,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn route(&self, path: &str, response: MockResponse) {
        self.routes.lock().insert(path.to_string(), response);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path() == path)
            .collect()
    }

    pub fn config(&self) -> Config {
        Config {
            backend_url: self.url.clone(),
            kakao_client_id: "kakao-app".to_string(),
            kakao_redirect_uri: "http://localhost:3000/login/kakao".to_string(),
            request_timeout_secs: 5,
            ..Config::default()
        }
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle_connection(
    mut socket: TcpStream,
    routes: Arc<Mutex<HashMap<String, MockResponse>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
) -> std::io::Result<()> {
    let (reader, mut writer) = socket.split();
    let mut reader = BufReader::new(reader);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let target = parts.next().unwrap_or_default().to_string();

    let mut authorization = None;
    let mut cookie = None;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            match name.trim().to_ascii_lowercase().as_str() {
                "authorization" => authorization = Some(value.trim().to_string()),
                "cookie" => cookie = Some(value.trim().to_string()),
                _ => {}
            }
        }
    }

    let recorded = RecordedRequest {
        method,
        target,
        authorization,
        cookie,
    };
    let response = routes
        .lock()
        .get(recorded.path())
        .cloned()
        .unwrap_or_else(|| MockResponse::raw(404, ""));
    requests.lock().push(recorded);

    let mut head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n",
        response.status,
        reason(response.status),
        response.body.len()
    );
    for (name, value) in &response.headers {
        head.push_str(&format!("{}: {}\r\n", name, value));
    }
    head.push_str("\r\n");

    writer.write_all(head.as_bytes()).await?;
    writer.write_all(response.body.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}

/// Login/refresh response body with an RFC 3339 expiry `secs` from now.
pub fn login_body(user_id: &str, access_token: &str, jwt: &str, secs: i64) -> serde_json::Value {
    let expire_at = chrono::Utc::now() + chrono::Duration::seconds(secs);
    serde_json::json!({
        "resultcode": "00",
        "message": "success",
        "userInfo": { "id": user_id, "nickname": "neo" },
        "accessToken": access_token,
        "jwt": jwt,
        "expiresIn": secs,
        "expireDate": expire_at.to_rfc3339(),
    })
}

pub fn empty_context() -> Arc<SessionContext> {
    Arc::new(SessionContext::new(SessionVault::new(Box::new(
        MemoryStorage::new(),
    ))))
}

/// A Naver session for `u1` whose token expires `secs` from now.
pub fn naver_context(secs: i64) -> Arc<SessionContext> {
    let context = empty_context();
    context
        .establish(
            LoginProvider::Naver,
            UserProfile::with_id("u1"),
            &TokenSet {
                access_token: "t1".to_string(),
                jwt: "j1".to_string(),
                expire_at: chrono::Utc::now() + chrono::Duration::seconds(secs),
            },
        )
        .expect("failed to establish session");
    context
}

pub fn client(backend: &MockBackend, context: Arc<SessionContext>) -> Arc<ApiClient> {
    Arc::new(ApiClient::new(&backend.config(), context).expect("failed to build client"))
}
