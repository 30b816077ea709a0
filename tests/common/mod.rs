//! Shared utilities for integration testing.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    extract::{Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{get, patch, post},
    Form, Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::net::{IpAddr, SocketAddr};
use std::path::Path as FsPath;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use dns_failover::config::{Credentials, DaemonConfig, PoolEntry};
use dns_failover::health::Prober;
use dns_failover::pool::Endpoint;

pub const CF_TOKEN: &str = "test-token";
pub const TG_TOKEN: &str = "123:abc";
pub const ZONE: &str = "zone-a";

/// Serve `router` on an ephemeral localhost port.
pub async fn spawn_server(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

#[derive(Debug, Clone)]
pub struct MockRecord {
    pub zone: String,
    pub id: String,
    pub name: String,
    pub record_type: String,
    pub content: String,
}

#[derive(Default)]
struct CloudflareState {
    records: Vec<MockRecord>,
    patches: Vec<(String, String)>,
    list_calls: usize,
}

/// In-memory stand-in for the Cloudflare v4 DNS API.
#[derive(Clone, Default)]
pub struct MockCloudflare {
    state: Arc<Mutex<CloudflareState>>,
    fail_patches: Arc<AtomicBool>,
}

impl MockCloudflare {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_record(&self, zone: &str, id: &str, name: &str, record_type: &str, content: &str) {
        self.state.lock().unwrap().records.push(MockRecord {
            zone: zone.into(),
            id: id.into(),
            name: name.into(),
            record_type: record_type.into(),
            content: content.into(),
        });
    }

    pub fn content(&self, id: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .records
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.content.clone())
    }

    /// `(record_id, content)` of every accepted PATCH, in order.
    pub fn patches(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().patches.clone()
    }

    pub fn list_calls(&self) -> usize {
        self.state.lock().unwrap().list_calls
    }

    pub fn fail_patches(&self, fail: bool) {
        self.fail_patches.store(fail, Ordering::SeqCst);
    }

    /// Start the mock and return its API base URL.
    pub async fn start(&self) -> String {
        let router = Router::new()
            .route("/client/v4/zones/{zone}/dns_records", get(list_records))
            .route("/client/v4/zones/{zone}/dns_records/{id}", patch(update_record))
            .with_state(self.clone());
        let addr = spawn_server(router).await;
        format!("http://{addr}/client/v4")
    }
}

#[derive(Deserialize)]
struct ListQuery {
    #[serde(rename = "type")]
    record_type: Option<String>,
    page: Option<usize>,
    per_page: Option<usize>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {CF_TOKEN}"))
}

fn api_failure(status: StatusCode, code: u32, message: &str) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(json!({
            "success": false,
            "errors": [{"code": code, "message": message}],
            "messages": [],
            "result": null
        })),
    )
}

async fn list_records(
    State(mock): State<MockCloudflare>,
    Path(zone): Path<String>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return api_failure(StatusCode::FORBIDDEN, 10000, "Authentication error");
    }

    let mut state = mock.state.lock().unwrap();
    state.list_calls += 1;

    let matching: Vec<&MockRecord> = state
        .records
        .iter()
        .filter(|r| r.zone == zone)
        .filter(|r| query.record_type.as_deref().map_or(true, |t| t == r.record_type))
        .collect();

    let per_page = query.per_page.unwrap_or(100).max(1);
    let page = query.page.unwrap_or(1).max(1);
    let total_pages = matching.len().div_ceil(per_page).max(1);
    let result: Vec<Value> = matching
        .iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .map(|r| {
            json!({
                "id": r.id,
                "name": r.name,
                "type": r.record_type,
                "content": r.content,
                "ttl": 1,
                "proxied": false
            })
        })
        .collect();

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "errors": [],
            "messages": [],
            "result_info": {
                "page": page,
                "per_page": per_page,
                "count": result.len(),
                "total_count": matching.len(),
                "total_pages": total_pages
            },
            "result": result
        })),
    )
}

async fn update_record(
    State(mock): State<MockCloudflare>,
    Path((zone, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return api_failure(StatusCode::FORBIDDEN, 10000, "Authentication error");
    }
    if mock.fail_patches.load(Ordering::SeqCst) {
        return api_failure(StatusCode::INTERNAL_SERVER_ERROR, 1000, "Internal error");
    }

    let content = body["content"].as_str().unwrap_or_default().to_string();
    let mut state = mock.state.lock().unwrap();
    let Some(record) = state.records.iter_mut().find(|r| r.zone == zone && r.id == id) else {
        return api_failure(StatusCode::NOT_FOUND, 81044, "Record not found");
    };
    record.content = content.clone();
    let updated = json!({
        "id": record.id,
        "name": record.name,
        "type": record.record_type,
        "content": record.content
    });
    state.patches.push((id, content));

    (StatusCode::OK, Json(json!({"success": true, "errors": [], "messages": [], "result": updated})))
}

/// Stand-in for the Telegram Bot API `sendMessage` method.
#[derive(Clone, Default)]
pub struct MockTelegram {
    messages: Arc<Mutex<Vec<HashMap<String, String>>>>,
    fail: Arc<AtomicBool>,
}

impl MockTelegram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn texts(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter_map(|m| m.get("text").cloned())
            .collect()
    }

    pub fn messages(&self) -> Vec<HashMap<String, String>> {
        self.messages.lock().unwrap().clone()
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Start the mock and return its API base URL.
    pub async fn start(&self) -> String {
        let router = Router::new()
            .route("/{bot}/sendMessage", post(send_message))
            .with_state(self.clone());
        let addr = spawn_server(router).await;
        format!("http://{addr}")
    }
}

async fn send_message(
    State(mock): State<MockTelegram>,
    Path(bot): Path<String>,
    Form(form): Form<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    if bot != format!("bot{TG_TOKEN}") {
        return (StatusCode::UNAUTHORIZED, Json(json!({"ok": false, "description": "Unauthorized"})));
    }
    if mock.fail.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"ok": false})));
    }
    mock.messages.lock().unwrap().push(form);
    (StatusCode::OK, Json(json!({"ok": true})))
}

/// Prober whose answers are set by the test. Endpoints are healthy unless marked down.
#[derive(Default)]
pub struct ScriptedProber {
    latency_down: Mutex<HashSet<IpAddr>>,
    connect_down: Mutex<HashSet<IpAddr>>,
}

impl ScriptedProber {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_latency(&self, ip: &str, up: bool) {
        let ip: IpAddr = ip.parse().unwrap();
        let mut down = self.latency_down.lock().unwrap();
        if up {
            down.remove(&ip);
        } else {
            down.insert(ip);
        }
    }

    pub fn set_connectivity(&self, ip: &str, up: bool) {
        let ip: IpAddr = ip.parse().unwrap();
        let mut down = self.connect_down.lock().unwrap();
        if up {
            down.remove(&ip);
        } else {
            down.insert(ip);
        }
    }
}

#[async_trait]
impl Prober for ScriptedProber {
    async fn latency(&self, endpoint: Endpoint) -> Option<Duration> {
        if self.latency_down.lock().unwrap().contains(&endpoint.address) {
            None
        } else {
            Some(Duration::from_millis(12))
        }
    }

    async fn connectivity(&self, endpoint: Endpoint) -> bool {
        !self.connect_down.lock().unwrap().contains(&endpoint.address)
    }
}

/// Daemon config pointing at the mocks, with revert spacing disabled.
pub fn daemon_config(cloudflare_base: &str, telegram_base: Option<&str>, state_dir: &FsPath) -> DaemonConfig {
    let mut config = DaemonConfig::default();
    config.cloudflare.api_base = cloudflare_base.to_string();
    config.cloudflare.zones = vec![ZONE.to_string()];
    config.pool = ["192.0.2.1", "192.0.2.2", "192.0.2.3"]
        .iter()
        .map(|ip| PoolEntry {
            address: ip.parse().unwrap(),
            port: 8587,
        })
        .collect();
    config.probe.revert_probe_spacing_ms = 0;
    config.state.path = state_dir.join("status.json");
    if let Some(base) = telegram_base {
        config.notifier.enabled = true;
        config.notifier.api_base = base.to_string();
        config.notifier.chat_id = "42".to_string();
    }
    config
}

pub fn credentials(config: &DaemonConfig) -> Credentials {
    Credentials::resolve(config, |name| match name {
        "CLOUDFLARE_API_TOKEN" => Some(CF_TOKEN.to_string()),
        "TELEGRAM_BOT_TOKEN" => Some(TG_TOKEN.to_string()),
        "DNS_FAILOVER_ADMIN_KEY" => Some("admin-key".to_string()),
        _ => None,
    })
    .unwrap()
}
