//! 进程内的 LibreLinkUp 模拟服务
//!
//! 登录、连接列表和曲线接口同时挂在根路径和 `/eu` 下，
//! 一个监听端口即可覆盖区域重定向；另附 Nightscout 的 entries 接口。
#![allow(dead_code)]

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use flate2::Compression;
use flate2::write::GzEncoder;
use glucose_relay::cache::GlucoseStore;
use glucose_relay::config::VendorConfig;
use glucose_relay::librelink::{GlucoseFetcher, LibreLinkClient};
use serde_json::{Value, json};

pub const TIMESTAMP: &str = "11/18/2024 6:40:12 PM";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoginMode {
    Direct,
    Redirect,
    AlwaysRedirect,
    BadCredentials,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GraphMode {
    Plain,
    Gzip,
    CorruptGzip,
    WithoutMeasurement,
    ServerError,
}

#[derive(Debug, Clone)]
pub struct Behavior {
    pub login: LoginMode,
    pub issue_token: String,
    pub valid_token: String,
    pub user_id: Option<String>,
    pub value: f64,
    pub graph: GraphMode,
    pub patients: Vec<String>,
    /// 令牌无效时返回 HTTP 200 + `{"status":401}`，而不是 HTTP 401
    pub reject_in_body: bool,
    /// 曲线接口挂起，直到测试调用 `release_graph`
    pub hold_graph: bool,
    pub nightscout_status: StatusCode,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            login: LoginMode::Direct,
            issue_token: "T1".into(),
            valid_token: "T1".into(),
            user_id: None,
            value: 110.0,
            graph: GraphMode::Plain,
            patients: vec!["p-1".into()],
            reject_in_body: false,
            hold_graph: false,
            nightscout_status: StatusCode::OK,
        }
    }
}

#[derive(Default)]
pub struct MockVendor {
    pub login_hits: AtomicUsize,
    pub regional_login_hits: AtomicUsize,
    pub connections_hits: AtomicUsize,
    pub graph_hits: AtomicUsize,
    pub behavior: Mutex<Behavior>,
    pub last_account_id: Mutex<Option<String>>,
    /// 收到的 Nightscout 记录：(api-secret 请求头, 请求体)
    pub entries: Mutex<Vec<(Option<String>, Value)>>,
    pub graph_entered: Notify,
    graph_release: Notify,
}

impl MockVendor {
    pub fn update(&self, f: impl FnOnce(&mut Behavior)) {
        let mut behavior = self.behavior.lock().unwrap();
        f(&mut *behavior);
    }

    pub fn hits(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    pub fn release_graph(&self) {
        self.graph_release.notify_one();
    }

    pub fn entries(&self) -> Vec<(Option<String>, Value)> {
        self.entries.lock().unwrap().clone()
    }

    fn behavior(&self) -> Behavior {
        self.behavior.lock().unwrap().clone()
    }
}

type Shared = Arc<MockVendor>;

fn measurement(value: f64) -> Value {
    json!({
        "FactoryTimestamp": "11/18/2024 5:40:12 PM",
        "Timestamp": TIMESTAMP,
        "type": 1,
        "ValueInMgPerDl": value,
        "TrendArrow": 3,
        "MeasurementColor": 1,
        "GlucoseUnits": 1,
        "Value": value,
        "isHigh": false,
        "isLow": false
    })
}

fn ticket(behavior: &Behavior) -> Value {
    let mut data = json!({
        "authTicket": {"token": behavior.issue_token, "expires": 1_900_000_000, "duration": 15_552_000_000u64}
    });
    if let Some(id) = &behavior.user_id {
        data["user"] = json!({"id": id});
    }
    json!({"status": 0, "data": data})
}

fn redirect() -> Value {
    json!({"status": 0, "data": {"redirect": true, "region": "eu"}})
}

async fn login(State(vendor): State<Shared>) -> Json<Value> {
    vendor.login_hits.fetch_add(1, Ordering::SeqCst);
    let behavior = vendor.behavior();
    Json(match behavior.login {
        LoginMode::Direct => ticket(&behavior),
        LoginMode::Redirect | LoginMode::AlwaysRedirect => redirect(),
        LoginMode::BadCredentials => {
            json!({"status": 2, "error": {"message": "notAuthenticated"}})
        }
    })
}

async fn regional_login(State(vendor): State<Shared>) -> Json<Value> {
    vendor.regional_login_hits.fetch_add(1, Ordering::SeqCst);
    let behavior = vendor.behavior();
    Json(match behavior.login {
        LoginMode::AlwaysRedirect => redirect(),
        _ => ticket(&behavior),
    })
}

fn authorize(vendor: &MockVendor, headers: &HeaderMap) -> Result<Behavior, Response> {
    let behavior = vendor.behavior();
    *vendor.last_account_id.lock().unwrap() = headers
        .get("account-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let expected = format!("Bearer {}", behavior.valid_token);
    match headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(behavior),
        _ if behavior.reject_in_body => Err(Json(json!({
            "status": 401,
            "error": {"message": "invalid or expired jwt"}
        }))
        .into_response()),
        _ => Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "invalid or expired jwt"})),
        )
            .into_response()),
    }
}

async fn connections(State(vendor): State<Shared>, headers: HeaderMap) -> Response {
    vendor.connections_hits.fetch_add(1, Ordering::SeqCst);
    let behavior = match authorize(&vendor, &headers) {
        Ok(b) => b,
        Err(response) => return response,
    };
    let data: Vec<Value> = behavior
        .patients
        .iter()
        .map(|id| {
            json!({
                "id": format!("c-{}", id),
                "patientId": id,
                "firstName": "Test",
                "lastName": id,
                "glucoseMeasurement": measurement(behavior.value)
            })
        })
        .collect();
    Json(json!({"status": 0, "data": data})).into_response()
}

async fn graph(
    State(vendor): State<Shared>,
    Path(patient_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    vendor.graph_hits.fetch_add(1, Ordering::SeqCst);
    let behavior = match authorize(&vendor, &headers) {
        Ok(b) => b,
        Err(response) => return response,
    };
    if behavior.hold_graph {
        vendor.graph_entered.notify_one();
        vendor.graph_release.notified().await;
    }

    let mut connection = json!({"patientId": patient_id});
    if behavior.graph != GraphMode::WithoutMeasurement {
        connection["glucoseMeasurement"] = measurement(behavior.value);
    }
    let body = json!({"status": 0, "data": {"connection": connection, "graphData": []}});
    let bytes = serde_json::to_vec(&body).unwrap();

    match behavior.graph {
        GraphMode::Plain | GraphMode::WithoutMeasurement => Json(body).into_response(),
        GraphMode::Gzip => {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&bytes).unwrap();
            gzip_response(encoder.finish().unwrap())
        }
        GraphMode::CorruptGzip => gzip_response(bytes),
        GraphMode::ServerError => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

fn gzip_response(bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::CONTENT_ENCODING, "gzip"),
        ],
        bytes,
    )
        .into_response()
}

async fn nightscout_entries(
    State(vendor): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    let secret = headers
        .get("api-secret")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    vendor.entries.lock().unwrap().push((secret, body));
    vendor.behavior().nightscout_status
}

fn api_routes() -> Router<Shared> {
    Router::new()
        .route("/llu/connections", get(connections))
        .route("/llu/connections/{patient_id}/graph", get(graph))
}

/// 启动模拟服务，返回共享状态和根地址
pub async fn start_vendor(behavior: Behavior) -> (Arc<MockVendor>, String) {
    let vendor = Arc::new(MockVendor {
        behavior: Mutex::new(behavior),
        ..Default::default()
    });

    let app = Router::new()
        .route("/llu/auth/login", post(login))
        .route("/eu/llu/auth/login", post(regional_login))
        .route("/api/v1/entries", post(nightscout_entries))
        .merge(api_routes())
        .nest("/eu", api_routes())
        .with_state(vendor.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (vendor, format!("http://{}", addr))
}

pub fn vendor_config(base_url: &str) -> VendorConfig {
    let mut config = VendorConfig::with_credentials("me@example.com", "secret");
    config.base_url = base_url.to_string();
    config.region_url_template = format!("{}/{{region}}", base_url);
    config.request_timeout_secs = 5;
    config
}

pub fn fetcher(config: VendorConfig) -> (GlucoseFetcher, Arc<GlucoseStore>) {
    let store = Arc::new(GlucoseStore::new());
    let client = LibreLinkClient::new(config).unwrap();
    (GlucoseFetcher::new(client, store.clone()), store)
}
