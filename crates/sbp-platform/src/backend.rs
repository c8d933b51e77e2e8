use async_trait::async_trait;
use reqwest::{Response, Url};
use sbp_core::{
    BackendError, Product, ProductCatalog, SearchOutcome, StockInBatch, StockInGateway,
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::BackendConfig;
use crate::contracts::{
    LoginRequest, LoginResponse, MessageResponse, ProductSearchQuery, RegisterRequest,
};

/// JSON client for the backend REST API.
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    config: BackendConfig,
}

impl BackendClient {
    pub fn new(config: BackendConfig) -> Self {
        Self::with_http(reqwest::Client::new(), config)
    }

    pub fn with_http(http: reqwest::Client, config: BackendConfig) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// `GET /product/search?q=&limit=`, prefix match on code or name.
    pub async fn search_products(
        &self,
        term: &str,
        limit: u32,
    ) -> Result<Vec<Product>, BackendError> {
        let url = self.config.endpoint(["product", "search"]);
        let query = ProductSearchQuery {
            q: term.to_string(),
            limit,
        };
        debug!(term, limit, "searching products");

        let response = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(transport)?;
        let response = ensure_success(response).await?;

        response.json::<Vec<Product>>().await.map_err(decode)
    }

    /// `GET /product/by-kode/{code}`. Any 4xx means the code is unknown.
    pub async fn product_by_code(&self, code: &str) -> Result<Option<Product>, BackendError> {
        let code = code.trim();
        if code.is_empty() {
            return Ok(None);
        }

        let mut url = Url::parse(&self.config.endpoint(["product", "by-kode"]))
            .map_err(|err| BackendError::Transport(err.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| BackendError::Transport("backend URL cannot carry a path".to_string()))?
            .push(code);

        let response = self.http.get(url).send().await.map_err(transport)?;
        if response.status().is_client_error() {
            debug!(code, status = %response.status(), "product code not found");
            return Ok(None);
        }
        let response = ensure_success(response).await?;

        response.json::<Product>().await.map(Some).map_err(decode)
    }

    pub async fn batch_stock_in(&self, batch: &StockInBatch) -> Result<(), BackendError> {
        let url = self.config.endpoint(["stock-movements", "batch-in"]);
        let response = self
            .http
            .post(&url)
            .json(batch)
            .send()
            .await
            .map_err(transport)?;

        match ensure_success(response).await {
            Ok(_) => {
                info!(
                    lokasi = %batch.lokasi,
                    items = batch.items.len(),
                    "batch stock-in accepted"
                );
                Ok(())
            }
            Err(err) => {
                warn!("batch stock-in rejected: {err}");
                Err(err)
            }
        }
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, BackendError> {
        self.post_json(["auth", "login"], request).await
    }

    pub async fn register(
        &self,
        request: &RegisterRequest,
    ) -> Result<MessageResponse, BackendError> {
        self.post_json(["auth", "register"], request).await
    }

    async fn post_json<'a, B, T>(
        &self,
        path: impl IntoIterator<Item = &'a str>,
        body: &B,
    ) -> Result<T, BackendError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.config.endpoint(path);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(transport)?;
        let response = ensure_success(response).await?;

        response.json::<T>().await.map_err(decode)
    }
}

#[async_trait]
impl ProductCatalog for BackendClient {
    async fn search(&self, term: &str, limit: u32) -> Result<SearchOutcome, BackendError> {
        self.search_products(term, limit)
            .await
            .map(SearchOutcome::from_candidates)
    }

    async fn lookup_exact(&self, code: &str) -> Result<Option<Product>, BackendError> {
        self.product_by_code(code).await
    }
}

#[async_trait]
impl StockInGateway for BackendClient {
    async fn submit_batch(&self, batch: &StockInBatch) -> Result<(), BackendError> {
        self.batch_stock_in(batch).await
    }
}

/// Pulls a human readable message out of an error body: the JSON `message`
/// field when the body is JSON, otherwise the raw text.
pub fn extract_error_message(body: &str) -> Option<String> {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => value
            .get("message")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|message| !message.is_empty())
            .map(str::to_string),
        Err(_) => {
            let text = body.trim();
            (!text.is_empty()).then(|| text.to_string())
        }
    }
}

async fn ensure_success(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(BackendError::Rejected {
        status: status.as_u16(),
        message: extract_error_message(&body),
    })
}

pub(crate) fn transport(err: reqwest::Error) -> BackendError {
    BackendError::Transport(err.to_string())
}

fn decode(err: reqwest::Error) -> BackendError {
    BackendError::Decode(err.to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::{
        Json, Router,
        extract::{Path, Query},
        http::StatusCode,
        routing::{get, post},
    };
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use sbp_core::{IntakeType, StockInItem};
    use serde_json::json;

    use super::*;

    fn product_json(id: i64, kode: &str) -> Value {
        json!({
            "id": id,
            "kode": kode,
            "nama": format!("Produk {kode}"),
            "brand": "Sika",
            "kategori": "Material",
            "satuan": "kg",
            "harga_idr": 10000
        })
    }

    async fn search(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
        let term = params.get("q").cloned().unwrap_or_default();
        let limit: usize = params
            .get("limit")
            .and_then(|limit| limit.parse().ok())
            .unwrap_or(50);
        if term.starts_with("RESIN") {
            return Json(json!([]));
        }

        let items: Vec<Value> = (1..=3)
            .map(|id| product_json(id, &format!("{term}-{id}")))
            .take(limit)
            .collect();
        Json(Value::Array(items))
    }

    async fn by_kode(Path(kode): Path<String>) -> (StatusCode, Json<Value>) {
        match kode.as_str() {
            "PRD 001" => (StatusCode::OK, Json(product_json(1, "PRD 001"))),
            "BOOM" => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Database error: timeout" })),
            ),
            _ => (
                StatusCode::NOT_FOUND,
                Json(json!({ "message": format!("Product dengan kode {kode} tidak ditemukan") })),
            ),
        }
    }

    async fn batch_in(Json(body): Json<Value>) -> (StatusCode, String) {
        match body["lokasi"].as_str() {
            Some("Gudang X") => (
                StatusCode::BAD_REQUEST,
                json!({ "message": "Lokasi tidak dikenal" }).to_string(),
            ),
            Some("Gudang Z") => (StatusCode::BAD_GATEWAY, String::new()),
            _ => (StatusCode::OK, json!({ "message": "ok" }).to_string()),
        }
    }

    async fn login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        if body["password"] == "rahasia" {
            (
                StatusCode::OK,
                Json(json!({
                    "token": "jwt-token",
                    "user": { "id": 3, "nama_lengkap": "Siti", "email": body["email"] }
                })),
            )
        } else {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "message": "Unauthorized" })),
            )
        }
    }

    async fn start_backend() -> BackendClient {
        let app = Router::new()
            .route("/api/product/search", get(search))
            .route("/api/product/by-kode/{kode}", get(by_kode))
            .route("/api/stock-movements/batch-in", post(batch_in))
            .route("/api/auth/login", post(login));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        BackendClient::new(BackendConfig::new(&format!("http://{addr}")).unwrap())
    }

    fn batch(lokasi: &str) -> StockInBatch {
        StockInBatch {
            tanggal: NaiveDate::from_ymd_opt(2024, 5, 17).unwrap(),
            lokasi: lokasi.to_string(),
            jenis_pemasukan: IntakeType::PembelianPo,
            items: vec![StockInItem {
                product_id: 1,
                product_kode: "PRD-1".to_string(),
                qty: Decimal::new(2, 0),
                satuan: "kg".to_string(),
            }],
        }
    }

    #[test]
    fn error_message_prefers_json_field_then_text() {
        assert_eq!(
            extract_error_message(r#"{"message":"Email sudah terdaftar"}"#).as_deref(),
            Some("Email sudah terdaftar")
        );
        assert_eq!(extract_error_message(r#"{"error":"x"}"#), None);
        assert_eq!(
            extract_error_message("upstream exploded").as_deref(),
            Some("upstream exploded")
        );
        assert_eq!(extract_error_message("   "), None);
    }

    #[tokio::test]
    async fn search_reports_not_found_softly() {
        let client = start_backend().await;

        let outcome = client.search("RESIN", 50).await.unwrap();
        assert_eq!(outcome, SearchOutcome::NotFound);

        let outcome = client.search("PRD", 2).await.unwrap();
        let candidates = outcome.into_candidates();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].kode, "PRD-1");
    }

    #[tokio::test]
    async fn exact_lookup_encodes_code_and_maps_404_to_none() {
        let client = start_backend().await;

        let product = client.lookup_exact("PRD 001").await.unwrap();
        assert_eq!(product.map(|product| product.id), Some(1));

        assert_eq!(client.lookup_exact("NOPE").await.unwrap(), None);
        assert_eq!(client.lookup_exact("   ").await.unwrap(), None);

        let err = client.lookup_exact("BOOM").await.unwrap_err();
        assert_eq!(err.server_message(), Some("Database error: timeout"));
    }

    #[tokio::test]
    async fn batch_rejection_carries_server_message() {
        let client = start_backend().await;

        client.submit_batch(&batch("Gudang A (Utama)")).await.unwrap();

        let err = client.submit_batch(&batch("Gudang X")).await.unwrap_err();
        assert_eq!(
            err,
            BackendError::Rejected {
                status: 400,
                message: Some("Lokasi tidak dikenal".to_string()),
            }
        );

        let err = client.submit_batch(&batch("Gudang Z")).await.unwrap_err();
        assert_eq!(err.server_message(), None);
    }

    #[tokio::test]
    async fn login_returns_token_or_server_message() {
        let client = start_backend().await;

        let response = client
            .login(&LoginRequest {
                email: "siti@example.com".to_string(),
                password: "rahasia".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(response.token, "jwt-token");
        assert_eq!(response.user.map(|user| user.id), Some(3));

        let err = client
            .login(&LoginRequest {
                email: "siti@example.com".to_string(),
                password: "salah".to_string(),
            })
            .await
            .unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(err.server_message(), Some("Unauthorized"));
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = BackendClient::new(BackendConfig::new(&format!("http://{addr}")).unwrap());
        let err = client.search("PRD", 10).await.unwrap_err();
        assert!(matches!(err, BackendError::Transport(_)));
    }
}
