use reqwest::Method;
use reqwest::header::{ACCEPT, AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE};
use sbp_core::BackendError;
use tracing::{debug, error};

use crate::backend::{BackendClient, transport};
use crate::config::BackendConfig;

const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// An inbound browser request, reduced to what gets forwarded upstream.
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub method: Method,
    pub suffix: Vec<String>,
    pub query: Option<String>,
    pub content_type: Option<String>,
    pub authorization: Option<String>,
    pub body: Vec<u8>,
}

impl ProxyRequest {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            suffix: Vec::new(),
            query: None,
            content_type: None,
            authorization: None,
            body: Vec::new(),
        }
    }

    fn carries_body(&self) -> bool {
        self.method != Method::GET && self.method != Method::HEAD
    }
}

/// Upstream answer, mirrored back to the browser as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxiedResponse {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
}

/// `<rest-base>/<prefix>/<suffix...>?<query>`, with the query copied verbatim.
pub fn upstream_url(
    config: &BackendConfig,
    prefix: &str,
    suffix: &[String],
    query: Option<&str>,
) -> String {
    let parts = std::iter::once(prefix).chain(suffix.iter().map(String::as_str));
    let url = config.endpoint(parts);

    match query.filter(|query| !query.is_empty()) {
        Some(query) => format!("{url}?{query}"),
        None => url,
    }
}

impl BackendClient {
    /// Forwards one request under `prefix`. Non-2xx statuses are not errors
    /// here; only a failed exchange is.
    pub async fn forward(
        &self,
        prefix: &str,
        request: ProxyRequest,
    ) -> Result<ProxiedResponse, BackendError> {
        let url = upstream_url(
            self.config(),
            prefix,
            &request.suffix,
            request.query.as_deref(),
        );
        debug!(method = %request.method, %url, "forwarding request");

        let carries_body = request.carries_body();
        let mut builder = self
            .http()
            .request(request.method.clone(), &url)
            .header(ACCEPT, DEFAULT_CONTENT_TYPE)
            .header(CACHE_CONTROL, "no-store");

        if let Some(authorization) = request.authorization {
            builder = builder.header(AUTHORIZATION, authorization);
        }
        if carries_body {
            if let Some(content_type) = request.content_type {
                builder = builder.header(CONTENT_TYPE, content_type);
            }
            builder = builder.body(request.body);
        }

        let response = builder.send().await.map_err(|err| {
            error!(%url, "upstream request failed: {err}");
            transport(err)
        })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let body = response.bytes().await.map_err(transport)?.to_vec();

        Ok(ProxiedResponse {
            status,
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::Bytes,
        http::{HeaderMap, Method as AxumMethod, StatusCode, Uri},
    };
    use serde_json::{Value, json};

    use super::*;

    async fn echo(
        method: AxumMethod,
        uri: Uri,
        headers: HeaderMap,
        body: Bytes,
    ) -> (StatusCode, String) {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };
        let status = if uri.path().ends_with("/missing") {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::OK
        };

        let payload = json!({
            "method": method.as_str(),
            "path": uri.path(),
            "query": uri.query(),
            "content_type": header("content-type"),
            "authorization": header("authorization"),
            "body": String::from_utf8_lossy(&body),
        });
        (status, payload.to_string())
    }

    async fn start_upstream() -> BackendClient {
        let app = Router::new().fallback(echo);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        BackendClient::new(BackendConfig::new(&format!("http://{addr}/api")).unwrap())
    }

    fn echoed(response: &ProxiedResponse) -> Value {
        serde_json::from_slice(&response.body).unwrap()
    }

    #[test]
    fn upstream_url_joins_prefix_suffix_and_query() {
        let config = BackendConfig::new("http://backend:8080").unwrap();
        let suffix = vec!["12".to_string(), "/kontrak/".to_string()];

        assert_eq!(
            upstream_url(&config, "masterpegawai", &suffix, Some("page=2&q=budi")),
            "http://backend:8080/api/masterpegawai/12/kontrak?page=2&q=budi"
        );
        assert_eq!(
            upstream_url(&config, "masterpegawai", &[], Some("")),
            "http://backend:8080/api/masterpegawai"
        );
    }

    #[tokio::test]
    async fn get_forwards_query_but_not_body() {
        let client = start_upstream().await;
        let mut request = ProxyRequest::new(Method::GET);
        request.query = Some("page=1&limit=10&status=aktif".to_string());
        request.content_type = Some("text/plain".to_string());
        request.body = b"ignored".to_vec();

        let response = client.forward("masterpegawai", request).await.unwrap();
        let echoed = echoed(&response);

        assert_eq!(response.status, 200);
        assert_eq!(echoed["path"], "/api/masterpegawai");
        assert_eq!(echoed["query"], "page=1&limit=10&status=aktif");
        assert_eq!(echoed["body"], "");
        assert_eq!(echoed["content_type"], Value::Null);
    }

    #[tokio::test]
    async fn put_forwards_body_content_type_and_authorization() {
        let client = start_upstream().await;
        let mut request = ProxyRequest::new(Method::PUT);
        request.suffix = vec!["42".to_string()];
        request.content_type = Some("application/json".to_string());
        request.authorization = Some("Bearer abc".to_string());
        request.body = br#"{"nama":"Budi"}"#.to_vec();

        let response = client.forward("masterpegawai", request).await.unwrap();
        let echoed = echoed(&response);

        assert_eq!(echoed["method"], "PUT");
        assert_eq!(echoed["path"], "/api/masterpegawai/42");
        assert_eq!(echoed["content_type"], "application/json");
        assert_eq!(echoed["authorization"], "Bearer abc");
        assert_eq!(echoed["body"], r#"{"nama":"Budi"}"#);
    }

    #[tokio::test]
    async fn upstream_status_and_content_type_pass_through() {
        let client = start_upstream().await;
        let mut request = ProxyRequest::new(Method::DELETE);
        request.suffix = vec!["missing".to_string()];

        let response = client.forward("masterpegawai", request).await.unwrap();

        assert_eq!(response.status, 404);
        assert!(response.content_type.starts_with("text/plain"));
    }
}
