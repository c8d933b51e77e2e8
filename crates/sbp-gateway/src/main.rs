use std::net::SocketAddr;

use anyhow::Result as AnyResult;
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
    routing::{MethodFilter, get, on},
};
use sbp_platform::{BackendClient, ProxiedResponse, ProxyRequest, ServiceConfig};
use serde_json::json;
use tracing::{error, info};

const UPSTREAM_UNAVAILABLE: &str = "Backend service is unavailable.";

/// Browser-facing prefixes under `/api` and the methods each one forwards.
const PROXY_ROUTES: [(&str, MethodFilter); 4] = [
    (
        "masterpegawai",
        MethodFilter::GET
            .or(MethodFilter::POST)
            .or(MethodFilter::PUT)
            .or(MethodFilter::DELETE),
    ),
    ("auth", MethodFilter::POST),
    ("product", MethodFilter::GET),
    ("stock-movements", MethodFilter::POST),
];

#[derive(Clone)]
struct ProxyRoute {
    backend: BackendClient,
    prefix: &'static str,
}

impl ProxyRoute {
    /// Path segments after `/api/<prefix>`, still percent-encoded.
    fn suffix_of(&self, path: &str) -> Vec<String> {
        let mount = format!("/api/{}", self.prefix);
        path.strip_prefix(mount.as_str())
            .unwrap_or_default()
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[tokio::main]
async fn main() -> AnyResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "sbp_gateway=info,sbp_platform=info".to_string()),
        )
        .init();

    let config = ServiceConfig::from_env("0.0.0.0:3000")?;
    info!("forwarding /api to {}", config.backend.rest_base());
    let router = build_router(BackendClient::new(config.backend.clone()));

    let addr: SocketAddr = config.http_addr.parse()?;
    info!("gateway listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

fn build_router(backend: BackendClient) -> Router {
    PROXY_ROUTES.into_iter().fold(
        Router::new().route("/healthz", get(healthz)),
        |router, (prefix, methods)| {
            let route = ProxyRoute {
                backend: backend.clone(),
                prefix,
            };
            let proxied = Router::new()
                .route(&format!("/api/{prefix}"), on(methods, forward))
                .route(&format!("/api/{prefix}/{{*rest}}"), on(methods, forward))
                .with_state(route);
            router.merge(proxied)
        },
    )
}

async fn healthz() -> &'static str {
    "ok"
}

async fn forward(
    State(route): State<ProxyRoute>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };

    let request = ProxyRequest {
        method,
        suffix: route.suffix_of(uri.path()),
        query: uri.query().map(str::to_string),
        content_type: header_value(header::CONTENT_TYPE),
        authorization: header_value(header::AUTHORIZATION),
        body: body.to_vec(),
    };

    match route.backend.forward(route.prefix, request).await {
        Ok(response) => mirror(response),
        Err(err) => {
            error!(prefix = route.prefix, "proxy request failed: {err}");
            (
                StatusCode::BAD_GATEWAY,
                [(header::CACHE_CONTROL, "no-store")],
                Json(json!({ "message": UPSTREAM_UNAVAILABLE })),
            )
                .into_response()
        }
    }
}

fn mirror(response: ProxiedResponse) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::BAD_GATEWAY);
    (
        status,
        [
            (header::CONTENT_TYPE, response.content_type),
            (header::CACHE_CONTROL, "no-store".to_string()),
        ],
        response.body,
    )
        .into_response()
}
