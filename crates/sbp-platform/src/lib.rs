pub mod backend;
pub mod config;
pub mod contracts;
pub mod proxy;

pub use backend::{BackendClient, extract_error_message};
pub use config::{BackendConfig, DEFAULT_API_URL, ServiceConfig, join_path};
pub use contracts::{
    AuthUser, LoginRequest, LoginResponse, MessageResponse, ProductSearchQuery, RegisterRequest,
};
pub use proxy::{ProxiedResponse, ProxyRequest, upstream_url};
