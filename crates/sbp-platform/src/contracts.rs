use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSearchQuery {
    pub q: String,
    pub limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
    pub nama_lengkap: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user: Option<AuthUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub nama_lengkap: String,
    pub email: String,
    pub no_hp: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<()> {
        if self.nama_lengkap.trim().is_empty() {
            anyhow::bail!("nama_lengkap is required");
        }
        if self.email.trim().is_empty() {
            anyhow::bail!("email is required");
        }
        if self.no_hp.trim().is_empty() {
            anyhow::bail!("no_hp is required");
        }
        if self.password.is_empty() {
            anyhow::bail!("password is required");
        }
        if self.password != self.confirm_password {
            anyhow::bail!("confirm_password does not match password");
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
