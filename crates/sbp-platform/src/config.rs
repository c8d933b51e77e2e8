use anyhow::{Context, Result};

pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Where the backend REST API lives.
///
/// Built from a single base URL. The REST base always ends in `/api`: it is
/// appended unless the configured value already carries it, so both
/// `http://host:8080` and `http://host:8080/api/` resolve to the same base.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendConfig {
    rest_base: String,
}

impl BackendConfig {
    pub fn new(raw: &str) -> Result<Self> {
        let trimmed = raw.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            anyhow::bail!("backend URL is required");
        }

        let (scheme, rest) = trimmed
            .split_once("://")
            .context("backend URL must include a scheme")?;
        if scheme != "http" && scheme != "https" {
            anyhow::bail!("backend URL scheme must be http or https");
        }
        if rest.is_empty() {
            anyhow::bail!("backend URL must include a host");
        }

        let rest_base = match rest.strip_suffix("/api") {
            Some(host) if !host.is_empty() => trimmed.to_string(),
            _ => format!("{trimmed}/api"),
        };

        Ok(Self { rest_base })
    }

    pub fn rest_base(&self) -> &str {
        &self.rest_base
    }

    /// `<rest-base>/<parts...>` with empty segments and stray slashes dropped.
    pub fn endpoint<'a>(&self, parts: impl IntoIterator<Item = &'a str>) -> String {
        let path = join_path(parts);
        if path.is_empty() {
            self.rest_base.clone()
        } else {
            format!("{}/{}", self.rest_base, path)
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            rest_base: format!("{DEFAULT_API_URL}/api"),
        }
    }
}

pub fn join_path<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .map(|part| part.trim_matches('/'))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub backend: BackendConfig,
    pub http_addr: String,
}

impl ServiceConfig {
    pub fn from_env(default_http_addr: &str) -> Result<Self> {
        let api_url = std::env::var("API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let backend = BackendConfig::new(&api_url).context("API_URL is invalid")?;
        let http_addr =
            std::env::var("HTTP_ADDR").unwrap_or_else(|_| default_http_addr.to_string());

        Ok(Self { backend, http_addr })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_api_prefix_when_missing() {
        let config = BackendConfig::new("http://localhost:8080").unwrap();
        assert_eq!(config.rest_base(), "http://localhost:8080/api");
    }

    #[test]
    fn keeps_existing_api_prefix_and_ignores_trailing_slashes() {
        let config = BackendConfig::new("https://erp.example.com/api///").unwrap();
        assert_eq!(config.rest_base(), "https://erp.example.com/api");
    }

    #[test]
    fn host_named_api_is_not_mistaken_for_the_prefix() {
        let config = BackendConfig::new("http://api").unwrap();
        assert_eq!(config.rest_base(), "http://api/api");
    }

    #[test]
    fn rejects_values_without_scheme_or_host() {
        assert!(BackendConfig::new("").is_err());
        assert!(BackendConfig::new("localhost:8080").is_err());
        assert!(BackendConfig::new("ftp://files").is_err());
        assert!(BackendConfig::new("http://").is_err());
    }

    #[test]
    fn endpoint_collapses_slashes() {
        let config = BackendConfig::default();
        assert_eq!(
            config.endpoint(["/masterpegawai/", "", "12/"]),
            "http://localhost:8080/api/masterpegawai/12"
        );
        assert_eq!(config.endpoint([]), "http://localhost:8080/api");
    }
}
