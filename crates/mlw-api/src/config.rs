use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_DATABASE_URL: &str = "sqlite://mlw.db?mode=rwc";
const DEFAULT_MEDIA_ROOT: &str = "./media";
const DEFAULT_PAGE_SIZE: u32 = 20;
const DEFAULT_MAX_PAGE_SIZE: u32 = 100;

/// Process configuration, read from `MLW_*` environment variables.
#[derive(Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub media_root: PathBuf,
    pub jwt_secret: String,
    pub jwt_issuer: Option<String>,
    pub page_size: u32,
    pub max_page_size: u32,
}

impl ServerConfig {
    pub fn from_env() -> eyre::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset or empty values fall back
    /// to defaults; `MLW_JWT_SECRET` has none.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> eyre::Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = get("MLW_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| eyre::eyre!("invalid MLW_BIND_ADDR: {e}"))?;

        let jwt_secret =
            get("MLW_JWT_SECRET").ok_or_else(|| eyre::eyre!("MLW_JWT_SECRET must be set"))?;

        let page_size = parse_page_size(get("MLW_PAGE_SIZE"), "MLW_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        let max_page_size = parse_page_size(
            get("MLW_MAX_PAGE_SIZE"),
            "MLW_MAX_PAGE_SIZE",
            DEFAULT_MAX_PAGE_SIZE,
        )?;
        if page_size > max_page_size {
            return Err(eyre::eyre!(
                "MLW_PAGE_SIZE ({page_size}) exceeds MLW_MAX_PAGE_SIZE ({max_page_size})"
            ));
        }

        Ok(Self {
            bind_addr,
            database_url: get("MLW_DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            media_root: PathBuf::from(
                get("MLW_MEDIA_ROOT").unwrap_or_else(|| DEFAULT_MEDIA_ROOT.to_string()),
            ),
            jwt_secret,
            jwt_issuer: get("MLW_JWT_ISSUER"),
            page_size,
            max_page_size,
        })
    }
}

fn parse_page_size(raw: Option<String>, key: &str, default: u32) -> eyre::Result<u32> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().parse::<u32>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(eyre::eyre!("{key} must be a positive integer, got {raw:?}")),
    }
}

// Keeps the signing secret out of logs.
impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("bind_addr", &self.bind_addr)
            .field("database_url", &self.database_url)
            .field("media_root", &self.media_root)
            .field("jwt_secret", &redact_secret(&self.jwt_secret))
            .field("jwt_issuer", &self.jwt_issuer)
            .field("page_size", &self.page_size)
            .field("max_page_size", &self.max_page_size)
            .finish()
    }
}

fn redact_secret(secret: &str) -> String {
    format!("<{} bytes>", secret.len())
}
