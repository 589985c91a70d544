use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Process-wide configuration, built once at startup and treated as
/// read-only thereafter. Components receive it explicitly rather than
/// reading the environment ambiently.
#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// ScraperAPI-style proxy-fetch key. Absence disables the proxy
    /// strategy without error.
    pub scraper_api_key: Option<String>,
    /// Base URL of the proxy-fetch service; overridable for tests.
    pub proxy_base_url: String,
    /// Per-attempt timeout for each retrieval strategy.
    pub fetch_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Timeout for each hop of short-link redirect resolution.
    pub resolve_timeout_secs: u64,
    /// Redirect hop budget for short-link resolution.
    pub resolve_max_hops: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field(
                "scraper_api_key",
                &self.scraper_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("proxy_base_url", &self.proxy_base_url)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("resolve_timeout_secs", &self.resolve_timeout_secs)
            .field("resolve_max_hops", &self.resolve_max_hops)
            .finish()
    }
}
