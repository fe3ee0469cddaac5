/// Application configuration resolved from environment variables.
///
/// Every field has a default, so a bare environment yields a working
/// configuration pointed at the production reporting API.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the store-status query API.
    pub api_base_url: String,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Per-request timeout for geo queries.
    pub request_timeout_secs: u64,
    /// Periodic staleness-check period for a map session.
    pub tick_secs: u64,
    /// Age at which displayed data is considered stale and re-fetched even
    /// without movement.
    pub staleness_secs: u64,
}
