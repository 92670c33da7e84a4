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

/// Process-wide configuration, loaded once at startup.
///
/// The Instagram app credentials and the state-signing secret are required;
/// their absence fails startup rather than a later request.
#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub instagram_client_id: String,
    pub instagram_client_secret: String,
    pub instagram_redirect_uri: String,
    pub state_signing_secret: String,
    pub graph_api_base: String,
    pub oauth_api_base: String,
    pub request_timeout_secs: u64,
    pub max_concurrent_requests: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("instagram_client_id", &self.instagram_client_id)
            .field("instagram_client_secret", &"[redacted]")
            .field("instagram_redirect_uri", &self.instagram_redirect_uri)
            .field("state_signing_secret", &"[redacted]")
            .field("graph_api_base", &self.graph_api_base)
            .field("oauth_api_base", &self.oauth_api_base)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_concurrent_requests", &self.max_concurrent_requests)
            .finish()
    }
}
