/// Vox API configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the HTTP server binds to.
    pub port: u16,
    /// Browser origin allowed by CORS. Unset allows any origin.
    pub frontend_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            frontend_url: std::env::var("FRONTEND_URL").ok().filter(|s| !s.is_empty()),
        }
    }
}
