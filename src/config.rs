//! Runner endpoint configuration.

/// Where the external runner's control endpoint lives.
#[derive(Clone, Debug)]
pub struct RunnerConfig {
    pub endpoint: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            endpoint: Self::resolve_endpoint(None),
        }
    }
}

impl RunnerConfig {
    pub const DEFAULT_ENDPOINT: &'static str = "ws://127.0.0.1:8000/ws";

    #[must_use]
    pub fn new(endpoint: Option<String>) -> Self {
        Self {
            endpoint: Self::resolve_endpoint(endpoint),
        }
    }

    fn resolve_endpoint(provided: Option<String>) -> String {
        if let Some(endpoint) = provided {
            return endpoint;
        }
        dotenvy::dotenv().ok();
        std::env::var("TASKWEAVE_RUNNER_URL")
            .unwrap_or_else(|_| Self::DEFAULT_ENDPOINT.to_string())
    }
}
