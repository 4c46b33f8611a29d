//! Gateway configuration from environment.

use muav_client::ClientSettings;
use muav_core::TargetCoverage;
use std::env;
use std::time::Duration;

use crate::encoding::OutputFormat;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub api_token: Option<String>,
    pub server_port: u16,
    pub request_timeout_ms: u64,
    pub debug: bool,
    pub ssl_verify: bool,
    pub output_format: OutputFormat,
    pub strict_target_coverage: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; used by `from_env` and by tests.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            api_url: lookup("MUAV_API_URL")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "https://localhost:4000/api".to_string()),
            api_token: lookup("MUAV_API_TOKEN")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            server_port: lookup("SERVER_PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(3000),
            request_timeout_ms: lookup("REQUEST_TIMEOUT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(5000),
            debug: lookup("DEBUG").map(|s| is_truthy(&s)).unwrap_or(false),
            ssl_verify: lookup("SSL_VERIFY")
                .map(|s| s.trim() != "false")
                .unwrap_or(true),
            output_format: lookup("OUTPUT_FORMAT")
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            strict_target_coverage: lookup("STRICT_TARGET_COVERAGE")
                .map(|s| is_truthy(&s))
                .unwrap_or(false),
        }
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.api_url.clone(),
            token: self.api_token.clone(),
            timeout: Duration::from_millis(self.request_timeout_ms),
            verify_tls: self.ssl_verify,
        }
    }

    pub fn target_coverage(&self) -> TargetCoverage {
        if self.strict_target_coverage {
            TargetCoverage::Strict
        } else {
            TargetCoverage::Advisory
        }
    }

    /// Default log filter when `RUST_LOG` is not set.
    pub fn default_log_filter(&self) -> &'static str {
        if self.debug {
            "muav_gateway=debug,muav_client=debug"
        } else {
            "muav_gateway=info,muav_client=info"
        }
    }

    pub fn log_summary(&self) {
        tracing::info!(
            api_url = %self.api_url,
            api_token = if self.api_token.is_some() { "[CONFIGURED]" } else { "[NOT SET]" },
            server_port = self.server_port,
            request_timeout_ms = self.request_timeout_ms,
            ssl_verify = self.ssl_verify,
            output_format = ?self.output_format,
            strict_target_coverage = self.strict_target_coverage,
            "configuration loaded"
        );
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim(), "true" | "1")
}
