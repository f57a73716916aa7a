use std::time::Duration;

use crate::retry::RetryPolicy;

/// Default platform base URL.
const DEFAULT_BASE_URL: &str = "https://developer.api.autodesk.com";

/// Default activity run by every workitem.
const DEFAULT_ACTIVITY_NAME: &str = "RCWMigratorAppActivity";

/// Default activity alias.
const DEFAULT_ACTIVITY_ALIAS: &str = "dev";

/// Outbound platform configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AutomationConfig {
    /// Platform base URL used by the data-management client.
    pub base_url: String,
    /// Root of the workitem API, e.g. `<base>/da/us-east/v3`.
    pub da_endpoint: String,
    /// Owner nickname of the activity.
    pub nickname: String,
    pub activity_name: String,
    pub activity_alias: String,
    /// Public URL of this service's completion webhook.
    pub webhook_url: String,
    /// Service (2-legged) token for workitem calls.
    pub service_token: String,
    /// Timeout for a single outbound request.
    pub request_timeout: Duration,
    /// Retry policy applied to every outbound request.
    pub retry: RetryPolicy,
}

impl AutomationConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                               |
    /// |--------------------------|---------------------------------------|
    /// | `APS_BASE_URL`           | `https://developer.api.autodesk.com`  |
    /// | `DA_ENDPOINT`            | `<APS_BASE_URL>/da/us-east/v3`        |
    /// | `DA_NICKNAME`            | `APS_CLIENT_ID`                       |
    /// | `DA_ACTIVITY_NAME`       | `RCWMigratorAppActivity`              |
    /// | `DA_ACTIVITY_ALIAS`      | `dev`                                 |
    /// | `APS_WEBHOOK_URL`        | `http://localhost:3000/callback/designautomation` |
    /// | `APS_SERVICE_TOKEN`      | empty                                 |
    /// | `REMOTE_TIMEOUT_SECS`    | `30`                                  |
    /// | `RETRY_MAX_ATTEMPTS`     | `4`                                   |
    /// | `RETRY_INITIAL_DELAY_MS` | `500`                                 |
    /// | `RETRY_MAX_DELAY_MS`     | `8000`                                |
    pub fn from_env() -> Self {
        let base_url = env_or("APS_BASE_URL", DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string();
        let da_endpoint = std::env::var("DA_ENDPOINT")
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| format!("{base_url}/da/us-east/v3"));

        let client_id = env_or("APS_CLIENT_ID", "");
        let nickname = std::env::var("DA_NICKNAME").unwrap_or(client_id);

        let request_timeout_secs: u64 = env_or("REMOTE_TIMEOUT_SECS", "30")
            .parse()
            .expect("REMOTE_TIMEOUT_SECS must be a valid u64");

        let defaults = RetryPolicy::default();
        let retry = RetryPolicy {
            max_attempts: env_or("RETRY_MAX_ATTEMPTS", &defaults.max_attempts.to_string())
                .parse()
                .expect("RETRY_MAX_ATTEMPTS must be a valid u32"),
            initial_delay: Duration::from_millis(
                env_or(
                    "RETRY_INITIAL_DELAY_MS",
                    &defaults.initial_delay.as_millis().to_string(),
                )
                .parse()
                .expect("RETRY_INITIAL_DELAY_MS must be a valid u64"),
            ),
            max_delay: Duration::from_millis(
                env_or(
                    "RETRY_MAX_DELAY_MS",
                    &defaults.max_delay.as_millis().to_string(),
                )
                .parse()
                .expect("RETRY_MAX_DELAY_MS must be a valid u64"),
            ),
            ..defaults
        };

        Self {
            base_url,
            da_endpoint,
            nickname,
            activity_name: env_or("DA_ACTIVITY_NAME", DEFAULT_ACTIVITY_NAME),
            activity_alias: env_or("DA_ACTIVITY_ALIAS", DEFAULT_ACTIVITY_ALIAS),
            webhook_url: env_or(
                "APS_WEBHOOK_URL",
                "http://localhost:3000/callback/designautomation",
            ),
            service_token: env_or("APS_SERVICE_TOKEN", ""),
            request_timeout: Duration::from_secs(request_timeout_secs),
            retry,
        }
    }

    /// Fully qualified activity id, `<nickname>.<activity>+<alias>`.
    pub fn activity_id(&self) -> String {
        format!(
            "{}.{}+{}",
            self.nickname, self.activity_name, self.activity_alias
        )
    }

    /// Build the shared HTTP client with the configured timeout.
    pub fn http_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(self.request_timeout)
            .build()
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
