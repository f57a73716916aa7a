use upgrader_automation::AutomationConfig;

/// The one version type the conversion activity accepts.
pub const DEFAULT_SUPPORTED_VERSION_TYPE: &str = "versions:autodesk.bim360:C4RModel";

/// Per-deployment values baked into every submitted workitem.
#[derive(Debug, Clone)]
pub struct UpgradeSettings {
    /// Fully qualified activity id.
    pub activity_id: String,
    /// Public URL of the completion webhook.
    pub callback_url: String,
    /// Declared version type a source model must have.
    pub supported_version_type: String,
}

impl UpgradeSettings {
    /// Derive settings from the automation configuration.
    ///
    /// `SUPPORTED_VERSION_TYPE` overrides the accepted version type.
    pub fn from_automation(config: &AutomationConfig) -> Self {
        Self {
            activity_id: config.activity_id(),
            callback_url: config.webhook_url.clone(),
            supported_version_type: std::env::var("SUPPORTED_VERSION_TYPE")
                .unwrap_or_else(|_| DEFAULT_SUPPORTED_VERSION_TYPE.to_string()),
        }
    }
}
