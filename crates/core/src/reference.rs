//! Parsing of Data Management style resource references.
//!
//! References look like `projects/<project>/items/<item>` or
//! `projects/<project>/folders/<folder>`. The `projects/<project>/` prefix
//! is optional; only the trailing `<kind>/<id>` pair is mandatory.

use serde::Serialize;

use crate::error::CoreError;

/// Resource kind expected for the model being upgraded.
pub const KIND_ITEMS: &str = "items";

/// Resource kind expected for the upgrade destination.
pub const KIND_FOLDERS: &str = "folders";

/// A parsed `[<project>/]<kind>/<id>` reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceRef {
    /// Owning project (container) id, when the reference carries one.
    pub project_id: Option<String>,
    pub kind: String,
    pub id: String,
}

impl ResourceRef {
    /// Parse `raw` and require its kind to equal `expected_kind`.
    pub fn parse(raw: &str, expected_kind: &str) -> Result<Self, CoreError> {
        let raw = raw.trim().trim_matches('/');
        if raw.is_empty() {
            return Err(CoreError::Validation(format!(
                "{expected_kind} reference must not be empty"
            )));
        }

        let segments: Vec<&str> = raw.split('/').collect();
        if segments.len() < 2 {
            return Err(CoreError::Validation(format!(
                "'{raw}' is not a <kind>/<id> reference"
            )));
        }

        let id = segments[segments.len() - 1];
        let kind = segments[segments.len() - 2];
        if kind != expected_kind {
            return Err(CoreError::Validation(format!(
                "expected a '{expected_kind}' reference, got '{kind}'"
            )));
        }
        if id.is_empty() {
            return Err(CoreError::Validation(format!("'{raw}' has an empty id")));
        }

        let project_id = segments
            .len()
            .checked_sub(3)
            .map(|i| segments[i])
            .filter(|p| !p.is_empty())
            .map(str::to_string);

        Ok(Self {
            project_id,
            kind: kind.to_string(),
            id: id.to_string(),
        })
    }

    /// Parse a source model reference (`items`).
    pub fn item(raw: &str) -> Result<Self, CoreError> {
        Self::parse(raw, KIND_ITEMS)
    }

    /// Parse a destination folder reference (`folders`).
    pub fn folder(raw: &str) -> Result<Self, CoreError> {
        Self::parse(raw, KIND_FOLDERS)
    }
}

/// Strip the `b.` style prefix from a hub or project id.
///
/// `b.1234-abcd` becomes `1234-abcd`; ids without a dot are returned as-is.
pub fn strip_id_prefix(id: &str) -> &str {
    id.split_once('.').map(|(_, guid)| guid).unwrap_or(id)
}
