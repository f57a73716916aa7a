//! Bearer credential extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use upgrader_automation::Credentials;

use crate::error::AppError;

/// The caller's access token taken from the `Authorization` header.
///
/// The token is not validated here; it is forwarded to the platform, which
/// rejects it if it is invalid or expired.
///
/// ```ignore
/// async fn my_handler(UserCredentials(credentials): UserCredentials) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct UserCredentials(pub Credentials);

impl<S: Send + Sync> FromRequestParts<S> for UserCredentials {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                AppError::Unauthorized(
                    "Invalid Authorization format. Expected: Bearer <token>".into(),
                )
            })?;

        Ok(UserCredentials(Credentials::new(token)))
    }
}
