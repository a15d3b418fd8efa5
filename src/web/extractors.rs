use crate::models::UserSummary;
use crate::services::api_token;
use crate::web::error::ApiError;
use crate::web::state::AppState;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Caller identity resolved from an `Authorization: Bearer <token>` header.
///
/// Handlers that take this extractor first never run for requests without an
/// active token; those are answered with 401.
#[derive(Debug, Clone)]
pub struct ApiTokenAuth(pub UserSummary);

impl FromRequestParts<Arc<AppState>> for ApiTokenAuth {
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        state: &'life1 Arc<AppState>,
    ) -> Pin<Box<dyn Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>>
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        let state = state.clone();
        let bearer = parts
            .headers
            .typed_get::<Authorization<Bearer>>()
            .map(|auth| auth.token().to_string());
        Box::pin(async move {
            let token = bearer.ok_or(ApiError::Unauthorized)?;

            let user = api_token::validate_token(&state.db, &token)?.ok_or_else(|| {
                tracing::debug!("Rejected unknown or inactive API token");
                ApiError::Unauthorized
            })?;

            Ok(ApiTokenAuth(UserSummary::from(&user)))
        })
    }
}
