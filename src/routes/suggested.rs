use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{ErrorEnvelope, SuggestedResponse},
    routes::AppState,
};

pub const DEFAULT_K: usize = 5;
pub const MAX_K: usize = 20;

/// Raw query parameters; validated by [`SuggestedQuery::validate`]
#[derive(Debug, Deserialize)]
pub struct SuggestedQuery {
    pub user_id: Option<String>,
    pub k: Option<String>,
}

impl SuggestedQuery {
    /// Returns the user id as sent and `k` in `1..=MAX_K`
    ///
    /// A user id that is empty or all whitespace is rejected.
    pub fn validate(self) -> AppResult<(String, usize)> {
        let user_id = self
            .user_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| AppError::InvalidInput("user_id is required".to_string()))?;

        let k = match self.k {
            None => DEFAULT_K,
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|k| (1..=MAX_K).contains(k))
                .ok_or_else(|| {
                    AppError::InvalidInput(format!(
                        "k must be an integer between 1 and {}, got '{}'",
                        MAX_K, raw
                    ))
                })?,
        };

        Ok((user_id, k))
    }
}

/// Handler for the suggestions endpoint
///
/// Malformed query strings and validation failures are rejected before the
/// pipeline runs. Pipeline failures are reported in the error envelope
/// together with the user id.
pub async fn suggested(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    query: Result<Query<SuggestedQuery>, QueryRejection>,
) -> AppResult<Response> {
    let Query(params) =
        query.map_err(|rejection| AppError::InvalidInput(rejection.body_text()))?;
    let (user_id, k) = params.validate()?;

    tracing::info!(
        request_id = %request_id,
        user_id = %user_id,
        k,
        "Processing suggestion request"
    );

    match state.recommendations.suggest(&user_id, k).await {
        Ok(recommendations) => {
            tracing::info!(
                request_id = %request_id,
                count = recommendations.len(),
                "Suggestions completed"
            );
            Ok(Json(SuggestedResponse::new(user_id, recommendations)).into_response())
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Suggestion pipeline failed");
            let body = ErrorEnvelope::new(e.client_message(), Some(user_id));
            Ok((e.status_code(), Json(body)).into_response())
        }
    }
}
