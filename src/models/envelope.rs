use serde::Serialize;

use super::Experience;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// Body of a successful `/suggested` response
#[derive(Debug, Serialize)]
pub struct SuggestedResponse {
    pub status: ResponseStatus,
    pub user_id: String,
    pub count: usize,
    pub recommendations: Vec<Experience>,
}

impl SuggestedResponse {
    pub fn new(user_id: String, recommendations: Vec<Experience>) -> Self {
        Self {
            status: ResponseStatus::Success,
            user_id,
            count: recommendations.len(),
            recommendations,
        }
    }
}

/// Uniform failure body shared by validation and pipeline errors
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub status: ResponseStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl ErrorEnvelope {
    pub fn new(message: String, user_id: Option<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            message,
            user_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}
