//! API request and response types

use crate::catalog::SupplierQuote;
use serde::{Deserialize, Serialize};

/// Request to send a chat message
#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Bot reply to one chat message
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    /// The user closed the conversation; the next message starts over
    pub ended: bool,
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
pub struct MaterialsQuery {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SuppliersQuery {
    pub material: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct MaterialsResponse {
    pub materials: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SuppliersResponse {
    pub results: Vec<SupplierQuote>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
