use serde::{Deserialize, Serialize};
use ts_rs::TS;

pub mod contact;
pub mod validation;

pub use contact::{
    Contact, ContactsResponse, CreateContactRequest, MessageResponse, NewContact,
    PaginationMeta, UpdateContactRequest, DEFAULT_LIMIT, DEFAULT_PAGE,
};
pub use validation::{FieldError, ValidationErrors};

/// Error response for API endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}
