use serde::{Deserialize, Serialize};
use validator::Validate;

/// Envelope for successful API responses.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(message: &str, data: T) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            data,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ContactRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 10, message = "Message must be at least 10 characters long"))]
    pub message: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewsletterRequest {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
}

/// Shared by both AI proxy routes.
#[derive(Debug, Deserialize, Validate)]
pub struct PromptRequest {
    #[validate(length(min = 1, message = "Prompt is required"))]
    pub prompt: String,
}
