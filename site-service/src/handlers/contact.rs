use axum::{Json, extract::State, http::StatusCode};
use site_core::error::AppError;

use crate::dtos::{ApiResponse, ContactRequest};
use crate::models::{ContactMessage, NewContact};
use crate::startup::AppState;
use crate::utils::ValidatedJson;

#[tracing::instrument(skip(state, request))]
pub async fn submit_contact(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ContactRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ContactMessage>>), AppError> {
    let contact = state
        .store
        .create_contact(NewContact {
            name: request.name,
            email: request.email,
            message: request.message,
        })
        .await;

    tracing::info!(contact_id = contact.id, "Contact form submission stored");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            "Contact form submitted successfully",
            contact,
        )),
    ))
}
