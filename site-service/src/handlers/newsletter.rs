use axum::{Json, extract::State, http::StatusCode};
use site_core::error::AppError;

use crate::dtos::{ApiResponse, NewsletterRequest};
use crate::models::{NewNewsletter, NewsletterSubscription};
use crate::startup::AppState;
use crate::utils::ValidatedJson;

/// Subscribing an already-subscribed email is a no-op that returns the
/// existing record, still as 201.
#[tracing::instrument(skip(state, request))]
pub async fn subscribe(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<NewsletterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<NewsletterSubscription>>), AppError> {
    let subscription = state
        .store
        .create_newsletter(NewNewsletter {
            email: request.email,
        })
        .await;

    tracing::info!(subscription_id = subscription.id, "Newsletter subscription stored");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            "Newsletter subscription successful",
            subscription,
        )),
    ))
}
