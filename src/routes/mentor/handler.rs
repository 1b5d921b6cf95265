use axum::{
    extract::{Extension, Json, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use tracing::Instrument;
use uuid::Uuid;

use super::model::{MentorChatRequest, validate_message};
use crate::{
    AppState,
    error::ChatError,
    i18n::Locale,
    llm::RoutedReply,
    middleware::{Session, resolve_identifier},
};

/// Mentor chat endpoint. Always answers `200` with a plain text reply; every
/// failure is turned into a localized apology.
#[axum::debug_handler]
pub async fn chat(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
    body: Result<Json<MentorChatRequest>, JsonRejection>,
) -> impl IntoResponse {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!(
        "mentor_chat",
        %request_id,
        authenticated = session.is_authenticated()
    );

    async move {
        let header_locale = Locale::from_headers(&headers);
        let (locale, result) = match body {
            Ok(Json(req)) => {
                let locale = req.locale(header_locale);
                (locale, answer(&state, &session, &headers, req, locale).await)
            }
            Err(rejection) => (
                header_locale,
                Err(ChatError::Malformed(rejection.body_text())),
            ),
        };

        match result {
            Ok(reply) => {
                tracing::info!(provider = %reply.provider, "mentor replied");
                (StatusCode::OK, reply.response)
            }
            Err(e) => {
                e.log();
                (StatusCode::OK, e.user_message(locale))
            }
        }
    }
    .instrument(span)
    .await
}

// Validation runs before the rate limiter so bad input never spends budget.
// Once a check passes, the attempt counts even if the client goes away.
async fn answer(
    state: &AppState,
    session: &Session,
    headers: &HeaderMap,
    req: MentorChatRequest,
    locale: Locale,
) -> Result<RoutedReply, ChatError> {
    let message = validate_message(&req.message)?;

    let identifier = resolve_identifier(session.user_id.as_deref(), headers);
    let decision = state
        .limiter
        .check(state.config.rate_limit_requests, &identifier);
    if !decision.success {
        return Err(ChatError::RateLimited {
            identifier,
            retry_after_secs: state.limiter.interval().as_secs().max(1),
        });
    }
    tracing::debug!(remaining = decision.remaining, "rate limit check passed");

    let request = req.into_provider_request(message, locale);
    Ok(state.models.chat(&request).await?)
}
