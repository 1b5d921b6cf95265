use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};

use crate::{AppState, utils::verify_token};

/// Identity of the caller as far as this service can tell
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub user_id: Option<String>,
}

impl Session {
    pub fn guest() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }
}

/// Attaches a [`Session`] to every request. A valid bearer token yields an
/// authenticated session; a missing or invalid one yields a guest session so
/// the mentor stays usable without login.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let session = match req.headers().typed_get::<Authorization<Bearer>>() {
        Some(auth) => match verify_token(auth.token(), &state.config) {
            Ok(claims) => Session {
                user_id: Some(claims.sub),
            },
            Err(e) => {
                tracing::debug!("Ignoring invalid session token: {}", e);
                Session::guest()
            }
        },
        None => Session::guest(),
    };

    req.extensions_mut().insert(session);
    next.run(req).await
}
