//! Auth middleware gating the MCP upgrade (spec.md 4.J's two entry
//! points), modeled on the teacher's `security_middleware`: inspect a
//! header, call through to the next layer on success, otherwise answer
//! 401 directly rather than reaching the handler at all.

use crate::state::AppState;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use tracing::warn;

const SESSION_COOKIE_NAME: &str = "session";

pub async fn require_session(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if !state.config.auth_enabled {
        return next.run(request).await;
    }

    if let Some(auth_header) = request.headers().get("Authorization").and_then(|v| v.to_str().ok()) {
        match state.session.authenticate_bearer(auth_header).await {
            Ok(_) => return next.run(request).await,
            Err(e) => {
                warn!(error = %e, "bearer authentication rejected");
                return unauthorized();
            }
        }
    }

    if let Some(cookie_value) = request
        .headers()
        .get("Cookie")
        .and_then(|v| v.to_str().ok())
        .and_then(|raw| find_cookie(raw, SESSION_COOKIE_NAME))
    {
        match state.session.authenticate_cookie(&cookie_value).await {
            Ok(Some(_)) => return next.run(request).await,
            Ok(None) => {
                warn!("session cookie present but absent or expired");
                return unauthorized();
            }
            Err(e) => {
                warn!(error = %e, "cookie authentication failed");
                return unauthorized();
            }
        }
    }

    warn!("no Authorization header or session cookie on an authenticated route");
    unauthorized()
}

fn find_cookie(header_value: &str, name: &str) -> Option<String> {
    header_value.split(';').find_map(|part| {
        let part = part.trim();
        part.strip_prefix(name)
            .and_then(|rest| rest.strip_prefix('='))
            .map(|v| v.to_string())
    })
}

fn unauthorized() -> Response {
    Response::builder()
        .status(StatusCode::UNAUTHORIZED)
        .body("unauthorized".into())
        .expect("static 401 response always builds")
}

#[cfg(test)]
mod tests {
    use super::find_cookie;

    #[test]
    fn finds_the_named_cookie_among_several() {
        let header = "a=1; session=abc123; b=2";
        assert_eq!(find_cookie(header, "session"), Some("abc123".to_string()));
    }

    #[test]
    fn returns_none_when_absent() {
        let header = "a=1; b=2";
        assert_eq!(find_cookie(header, "session"), None);
    }
}
