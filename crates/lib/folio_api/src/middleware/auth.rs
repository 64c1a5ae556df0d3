//! Authentication middleware: Bearer token extraction and validation.

use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use folio_core::auth::AuthError;
use folio_core::auth::access;
use folio_core::models::auth::Identity;

use crate::AppState;
use crate::error::AppError;

/// Key used to store the resolved `Identity` in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Identity);

/// Axum middleware: reads `Authorization: Bearer <token>`, validates it against
/// the store, and injects `AuthenticatedUser` into request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::MalformedToken("authorization header is not visible ASCII".into()))?
        .trim();
    if header.is_empty() {
        return Err(AuthError::MissingToken.into());
    }

    let token = bearer_token(header)?.to_owned();
    let identity = state.tokens.validate(&token, state.store.as_ref()).await?;

    request.extensions_mut().insert(AuthenticatedUser(identity));
    Ok(next.run(request).await)
}

/// Axum middleware layered inside [`require_auth`]: rejects non-admins with 403.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or(AuthError::MissingToken)?;
    access::require_admin(&user.0)?;
    Ok(next.run(request).await)
}

fn bearer_token(header: &str) -> Result<&str, AuthError> {
    let (scheme, token) = header
        .split_once(' ')
        .ok_or_else(|| AuthError::MalformedToken("expected `Bearer <token>`".into()))?;
    if !scheme.eq_ignore_ascii_case("bearer") || token.trim().is_empty() {
        return Err(AuthError::MalformedToken("unsupported authorization scheme".into()));
    }
    Ok(token.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        assert_eq!(bearer_token("Bearer abc").unwrap(), "abc");
        assert_eq!(bearer_token("bearer abc").unwrap(), "abc");
    }

    #[test]
    fn other_schemes_are_malformed() {
        assert!(matches!(
            bearer_token("Basic dXNlcjpwYXNz"),
            Err(AuthError::MalformedToken(_))
        ));
        assert!(matches!(bearer_token("abc"), Err(AuthError::MalformedToken(_))));
        assert!(matches!(bearer_token("Bearer  "), Err(AuthError::MalformedToken(_))));
    }
}
