//! Authentication service: login, registration and admin bootstrap flows
//! delegating to `folio_core::auth`.

use folio_core::auth::credentials::verify_credentials;
use folio_core::auth::jwt::TokenService;
use folio_core::auth::password::hash_password_blocking;
use folio_core::auth::{AuthError, access};
use folio_core::models::auth::{Identity, NewIdentity};
use folio_core::store::{Store, StoreError, UserStore};
use tracing::info;

use crate::config::AdminBootstrap;
use crate::error::{AppError, AppResult};
use crate::models::{AuthUser, TokenResponse};

/// Shortest accepted password, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

fn token_response(tokens: &TokenService, identity: &Identity) -> AppResult<TokenResponse> {
    Ok(TokenResponse {
        token: tokens.issue(identity)?,
        user: AuthUser::from(identity),
    })
}

/// Authenticate with email (or unique display name) + password.
pub async fn login(
    store: &dyn Store,
    tokens: &TokenService,
    identifier: &str,
    password: &str,
) -> AppResult<TokenResponse> {
    let identity = verify_credentials(store, identifier, password).await?;
    info!(user_id = identity.id, "login succeeded");
    token_response(tokens, &identity)
}

/// Same as [`login`], but only administrators get a token.
pub async fn admin_login(
    store: &dyn Store,
    tokens: &TokenService,
    identifier: &str,
    password: &str,
) -> AppResult<TokenResponse> {
    let identity = verify_credentials(store, identifier, password).await?;
    access::require_admin(&identity)?;
    info!(user_id = identity.id, "admin login succeeded");
    token_response(tokens, &identity)
}

/// Register a new, non-admin account and sign it in.
pub async fn register(
    store: &dyn Store,
    tokens: &TokenService,
    name: &str,
    email: &str,
    password: &str,
) -> AppResult<TokenResponse> {
    let name = name.trim();
    let email = email.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Name is required".into()));
    }
    if !email.contains('@') {
        return Err(AppError::Validation("Email address is invalid".into()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let password_hash = hash_password_blocking(password).await?;
    let identity = store
        .create_user(NewIdentity {
            email: email.to_string(),
            name: name.to_string(),
            password_hash,
            is_admin: false,
        })
        .await
        .map_err(|e| match e {
            StoreError::Conflict(_) => AppError::Conflict("Email already registered".into()),
            other => AppError::from(other),
        })?;

    info!(user_id = identity.id, "account registered");
    token_response(tokens, &identity)
}

/// Create the configured admin account, or promote it if it already exists.
pub async fn ensure_admin(store: &dyn Store, admin: &AdminBootstrap) -> Result<Identity, AuthError> {
    if let Some(existing) = store.find_user_by_email(&admin.email).await? {
        if existing.is_admin {
            return Ok(existing);
        }
        let promoted = store
            .set_admin(existing.id, true)
            .await?
            .ok_or(AuthError::UnknownSubject(existing.id))?;
        info!(user_id = promoted.id, "existing account promoted to admin");
        return Ok(promoted);
    }

    let password_hash = hash_password_blocking(&admin.password).await?;
    let created = store
        .create_user(NewIdentity {
            email: admin.email.clone(),
            name: admin.name.clone(),
            password_hash,
            is_admin: true,
        })
        .await?;
    info!(user_id = created.id, "admin account created");
    Ok(created)
}

#[cfg(test)]
mod tests {
    use folio_core::auth::jwt::JwtSecret;
    use folio_core::store::memory::MemoryStore;

    use super::*;

    fn tokens() -> TokenService {
        let secret = JwtSecret::new("0123456789abcdef0123456789abcdef").unwrap();
        TokenService::with_default_ttl(&secret)
    }

    fn admin() -> AdminBootstrap {
        AdminBootstrap {
            email: "root@x.com".into(),
            password: "rootpass".into(),
            name: "Root".into(),
        }
    }

    #[tokio::test]
    async fn register_then_login() {
        let store = MemoryStore::new();
        let tokens = tokens();
        let registered = register(&store, &tokens, "Alice", "a@x.com", "secret")
            .await
            .unwrap();
        assert_eq!(registered.user.id, 1);
        assert!(!registered.user.is_admin);

        let logged_in = login(&store, &tokens, "a@x.com", "secret").await.unwrap();
        let claims = tokens.decode(&logged_in.token).unwrap();
        assert_eq!(claims.user_id, 1);
    }

    #[tokio::test]
    async fn register_validates_input() {
        let store = MemoryStore::new();
        let tokens = tokens();
        for (name, email, password) in [
            ("", "a@x.com", "secret"),
            ("Alice", "not-an-email", "secret"),
            ("Alice", "a@x.com", "12345"),
        ] {
            assert!(matches!(
                register(&store, &tokens, name, email, password).await,
                Err(AppError::Validation(_))
            ));
        }
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let store = MemoryStore::new();
        let tokens = tokens();
        register(&store, &tokens, "Alice", "a@x.com", "secret")
            .await
            .unwrap();
        assert!(matches!(
            register(&store, &tokens, "Alice", "a@x.com", "another").await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn admin_login_rejects_regular_accounts() {
        let store = MemoryStore::new();
        let tokens = tokens();
        register(&store, &tokens, "Alice", "a@x.com", "secret")
            .await
            .unwrap();
        assert!(matches!(
            admin_login(&store, &tokens, "a@x.com", "secret").await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn ensure_admin_creates_once_and_promotes() {
        let store = MemoryStore::new();
        let first = ensure_admin(&store, &admin()).await.unwrap();
        let second = ensure_admin(&store, &admin()).await.unwrap();
        assert!(first.is_admin);
        assert_eq!(first.id, second.id);

        let tokens = tokens();
        register(&store, &tokens, "Bob", "b@x.com", "secret")
            .await
            .unwrap();
        let promoted = ensure_admin(
            &store,
            &AdminBootstrap {
                email: "b@x.com".into(),
                password: "ignored".into(),
                name: "Bob".into(),
            },
        )
        .await
        .unwrap();
        assert!(promoted.is_admin);
    }
}
