//! Credential verification: identifier + password against the stored hash.

use tracing::{debug, warn};

use super::AuthError;
use super::password::{verify_against_dummy, verify_password_blocking};
use crate::models::auth::Identity;
use crate::store::UserStore;

/// Verify a login attempt.
///
/// The identifier is matched exactly against the email first, then against a
/// display name that belongs to exactly one account. Unknown identifier and
/// wrong password both yield [`AuthError::InvalidCredentials`].
pub async fn verify_credentials<S>(
    store: &S,
    identifier: &str,
    password: &str,
) -> Result<Identity, AuthError>
where
    S: UserStore + ?Sized,
{
    let identifier = identifier.trim();
    if identifier.is_empty() || password.is_empty() {
        return Err(AuthError::InvalidCredentials);
    }

    let Some(identity) = find_login_candidate(store, identifier).await? else {
        verify_against_dummy(password).await;
        debug!("login rejected: no matching account");
        return Err(AuthError::InvalidCredentials);
    };

    if identity.password_hash.is_empty() {
        verify_against_dummy(password).await;
        warn!(user_id = identity.id, "account has no password hash");
        return Err(AuthError::InvalidCredentials);
    }

    match verify_password_blocking(password, &identity.password_hash).await {
        Ok(true) => Ok(identity),
        Ok(false) => {
            debug!(user_id = identity.id, "login rejected: password mismatch");
            Err(AuthError::InvalidCredentials)
        }
        Err(e) => {
            warn!(user_id = identity.id, error = %e, "stored password hash is unusable");
            Err(AuthError::InvalidCredentials)
        }
    }
}

async fn find_login_candidate<S>(store: &S, identifier: &str) -> Result<Option<Identity>, AuthError>
where
    S: UserStore + ?Sized,
{
    if let Some(identity) = store.find_user_by_email(identifier).await? {
        return Ok(Some(identity));
    }
    let mut by_name = store.find_users_by_name(identifier).await?;
    if by_name.len() == 1 {
        Ok(by_name.pop())
    } else {
        Ok(None)
    }
}
