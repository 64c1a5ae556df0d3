//! Privilege checks layered after authentication.

use super::AuthError;
use crate::models::auth::Identity;

/// Require the administrator flag.
pub fn require_admin(identity: &Identity) -> Result<(), AuthError> {
    if identity.is_admin {
        Ok(())
    } else {
        Err(AuthError::ForbiddenNotAdmin)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn identity(is_admin: bool) -> Identity {
        Identity {
            id: 1,
            email: "a@x.com".into(),
            name: "alice".into(),
            password_hash: String::new(),
            is_admin,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn admin_passes() {
        assert!(require_admin(&identity(true)).is_ok());
    }

    #[test]
    fn non_admin_is_forbidden() {
        assert!(matches!(
            require_admin(&identity(false)),
            Err(AuthError::ForbiddenNotAdmin)
        ));
    }
}
