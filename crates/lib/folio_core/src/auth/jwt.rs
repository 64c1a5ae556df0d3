//! JWT token generation and verification.
//!
//! Tokens are HS256-signed with the process secret and carry
//! [`TokenClaims`]. Validation runs strictly in order: structure, algorithm,
//! signature, expiry, then subject resolution against the store.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::Deserialize;
use uuid::Uuid;

use super::AuthError;
use crate::models::auth::{Identity, TokenClaims};
use crate::store::UserStore;

/// Minimum accepted secret length in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Token lifetime: 7 days.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// The only algorithm tokens may be signed with.
const EXPECTED_ALG: &str = "HS256";

/// Scheme marker accepted in front of a raw token.
const BEARER_PREFIX: &str = "Bearer ";

/// Symmetric signing secret, checked for length on construction.
#[derive(Clone)]
pub struct JwtSecret(Vec<u8>);

impl JwtSecret {
    pub fn new(value: impl Into<Vec<u8>>) -> Result<Self, AuthError> {
        let bytes = value.into();
        if bytes.len() < MIN_SECRET_LEN {
            return Err(AuthError::Configuration(format!(
                "JWT secret must be at least {MIN_SECRET_LEN} bytes (got {})",
                bytes.len()
            )));
        }
        Ok(Self(bytes))
    }

    /// Read the secret from an environment variable. Absent or short is fatal.
    pub fn from_env(var: &str) -> Result<Self, AuthError> {
        let value = std::env::var(var)
            .map_err(|_| AuthError::Configuration(format!("{var} must be set")))?;
        Self::new(value)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for JwtSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JwtSecret({} bytes)", self.0.len())
    }
}

/// Only the header field needed before jsonwebtoken takes over.
#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

/// Issues and validates access tokens.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &JwtSecret, ttl: Duration) -> Result<Self, AuthError> {
        if ttl <= Duration::zero() {
            return Err(AuthError::Configuration(
                "token lifetime must be positive".into(),
            ));
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        })
    }

    /// Service with the default 7-day lifetime.
    pub fn with_default_ttl(secret: &JwtSecret) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a token for `identity`, valid from now.
    pub fn issue(&self, identity: &Identity) -> Result<String, AuthError> {
        self.issue_at(identity, Utc::now())
    }

    /// Sign a token for `identity` as if issued at `issued_at`.
    pub fn issue_at(
        &self,
        identity: &Identity,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let iat = issued_at.timestamp();
        let claims = TokenClaims {
            user_id: identity.id,
            email: Some(identity.email.clone()),
            admin: Some(identity.is_admin),
            iat,
            exp: iat + self.ttl.num_seconds(),
            jti: Some(Uuid::new_v4().to_string()),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Internal(format!("jwt encode: {e}")))
    }

    /// Check structure, algorithm, signature and expiry; return the claims.
    pub fn decode(&self, raw: &str) -> Result<TokenClaims, AuthError> {
        self.decode_at(raw, Utc::now())
    }

    /// [`decode`](Self::decode) against an explicit clock.
    pub fn decode_at(&self, raw: &str, now: DateTime<Utc>) -> Result<TokenClaims, AuthError> {
        let token = strip_bearer(raw);
        let alg = peek_algorithm(token)?;
        if alg != EXPECTED_ALG {
            return Err(AuthError::UnsupportedAlgorithm(alg));
        }

        // Expiry is checked below so that `now == exp` is already expired.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.required_spec_claims.clear();

        let claims = decode::<TokenClaims>(token, &self.decoding, &validation)
            .map_err(map_jwt_error)?
            .claims;

        if now.timestamp() >= claims.exp {
            return Err(AuthError::Expired);
        }
        Ok(claims)
    }

    /// Full validation: [`decode`](Self::decode) plus subject resolution.
    pub async fn validate<S>(&self, raw: &str, store: &S) -> Result<Identity, AuthError>
    where
        S: UserStore + ?Sized,
    {
        let claims = self.decode(raw)?;
        store
            .find_user_by_id(claims.user_id)
            .await?
            .ok_or(AuthError::UnknownSubject(claims.user_id))
    }
}

fn strip_bearer(raw: &str) -> &str {
    let raw = raw.trim();
    raw.strip_prefix(BEARER_PREFIX).unwrap_or(raw).trim()
}

/// Parse the three-segment structure and return the header's `alg`.
fn peek_algorithm(token: &str) -> Result<String, AuthError> {
    let mut segments = token.split('.');
    let (Some(header), Some(_payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(AuthError::MalformedToken("expected three segments".into()));
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|e| AuthError::MalformedToken(format!("header encoding: {e}")))?;
    let header: RawHeader = serde_json::from_slice(&bytes)
        .map_err(|e| AuthError::MalformedToken(format!("header json: {e}")))?;
    Ok(header.alg)
}

fn map_jwt_error(e: jsonwebtoken::errors::Error) -> AuthError {
    match e.kind() {
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        ErrorKind::InvalidAlgorithm => AuthError::UnsupportedAlgorithm(e.to_string()),
        ErrorKind::ExpiredSignature => AuthError::Expired,
        _ => AuthError::MalformedToken(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::NewIdentity;
    use crate::store::memory::MemoryStore;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn service() -> TokenService {
        TokenService::with_default_ttl(&JwtSecret::new(SECRET).unwrap())
    }

    fn identity(id: i64) -> Identity {
        Identity {
            id,
            email: "a@x.com".into(),
            name: "alice".into(),
            password_hash: "hash".into(),
            is_admin: false,
            created_at: Utc::now(),
        }
    }

    fn flip_signature(token: &str) -> String {
        let sig_start = token.rfind('.').unwrap() + 1;
        let idx = sig_start + (token.len() - sig_start) / 2;
        let mut bytes = token.as_bytes().to_vec();
        bytes[idx] = if bytes[idx] == b'A' { b'B' } else { b'A' };
        String::from_utf8(bytes).unwrap()
    }

    fn forge(header: &str, claims: &str, signature: &str) -> String {
        format!(
            "{}.{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(claims),
            signature
        )
    }

    #[test]
    fn secret_shorter_than_minimum_is_rejected() {
        let err = JwtSecret::new("too-short").unwrap_err();
        assert!(matches!(err, AuthError::Configuration(_)));
        assert!(JwtSecret::new(vec![b'x'; MIN_SECRET_LEN - 1]).is_err());
        assert!(JwtSecret::new(vec![b'x'; MIN_SECRET_LEN]).is_ok());
    }

    #[test]
    fn missing_env_secret_is_configuration_error() {
        let err = JwtSecret::from_env("FOLIO_TEST_SECRET_THAT_IS_NEVER_SET").unwrap_err();
        assert!(matches!(err, AuthError::Configuration(_)));
    }

    #[test]
    fn secret_debug_does_not_leak_value() {
        let secret = JwtSecret::new(SECRET).unwrap();
        assert!(!format!("{secret:?}").contains("0123"));
    }

    #[test]
    fn non_positive_ttl_is_rejected() {
        let secret = JwtSecret::new(SECRET).unwrap();
        assert!(TokenService::new(&secret, Duration::zero()).is_err());
        assert!(TokenService::new(&secret, Duration::hours(24)).is_ok());
    }

    #[test]
    fn issued_token_round_trips() {
        let svc = service();
        let token = svc.issue(&identity(1)).unwrap();
        let claims = svc.decode(&token).unwrap();
        assert_eq!(claims.user_id, 1);
        assert_eq!(claims.email.as_deref(), Some("a@x.com"));
        assert_eq!(claims.admin, Some(false));
        assert!(claims.jti.is_some());
    }

    #[test]
    fn expiry_is_issued_at_plus_ttl() {
        let svc = service();
        let token = svc.issue(&identity(1)).unwrap();
        let claims = svc.decode(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, DEFAULT_TOKEN_TTL_SECS);
    }

    #[test]
    fn each_token_has_a_unique_id() {
        let svc = service();
        let a = svc.decode(&svc.issue(&identity(1)).unwrap()).unwrap();
        let b = svc.decode(&svc.issue(&identity(1)).unwrap()).unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn bearer_prefix_is_stripped() {
        let svc = service();
        let token = svc.issue(&identity(4)).unwrap();
        let claims = svc.decode(&format!("Bearer {token}")).unwrap();
        assert_eq!(claims.user_id, 4);
    }

    #[test]
    fn token_expires_exactly_at_exp() {
        let svc = service();
        let issued = Utc::now() - Duration::days(1);
        let token = svc.issue_at(&identity(1), issued).unwrap();
        let exp = issued + svc.ttl();

        assert!(svc.decode_at(&token, exp - Duration::seconds(1)).is_ok());
        assert!(matches!(
            svc.decode_at(&token, exp),
            Err(AuthError::Expired)
        ));
        assert!(matches!(
            svc.decode_at(&token, exp + Duration::days(30)),
            Err(AuthError::Expired)
        ));
    }

    #[test]
    fn token_issued_long_ago_is_expired() {
        let svc = service();
        let token = svc
            .issue_at(&identity(1), Utc::now() - Duration::days(8))
            .unwrap();
        assert!(matches!(svc.decode(&token), Err(AuthError::Expired)));
    }

    #[test]
    fn flipped_signature_is_rejected() {
        let svc = service();
        let token = svc.issue(&identity(1)).unwrap();
        let tampered = flip_signature(&token);
        assert_ne!(token, tampered);
        assert!(matches!(
            svc.decode(&tampered),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let svc = service();
        let token = svc.issue(&identity(1)).unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        let payload = URL_SAFE_NO_PAD.encode(r#"{"user_id":2,"admin":true,"iat":0,"exp":99999999999}"#);
        let forged = format!("{}.{}.{}", parts[0], payload, parts[2]);
        assert!(matches!(
            svc.decode(&forged),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let other = TokenService::with_default_ttl(
            &JwtSecret::new("ffffffffffffffffffffffffffffffff").unwrap(),
        );
        let token = other.issue(&identity(1)).unwrap();
        assert!(matches!(
            service().decode(&token),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn unsigned_token_is_rejected() {
        let token = forge(
            r#"{"alg":"none","typ":"JWT"}"#,
            r#"{"user_id":1,"iat":0,"exp":99999999999}"#,
            "",
        );
        assert!(matches!(
            service().decode(&token),
            Err(AuthError::UnsupportedAlgorithm(alg)) if alg == "none"
        ));
    }

    #[test]
    fn other_hmac_algorithm_is_rejected() {
        let key = EncodingKey::from_secret(SECRET.as_bytes());
        let claims = TokenClaims {
            user_id: 1,
            email: None,
            admin: None,
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 60,
            jti: None,
        };
        let token = encode(&Header::new(Algorithm::HS512), &claims, &key).unwrap();
        assert!(matches!(
            service().decode(&token),
            Err(AuthError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn garbage_is_malformed() {
        let svc = service();
        for raw in ["", "Bearer ", "not-a-token", "a.b", "a.b.c.d", "!!!.e30.sig"] {
            assert!(
                matches!(svc.decode(raw), Err(AuthError::MalformedToken(_))),
                "expected malformed for {raw:?}"
            );
        }
    }

    #[tokio::test]
    async fn validate_resolves_identity() {
        let store = MemoryStore::new();
        let created = store
            .create_user(NewIdentity {
                email: "a@x.com".into(),
                name: "alice".into(),
                password_hash: "hash".into(),
                is_admin: false,
            })
            .await
            .unwrap();
        let svc = service();
        let token = svc.issue(&created).unwrap();
        let resolved = svc.validate(&token, &store).await.unwrap();
        assert_eq!(resolved.id, created.id);
    }

    #[tokio::test]
    async fn validate_rejects_deleted_subject() {
        let store = MemoryStore::new();
        let created = store
            .create_user(NewIdentity {
                email: "a@x.com".into(),
                name: "alice".into(),
                password_hash: "hash".into(),
                is_admin: false,
            })
            .await
            .unwrap();
        let svc = service();
        let token = svc.issue(&created).unwrap();
        store.delete_user(created.id).await.unwrap();
        assert!(matches!(
            svc.validate(&token, &store).await,
            Err(AuthError::UnknownSubject(id)) if id == created.id
        ));
    }
}
