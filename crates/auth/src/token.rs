//! HS256 credential issuance and verification.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use crate::claims::{JwtClaims, TokenValidationError, validate_claims};
use crate::Principal;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("invalid credential: {0}")]
    Invalid(String),

    #[error("credential expired")]
    Expired,

    #[error("failed to sign credential: {0}")]
    Signing(String),
}

impl From<TokenValidationError> for TokenError {
    fn from(value: TokenValidationError) -> Self {
        match value {
            TokenValidationError::Expired => TokenError::Expired,
            other => TokenError::Invalid(other.to_string()),
        }
    }
}

/// Verifies an opaque credential and yields the caller identity.
///
/// The HTTP layer depends on this trait only, so tests can swap in a fixed
/// verifier.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Principal, TokenError>;
}

/// A freshly signed credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies session credentials with a server-held secret.
///
/// The secret and lifetime are injected at construction; nothing here reads
/// the process environment.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl core::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenService").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Time window is checked by `validate_claims` against an explicit `now`.
        validation.validate_exp = false;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a credential for `principal`, valid from `now` for the configured TTL.
    pub fn issue(&self, principal: &Principal, now: DateTime<Utc>) -> Result<IssuedToken, TokenError> {
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| TokenError::Signing("expiry is out of range".into()))?;
        let claims = principal.to_claims(now.timestamp(), expires_at.timestamp());
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))?;
        Ok(IssuedToken { token, expires_at })
    }
}

impl CredentialVerifier for TokenService {
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Principal, TokenError> {
        let data = decode::<JwtClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| TokenError::Invalid(e.to_string()))?;
        validate_claims(&data.claims, now)?;
        Ok(Principal::from_claims(&data.claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hrportal_core::{EmployeeId, UserId};

    use crate::PrincipalKind;

    fn service() -> TokenService {
        TokenService::new(b"test-secret", Duration::days(30))
    }

    #[test]
    fn issued_token_round_trips_identity() {
        let svc = service();
        let now = Utc::now();
        let principal = Principal::employee(EmployeeId::new(7), true, "boss@hr.test", "Big Boss");

        let issued = svc.issue(&principal, now).unwrap();
        assert_eq!(issued.expires_at, now + Duration::days(30));

        let verified = svc.verify(&issued.token, now).unwrap();
        assert_eq!(verified, principal);
        assert!(verified.is_admin());
        assert_eq!(verified.kind(), PrincipalKind::Employee);
    }

    #[test]
    fn expired_token_is_rejected() {
        let svc = service();
        let issued_at = Utc::now() - Duration::days(31);
        let issued = svc
            .issue(&Principal::account(UserId::new(1), false, "reader"), issued_at)
            .unwrap();

        assert_eq!(svc.verify(&issued.token, Utc::now()), Err(TokenError::Expired));
    }

    #[test]
    fn unrepresentable_expiry_is_a_signing_error() {
        let svc = TokenService::new(b"test-secret", Duration::try_days(1_000_000_000).unwrap());
        let principal = Principal::employee(EmployeeId::new(1), false, "a@x.test", "A B");
        assert!(matches!(svc.issue(&principal, Utc::now()), Err(TokenError::Signing(_))));
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let now = Utc::now();
        let other = TokenService::new(b"other-secret", Duration::days(30));
        let issued = other
            .issue(&Principal::account(UserId::new(1), false, "reader"), now)
            .unwrap();

        assert!(matches!(service().verify(&issued.token, now), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            service().verify("not.a.jwt", Utc::now()),
            Err(TokenError::Invalid(_))
        ));
    }
}
