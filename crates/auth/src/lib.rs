//! `hrportal-auth` — authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it signs and
//! verifies credentials, hashes passwords, and answers policy questions about
//! a verified [`Principal`].

pub mod authorize;
pub mod claims;
pub mod password;
pub mod principal;
pub mod token;

pub use authorize::{
    AuthzError, require_account, require_admin, require_author_or_admin, require_employee,
    require_self,
};
pub use claims::{JwtClaims, PrincipalKind, TokenValidationError, validate_claims};
pub use password::{PasswordError, hash_password, verify_password};
pub use principal::Principal;
pub use token::{CredentialVerifier, IssuedToken, TokenError, TokenService};
