use hrportal_auth::Principal;

/// Result of resolving the session cookie for a request.
///
/// Inserted by the auth middleware on every request; route guards decide
/// what an absent or invalid credential means for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authentication {
    /// No session cookie was sent.
    Missing,
    /// A cookie was sent but failed verification.
    Invalid,
    /// A verified caller.
    Principal(Principal),
}

impl Authentication {
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Authentication::Principal(p) => Some(p),
            _ => None,
        }
    }
}
