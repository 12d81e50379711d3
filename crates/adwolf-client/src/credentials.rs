/// Source of the bearer credential attached to outgoing requests.
///
/// The token is read at request-construction time, once per request; this
/// crate never mutates or refreshes it. Expiry handling belongs to the
/// authentication layer that populates the underlying storage. Returning
/// `None` sends the request unauthenticated and lets the server reject it.
pub trait CredentialProvider: Send + Sync {
    /// Returns the current bearer token, if one is available.
    fn bearer_token(&self) -> Option<String>;
}

/// A fixed token, handed over once at construction.
pub struct StaticToken(String);

impl StaticToken {
    /// Wraps the given token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl CredentialProvider for StaticToken {
    fn bearer_token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Reads the token from an environment variable on every request.
pub struct EnvToken {
    var: String,
}

impl EnvToken {
    /// Reads from the named environment variable.
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl CredentialProvider for EnvToken {
    fn bearer_token(&self) -> Option<String> {
        std::env::var(&self.var).ok().filter(|t| !t.is_empty())
    }
}

/// No credential; every request goes out unauthenticated.
pub struct Anonymous;

impl CredentialProvider for Anonymous {
    fn bearer_token(&self) -> Option<String> {
        None
    }
}
