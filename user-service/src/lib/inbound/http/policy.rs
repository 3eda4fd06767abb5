use std::collections::BTreeSet;

use auth::AuthContext;

/// Paths reachable without an established identity.
pub const PUBLIC_PATHS: [&str; 2] = ["/signup", "/login"];

/// Decides which requests may reach a handler.
///
/// Public paths are matched exactly. Every other path, including ones no
/// route is registered for, needs an authenticated context.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    public_paths: BTreeSet<String>,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::new(PUBLIC_PATHS)
    }
}

impl AccessPolicy {
    pub fn new<I, S>(public_paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            public_paths: public_paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.public_paths.contains(path)
    }

    pub fn admits(&self, path: &str, context: Option<&AuthContext>) -> bool {
        self.is_public(path) || context.is_some_and(AuthContext::is_authenticated)
    }
}
