use crate::principal::Principal;

/// Per-request authentication slot.
///
/// Starts out `Anonymous` and is moved to `Authenticated` at most once, by the
/// authentication pipeline. Carried explicitly with the request; never shared
/// between requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthContext {
    #[default]
    Anonymous,
    Authenticated(Principal),
}

impl AuthContext {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthContext::Authenticated(_))
    }

    pub fn principal(&self) -> Option<&Principal> {
        match self {
            AuthContext::Authenticated(principal) => Some(principal),
            AuthContext::Anonymous => None,
        }
    }

    /// Attach `principal` to an anonymous context.
    ///
    /// An already established identity is kept; the returned context is
    /// unchanged in that case.
    pub fn establish(self, principal: Principal) -> Self {
        match self {
            AuthContext::Anonymous => AuthContext::Authenticated(principal),
            established @ AuthContext::Authenticated(_) => established,
        }
    }
}
