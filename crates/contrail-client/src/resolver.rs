//! Auth flow resolution.
//!
//! Pure decision logic: given the methods a server advertises for a team,
//! pick exactly one acquisition flow.

use contrail_types::{AuthMethod, AuthMethodKind};

/// The next acquisition flow for a set of advertised auth methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFlow {
    /// The server requires no credential for this team.
    Unauthenticated,
    /// More than one usable option (or a basic credential form); the user
    /// picks from the carried methods.
    ChooseCredential(Vec<AuthMethod>),
    /// Exactly one usable method and it is delegated; skip the chooser and
    /// go straight to the third-party flow.
    DelegatedDirect(AuthMethod),
    /// Every advertised method is one this client cannot perform.
    Unsupported,
}

/// Map advertised auth methods to exactly one flow.
///
/// Unsupported-kind entries are filtered out before counting; they never
/// force the chooser path by themselves. Combinations not covered by a
/// specific rule fall back to `ChooseCredential`.
pub fn resolve(methods: &[AuthMethod]) -> AuthFlow {
    if methods.is_empty() {
        return AuthFlow::Unauthenticated;
    }

    let supported: Vec<AuthMethod> = methods
        .iter()
        .filter(|m| m.kind != AuthMethodKind::Unsupported)
        .cloned()
        .collect();

    if supported.is_empty() {
        return AuthFlow::Unsupported;
    }

    if let [only] = supported.as_slice() {
        if only.kind == AuthMethodKind::Delegated {
            return AuthFlow::DelegatedDirect(only.clone());
        }
    }

    AuthFlow::ChooseCredential(supported)
}
