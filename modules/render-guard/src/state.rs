use rio_security::{Identity, Requirement, RoleDecision};

/// Observable guard state.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum GuardState {
    /// Initial session read in flight.
    #[default]
    Loading,
    Authenticated {
        identity: Identity,
        role: RoleDecision,
    },
    Unauthenticated,
}

/// What the guarded tree should render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Loading placeholder.
    Placeholder,
    /// The guarded children.
    Content,
    /// "Please log in".
    LoginFallback,
    /// Signed in, but the role requirement is not met.
    InsufficientPrivilege,
}

impl GuardState {
    #[must_use]
    pub fn view(&self, requirement: Requirement) -> View {
        match self {
            Self::Loading => View::Placeholder,
            Self::Unauthenticated => View::LoginFallback,
            Self::Authenticated { role, .. } if requirement.admits(*role) => View::Content,
            Self::Authenticated { .. } => View::InsufficientPrivilege,
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    #[must_use]
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Loading)
    }
}
