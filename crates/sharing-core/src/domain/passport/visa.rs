//! Visa: the per-(actor, target) authorization evaluator.

use crate::domain::permissions::DomainPermissions;

/// The acting identity a passport was issued for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Principal {
    /// Trusted background process; carries the elevation reason
    System { reason: String },
    /// Marketplace member
    PersonalUser(crate::domain::identifiers::UserId),
    /// Administrator
    AdminUser(crate::domain::identifiers::UserId),
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::System { reason } => write!(f, "system({reason})"),
            Self::PersonalUser(id) => write!(f, "personal-user({id})"),
            Self::AdminUser(id) => write!(f, "admin-user({id})"),
        }
    }
}

/// The aggregate a Visa was issued for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VisaSubject {
    pub context: &'static str,
    pub id: String,
}

/// Authorization evaluator bound to one actor and one target.
///
/// The permission struct is resolved once when the Visa is issued and never
/// changes afterwards, so every call to [`Visa::evaluate`] on the same
/// instance gives the same answer for the same predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visa<P> {
    principal: Principal,
    subject: VisaSubject,
    permissions: P,
}

impl<P: DomainPermissions> Visa<P> {
    /// Issue a Visa over a resolved permission struct.
    pub fn issue(principal: Principal, target_id: impl Into<String>, permissions: P) -> Self {
        Self {
            principal,
            subject: VisaSubject {
                context: P::CONTEXT,
                id: target_id.into(),
            },
            permissions,
        }
    }

    /// Run `predicate` against the captured permissions.
    ///
    /// Denial is `false`; turning it into an error is the caller's job.
    pub fn evaluate<F>(&self, predicate: F) -> bool
    where
        F: FnOnce(&P) -> bool,
    {
        predicate(&self.permissions)
    }

    #[must_use]
    pub const fn principal(&self) -> &Principal {
        &self.principal
    }

    #[must_use]
    pub const fn subject(&self) -> &VisaSubject {
        &self.subject
    }
}
