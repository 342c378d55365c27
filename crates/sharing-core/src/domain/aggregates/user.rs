//! User aggregates: marketplace members and administrators.
//!
//! Both kinds are stored as one tagged [`UserRecord`]. Aggregates that point
//! at a user (listing sharer, conversation participants, reserver) keep the
//! raw record and resolve it through [`resolve_user_view`] on every access.
//!
//! # Guards
//!
//! | Field | Permission |
//! |---|---|
//! | account fields, onboarding | `is_editing_own_account` |
//! | blocked flag | `can_block_users` |
//! | role | `can_manage_user_roles` |

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entity::{require, Aggregate, AggregateRoot};
use crate::domain::events::IntegrationEvent;
use crate::domain::identifiers::UserId;
use crate::domain::passport::{Passport, UserVisaTarget};
use crate::domain::permissions::UserDomainPermissions;
use crate::domain::repository::RoleRepository;
use crate::domain::values::{Email, PersonName, Username};
use crate::error::DomainResult;

use super::role::{AdminRoleProps, PersonalUserRoleProps};

const PERSONAL_USER: &str = "personal user";
const ADMIN_USER: &str = "admin user";

// ============================================================================
// PROPS
// ============================================================================

/// Profile shared by members and administrators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub email: Email,
    pub username: Username,
    pub first_name: PersonName,
    pub last_name: PersonName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalUserProps {
    pub id: UserId,
    pub is_blocked: bool,
    pub has_completed_onboarding: bool,
    pub account: UserAccount,
    pub role: Option<PersonalUserRoleProps>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserProps {
    pub id: UserId,
    pub is_blocked: bool,
    pub account: UserAccount,
    pub role: Option<AdminRoleProps>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A stored user reference, discriminated by `userType`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "userType")]
pub enum UserRecord {
    #[serde(rename = "personal-user")]
    PersonalUser(PersonalUserProps),
    #[serde(rename = "admin-user")]
    AdminUser(AdminUserProps),
}

impl UserRecord {
    #[must_use]
    pub const fn id(&self) -> &UserId {
        match self {
            Self::PersonalUser(props) => &props.id,
            Self::AdminUser(props) => &props.id,
        }
    }

    #[must_use]
    pub const fn account(&self) -> &UserAccount {
        match self {
            Self::PersonalUser(props) => &props.account,
            Self::AdminUser(props) => &props.account,
        }
    }
}

impl From<PersonalUserProps> for UserRecord {
    fn from(props: PersonalUserProps) -> Self {
        Self::PersonalUser(props)
    }
}

impl From<AdminUserProps> for UserRecord {
    fn from(props: AdminUserProps) -> Self {
        Self::AdminUser(props)
    }
}

// ============================================================================
// PERSONAL USER
// ============================================================================

/// A marketplace member.
#[derive(Debug, PartialEq)]
pub struct PersonalUser {
    root: AggregateRoot<PersonalUserProps, UserDomainPermissions>,
}

impl PersonalUser {
    /// Wrap stored props. The Visa is issued here and never recomputed.
    #[must_use]
    pub fn new(props: PersonalUserProps, passport: Arc<dyn Passport>) -> Self {
        let visa = passport.user().for_user(&UserVisaTarget { user_id: &props.id });
        Self {
            root: AggregateRoot::new(props, passport, visa),
        }
    }

    /// Create a member with no role and onboarding still pending.
    ///
    /// # Errors
    ///
    /// Propagates failures from the draft setters.
    pub fn new_instance(
        passport: Arc<dyn Passport>,
        id: UserId,
        account: UserAccount,
        role: Option<PersonalUserRoleProps>,
    ) -> DomainResult<Self> {
        let mut draft = PersonalUserDraft::new(passport, id, account);
        if role.is_some() {
            draft.set_role(role)?;
        }
        Ok(draft.finalize())
    }

    #[must_use]
    pub const fn id(&self) -> &UserId {
        &self.root.props().id
    }

    #[must_use]
    pub const fn account(&self) -> &UserAccount {
        &self.root.props().account
    }

    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        self.root.props().is_blocked
    }

    #[must_use]
    pub const fn has_completed_onboarding(&self) -> bool {
        self.root.props().has_completed_onboarding
    }

    #[must_use]
    pub const fn role(&self) -> Option<&PersonalUserRoleProps> {
        self.root.props().role.as_ref()
    }

    #[must_use]
    pub const fn props(&self) -> &PersonalUserProps {
        self.root.props()
    }

    pub fn set_email(&mut self, email: Email) -> DomainResult<()> {
        self.root
            .guard("email", PERSONAL_USER, |p| p.is_editing_own_account)?;
        self.root.props_mut().account.email = email;
        Ok(())
    }

    pub fn set_username(&mut self, username: Username) -> DomainResult<()> {
        self.root
            .guard("username", PERSONAL_USER, |p| p.is_editing_own_account)?;
        self.root.props_mut().account.username = username;
        Ok(())
    }

    pub fn set_first_name(&mut self, first_name: PersonName) -> DomainResult<()> {
        self.root
            .guard("first name", PERSONAL_USER, |p| p.is_editing_own_account)?;
        self.root.props_mut().account.first_name = first_name;
        Ok(())
    }

    pub fn set_last_name(&mut self, last_name: PersonName) -> DomainResult<()> {
        self.root
            .guard("last name", PERSONAL_USER, |p| p.is_editing_own_account)?;
        self.root.props_mut().account.last_name = last_name;
        Ok(())
    }

    pub fn complete_onboarding(&mut self) -> DomainResult<()> {
        self.root
            .guard("onboarding status", PERSONAL_USER, |p| p.is_editing_own_account)?;
        self.root.props_mut().has_completed_onboarding = true;
        Ok(())
    }

    pub fn set_blocked(&mut self, is_blocked: bool) -> DomainResult<()> {
        self.root
            .guard("blocked status", PERSONAL_USER, |p| p.can_block_users)?;
        self.root.props_mut().is_blocked = is_blocked;
        tracing::debug!(user_id = %self.id(), is_blocked, "personal user blocked status changed");
        Ok(())
    }

    pub fn set_role(&mut self, role: Option<PersonalUserRoleProps>) -> DomainResult<()> {
        self.root
            .guard("role", PERSONAL_USER, |p| p.can_manage_user_roles)?;
        self.root.props_mut().role = Some(require("role", role)?);
        Ok(())
    }

    /// Fetch a fresh copy of the member's role.
    ///
    /// # Errors
    ///
    /// Propagates the repository error untouched.
    pub async fn load_role(
        &self,
        roles: &dyn RoleRepository,
    ) -> DomainResult<Option<PersonalUserRoleProps>> {
        match self.role() {
            Some(role) => Ok(Some(roles.get_personal_user_role_by_id(&role.id).await?)),
            None => Ok(None),
        }
    }
}

impl Aggregate for PersonalUser {
    fn take_integration_events(&mut self) -> Vec<IntegrationEvent> {
        self.root.take_integration_events()
    }
}

/// Creation phase of a [`PersonalUser`].
#[derive(Debug)]
pub struct PersonalUserDraft {
    passport: Arc<dyn Passport>,
    props: PersonalUserProps,
}

impl PersonalUserDraft {
    #[must_use]
    pub fn new(passport: Arc<dyn Passport>, id: UserId, account: UserAccount) -> Self {
        let now = Utc::now();
        Self {
            passport,
            props: PersonalUserProps {
                id,
                is_blocked: false,
                has_completed_onboarding: false,
                account,
                role: None,
                created_at: now,
                updated_at: now,
            },
        }
    }

    pub fn set_role(&mut self, role: Option<PersonalUserRoleProps>) -> DomainResult<()> {
        self.props.role = Some(require("role", role)?);
        Ok(())
    }

    #[must_use]
    pub fn finalize(self) -> PersonalUser {
        PersonalUser::new(self.props, self.passport)
    }
}

// ============================================================================
// ADMIN USER
// ============================================================================

/// An administrator.
#[derive(Debug, PartialEq)]
pub struct AdminUser {
    root: AggregateRoot<AdminUserProps, UserDomainPermissions>,
}

impl AdminUser {
    #[must_use]
    pub fn new(props: AdminUserProps, passport: Arc<dyn Passport>) -> Self {
        let visa = passport.user().for_user(&UserVisaTarget { user_id: &props.id });
        Self {
            root: AggregateRoot::new(props, passport, visa),
        }
    }

    /// # Errors
    ///
    /// Fails when `role` is missing.
    pub fn new_instance(
        passport: Arc<dyn Passport>,
        id: UserId,
        account: UserAccount,
        role: Option<AdminRoleProps>,
    ) -> DomainResult<Self> {
        let mut draft = AdminUserDraft::new(passport, id, account);
        draft.set_role(role)?;
        Ok(draft.finalize())
    }

    #[must_use]
    pub const fn id(&self) -> &UserId {
        &self.root.props().id
    }

    #[must_use]
    pub const fn account(&self) -> &UserAccount {
        &self.root.props().account
    }

    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        self.root.props().is_blocked
    }

    #[must_use]
    pub const fn role(&self) -> Option<&AdminRoleProps> {
        self.root.props().role.as_ref()
    }

    #[must_use]
    pub const fn props(&self) -> &AdminUserProps {
        self.root.props()
    }

    pub fn set_email(&mut self, email: Email) -> DomainResult<()> {
        self.root
            .guard("email", ADMIN_USER, |p| p.is_editing_own_account)?;
        self.root.props_mut().account.email = email;
        Ok(())
    }

    pub fn set_username(&mut self, username: Username) -> DomainResult<()> {
        self.root
            .guard("username", ADMIN_USER, |p| p.is_editing_own_account)?;
        self.root.props_mut().account.username = username;
        Ok(())
    }

    pub fn set_blocked(&mut self, is_blocked: bool) -> DomainResult<()> {
        self.root
            .guard("blocked status", ADMIN_USER, |p| p.can_block_users)?;
        self.root.props_mut().is_blocked = is_blocked;
        tracing::debug!(user_id = %self.id(), is_blocked, "admin user blocked status changed");
        Ok(())
    }

    pub fn set_role(&mut self, role: Option<AdminRoleProps>) -> DomainResult<()> {
        self.root
            .guard("role", ADMIN_USER, |p| p.can_manage_user_roles)?;
        self.root.props_mut().role = Some(require("role", role)?);
        Ok(())
    }

    /// # Errors
    ///
    /// Propagates the repository error untouched.
    pub async fn load_role(&self, roles: &dyn RoleRepository) -> DomainResult<Option<AdminRoleProps>> {
        match self.role() {
            Some(role) => Ok(Some(roles.get_admin_role_by_id(&role.id).await?)),
            None => Ok(None),
        }
    }
}

impl Aggregate for AdminUser {
    fn take_integration_events(&mut self) -> Vec<IntegrationEvent> {
        self.root.take_integration_events()
    }
}

/// Creation phase of an [`AdminUser`].
#[derive(Debug)]
pub struct AdminUserDraft {
    passport: Arc<dyn Passport>,
    props: AdminUserProps,
}

impl AdminUserDraft {
    #[must_use]
    pub fn new(passport: Arc<dyn Passport>, id: UserId, account: UserAccount) -> Self {
        let now = Utc::now();
        Self {
            passport,
            props: AdminUserProps {
                id,
                is_blocked: false,
                account,
                role: None,
                created_at: now,
                updated_at: now,
            },
        }
    }

    pub fn set_role(&mut self, role: Option<AdminRoleProps>) -> DomainResult<()> {
        self.props.role = Some(require("role", role)?);
        Ok(())
    }

    #[must_use]
    pub fn finalize(self) -> AdminUser {
        AdminUser::new(self.props, self.passport)
    }
}

// ============================================================================
// USER VIEW
// ============================================================================

/// A user reference resolved into the aggregate matching its `userType`.
#[derive(Debug, PartialEq)]
pub enum UserView {
    PersonalUser(PersonalUser),
    AdminUser(AdminUser),
}

impl UserView {
    #[must_use]
    pub const fn id(&self) -> &UserId {
        match self {
            Self::PersonalUser(user) => user.id(),
            Self::AdminUser(user) => user.id(),
        }
    }

    #[must_use]
    pub const fn account(&self) -> &UserAccount {
        match self {
            Self::PersonalUser(user) => user.account(),
            Self::AdminUser(user) => user.account(),
        }
    }

    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        match self {
            Self::PersonalUser(user) => user.is_blocked(),
            Self::AdminUser(user) => user.is_blocked(),
        }
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::AdminUser(_))
    }
}

/// Build a fresh view of `raw` for `passport`. Never cached.
#[must_use]
pub fn resolve_user_view(raw: &UserRecord, passport: &Arc<dyn Passport>) -> UserView {
    match raw {
        UserRecord::PersonalUser(props) => {
            UserView::PersonalUser(PersonalUser::new(props.clone(), Arc::clone(passport)))
        }
        UserRecord::AdminUser(props) => {
            UserView::AdminUser(AdminUser::new(props.clone(), Arc::clone(passport)))
        }
    }
}
