// SPDX-License-Identifier: MIT OR Apache-2.0

use std::error::Error;

use crate::acl::AccessPolicy;
use crate::item::ItemPath;
use crate::principal::PrincipalId;
use crate::role::Privilege;

/// Contract of the enforcement-time permission store.
///
/// Mutations are staged on a session and become visible only on
/// [`commit`](PermissionStore::commit). Sessions obtained through
/// [`escalate`](PermissionStore::escalate) may write regardless of the
/// caller's own rights and must be handed back through
/// [`release`](PermissionStore::release) — use
/// [`EscalatedSession`](crate::EscalatedSession) rather than calling the two
/// directly.
pub trait PermissionStore {
    /// An authenticated execution context against the store.
    type Session;

    type Error: Error;

    /// Effective policies for an item, the primary item-level policy first.
    ///
    /// An empty result means no policy object could be retrieved for the
    /// item.
    fn effective_policies(&self, item: &ItemPath) -> Result<Vec<AccessPolicy>, Self::Error>;

    /// Whether the session's own identity effectively holds the privilege on
    /// the item.
    fn has_privilege(
        &self,
        session: &Self::Session,
        item: &ItemPath,
        privilege: Privilege,
    ) -> Result<bool, Self::Error>;

    /// Stage an allow entry for the principal.
    fn grant(
        &self,
        session: &mut Self::Session,
        item: &ItemPath,
        principal: &PrincipalId,
        privilege: Privilege,
    ) -> Result<(), Self::Error>;

    /// Stage a deny entry for the principal.
    fn deny(
        &self,
        session: &mut Self::Session,
        item: &ItemPath,
        principal: &PrincipalId,
        privilege: Privilege,
    ) -> Result<(), Self::Error>;

    /// Whether the session holds staged, uncommitted mutations.
    fn has_pending_changes(&self, session: &Self::Session) -> bool;

    /// Persist all staged mutations in one transactional unit.
    fn commit(&self, session: &mut Self::Session) -> Result<(), Self::Error>;

    /// Open a privilege-escalated session. Never shared or pooled; acquired
    /// per request and released on every exit path.
    fn escalate(&self) -> Result<Self::Session, Self::Error>;

    /// Hand a session back to the store. Staged mutations that were not
    /// committed are abandoned.
    fn release(&self, session: Self::Session);
}
