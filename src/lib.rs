// SPDX-License-Identifier: MIT OR Apache-2.0

//! Membership and ACL synchronisation for pooled shared content.
//!
//! A pooled content item has two roles: _managers_ with full control and
//! _viewers_ with read-only access. This crate keeps two representations of
//! that membership consistent: the enforcement-time permission store
//! (allow/deny entries per principal and privilege) and the display-time
//! membership directory (ordered, deduplicated principal lists per role).
//!
//! The [`AccessSynchronizer`] orchestrates both: it resolves requested
//! principal names, authorizes the caller, applies grant/deny mutations
//! through a privilege-escalated session and mirrors the result into the
//! membership directory. Backends are supplied through the contracts in
//! [`traits`]; in-memory reference implementations live in [`memory`].

mod acl;
mod directory;
mod item;
pub mod memory;
mod principal;
mod role;
mod session;
mod sync;
#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
pub mod traits;

pub use acl::{AccessPolicy, AclEntry, Disposition};
pub use directory::{MembershipDirectory, Roster};
pub use item::ItemPath;
pub use principal::{ANONYMOUS_ID, Caller, MemberInfo, PrincipalId};
pub use role::{Privilege, Role};
pub use session::EscalatedSession;
pub use sync::{
    AccessSynchronizer, Membership, MembershipRequest, RoleChange, SyncError, UpdateOutcome,
};
