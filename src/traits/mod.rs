// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contracts for the external collaborators the synchronizer depends on:
//! the permission store, the membership directory backend and the principal
//! resolver.

mod membership_store;
mod permission_store;
mod resolver;

pub use membership_store::MembershipStore;
pub use permission_store::PermissionStore;
pub use resolver::PrincipalResolver;
