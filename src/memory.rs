// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory reference backends for the permission store and membership
//! directory contracts.
//!
//! Useful as test fixtures and as a blueprint for real storage-engine
//! bindings. Maps are guarded by locks so concurrent workers interleave at
//! entry granularity; no cross-request ordering is provided.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use thiserror::Error;

use crate::acl::{AccessPolicy, AclEntry};
use crate::item::ItemPath;
use crate::principal::PrincipalId;
use crate::role::{Privilege, Role};
use crate::traits::{MembershipStore, PermissionStore};

/// Identity the in-memory store runs escalated sessions under.
const SYSTEM_ID: &str = "system";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MemoryStoreError {
    #[error("session for {0} is not escalated and cannot write")]
    NotEscalated(PrincipalId),

    #[error("commit to the permission store failed")]
    CommitFailed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum StagedChange {
    Grant {
        item: ItemPath,
        principal: PrincipalId,
        privilege: Privilege,
    },
    Deny {
        item: ItemPath,
        principal: PrincipalId,
        privilege: Privilege,
    },
}

/// A session against the in-memory permission store.
///
/// Mutations are staged here and applied to the shared state on commit.
#[derive(Debug)]
pub struct MemorySession {
    principal: PrincipalId,
    escalated: bool,
    staged: Vec<StagedChange>,
}

impl MemorySession {
    pub fn principal(&self) -> &PrincipalId {
        &self.principal
    }

    pub fn is_escalated(&self) -> bool {
        self.escalated
    }
}

/// HashMap-backed [`PermissionStore`].
///
/// Commits apply replace-on-write semantics: a grant clears a matching deny
/// entry before adding the allow and a deny clears a matching allow, so a
/// removed member can later be re-added. Effective evaluation treats a
/// present deny as overriding an allow.
#[derive(Debug, Default)]
pub struct MemoryPermissionStore {
    acls: RwLock<HashMap<ItemPath, AccessPolicy>>,
    live_escalations: AtomicUsize,
    fail_commits: AtomicBool,
}

impl MemoryPermissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session bound to the given principal's own rights.
    pub fn login(&self, principal: impl Into<PrincipalId>) -> MemorySession {
        MemorySession {
            principal: principal.into(),
            escalated: false,
            staged: Vec::new(),
        }
    }

    /// Install an item-level policy, as content provisioning would at
    /// creation time.
    pub fn provision(&self, item: ItemPath, policy: AccessPolicy) {
        self.acls
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(item, policy);
    }

    /// Number of escalated sessions currently held by callers.
    pub fn live_escalations(&self) -> usize {
        self.live_escalations.load(Ordering::SeqCst)
    }

    /// Make subsequent commits fail.
    #[cfg(any(test, feature = "test_utils"))]
    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    fn apply(policy: &mut AccessPolicy, change: &StagedChange) {
        match change {
            StagedChange::Grant {
                principal,
                privilege,
                ..
            } => {
                policy.clear(principal, *privilege);
                policy.push(AclEntry::allow(principal.clone(), *privilege));
            }
            StagedChange::Deny {
                principal,
                privilege,
                ..
            } => {
                policy.clear(principal, *privilege);
                policy.push(AclEntry::deny(principal.clone(), *privilege));
            }
        }
    }

    fn stage(session: &mut MemorySession, change: StagedChange) -> Result<(), MemoryStoreError> {
        if !session.escalated {
            return Err(MemoryStoreError::NotEscalated(session.principal.clone()));
        }
        if !session.staged.contains(&change) {
            session.staged.push(change);
        }
        Ok(())
    }
}

impl PermissionStore for MemoryPermissionStore {
    type Session = MemorySession;
    type Error = MemoryStoreError;

    fn effective_policies(&self, item: &ItemPath) -> Result<Vec<AccessPolicy>, Self::Error> {
        let acls = self.acls.read().unwrap_or_else(PoisonError::into_inner);
        Ok(acls.get(item).cloned().into_iter().collect())
    }

    fn has_privilege(
        &self,
        session: &Self::Session,
        item: &ItemPath,
        privilege: Privilege,
    ) -> Result<bool, Self::Error> {
        if session.escalated {
            return Ok(true);
        }
        let acls = self.acls.read().unwrap_or_else(PoisonError::into_inner);
        Ok(acls
            .get(item)
            .is_some_and(|policy| policy.is_allowed(&session.principal, privilege)))
    }

    fn grant(
        &self,
        session: &mut Self::Session,
        item: &ItemPath,
        principal: &PrincipalId,
        privilege: Privilege,
    ) -> Result<(), Self::Error> {
        Self::stage(
            session,
            StagedChange::Grant {
                item: item.clone(),
                principal: principal.clone(),
                privilege,
            },
        )
    }

    fn deny(
        &self,
        session: &mut Self::Session,
        item: &ItemPath,
        principal: &PrincipalId,
        privilege: Privilege,
    ) -> Result<(), Self::Error> {
        Self::stage(
            session,
            StagedChange::Deny {
                item: item.clone(),
                principal: principal.clone(),
                privilege,
            },
        )
    }

    fn has_pending_changes(&self, session: &Self::Session) -> bool {
        !session.staged.is_empty()
    }

    fn commit(&self, session: &mut Self::Session) -> Result<(), Self::Error> {
        if !session.escalated {
            return Err(MemoryStoreError::NotEscalated(session.principal.clone()));
        }
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(MemoryStoreError::CommitFailed);
        }

        let mut acls = self.acls.write().unwrap_or_else(PoisonError::into_inner);
        for change in session.staged.drain(..) {
            let item = match &change {
                StagedChange::Grant { item, .. } | StagedChange::Deny { item, .. } => item.clone(),
            };
            let policy = acls.entry(item).or_default();
            Self::apply(policy, &change);
        }

        Ok(())
    }

    fn escalate(&self) -> Result<Self::Session, Self::Error> {
        self.live_escalations.fetch_add(1, Ordering::SeqCst);
        Ok(MemorySession {
            principal: PrincipalId::from(SYSTEM_ID),
            escalated: true,
            staged: Vec::new(),
        })
    }

    fn release(&self, session: Self::Session) {
        if session.escalated {
            self.live_escalations.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

/// HashMap-backed [`MembershipStore`].
#[derive(Debug, Default)]
pub struct MemoryMembershipStore {
    lists: RwLock<HashMap<(ItemPath, Role), Vec<PrincipalId>>>,
}

impl MemoryMembershipStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MembershipStore for MemoryMembershipStore {
    type Error = MemoryStoreError;

    fn read(&self, item: &ItemPath, role: Role) -> Result<Vec<PrincipalId>, Self::Error> {
        let lists = self.lists.read().unwrap_or_else(PoisonError::into_inner);
        Ok(lists
            .get(&(item.clone(), role))
            .cloned()
            .unwrap_or_default())
    }

    fn write(
        &self,
        item: &ItemPath,
        role: Role,
        members: &[PrincipalId],
    ) -> Result<(), Self::Error> {
        let mut lists = self.lists.write().unwrap_or_else(PoisonError::into_inner);
        lists.insert((item.clone(), role), members.to_vec());
        Ok(())
    }
}
