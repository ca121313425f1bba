// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::principal::PrincipalId;
use crate::role::Privilege;

/// Whether an ACL entry grants or withholds its privilege.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum Disposition {
    Allow,
    Deny,
}

/// An explicit allow or deny record associating a principal with a privilege
/// level on a content item.
///
/// Removal from a role is modelled as an explicit deny layered over any
/// prior allow, not as entry deletion, so multiple entries per principal may
/// exist.
#[derive(Clone, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclEntry {
    pub principal: PrincipalId,
    pub privilege: Privilege,
    pub disposition: Disposition,
}

impl AclEntry {
    pub fn allow(principal: impl Into<PrincipalId>, privilege: Privilege) -> Self {
        Self {
            principal: principal.into(),
            privilege,
            disposition: Disposition::Allow,
        }
    }

    pub fn deny(principal: impl Into<PrincipalId>, privilege: Privilege) -> Self {
        Self {
            principal: principal.into(),
            privilege,
            disposition: Disposition::Deny,
        }
    }

    pub fn is_allow(&self) -> bool {
        self.disposition == Disposition::Allow
    }
}

/// The ordered access-control entries of one policy object.
///
/// The permission store returns effective policies with the item-level
/// policy first; only that primary policy is consulted when listing members,
/// so results describe the item itself rather than an aggregate of its
/// ancestors.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPolicy {
    entries: Vec<AclEntry>,
}

impl AccessPolicy {
    pub fn new(entries: Vec<AclEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[AclEntry] {
        &self.entries
    }

    pub fn push(&mut self, entry: AclEntry) {
        self.entries.push(entry);
    }

    /// Remove all entries for this principal and privilege, regardless of
    /// disposition. Returns `true` when anything was removed.
    pub fn clear(&mut self, principal: &PrincipalId, privilege: Privilege) -> bool {
        let before = self.entries.len();
        self.entries
            .retain(|entry| !(entry.principal == *principal && entry.privilege == privilege));
        self.entries.len() != before
    }

    /// Whether the principal effectively holds the privilege: an allow entry
    /// exists and no deny entry overrides it.
    pub fn is_allowed(&self, principal: &PrincipalId, privilege: Privilege) -> bool {
        let mut allowed = false;
        for entry in &self.entries {
            if entry.principal != *principal || entry.privilege != privilege {
                continue;
            }
            match entry.disposition {
                Disposition::Allow => allowed = true,
                // Deny overrides any allow for the same privilege.
                Disposition::Deny => return false,
            }
        }
        allowed
    }

    /// Partition principals into manager and viewer sets.
    ///
    /// A principal effectively holding full control is a manager; otherwise,
    /// one effectively holding read-only access is a viewer. A principal
    /// holding neither is excluded. Classification is manager-first, so a
    /// principal granted both privileges is reported once, as a manager.
    pub fn partition_roles(&self) -> (BTreeSet<PrincipalId>, BTreeSet<PrincipalId>) {
        let mut managers = BTreeSet::new();
        let mut viewers = BTreeSet::new();

        let principals: BTreeSet<_> = self
            .entries
            .iter()
            .filter(|entry| entry.is_allow())
            .map(|entry| entry.principal.clone())
            .collect();

        for principal in principals {
            if self.is_allowed(&principal, Privilege::FullControl) {
                managers.insert(principal);
            } else if self.is_allowed(&principal, Privilege::ReadOnly) {
                viewers.insert(principal);
            }
        }

        (managers, viewers)
    }
}
