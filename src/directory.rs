// SPDX-License-Identifier: MIT OR Apache-2.0

use tracing::debug;

use crate::item::ItemPath;
use crate::principal::PrincipalId;
use crate::role::Role;
use crate::traits::MembershipStore;

/// One role's member list loaded for editing.
///
/// Set semantics over a list that preserves display order: adds and removes
/// are idempotent and the roster tracks whether it diverged from what was
/// loaded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Roster {
    members: Vec<PrincipalId>,
    dirty: bool,
}

impl Roster {
    pub fn new(members: Vec<PrincipalId>) -> Self {
        Self {
            members,
            dirty: false,
        }
    }

    pub fn members(&self) -> &[PrincipalId] {
        &self.members
    }

    pub fn contains(&self, principal: &PrincipalId) -> bool {
        self.members.contains(principal)
    }

    /// Whether the roster has changed since it was loaded.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Append the principal unless already a member. Returns `true` when the
    /// roster changed.
    pub fn add(&mut self, principal: PrincipalId) -> bool {
        if self.contains(&principal) {
            return false;
        }
        self.members.push(principal);
        self.dirty = true;
        true
    }

    /// Drop the principal if present. Returns `true` when the roster
    /// changed.
    pub fn remove(&mut self, principal: &PrincipalId) -> bool {
        let before = self.members.len();
        self.members.retain(|member| member != principal);
        if self.members.len() == before {
            return false;
        }
        self.dirty = true;
        true
    }
}

/// The display-time membership directory, layered over a
/// [`MembershipStore`] backend.
///
/// Pure data operations with no authorization logic; callers are responsible
/// for invoking these only after the corresponding permission mutation has
/// been decided.
#[derive(Debug)]
pub struct MembershipDirectory<D> {
    store: D,
}

impl<D> MembershipDirectory<D>
where
    D: MembershipStore,
{
    pub fn new(store: D) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &D {
        &self.store
    }

    /// Load a role's roster for editing.
    pub fn load(&self, item: &ItemPath, role: Role) -> Result<Roster, D::Error> {
        Ok(Roster::new(self.store.read(item, role)?))
    }

    /// Write an edited roster back, skipping the write when nothing changed.
    ///
    /// Returns `true` when a write was issued.
    pub fn persist(&self, item: &ItemPath, role: Role, roster: &Roster) -> Result<bool, D::Error> {
        if !roster.is_dirty() {
            return Ok(false);
        }
        debug!(item = %item, %role, members = roster.members().len(), "updating membership list");
        self.store.write(item, role, roster.members())?;
        Ok(true)
    }

    /// Current member list for a role, in display order.
    pub fn snapshot(&self, item: &ItemPath, role: Role) -> Result<Vec<PrincipalId>, D::Error> {
        self.store.read(item, role)
    }
}
