// SPDX-License-Identifier: MIT OR Apache-2.0

//! The access synchronizer: keeps the permission store and the membership
//! directory consistent for the manager/viewer roles of a pooled content
//! item.

#[cfg(test)]
mod tests;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::acl::AccessPolicy;
use crate::directory::{MembershipDirectory, Roster};
use crate::item::ItemPath;
use crate::principal::{Caller, MemberInfo, PrincipalId};
use crate::role::{Privilege, Role};
use crate::session::EscalatedSession;
use crate::traits::{MembershipStore, PermissionStore, PrincipalResolver};

/// Error types for the access synchronizer.
///
/// Nothing here is retried internally; retrying the whole request is the
/// caller's responsibility.
#[derive(Debug, Error)]
pub enum SyncError<PE, DE, RE>
where
    PE: std::error::Error,
    DE: std::error::Error,
    RE: std::error::Error,
{
    #[error("anonymous users cannot manipulate pooled content")]
    Unauthorized,

    #[error("could not look up an access policy for {0}")]
    StoreUnavailable(ItemPath),

    #[error("permission store operation failed for {0}: {1}")]
    Permissions(ItemPath, PE),

    #[error("membership directory operation failed for {0}: {1}")]
    Directory(ItemPath, DE),

    #[error("could not render member record for {0}: {1}")]
    Render(PrincipalId, RE),
}

type SyncResult<T, P, D, R> = Result<
    T,
    SyncError<
        <P as PermissionStore>::Error,
        <D as MembershipStore>::Error,
        <R as PrincipalResolver>::Error,
    >,
>;

/// Current membership of an item, rendered as compact display records.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub managers: Vec<MemberInfo>,
    pub viewers: Vec<MemberInfo>,
}

/// Requested additions and removals for one role, as unresolved principal
/// names. The lists may overlap and may be empty; removals win over
/// additions for the same principal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleChange {
    pub add: Vec<String>,
    pub remove: Vec<String>,
}

impl RoleChange {
    pub fn new(add: Vec<String>, remove: Vec<String>) -> Self {
        Self { add, remove }
    }

    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }
}

/// A full membership update request, covering both roles at once the way
/// one inbound request may.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipRequest {
    pub viewer: RoleChange,
    pub manager: RoleChange,
}

/// Status marker reported by a successful membership update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Changes were persisted to the permission store and/or the membership
    /// directory.
    Committed,

    /// The request resolved to no effective change; no commit was issued.
    NoChanges,
}

/// Orchestrates membership reads and writes across the permission store,
/// the membership directory and the principal resolver.
///
/// Stateless between calls: all state lives in the backing stores, which
/// also own concurrency control. Two concurrent updates on the same item may
/// interleave at the level of individual grant/deny and directory
/// operations; each single invocation commits as one transactional unit.
#[derive(Debug)]
pub struct AccessSynchronizer<P, D, R> {
    permissions: P,
    directory: MembershipDirectory<D>,
    resolver: R,
}

impl<P, D, R> AccessSynchronizer<P, D, R>
where
    P: PermissionStore,
    D: MembershipStore,
    R: PrincipalResolver,
{
    pub fn new(permissions: P, directory_store: D, resolver: R) -> Self {
        Self {
            permissions,
            directory: MembershipDirectory::new(directory_store),
            resolver,
        }
    }

    pub fn permissions(&self) -> &P {
        &self.permissions
    }

    pub fn directory(&self) -> &MembershipDirectory<D> {
        &self.directory
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// List the managers and viewers of an item.
    ///
    /// Reads the item's primary, item-level policy only; inherited policies
    /// are not aggregated, so the result describes this item rather than its
    /// ancestors. A principal effectively holding full control is listed as
    /// a manager, otherwise one holding read-only access as a viewer.
    pub fn list_members(&self, item: &ItemPath) -> SyncResult<Membership, P, D, R> {
        let policies = self.permissions.effective_policies(item).map_err(|err| {
            warn!(item = %item, "could not retrieve policies: {err}");
            SyncError::StoreUnavailable(item.clone())
        })?;

        // Entries for the item itself are always in the first policy.
        let Some(policy) = policies.into_iter().next() else {
            return Err(SyncError::StoreUnavailable(item.clone()));
        };

        let (managers, viewers) = policy.partition_roles();
        Ok(Membership {
            managers: self.describe_all(managers)?,
            viewers: self.describe_all(viewers)?,
        })
    }

    /// Apply additions and removals to one role's membership.
    ///
    /// See [`apply_request`](Self::apply_request) for the semantics; this is
    /// the single-role form of the same operation.
    pub fn update_members(
        &self,
        item: &ItemPath,
        caller: &Caller<P::Session>,
        role: Role,
        to_add: &[String],
        to_remove: &[String],
    ) -> SyncResult<UpdateOutcome, P, D, R> {
        let change = RoleChange::new(to_add.to_vec(), to_remove.to_vec());
        let request = match role {
            Role::Viewer => MembershipRequest {
                viewer: change,
                ..Default::default()
            },
            Role::Manager => MembershipRequest {
                manager: change,
                ..Default::default()
            },
        };
        self.apply_request(item, caller, &request)
    }

    /// Apply a full membership update request.
    ///
    /// Anonymous callers are rejected before any store is touched. Requested
    /// names that do not resolve to a principal are dropped silently.
    ///
    /// The viewer portion applies for any caller who can reach this
    /// operation: read access is sufficient to extend read access to others.
    /// The manager portion applies only when the caller effectively holds
    /// full control on the item, checked against the caller's own session;
    /// otherwise it is skipped silently and the viewer portion still
    /// applies.
    ///
    /// All permission mutations are staged on a privilege-escalated session
    /// and committed as one unit; the membership directory is mirrored
    /// afterwards. If nothing changed, no commit is issued. The escalated
    /// session is released on every exit path.
    pub fn apply_request(
        &self,
        item: &ItemPath,
        caller: &Caller<P::Session>,
        request: &MembershipRequest,
    ) -> SyncResult<UpdateOutcome, P, D, R> {
        // Callers should never get this far unauthenticated; re-checked here
        // defensively.
        if caller.is_anonymous() {
            return Err(SyncError::Unauthorized);
        }

        match self.apply_request_inner(item, caller, request) {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                error!(item = %item, "could not update membership: {err}");
                Err(err)
            }
        }
    }

    fn apply_request_inner(
        &self,
        item: &ItemPath,
        caller: &Caller<P::Session>,
        request: &MembershipRequest,
    ) -> SyncResult<UpdateOutcome, P, D, R> {
        // The policy as currently committed, used to skip grants already in
        // effect and denies for principals holding nothing. An item without
        // a policy yet is treated as an empty one here.
        let policy = self
            .permissions
            .effective_policies(item)
            .map_err(|err| SyncError::Permissions(item.clone(), err))?
            .into_iter()
            .next()
            .unwrap_or_default();

        // Escalated because the caller may legitimately hold only read
        // access on the item, which is not enough to write its ACL.
        let mut admin = EscalatedSession::acquire(&self.permissions)
            .map_err(|err| SyncError::Permissions(item.clone(), err))?;

        let viewer_roster =
            self.apply_role(item, caller, Role::Viewer, &request.viewer, &policy, &mut admin)?;

        let manager_roster = if request.manager.is_empty() {
            None
        } else if self
            .permissions
            .has_privilege(caller.session(), item, Privilege::FullControl)
            .map_err(|err| SyncError::Permissions(item.clone(), err))?
        {
            self.apply_role(item, caller, Role::Manager, &request.manager, &policy, &mut admin)?
        } else {
            debug!(
                item = %item,
                caller = %caller.principal(),
                "caller lacks full control, skipping manager changes"
            );
            None
        };

        let committed = admin
            .commit_pending()
            .map_err(|err| SyncError::Permissions(item.clone(), err))?;

        // Mirror into the directory once the grants are committed. A failure
        // from here on leaves the ACL committed and the directory behind;
        // the directory is advisory state and reconciled by the next
        // successful update.
        let mut changed = committed;
        for (role, roster) in [
            (Role::Viewer, viewer_roster),
            (Role::Manager, manager_roster),
        ] {
            if let Some(roster) = roster {
                changed |= self
                    .directory
                    .persist(item, role, &roster)
                    .map_err(|err| SyncError::Directory(item.clone(), err))?;
            }
        }

        Ok(if changed {
            UpdateOutcome::Committed
        } else {
            UpdateOutcome::NoChanges
        })
    }

    /// Stage the permission mutations for one role and edit its roster.
    ///
    /// Additions grant the role's privilege; removals record an explicit
    /// deny over any prior allow rather than deleting entries.
    fn apply_role(
        &self,
        item: &ItemPath,
        caller: &Caller<P::Session>,
        role: Role,
        change: &RoleChange,
        policy: &AccessPolicy,
        admin: &mut EscalatedSession<P>,
    ) -> SyncResult<Option<Roster>, P, D, R> {
        if change.is_empty() {
            return Ok(None);
        }

        let privilege = role.privilege();
        let to_add = self.resolve_names(caller.principal(), &change.add);
        let to_remove = self.resolve_names(caller.principal(), &change.remove);
        // The lists may overlap; removals win.
        let to_add: BTreeSet<_> = to_add.difference(&to_remove).cloned().collect();

        let mut roster = self
            .directory
            .load(item, role)
            .map_err(|err| SyncError::Directory(item.clone(), err))?;

        for principal in &to_add {
            if !policy.is_allowed(principal, privilege) {
                self.permissions
                    .grant(admin.session_mut(), item, principal, privilege)
                    .map_err(|err| SyncError::Permissions(item.clone(), err))?;
            }
            roster.add(principal.clone());
        }

        for principal in &to_remove {
            // Only deny a privilege the principal effectively holds;
            // removing an absent member must not leave a spurious deny
            // entry.
            if policy.is_allowed(principal, privilege) {
                self.permissions
                    .deny(admin.session_mut(), item, principal, privilege)
                    .map_err(|err| SyncError::Permissions(item.clone(), err))?;
            }
            roster.remove(principal);
        }

        Ok(Some(roster))
    }

    /// Resolve requested names to canonical principals, dropping unknown
    /// names silently.
    fn resolve_names(&self, viewer: &PrincipalId, names: &[String]) -> BTreeSet<PrincipalId> {
        let mut principals = BTreeSet::new();
        for name in names {
            match self.resolver.resolve(viewer, name) {
                Some(principal) => {
                    principals.insert(principal);
                }
                None => debug!(%viewer, name, "dropping unresolvable principal name"),
            }
        }
        principals
    }

    fn describe_all(
        &self,
        principals: BTreeSet<PrincipalId>,
    ) -> SyncResult<Vec<MemberInfo>, P, D, R> {
        let mut records = Vec::with_capacity(principals.len());
        for principal in principals {
            let record = self
                .resolver
                .describe(&principal)
                .map_err(|err| SyncError::Render(principal.clone(), err))?;
            records.push(record);
        }
        Ok(records)
    }
}
