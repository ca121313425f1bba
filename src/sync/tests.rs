// SPDX-License-Identifier: MIT OR Apache-2.0

use assert_matches::assert_matches;

use crate::acl::{AccessPolicy, AclEntry, Disposition};
use crate::item::ItemPath;
use crate::memory::{MemoryMembershipStore, MemoryPermissionStore, MemorySession};
use crate::principal::{ANONYMOUS_ID, Caller, PrincipalId};
use crate::role::{Privilege, Role};
use crate::sync::{AccessSynchronizer, MembershipRequest, RoleChange, SyncError, UpdateOutcome};
use crate::test_utils::StaticResolver;
use crate::traits::{MembershipStore, PermissionStore};

type TestSynchronizer =
    AccessSynchronizer<MemoryPermissionStore, MemoryMembershipStore, StaticResolver>;

fn item() -> ItemPath {
    ItemPath::from("/pooled/content/file")
}

/// Membership starts as managers = {alice}, viewers = {bob}, with matching
/// grant entries provisioned on the item.
fn fixture() -> TestSynchronizer {
    crate::test_utils::setup_logging();

    let permissions = MemoryPermissionStore::new();
    permissions.provision(
        item(),
        AccessPolicy::new(vec![
            AclEntry::allow("alice", Privilege::FullControl),
            AclEntry::allow("bob", Privilege::ReadOnly),
        ]),
    );

    let membership = MemoryMembershipStore::new();
    membership
        .write(&item(), Role::Manager, &["alice".into()])
        .unwrap();
    membership
        .write(&item(), Role::Viewer, &["bob".into()])
        .unwrap();

    let resolver = StaticResolver::with_principals(&["alice", "bob", "charly", "carol"]);
    AccessSynchronizer::new(permissions, membership, resolver)
}

fn login(sync: &TestSynchronizer, id: &str) -> Caller<MemorySession> {
    Caller::new(PrincipalId::from(id), sync.permissions().login(id))
}

fn names(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

fn member_ids(records: &[crate::MemberInfo]) -> Vec<&str> {
    records.iter().map(|info| info.id.as_str()).collect()
}

#[test]
fn list_members_partitions_by_privilege() {
    let sync = fixture();

    let membership = sync.list_members(&item()).unwrap();
    assert_eq!(member_ids(&membership.managers), vec!["alice"]);
    assert_eq!(member_ids(&membership.viewers), vec!["bob"]);
}

#[test]
fn manager_adds_a_manager() {
    let sync = fixture();
    let alice = login(&sync, "alice");

    // Alice is already a manager; her entry is a no-op add.
    let outcome = sync
        .update_members(
            &item(),
            &alice,
            Role::Manager,
            &names(&["charly", "alice"]),
            &[],
        )
        .unwrap();
    assert_eq!(outcome, UpdateOutcome::Committed);

    let membership = sync.list_members(&item()).unwrap();
    assert_eq!(member_ids(&membership.managers), vec!["alice", "charly"]);
    assert_eq!(member_ids(&membership.viewers), vec!["bob"]);

    // The directory mirror preserves display order.
    let roster = sync.directory().snapshot(&item(), Role::Manager).unwrap();
    assert_eq!(roster, vec![PrincipalId::from("alice"), "charly".into()]);
}

#[test]
fn removing_a_manager_records_a_deny() {
    let sync = fixture();
    let alice = login(&sync, "alice");

    let outcome = sync
        .update_members(&item(), &alice, Role::Manager, &[], &names(&["alice"]))
        .unwrap();
    assert_eq!(outcome, UpdateOutcome::Committed);

    let membership = sync.list_members(&item()).unwrap();
    assert!(membership.managers.is_empty());
    assert_eq!(member_ids(&membership.viewers), vec!["bob"]);
    assert!(
        sync.directory()
            .snapshot(&item(), Role::Manager)
            .unwrap()
            .is_empty()
    );

    // Removal layers an explicit deny at the full-control level rather than
    // deleting entries.
    let policies = sync.permissions().effective_policies(&item()).unwrap();
    assert!(policies[0].entries().iter().any(|entry| {
        entry.principal.as_str() == "alice"
            && entry.privilege == Privilege::FullControl
            && entry.disposition == Disposition::Deny
    }));
}

#[test]
fn caller_without_full_control_cannot_touch_managers() {
    let sync = fixture();
    let bob = login(&sync, "bob");

    // Silently skipped, not an error.
    let outcome = sync
        .update_members(&item(), &bob, Role::Manager, &names(&["carol"]), &[])
        .unwrap();
    assert_eq!(outcome, UpdateOutcome::NoChanges);

    let membership = sync.list_members(&item()).unwrap();
    assert_eq!(member_ids(&membership.managers), vec!["alice"]);

    // The same caller may still extend read access.
    let outcome = sync
        .update_members(&item(), &bob, Role::Viewer, &names(&["carol"]), &[])
        .unwrap();
    assert_eq!(outcome, UpdateOutcome::Committed);

    let membership = sync.list_members(&item()).unwrap();
    assert_eq!(member_ids(&membership.viewers), vec!["bob", "carol"]);
}

#[test]
fn combined_request_applies_viewer_and_gates_manager() {
    let sync = fixture();
    let bob = login(&sync, "bob");

    let request = MembershipRequest {
        viewer: RoleChange::new(names(&["carol"]), vec![]),
        manager: RoleChange::new(names(&["carol"]), vec![]),
    };
    let outcome = sync.apply_request(&item(), &bob, &request).unwrap();
    assert_eq!(outcome, UpdateOutcome::Committed);

    let membership = sync.list_members(&item()).unwrap();
    assert_eq!(member_ids(&membership.managers), vec!["alice"]);
    assert_eq!(member_ids(&membership.viewers), vec!["bob", "carol"]);
}

#[test]
fn unresolvable_names_are_dropped() {
    let sync = fixture();
    let alice = login(&sync, "alice");

    let outcome = sync
        .update_members(&item(), &alice, Role::Viewer, &names(&["ghost"]), &[])
        .unwrap();
    assert_eq!(outcome, UpdateOutcome::NoChanges);

    let membership = sync.list_members(&item()).unwrap();
    assert_eq!(member_ids(&membership.viewers), vec!["bob"]);
}

#[test]
fn anonymous_callers_are_rejected_before_any_store_access() {
    let sync = fixture();
    let anonymous = login(&sync, ANONYMOUS_ID);

    let result = sync.update_members(
        &item(),
        &anonymous,
        Role::Viewer,
        &names(&["carol"]),
        &[],
    );
    assert_matches!(result, Err(SyncError::Unauthorized));

    // No escalation happened and nothing changed.
    assert_eq!(sync.permissions().live_escalations(), 0);
    let membership = sync.list_members(&item()).unwrap();
    assert_eq!(member_ids(&membership.viewers), vec!["bob"]);
}

#[test]
fn re_adding_a_member_changes_nothing() {
    let sync = fixture();
    let alice = login(&sync, "alice");

    let entries_before = sync.permissions().effective_policies(&item()).unwrap()[0]
        .entries()
        .len();

    let outcome = sync
        .update_members(&item(), &alice, Role::Manager, &names(&["alice"]), &[])
        .unwrap();
    assert_eq!(outcome, UpdateOutcome::NoChanges);

    let entries_after = sync.permissions().effective_policies(&item()).unwrap()[0]
        .entries()
        .len();
    assert_eq!(entries_before, entries_after);
}

#[test]
fn removing_an_absent_member_leaves_no_spurious_deny() {
    let sync = fixture();
    let alice = login(&sync, "alice");

    let outcome = sync
        .update_members(&item(), &alice, Role::Manager, &[], &names(&["charly"]))
        .unwrap();
    assert_eq!(outcome, UpdateOutcome::NoChanges);

    let policies = sync.permissions().effective_policies(&item()).unwrap();
    assert!(
        !policies[0]
            .entries()
            .iter()
            .any(|entry| entry.principal.as_str() == "charly")
    );
}

#[test]
fn removal_wins_when_the_lists_overlap() {
    let sync = fixture();
    let alice = login(&sync, "alice");

    let outcome = sync
        .update_members(
            &item(),
            &alice,
            Role::Manager,
            &names(&["charly"]),
            &names(&["charly"]),
        )
        .unwrap();
    assert_eq!(outcome, UpdateOutcome::NoChanges);

    let membership = sync.list_members(&item()).unwrap();
    assert_eq!(member_ids(&membership.managers), vec!["alice"]);
}

#[test]
fn missing_policy_is_store_unavailable() {
    let sync = AccessSynchronizer::new(
        MemoryPermissionStore::new(),
        MemoryMembershipStore::new(),
        StaticResolver::with_principals(&["alice"]),
    );

    let result = sync.list_members(&item());
    assert_matches!(result, Err(SyncError::StoreUnavailable(path)) if path == item());
}

#[test]
fn unknown_profile_fails_rendering() {
    let sync = fixture();
    // Grant entry for a principal the resolver has no profile record for.
    sync.permissions().provision(
        item(),
        AccessPolicy::new(vec![AclEntry::allow("zed", Privilege::ReadOnly)]),
    );

    let result = sync.list_members(&item());
    assert_matches!(result, Err(SyncError::Render(principal, _)) if principal.as_str() == "zed");
}

#[test]
fn escalated_session_is_released_when_the_commit_fails() {
    let sync = fixture();
    let alice = login(&sync, "alice");

    sync.permissions().fail_commits(true);
    let result = sync.update_members(&item(), &alice, Role::Viewer, &names(&["carol"]), &[]);
    assert_matches!(result, Err(SyncError::Permissions(path, _)) if path == item());

    assert_eq!(sync.permissions().live_escalations(), 0);
    // The directory was not touched either.
    let roster = sync.directory().snapshot(&item(), Role::Viewer).unwrap();
    assert_eq!(roster, vec![PrincipalId::from("bob")]);
}

#[test]
fn membership_serializes_for_transport() {
    let sync = fixture();
    let membership = sync.list_members(&item()).unwrap();

    let json = serde_json::to_value(&membership).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "managers": [{ "id": "alice", "name": "alice" }],
            "viewers": [{ "id": "bob", "name": "bob" }],
        })
    );
}
