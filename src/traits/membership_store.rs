// SPDX-License-Identifier: MIT OR Apache-2.0

use std::error::Error;

use crate::item::ItemPath;
use crate::principal::PrincipalId;
use crate::role::Role;

/// Backend contract of the display-time membership directory.
///
/// Holds one ordered principal list per (item, role). The directory is
/// advisory, denormalized state mirroring the permission store's grants for
/// fast listing; it is not the authorization source of truth.
pub trait MembershipStore {
    type Error: Error;

    /// Current member list for the role, in display order. An item without a
    /// membership record yields an empty list.
    fn read(&self, item: &ItemPath, role: Role) -> Result<Vec<PrincipalId>, Self::Error>;

    /// Replace the member list for the role.
    fn write(
        &self,
        item: &ItemPath,
        role: Role,
        members: &[PrincipalId],
    ) -> Result<(), Self::Error>;
}
