// SPDX-License-Identifier: MIT OR Apache-2.0

use std::error::Error;

use crate::principal::{MemberInfo, PrincipalId};

/// Contract of the principal directory.
///
/// Resolution is scoped to the calling principal since group visibility may
/// differ per caller.
pub trait PrincipalResolver {
    type Error: Error;

    /// Map a role-claim name to a canonical principal identity.
    ///
    /// `None` means the name is unknown to the directory. That is routine
    /// input hygiene, not an error: callers silently drop such names.
    fn resolve(&self, viewer: &PrincipalId, name: &str) -> Option<PrincipalId>;

    /// Produce the compact display record for a principal.
    fn describe(&self, id: &PrincipalId) -> Result<MemberInfo, Self::Error>;
}
