// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// The two privilege levels tracked for pooled content.
///
/// Ordered such that `FullControl` includes everything `ReadOnly` does.
#[derive(Clone, Copy, Debug, Hash, PartialEq, PartialOrd, Eq, Ord, Serialize, Deserialize)]
pub enum Privilege {
    /// Permission to read the item.
    ReadOnly,

    /// Permission to do anything with the item, including sharing it.
    FullControl,
}

impl Display for Privilege {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Privilege::ReadOnly => "read-only",
            Privilege::FullControl => "full-control",
        };

        write!(f, "{}", s)
    }
}

/// Membership roles on a pooled content item.
///
/// This is a fixed, closed enumeration; the role to privilege mapping is
/// static configuration, not mutable state.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Read-only membership.
    Viewer,

    /// Full-control membership. Only managers may extend this role to
    /// others.
    Manager,
}

impl Role {
    /// The privilege level granted to members of this role.
    pub fn privilege(&self) -> Privilege {
        match self {
            Role::Viewer => Privilege::ReadOnly,
            Role::Manager => Privilege::FullControl,
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Viewer => "viewer",
            Role::Manager => "manager",
        };

        write!(f, "{}", s)
    }
}
