// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Stable path identifying a pooled content item.
///
/// The item itself (its node, properties and lifecycle) is owned by the
/// storage engine; this crate only addresses the membership and permission
/// sub-records associated with the path.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemPath(String);

impl ItemPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ItemPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ItemPath {
    fn from(path: &str) -> Self {
        Self(path.to_string())
    }
}

impl From<String> for ItemPath {
    fn from(path: String) -> Self {
        Self(path)
    }
}
