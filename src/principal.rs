// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Identity of the anonymous, unauthenticated user.
///
/// Requests made under this identity are rejected before any store is
/// touched.
pub const ANONYMOUS_ID: &str = "anonymous";

/// A canonical principal identity (user or group) recognised by the
/// authorization system.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PrincipalId(String);

impl PrincipalId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the anonymous identity.
    pub fn is_anonymous(&self) -> bool {
        self.0 == ANONYMOUS_ID
    }
}

impl Display for PrincipalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PrincipalId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PrincipalId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Compact display record for a member, produced by the principal resolver
/// and handed to the transport layer for rendering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberInfo {
    pub id: PrincipalId,
    pub name: String,
}

/// The acting caller on a membership update: their canonical identity plus
/// their own (non-escalated) store session.
///
/// The session is only ever used for reads, never mutated; privileged writes
/// go through an [`EscalatedSession`](crate::EscalatedSession) instead.
#[derive(Debug)]
pub struct Caller<S> {
    principal: PrincipalId,
    session: S,
}

impl<S> Caller<S> {
    pub fn new(principal: PrincipalId, session: S) -> Self {
        Self { principal, session }
    }

    pub fn principal(&self) -> &PrincipalId {
        &self.principal
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn is_anonymous(&self) -> bool {
        self.principal.is_anonymous()
    }
}
