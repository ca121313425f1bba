// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::principal::{MemberInfo, PrincipalId};
use crate::traits::PrincipalResolver;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("no profile record for {0}")]
    UnknownPrincipal(PrincipalId),
}

/// Resolver fixture over a fixed directory of principals.
///
/// Names resolve to identically-named principal ids regardless of the
/// calling principal; anything outside the directory is unknown.
#[derive(Debug, Default)]
pub struct StaticResolver {
    known: BTreeMap<String, PrincipalId>,
}

impl StaticResolver {
    pub fn with_principals(names: &[&str]) -> Self {
        let known = names
            .iter()
            .map(|name| (name.to_string(), PrincipalId::from(*name)))
            .collect();
        Self { known }
    }
}

impl PrincipalResolver for StaticResolver {
    type Error = ResolveError;

    fn resolve(&self, _viewer: &PrincipalId, name: &str) -> Option<PrincipalId> {
        self.known.get(name).cloned()
    }

    fn describe(&self, id: &PrincipalId) -> Result<MemberInfo, Self::Error> {
        if !self.known.contains_key(id.as_str()) {
            return Err(ResolveError::UnknownPrincipal(id.clone()));
        }
        Ok(MemberInfo {
            id: id.clone(),
            name: id.as_str().to_string(),
        })
    }
}

#[cfg(feature = "test_utils")]
pub fn setup_logging() {
    if std::env::var("RUST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    }
}
