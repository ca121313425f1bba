// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::traits::PermissionStore;

/// Scoped handle over a privilege-escalated permission store session.
///
/// Acquired per request and released back to the store when dropped, on
/// every exit path. Mutations staged on the session that were not committed
/// by then are abandoned.
pub struct EscalatedSession<'a, P>
where
    P: PermissionStore,
{
    store: &'a P,
    session: Option<P::Session>,
}

impl<'a, P> EscalatedSession<'a, P>
where
    P: PermissionStore,
{
    /// Open an escalated session against the store.
    pub fn acquire(store: &'a P) -> Result<Self, P::Error> {
        let session = store.escalate()?;
        Ok(Self {
            store,
            session: Some(session),
        })
    }

    pub fn session(&self) -> &P::Session {
        // Only emptied by Drop.
        self.session.as_ref().unwrap()
    }

    pub fn session_mut(&mut self) -> &mut P::Session {
        self.session.as_mut().unwrap()
    }

    /// Commit staged mutations if there are any.
    ///
    /// Returns `true` when a commit was issued and `false` when there was
    /// nothing to persist.
    pub fn commit_pending(&mut self) -> Result<bool, P::Error> {
        if !self.store.has_pending_changes(self.session()) {
            return Ok(false);
        }
        self.store.commit(self.session_mut())?;
        Ok(true)
    }
}

impl<P> Drop for EscalatedSession<'_, P>
where
    P: PermissionStore,
{
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            self.store.release(session);
        }
    }
}
