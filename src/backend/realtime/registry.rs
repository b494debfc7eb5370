/**
 * Connection Registry
 *
 * Authoritative mapping of user identity to the connection currently
 * serving it. The registry is a plain owned value with no interior locking;
 * it lives inside the relay task and is only touched from there.
 *
 * # Invariants
 *
 * - At most one handle per identity. A later `register` for the same
 *   identity overwrites the earlier one (last writer wins).
 * - `by_handle` is the exact inverse of `by_identity`: a displaced handle
 *   loses its reverse entry, so its eventual disconnect is a no-op.
 */

use std::collections::HashMap;

use crate::backend::realtime::connection::ConnectionId;

#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    by_identity: HashMap<String, ConnectionId>,
    by_handle: HashMap<ConnectionId, String>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `identity` to `handle`
    ///
    /// Returns the handle that was displaced, if a different one was mapped.
    /// The displaced connection is not closed; it just stops being reachable.
    pub fn register(&mut self, identity: impl Into<String>, handle: ConnectionId) -> Option<ConnectionId> {
        let identity = identity.into();

        let previous = self.by_identity.insert(identity.clone(), handle);
        if let Some(old) = previous.filter(|old| *old != handle) {
            self.by_handle.remove(&old);
        }

        // a handle serves a single identity
        if let Some(stale) = self.by_handle.insert(handle, identity.clone()) {
            if stale != identity && self.by_identity.get(&stale) == Some(&handle) {
                self.by_identity.remove(&stale);
            }
        }

        tracing::debug!(
            user_id = %identity,
            connection = %handle,
            "[Registry] Registered ({} online)",
            self.by_identity.len()
        );

        previous.filter(|old| *old != handle)
    }

    /// Remove whatever identity currently points at `handle`
    ///
    /// Returns the identity that went offline. Unknown or displaced handles
    /// are a no-op and return `None`.
    pub fn unregister_by_handle(&mut self, handle: ConnectionId) -> Option<String> {
        let identity = self.by_handle.remove(&handle)?;

        if self.by_identity.get(&identity) == Some(&handle) {
            self.by_identity.remove(&identity);
        }

        tracing::debug!(
            user_id = %identity,
            connection = %handle,
            "[Registry] Unregistered ({} online)",
            self.by_identity.len()
        );
        Some(identity)
    }

    pub fn lookup(&self, identity: &str) -> Option<ConnectionId> {
        self.by_identity.get(identity).copied()
    }

    #[cfg(test)]
    pub fn identity_of(&self, handle: ConnectionId) -> Option<&str> {
        self.by_handle.get(&handle).map(String::as_str)
    }

    #[cfg(test)]
    pub fn contains(&self, identity: &str) -> bool {
        self.by_identity.contains_key(identity)
    }

    /// Snapshot of online identities, sorted
    pub fn online_identities(&self) -> Vec<String> {
        let mut identities: Vec<String> = self.by_identity.keys().cloned().collect();
        identities.sort();
        identities
    }

    pub fn len(&self) -> usize {
        self.by_identity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_identity.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ConnectionRegistry::new();
        let c1 = ConnectionId::new();

        assert_eq!(registry.register("u1", c1), None);
        assert_eq!(registry.lookup("u1"), Some(c1));
        assert_eq!(registry.identity_of(c1), Some("u1"));
        assert_eq!(registry.lookup("u2"), None);
    }

    #[test]
    fn test_last_writer_wins() {
        let mut registry = ConnectionRegistry::new();
        let c1 = ConnectionId::new();
        let c2 = ConnectionId::new();

        registry.register("u1", c1);
        assert_eq!(registry.register("u1", c2), Some(c1));
        assert_eq!(registry.lookup("u1"), Some(c2));
        assert_eq!(registry.identity_of(c1), None);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_reregister_same_handle_is_not_displacement() {
        let mut registry = ConnectionRegistry::new();
        let c1 = ConnectionId::new();

        registry.register("u1", c1);
        assert_eq!(registry.register("u1", c1), None);
        assert_eq!(registry.lookup("u1"), Some(c1));
    }

    #[test]
    fn test_displaced_handle_unregister_is_noop() {
        let mut registry = ConnectionRegistry::new();
        let c1 = ConnectionId::new();
        let c2 = ConnectionId::new();

        registry.register("u1", c1);
        registry.register("u1", c2);

        assert_eq!(registry.unregister_by_handle(c1), None);
        assert_eq!(registry.lookup("u1"), Some(c2));

        assert_eq!(registry.unregister_by_handle(c2), Some("u1".to_string()));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_double_unregister() {
        let mut registry = ConnectionRegistry::new();
        let c1 = ConnectionId::new();
        registry.register("u1", c1);

        assert_eq!(registry.unregister_by_handle(c1), Some("u1".to_string()));
        assert_eq!(registry.unregister_by_handle(c1), None);
        assert_eq!(registry.unregister_by_handle(ConnectionId::new()), None);
    }

    #[test]
    fn test_online_identities_sorted() {
        let mut registry = ConnectionRegistry::new();
        registry.register("carol", ConnectionId::new());
        registry.register("alice", ConnectionId::new());
        registry.register("bob", ConnectionId::new());

        assert_eq!(registry.online_identities(), vec!["alice", "bob", "carol"]);
        assert!(registry.contains("bob"));
    }
}
