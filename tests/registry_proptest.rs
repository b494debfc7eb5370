//! Property-based tests for the connection registry

#![cfg(feature = "ssr")]

use std::collections::HashMap;

use agora::backend::realtime::{ConnectionId, ConnectionRegistry};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Register { identity: usize, handle: usize },
    Unregister { handle: usize },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..4usize, 0..6usize).prop_map(|(identity, handle)| Op::Register { identity, handle }),
        (0..6usize).prop_map(|handle| Op::Unregister { handle }),
    ]
}

proptest! {
    #[test]
    fn registry_matches_last_writer_model(ops in prop::collection::vec(op(), 0..60)) {
        let handles: Vec<ConnectionId> = (0..6).map(|_| ConnectionId::new()).collect();
        let identities = ["ann", "ben", "cat", "dan"];

        let mut registry = ConnectionRegistry::new();
        // identity -> handle, the simplest possible reading of the rules
        let mut model: HashMap<&str, ConnectionId> = HashMap::new();

        for op in ops {
            match op {
                Op::Register { identity, handle } => {
                    let (identity, handle) = (identities[identity], handles[handle]);
                    // a handle carries one identity; re-registering it elsewhere moves it
                    model.retain(|_, h| *h != handle);
                    let expected_displaced = model.insert(identity, handle).filter(|old| *old != handle);
                    prop_assert_eq!(registry.register(identity, handle), expected_displaced);
                }
                Op::Unregister { handle } => {
                    let handle = handles[handle];
                    let owned = model
                        .iter()
                        .find(|(_, h)| **h == handle)
                        .map(|(identity, _)| identity.to_string());
                    if let Some(identity) = &owned {
                        model.remove(identity.as_str());
                    }
                    prop_assert_eq!(registry.unregister_by_handle(handle), owned);
                }
            }

            for identity in identities {
                prop_assert_eq!(registry.lookup(identity), model.get(identity).copied());
            }
            prop_assert_eq!(registry.len(), model.len());
        }

        let mut expected: Vec<String> = model.keys().map(|k| k.to_string()).collect();
        expected.sort();
        prop_assert_eq!(registry.online_identities(), expected);
    }

    #[test]
    fn unregister_is_idempotent(identity in "[a-z]{1,8}") {
        let mut registry = ConnectionRegistry::new();
        let handle = ConnectionId::new();
        registry.register(identity.clone(), handle);

        prop_assert_eq!(registry.unregister_by_handle(handle), Some(identity));
        prop_assert_eq!(registry.unregister_by_handle(handle), None);
        prop_assert!(registry.is_empty());
    }
}
