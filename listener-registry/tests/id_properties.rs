use listener_registry::{ListenerId, Owner, Registry};
use proptest::prelude::*;

proptest! {
    #[test]
    fn sequential_registrations_yield_dense_ids(n in 0usize..200) {
        let registry = Registry::new();
        let ids: Vec<u64> = (0..n)
            .map(|i| registry.register_global(format!("e{}", i % 7), |_, _: &()| Ok(())).value())
            .collect();
        prop_assert_eq!(ids, (0..n as u64).collect::<Vec<_>>());
    }

    #[test]
    fn ids_are_never_reused_after_removal(ops in prop::collection::vec(any::<(bool, u8)>(), 1..100)) {
        let registry = Registry::new();
        let owner = Owner::unique();
        let mut live: Vec<ListenerId> = Vec::new();
        let mut last: Option<ListenerId> = None;

        for (register, pick) in ops {
            if register || live.is_empty() {
                let id = registry.register(owner, "evt", |_, _: &()| Ok(()));
                if let Some(prev) = last {
                    prop_assert!(id > prev);
                }
                last = Some(id);
                live.push(id);
            } else {
                let id = live.remove(pick as usize % live.len());
                prop_assert_eq!(registry.remove_by_id(id), 1);
                prop_assert_eq!(registry.remove_by_id(id), 0);
            }
        }

        prop_assert_eq!(registry.len(), live.len());
        prop_assert_eq!(registry.push_scoped(owner, "evt", &()), live.len());
    }
}
