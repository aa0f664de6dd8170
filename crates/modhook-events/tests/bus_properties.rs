//! Property-based tests for the event bus
//!
//! Subscriber keys are instance keys over a pool of shared objects so that
//! proptest can pick arbitrary subsets.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use modhook_events::*;
use proptest::prelude::*;

struct Widget;

struct Tick;
impl Event for Tick {}

const POOL: usize = 8;

fn pool() -> Vec<Arc<Widget>> {
    (0..POOL).map(|_| Arc::new(Widget)).collect()
}

#[derive(Debug, Clone)]
enum Op {
    Register(usize),
    Deregister(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..POOL).prop_map(Op::Register),
        (0..POOL).prop_map(Op::Deregister),
    ]
}

proptest! {
    /// Visible count equals successful adds minus completed removes
    #[test]
    fn prop_count_tracks_adds_and_removes(ops in prop::collection::vec(op_strategy(), 0..64)) {
        let widgets = pool();
        let bus = EventBus::new();
        let mut adds = 0usize;
        let mut removes = 0usize;

        for op in ops {
            match op {
                Op::Register(i) => {
                    let key = SubscriberKey::of_instance(&widgets[i]);
                    if bus.register(key, HandlerTable::new().on(|_: &Tick, _| Ok(()))).is_ok() {
                        adds += 1;
                    }
                }
                Op::Deregister(i) => {
                    let key = SubscriberKey::of_instance(&widgets[i]);
                    if bus.deregister(&key) == Deregistration::Removed {
                        removes += 1;
                    }
                }
            }
            prop_assert_eq!(bus.len(), adds - removes);
        }
    }

    /// No key ever appears twice
    #[test]
    fn prop_keys_unique(indices in prop::collection::vec(0..POOL, 0..32)) {
        let widgets = pool();
        let bus = EventBus::new();

        for i in indices {
            let _ = bus.register(SubscriberKey::of_instance(&widgets[i]), HandlerTable::new());
        }

        let keys = bus.subscribers();
        let unique: HashSet<_> = keys.iter().cloned().collect();
        prop_assert_eq!(keys.len(), unique.len());
    }

    /// Removals requested mid-cycle never change who that cycle visits
    #[test]
    fn prop_mid_cycle_removal_does_not_change_visited_set(
        registered in prop::collection::btree_set(0..POOL, 1..POOL),
        removed in prop::collection::btree_set(0..POOL, 0..POOL),
    ) {
        let widgets = pool();
        let bus = EventBus::new();
        let visited = Arc::new(Mutex::new(Vec::new()));

        let remove_keys: Vec<SubscriberKey> = removed
            .iter()
            .map(|&i| SubscriberKey::of_instance(&widgets[i]))
            .collect();

        for &i in &registered {
            let key = SubscriberKey::of_instance(&widgets[i]);
            let visited = Arc::clone(&visited);
            let remove_keys = remove_keys.clone();
            let visitor = key.clone();
            bus.register(
                key,
                HandlerTable::new().on(move |_: &Tick, bus: &EventBus| {
                    visited.lock().unwrap().push(visitor.clone());
                    for k in &remove_keys {
                        bus.deregister(k);
                    }
                    Ok(())
                }),
            )
            .unwrap();
        }

        let before = bus.subscribers();
        bus.call(&Tick);

        prop_assert_eq!(&*visited.lock().unwrap(), &before);

        let expected: Vec<SubscriberKey> = before
            .into_iter()
            .filter(|k| !remove_keys.contains(k))
            .collect();
        prop_assert_eq!(bus.subscribers(), expected);
    }
}
