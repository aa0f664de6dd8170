//! Declarative subscriber discovery
//!
//! Subscribers and startup entry points are declared next to the code they
//! belong to and collected at link time with the `inventory` crate. No
//! runtime reflection is involved: each declaration is a static value holding
//! plain function pointers.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use modhook_events::{EventBus, HandlerTable, InitEntry, InitPhase,
//!     SubscriberDeclaration, SubscriberKey, UpdateTick};
//!
//! struct FreeCamera;
//!
//! inventory::submit! {
//!     SubscriberDeclaration::new("free_camera", free_camera_key, free_camera_handlers)
//! }
//!
//! fn free_camera_key() -> SubscriberKey {
//!     SubscriberKey::of_type::<FreeCamera>()
//! }
//!
//! fn free_camera_handlers() -> HandlerTable {
//!     HandlerTable::new().on(|tick: &UpdateTick, _bus| {
//!         tracing::trace!(frame = tick.frame, "camera update");
//!         Ok(())
//!     })
//! }
//!
//! fn free_camera_setup(_bus: &EventBus) -> anyhow::Result<()> {
//!     Ok(())
//! }
//!
//! inventory::submit! {
//!     InitEntry::new("free_camera_setup", InitPhase::PostInit, free_camera_setup)
//! }
//! ```
//!
//! The host integration layer then calls
//! [`EventBus::initialise_all`] once at startup.

use tracing::{debug, error, info, warn};

use crate::{
    dispatcher::{run_isolated, EventBus},
    error::{EventsError, Result},
    registry::HandlerTable,
    types::SubscriberKey,
};

/// Default ordering priority for declarations
pub const DEFAULT_PRIORITY: u32 = 100;

/// A statically declared subscriber
pub struct SubscriberDeclaration {
    /// Diagnostic name
    pub name: &'static str,

    /// Produces the subscriber's key
    pub key: fn() -> SubscriberKey,

    /// Produces the subscriber's handler table
    pub handlers: fn() -> HandlerTable,

    /// Registration order (lower = earlier)
    pub priority: u32,
}

impl SubscriberDeclaration {
    /// Create a declaration with default priority
    pub const fn new(
        name: &'static str,
        key: fn() -> SubscriberKey,
        handlers: fn() -> HandlerTable,
    ) -> Self {
        Self {
            name,
            key,
            handlers,
            priority: DEFAULT_PRIORITY,
        }
    }

    /// Create a declaration with custom priority
    pub const fn with_priority(
        name: &'static str,
        key: fn() -> SubscriberKey,
        handlers: fn() -> HandlerTable,
        priority: u32,
    ) -> Self {
        Self {
            name,
            key,
            handlers,
            priority,
        }
    }
}

inventory::collect!(SubscriberDeclaration);

/// Startup pass an [`InitEntry`] belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InitPhase {
    /// Runs after all declared subscribers are registered
    PreInit,
    /// Runs after every pre-init entry
    PostInit,
}

/// A statically declared startup entry point
pub struct InitEntry {
    /// Diagnostic name
    pub name: &'static str,

    /// Pass this entry runs in
    pub phase: InitPhase,

    /// Order within the pass (lower = earlier)
    pub priority: u32,

    /// Entry point
    pub run: fn(&EventBus) -> anyhow::Result<()>,
}

impl InitEntry {
    /// Create an entry with default priority
    pub const fn new(
        name: &'static str,
        phase: InitPhase,
        run: fn(&EventBus) -> anyhow::Result<()>,
    ) -> Self {
        Self {
            name,
            phase,
            priority: DEFAULT_PRIORITY,
            run,
        }
    }

    /// Create an entry with custom priority
    pub const fn with_priority(
        name: &'static str,
        phase: InitPhase,
        priority: u32,
        run: fn(&EventBus) -> anyhow::Result<()>,
    ) -> Self {
        Self {
            name,
            phase,
            priority,
            run,
        }
    }
}

inventory::collect!(InitEntry);

/// What [`EventBus::initialise_all`] did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitReport {
    /// Declarations registered
    pub registered: Vec<&'static str>,
    /// Declarations rejected because their key was already registered
    pub duplicates: Vec<&'static str>,
    /// Pre-init entries that completed
    pub pre_init: Vec<&'static str>,
    /// Post-init entries that completed
    pub post_init: Vec<&'static str>,
    /// Entries that returned an error or panicked
    pub failed: Vec<&'static str>,
    /// Removals deferred during the init passes and applied at the end.
    ///
    /// Zero when initialisation ran inside a dispatch cycle; those removals
    /// are applied when the outer cycle ends.
    pub removals_flushed: usize,
}

/// Discovered subscriber declarations, sorted by priority then name
pub fn discovered_subscribers() -> Vec<&'static SubscriberDeclaration> {
    let mut declarations: Vec<_> = inventory::iter::<SubscriberDeclaration>().collect();
    declarations.sort_by_key(|d| (d.priority, d.name));
    declarations
}

/// Discovered init entries, sorted by phase, priority, then name
pub fn discovered_init_entries() -> Vec<&'static InitEntry> {
    let mut entries: Vec<_> = inventory::iter::<InitEntry>().collect();
    entries.sort_by_key(|e| (e.phase, e.priority, e.name));
    entries
}

/// Names of all discovered subscriber declarations
pub fn list_discovered_subscribers() -> Vec<&'static str> {
    discovered_subscribers().iter().map(|d| d.name).collect()
}

/// Names of all discovered init entries
pub fn list_discovered_init_entries() -> Vec<&'static str> {
    discovered_init_entries().iter().map(|e| e.name).collect()
}

impl EventBus {
    /// Register every discovered subscriber declaration, then run the
    /// pre-init and post-init passes, then apply deferred removals.
    ///
    /// # Errors
    ///
    /// Returns [`EventsError::AlreadyInitialised`] (after logging a warning)
    /// if called more than once on this bus.
    pub fn initialise_all(&self) -> Result<InitReport> {
        let declarations = discovered_subscribers();
        let entries = discovered_init_entries();
        info!(
            subscribers = declarations.len(),
            init_entries = entries.len(),
            "Initialising declared subscribers"
        );
        self.initialise_with(declarations, entries)
    }

    /// [`initialise_all`](Self::initialise_all) over explicit lists.
    ///
    /// Declarations are registered in (priority, name) order. Entries run in
    /// two passes, pre-init then post-init, each in (priority, name) order.
    /// Both passes count as an active cycle, so deregistrations they request
    /// are deferred until the end.
    pub fn initialise_with<'a, D, I>(&self, declarations: D, entries: I) -> Result<InitReport>
    where
        D: IntoIterator<Item = &'a SubscriberDeclaration>,
        I: IntoIterator<Item = &'a InitEntry>,
    {
        if self.initialised.swap(true, std::sync::atomic::Ordering::SeqCst) {
            warn!("Event bus already initialised; ignoring");
            return Err(EventsError::AlreadyInitialised);
        }

        let mut report = InitReport::default();

        let mut declarations: Vec<_> = declarations.into_iter().collect();
        declarations.sort_by_key(|d| (d.priority, d.name));
        for declaration in declarations {
            let key = (declaration.key)();
            match self.register(key, (declaration.handlers)()) {
                Ok(()) => report.registered.push(declaration.name),
                Err(_) => report.duplicates.push(declaration.name),
            }
        }

        let mut entries: Vec<_> = entries.into_iter().collect();
        entries.sort_by_key(|e| (e.phase, e.priority, e.name));

        let cycle = self.enter_cycle();
        for phase in [InitPhase::PreInit, InitPhase::PostInit] {
            for entry in entries.iter().filter(|e| e.phase == phase) {
                debug!(entry = entry.name, phase = ?phase, "Running init entry");
                match run_isolated(|| (entry.run)(self)) {
                    Ok(()) => match phase {
                        InitPhase::PreInit => report.pre_init.push(entry.name),
                        InitPhase::PostInit => report.post_init.push(entry.name),
                    },
                    Err(failure) => {
                        error!(
                            entry = entry.name,
                            phase = ?phase,
                            error = %failure,
                            "Init entry failed"
                        );
                        report.failed.push(entry.name);
                    }
                }
            }
        }
        report.removals_flushed = cycle.finish();

        info!(
            registered = report.registered.len(),
            duplicates = report.duplicates.len(),
            failed = report.failed.len(),
            "Initialisation complete"
        );
        Ok(report)
    }

    /// Whether initialisation has run on this bus
    pub fn is_initialised(&self) -> bool {
        self.initialised.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Event;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Ping;
    impl Event for Ping {}

    struct Discovered;
    struct Other;

    fn discovered_key() -> SubscriberKey {
        SubscriberKey::of_type::<Discovered>()
    }

    fn other_key() -> SubscriberKey {
        SubscriberKey::of_type::<Other>()
    }

    fn ping_handlers() -> HandlerTable {
        HandlerTable::new().on(|_: &Ping, _| Ok(()))
    }

    inventory::submit! {
        SubscriberDeclaration::new("discovery_test_subscriber", discovered_key, ping_handlers)
    }

    fn noop_init(_bus: &EventBus) -> anyhow::Result<()> {
        Ok(())
    }

    inventory::submit! {
        InitEntry::new("discovery_test_init", InitPhase::PreInit, noop_init)
    }

    const NO_DECLARATIONS: [&SubscriberDeclaration; 0] = [];
    const NO_ENTRIES: [&InitEntry; 0] = [];

    #[test]
    fn test_discovered_declarations_include_test() {
        assert!(list_discovered_subscribers().contains(&"discovery_test_subscriber"));
        assert!(list_discovered_init_entries().contains(&"discovery_test_init"));
    }

    #[test]
    fn test_initialise_all_registers_discovered() {
        let bus = EventBus::new();
        let report = bus.initialise_all().unwrap();

        assert!(report.registered.contains(&"discovery_test_subscriber"));
        assert!(report.pre_init.contains(&"discovery_test_init"));
        assert!(bus.contains(&discovered_key()));
        assert_eq!(bus.call(&Ping).delivered, bus.len());
    }

    #[test]
    fn test_initialise_twice_rejected() {
        let bus = EventBus::new();
        bus.initialise_with(NO_DECLARATIONS, NO_ENTRIES).unwrap();

        assert!(bus.is_initialised());
        assert_eq!(
            bus.initialise_with(NO_DECLARATIONS, NO_ENTRIES),
            Err(EventsError::AlreadyInitialised)
        );
    }

    #[test]
    fn test_duplicate_declarations_reported() {
        let first = SubscriberDeclaration::new("a_first", other_key, ping_handlers);
        let second = SubscriberDeclaration::new("b_second", other_key, ping_handlers);

        let bus = EventBus::new();
        let report = bus.initialise_with([&first, &second], NO_ENTRIES).unwrap();

        assert_eq!(report.registered, vec!["a_first"]);
        assert_eq!(report.duplicates, vec!["b_second"]);
        assert_eq!(bus.len(), 1);
    }

    #[test]
    fn test_declarations_sorted_by_priority() {
        let late = SubscriberDeclaration::with_priority("late", discovered_key, ping_handlers, 200);
        let early = SubscriberDeclaration::with_priority("early", other_key, ping_handlers, 10);

        let bus = EventBus::new();
        bus.initialise_with([&late, &early], NO_ENTRIES).unwrap();

        assert_eq!(bus.subscribers(), vec![other_key(), discovered_key()]);
    }

    static ORDER: AtomicUsize = AtomicUsize::new(0);
    static PRE_SEEN: AtomicUsize = AtomicUsize::new(usize::MAX);
    static POST_SEEN: AtomicUsize = AtomicUsize::new(usize::MAX);

    #[test]
    fn test_pre_init_runs_before_post_init() {
        let post = InitEntry::new("post", InitPhase::PostInit, |_| {
            POST_SEEN.store(ORDER.fetch_add(1, Ordering::SeqCst), Ordering::SeqCst);
            Ok(())
        });
        let pre = InitEntry::with_priority("pre", InitPhase::PreInit, 500, |_| {
            PRE_SEEN.store(ORDER.fetch_add(1, Ordering::SeqCst), Ordering::SeqCst);
            Ok(())
        });

        let bus = EventBus::new();
        let report = bus.initialise_with(NO_DECLARATIONS, [&post, &pre]).unwrap();

        assert_eq!(report.pre_init, vec!["pre"]);
        assert_eq!(report.post_init, vec!["post"]);
        assert!(PRE_SEEN.load(Ordering::SeqCst) < POST_SEEN.load(Ordering::SeqCst));
    }

    #[test]
    fn test_failing_entries_do_not_stop_pass() {
        let failing = InitEntry::new("a_failing", InitPhase::PreInit, |_| {
            Err(anyhow::anyhow!("missing asset"))
        });
        let panicking = InitEntry::new("b_panicking", InitPhase::PreInit, |_| {
            panic!("bad state")
        });
        let fine = InitEntry::new("c_fine", InitPhase::PreInit, |_| Ok(()));

        let bus = EventBus::new();
        let report = bus
            .initialise_with(NO_DECLARATIONS, [&failing, &panicking, &fine])
            .unwrap();

        assert_eq!(report.failed, vec!["a_failing", "b_panicking"]);
        assert_eq!(report.pre_init, vec!["c_fine"]);
        assert!(!bus.is_dispatching());
    }

    #[test]
    fn test_deregistration_during_init_is_deferred() {
        let declaration = SubscriberDeclaration::new("other", other_key, ping_handlers);
        let remover = InitEntry::new("remover", InitPhase::PreInit, |bus| {
            assert_eq!(
                bus.deregister(&SubscriberKey::of_type::<Other>()),
                crate::Deregistration::Deferred
            );
            Ok(())
        });
        let checker = InitEntry::new("checker", InitPhase::PostInit, |bus| {
            anyhow::ensure!(
                bus.contains(&SubscriberKey::of_type::<Other>()),
                "removed too early"
            );
            Ok(())
        });

        let bus = EventBus::new();
        let report = bus
            .initialise_with([&declaration], [&remover, &checker])
            .unwrap();

        assert!(report.failed.is_empty());
        assert_eq!(report.removals_flushed, 1);
        assert!(bus.is_empty());
    }

    #[test]
    fn test_init_inside_dispatch_reports_no_flush() {
        struct Starter;

        let bus = EventBus::new();
        bus.register(SubscriberKey::of_type::<Other>(), ping_handlers())
            .unwrap();

        let flushed = std::sync::Arc::new(AtomicUsize::new(usize::MAX));
        let slot = std::sync::Arc::clone(&flushed);
        bus.register(
            SubscriberKey::of_type::<Starter>(),
            HandlerTable::new().on(move |_: &Ping, bus: &EventBus| {
                let remover = InitEntry::new("remover", InitPhase::PreInit, |bus| {
                    bus.deregister(&SubscriberKey::of_type::<Other>());
                    Ok(())
                });
                let report = bus.initialise_with(NO_DECLARATIONS, [&remover])?;
                slot.store(report.removals_flushed, Ordering::SeqCst);
                anyhow::ensure!(
                    bus.contains(&SubscriberKey::of_type::<Other>()),
                    "removed inside the outer cycle"
                );
                Ok(())
            }),
        )
        .unwrap();

        let report = bus.call(&Ping);

        assert_eq!(report.failed, 0);
        assert_eq!(flushed.load(Ordering::SeqCst), 0);
        assert_eq!(bus.subscribers(), vec![SubscriberKey::of_type::<Starter>()]);
    }
}
