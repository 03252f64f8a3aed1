//! End-to-end replay passes over in-memory stores.

use fieldlog_core::{
    CoreError, CoreResult, EntityId, EntryScan, EntryStore, MemoryEntryStore, OutstandingEntry,
    SaveError, ScanOrder, Timestamp, Value,
};
use fieldlog_replay::{
    CollectingReporter, ConsumePolicy, GroupError, ReplayConfig, ReplayEngine, ReplayError,
};
use fieldlog_testkit::prelude::*;
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn engine_for(
    fixture: &ReplayFixture,
    config: ReplayConfig,
) -> ReplayEngine<MemoryEntryStore, fieldlog_core::Schema, fieldlog_core::MemoryEntityStore> {
    ReplayEngine::new(
        config,
        fixture.table.clone(),
        fixture.entries.clone(),
        fixture.schema.clone(),
        fixture.entities.clone(),
    )
}

#[test]
fn groups_are_folded_per_entity() {
    let fixture = ReplayFixture::tasks().with_rows([1, 2]);
    fixture.append(1, "importance", "i5", 1);
    fixture.append(1, "title", "sx", 2);
    fixture.append(2, "importance", "i9", 3);

    let recorder = Arc::new(RecordingEntityStore::new());
    let engine = ReplayEngine::new(
        ReplayConfig::default(),
        fixture.table.clone(),
        fixture.entries.clone(),
        fixture.schema.clone(),
        recorder.clone(),
    );
    let report = engine.replay().unwrap();

    assert_eq!(report.committed, vec![EntityId::new(1), EntityId::new(2)]);
    let saves = recorder.saves();
    assert_eq!(saves.len(), 2);
    assert!(saves.iter().all(|s| s.suppressed));

    let one = &saves[0].snapshot;
    assert_eq!(one.id, EntityId::new(1));
    assert_eq!(one.get("importance"), Some(&Value::Int(5)));
    assert_eq!(one.get("title"), Some(&Value::from("x")));
    assert_eq!(one.len(), 2);

    let two = &saves[1].snapshot;
    assert_eq!(two.get("importance"), Some(&Value::Int(9)));
    assert_eq!(two.len(), 1);

    assert!(fixture.entries.is_empty());
}

#[test]
fn last_write_wins_within_group() {
    let fixture = ReplayFixture::tasks().with_rows([1]);
    fixture.append(1, "importance", "i1", 1);
    fixture.append(1, "importance", "i2", 2);
    fixture.append(1, "importance", "i3", 3);

    let report = engine_for(&fixture, ReplayConfig::default())
        .replay()
        .unwrap();

    assert_eq!(report.entries_applied, 3);
    assert_eq!(fixture.value(1, "importance"), Some(Value::Int(3)));
}

#[test]
fn scan_order_wins_over_append_order() {
    let fixture = ReplayFixture::tasks().with_rows([1]);
    fixture.append(1, "importance", "i3", 30);
    fixture.append(1, "importance", "i1", 10);

    engine_for(&fixture, ReplayConfig::default())
        .replay()
        .unwrap();
    assert_eq!(fixture.value(1, "importance"), Some(Value::Int(3)));
}

#[test]
fn column_maps_to_property_name() {
    let fixture = ReplayFixture::tasks().with_rows([4]);
    fixture.append(4, "dueDate", "l1700000000000", 1);

    engine_for(&fixture, ReplayConfig::default())
        .replay()
        .unwrap();
    assert_eq!(fixture.value(4, "due_date"), Some(Value::Long(1_700_000_000_000)));
}

#[test]
fn replay_does_not_log_new_entries() {
    let fixture = ReplayFixture::tasks().with_rows([1, 2]);
    fixture.append(1, "title", "sone", 1);
    fixture.append(2, "progress", "d0.5", 2);

    engine_for(&fixture, ReplayConfig::default())
        .replay()
        .unwrap();

    // The entity store is attached to the log; only suppression keeps it empty.
    assert!(fixture.entries.is_empty());
    assert_eq!(fixture.entities.save_count(), 2);
}

#[test]
fn failed_group_does_not_block_others() {
    let fixture = ReplayFixture::tasks().with_rows([1, 2]);
    fixture.append(1, "nosuchcolumn", "i1", 1);
    fixture.append(1, "importance", "i2", 2);
    fixture.append(2, "importance", "i7", 3);

    let reporter = Arc::new(CollectingReporter::new());
    let engine = engine_for(&fixture, ReplayConfig::default()).with_reporter(reporter.clone());
    let report = engine.replay().unwrap();

    assert_eq!(report.committed, vec![EntityId::new(2)]);
    assert_eq!(fixture.value(2, "importance"), Some(Value::Int(7)));
    assert_eq!(fixture.value(1, "importance"), None);

    let remaining = fixture.entries.entries_for(EntityId::new(1));
    assert_eq!(remaining.len(), 2);
    assert!(fixture.entries.entries_for(EntityId::new(2)).is_empty());

    let failures = reporter.failures();
    assert_eq!(failures.len(), 1);
    let (table, failure) = &failures[0];
    assert_eq!(table.as_str(), TASKS);
    assert_eq!(failure.entity_id, EntityId::new(1));
    assert_eq!(failure.column.as_deref(), Some("nosuchcolumn"));
    assert_eq!(failure.entries_retained, 2);
    assert!(matches!(
        failure.error,
        GroupError::UnresolvedColumn { ref column, .. } if column == "nosuchcolumn"
    ));
}

#[test]
fn failed_save_retains_entries() {
    let fixture = ReplayFixture::tasks().with_rows([1, 2]);
    fixture.append(1, "importance", "i1", 1);
    fixture.append(2, "importance", "i2", 2);
    fixture.entities.reject(EntityId::new(1));

    let engine = engine_for(&fixture, ReplayConfig::default());
    let report = engine.replay().unwrap();

    assert_eq!(report.committed, vec![EntityId::new(2)]);
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        report.failures[0].error,
        GroupError::Save(SaveError::Rejected { .. })
    ));
    assert_eq!(report.failures[0].column, None);
    assert_eq!(fixture.entries.len(), 1);

    // Once the store accepts the entity, the next pass picks it up.
    fixture.entities.accept(EntityId::new(1));
    let report = engine.replay().unwrap();
    assert_eq!(report.committed, vec![EntityId::new(1)]);
    assert!(fixture.entries.is_empty());
    assert_eq!(fixture.value(1, "importance"), Some(Value::Int(1)));
}

#[test]
fn missing_row_is_a_save_failure() {
    let fixture = ReplayFixture::tasks();
    fixture.append(9, "title", "sghost", 1);

    let report = engine_for(&fixture, ReplayConfig::default())
        .replay()
        .unwrap();
    assert!(matches!(
        report.failures[0].error,
        GroupError::Save(SaveError::NotFound(id)) if id == EntityId::new(9)
    ));
    assert_eq!(fixture.entries.len(), 1);
}

#[test]
fn retained_entries_replay_idempotently() {
    let fixture = ReplayFixture::tasks().with_rows([1]);
    fixture.append(1, "importance", "i4", 1);
    fixture.append(1, "title", "sdone", 2);

    let engine = engine_for(
        &fixture,
        ReplayConfig::new().with_consume(ConsumePolicy::Retain),
    );
    let first = engine.replay().unwrap();
    let after_first = fixture.entities.row(EntityId::new(1));
    let second = engine.replay().unwrap();

    assert_eq!(first.entries_consumed, 0);
    assert_eq!(first.committed, second.committed);
    assert_eq!(fixture.entities.row(EntityId::new(1)), after_first);
    assert_eq!(fixture.entries.len(), 2);
}

#[test]
fn unordered_store_is_refused() {
    let entries = Arc::new(MemoryEntryStore::insertion_ordered());
    let fixture = ReplayFixture::with_entries(entries).with_rows([1]);
    fixture.append(1, "importance", "i1", 1);

    let engine = engine_for(&fixture, ReplayConfig::default());
    assert!(matches!(engine.replay(), Err(ReplayError::UnorderedScan)));
    assert_eq!(fixture.entries.len(), 1);
    assert_eq!(fixture.entities.save_count(), 0);
}

#[test]
fn lying_store_is_caught_at_runtime() {
    let entries = Arc::new(
        MemoryEntryStore::insertion_ordered().advertising(ScanOrder::EntityThenCreated),
    );
    let fixture = ReplayFixture::with_entries(entries).with_rows([1, 2]);
    fixture.append(2, "importance", "i2", 1);
    fixture.append(1, "importance", "i1", 2);

    let engine = engine_for(&fixture, ReplayConfig::default());
    assert!(matches!(
        engine.replay(),
        Err(ReplayError::OrderingViolation { .. })
    ));
    // Entity 2 was committed before the violation was seen.
    assert_eq!(fixture.entries.len(), 1);
}

#[test]
fn unordered_scan_allowed_when_not_required() {
    let entries = Arc::new(MemoryEntryStore::insertion_ordered());
    let fixture = ReplayFixture::with_entries(entries).with_rows([1, 2]);
    fixture.append(1, "importance", "i1", 1);
    fixture.append(2, "importance", "i2", 2);

    let engine = engine_for(
        &fixture,
        ReplayConfig::new().with_require_ordered_scan(false),
    );
    let report = engine.replay().unwrap();
    assert_eq!(report.groups(), 2);
}

/// Entry store whose scan cancels the engine after a fixed number of entries.
struct CancellingStore {
    inner: MemoryEntryStore,
    after: usize,
    read: Arc<AtomicUsize>,
    cancel: parking_lot::Mutex<Option<Box<dyn Fn() + Send + Sync>>>,
}

impl EntryStore for CancellingStore {
    fn append(&self, entry: OutstandingEntry) -> CoreResult<()> {
        self.inner.append(entry)
    }

    fn scan_ascending(&self) -> CoreResult<EntryScan<'_>> {
        let scan = self.inner.scan_ascending()?;
        Ok(Box::new(scan.inspect(move |_| {
            if self.read.fetch_add(1, Ordering::SeqCst) + 1 == self.after {
                if let Some(cancel) = self.cancel.lock().as_ref() {
                    cancel();
                }
            }
        })))
    }

    fn delete_group(&self, entity_id: EntityId, up_to: Timestamp) -> CoreResult<usize> {
        self.inner.delete_group(entity_id, up_to)
    }
}

#[test]
fn cancel_stops_at_group_boundary() {
    let store = Arc::new(CancellingStore {
        inner: MemoryEntryStore::with_entries(vec![
            OutstandingEntry::new(1, "importance", "i1", 1),
            OutstandingEntry::new(1, "importance", "i2", 2),
            OutstandingEntry::new(2, "importance", "i3", 3),
        ]),
        after: 1,
        read: Arc::new(AtomicUsize::new(0)),
        cancel: parking_lot::Mutex::new(None),
    });
    let fixture = ReplayFixture::tasks().with_rows([1, 2]);
    let engine = Arc::new(ReplayEngine::new(
        ReplayConfig::default(),
        fixture.table.clone(),
        store.clone(),
        fixture.schema.clone(),
        fixture.entities.clone(),
    ));
    let weak = Arc::downgrade(&engine);
    *store.cancel.lock() = Some(Box::new(move || {
        if let Some(engine) = weak.upgrade() {
            engine.cancel();
        }
    }));

    let report = engine.replay().unwrap();

    // Cancelled while reading entity 1; its group still completes.
    assert!(report.cancelled);
    assert_eq!(report.committed, vec![EntityId::new(1)]);
    assert_eq!(fixture.value(1, "importance"), Some(Value::Int(2)));
    assert_eq!(store.inner.len(), 1);
}

/// Entry store whose scan fails after yielding a fixed number of entries.
struct FailingScanStore {
    inner: MemoryEntryStore,
    good: usize,
}

impl EntryStore for FailingScanStore {
    fn append(&self, entry: OutstandingEntry) -> CoreResult<()> {
        self.inner.append(entry)
    }

    fn scan_ascending(&self) -> CoreResult<EntryScan<'_>> {
        let good = self.inner.scan_ascending()?.take(self.good);
        Ok(Box::new(
            good.chain(std::iter::once(Err(CoreError::store("row read failed")))),
        ))
    }

    fn delete_group(&self, entity_id: EntityId, up_to: Timestamp) -> CoreResult<usize> {
        self.inner.delete_group(entity_id, up_to)
    }
}

#[test]
fn read_failure_inside_group_commits_nothing() {
    let store = Arc::new(FailingScanStore {
        inner: MemoryEntryStore::with_entries(vec![
            OutstandingEntry::new(1, "importance", "i1", 5),
            OutstandingEntry::new(1, "importance", "i2", 5),
        ]),
        good: 1,
    });
    let fixture = ReplayFixture::tasks().with_rows([1]);
    let engine = ReplayEngine::new(
        ReplayConfig::default(),
        fixture.table.clone(),
        store.clone(),
        fixture.schema.clone(),
        fixture.entities.clone(),
    );

    assert!(matches!(engine.replay(), Err(ReplayError::Store(_))));
    assert_eq!(fixture.value(1, "importance"), None);
    assert_eq!(fixture.entities.save_count(), 0);
    assert_eq!(store.inner.len(), 2);
}

type TasksEngine =
    ReplayEngine<MemoryEntryStore, fieldlog_core::Schema, fieldlog_core::MemoryEntityStore>;

/// Reporter that tries to start a second pass on the engine it reports for.
#[derive(Default)]
struct ReentrantReporter {
    engine: parking_lot::Mutex<std::sync::Weak<TasksEngine>>,
    nested: parking_lot::Mutex<Vec<bool>>,
}

impl fieldlog_replay::FailureReporter for ReentrantReporter {
    fn report(&self, _: &fieldlog_core::TableId, _: &fieldlog_replay::ReplayFailure) {
        if let Some(engine) = self.engine.lock().upgrade() {
            let refused = matches!(engine.replay(), Err(ReplayError::AlreadyRunning));
            self.nested.lock().push(refused);
        }
    }
}

#[test]
fn second_pass_is_refused_while_running() {
    let fixture = ReplayFixture::tasks().with_rows([1, 2]);
    fixture.append(1, "nosuchcolumn", "i1", 1);
    fixture.append(2, "importance", "i7", 2);

    let reporter = Arc::new(ReentrantReporter::default());
    let engine = Arc::new(
        engine_for(&fixture, ReplayConfig::default()).with_reporter(reporter.clone()),
    );
    *reporter.engine.lock() = Arc::downgrade(&engine);

    let report = engine.replay().unwrap();

    assert_eq!(*reporter.nested.lock(), vec![true]);
    assert_eq!(report.committed, vec![EntityId::new(2)]);
    assert_eq!(engine.state(), fieldlog_replay::ReplayState::Completed);
    assert_eq!(engine.stats().passes_completed, 1);
    assert_eq!(fixture.value(2, "importance"), Some(Value::Int(7)));
}

#[test]
fn store_scan_error_stops_pass() {
    struct BrokenStore;

    impl EntryStore for BrokenStore {
        fn append(&self, _: OutstandingEntry) -> CoreResult<()> {
            Ok(())
        }

        fn scan_ascending(&self) -> CoreResult<EntryScan<'_>> {
            Err(CoreError::store("disk unavailable"))
        }

        fn delete_group(&self, _: EntityId, _: Timestamp) -> CoreResult<usize> {
            Ok(0)
        }
    }

    let fixture = ReplayFixture::tasks();
    let engine = ReplayEngine::new(
        ReplayConfig::default(),
        fixture.table.clone(),
        Arc::new(BrokenStore),
        fixture.schema.clone(),
        fixture.entities.clone(),
    );
    assert!(matches!(engine.replay(), Err(ReplayError::Store(_))));
}

#[test]
fn engine_accepts_trait_objects() {
    let fixture = ReplayFixture::tasks().with_rows([1]);
    fixture.append(1, "title", "sdyn", 1);

    let entries: Arc<dyn EntryStore> = fixture.entries.clone();
    let resolver: Arc<dyn fieldlog_core::PropertyResolver> = fixture.schema.clone();
    let entities: Arc<dyn fieldlog_core::EntityStore> = fixture.entities.clone();
    let engine = ReplayEngine::new(
        ReplayConfig::default(),
        fixture.table.clone(),
        entries,
        resolver,
        entities,
    );

    assert_eq!(engine.replay().unwrap().committed.len(), 1);
    assert_eq!(fixture.value(1, "title"), Some(Value::from("dyn")));
}

proptest! {
    #[test]
    fn replay_matches_last_write_wins_model(log in tasks_log_strategy(5, 40)) {
        let fixture = ReplayFixture::with_entries(Arc::new(MemoryEntryStore::with_entries(log.clone())))
            .with_rows(1..=5);
        let report = engine_for(&fixture, ReplayConfig::default()).replay().unwrap();

        prop_assert!(report.is_clean());
        prop_assert_eq!(report.entries_consumed, log.len());
        prop_assert!(fixture.entries.is_empty());

        for (entity_id, columns) in latest_tokens(&log) {
            for (column, token) in columns {
                let property = if column == "dueDate" { "due_date" } else { column.as_str() };
                let expected = fieldlog_codec::decode_scalar(&token).unwrap();
                prop_assert_eq!(fixture.value(entity_id.get(), property), Some(expected));
            }
        }
    }

    #[test]
    fn second_pass_is_a_no_op(log in tasks_log_strategy(3, 20)) {
        let fixture = ReplayFixture::with_entries(Arc::new(MemoryEntryStore::with_entries(log)))
            .with_rows(1..=3);
        let engine = engine_for(&fixture, ReplayConfig::default());
        engine.replay().unwrap();
        let rows: Vec<_> = (1..=3).map(|id| fixture.entities.row(EntityId::new(id))).collect();

        let report = engine.replay().unwrap();
        prop_assert_eq!(report.groups(), 0);
        let after: Vec<_> = (1..=3).map(|id| fixture.entities.row(EntityId::new(id))).collect();
        prop_assert_eq!(rows, after);
    }
}
