//! Metrics sink boundary.
//!
//! Core DB logic MUST NOT depend on obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
use crate::{db::query::MutationKind, obs::metrics};
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = RefCell::new(None);
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    ExecStart {
        kind: MutationKind,
        entity_path: &'static str,
    },
    ExecFinish {
        kind: MutationKind,
        entity_path: &'static str,
        rows_affected: u64,
    },
    InstanceFilterMismatch {
        kind: MutationKind,
        entity_path: &'static str,
        rows_affected: u64,
    },
    InstanceFiltersCleared {
        kind: MutationKind,
        entity_path: &'static str,
        count: u64,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default thread-local sink that writes into global metrics state.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::ExecStart { kind, entity_path } => {
                metrics::with_state_mut(|m| {
                    let entry = m.entities.entry(entity_path.to_string()).or_default();
                    match kind {
                        MutationKind::Delete => {
                            m.ops.delete_calls = m.ops.delete_calls.saturating_add(1);
                            entry.delete_calls = entry.delete_calls.saturating_add(1);
                        }
                        MutationKind::Update => {
                            m.ops.update_calls = m.ops.update_calls.saturating_add(1);
                            entry.update_calls = entry.update_calls.saturating_add(1);
                        }
                    }
                });
            }

            MetricsEvent::ExecFinish {
                kind,
                entity_path,
                rows_affected,
            } => {
                metrics::with_state_mut(|m| {
                    let entry = m.entities.entry(entity_path.to_string()).or_default();
                    match kind {
                        MutationKind::Delete => {
                            m.ops.rows_deleted = m.ops.rows_deleted.saturating_add(rows_affected);
                            entry.rows_deleted = entry.rows_deleted.saturating_add(rows_affected);
                        }
                        MutationKind::Update => {
                            m.ops.rows_updated = m.ops.rows_updated.saturating_add(rows_affected);
                            entry.rows_updated = entry.rows_updated.saturating_add(rows_affected);
                        }
                    }
                });
            }

            MetricsEvent::InstanceFilterMismatch { entity_path, .. } => {
                metrics::with_state_mut(|m| {
                    m.ops.filter_mismatches = m.ops.filter_mismatches.saturating_add(1);
                    let entry = m.entities.entry(entity_path.to_string()).or_default();
                    entry.filter_mismatches = entry.filter_mismatches.saturating_add(1);
                });
            }

            MetricsEvent::InstanceFiltersCleared {
                entity_path, count, ..
            } => {
                metrics::with_state_mut(|m| {
                    m.ops.filters_cleared = m.ops.filters_cleared.saturating_add(count);
                    let entry = m.entities.entry(entity_path.to_string()).or_default();
                    entry.filters_cleared = entry.filters_cleared.saturating_add(count);
                });
            }
        }
    }
}

pub(crate) fn record(event: MetricsEvent) {
    let override_sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());
    match override_sink {
        Some(sink) => sink.record(event),
        None => GlobalMetricsSink.record(event),
    }
}

/// Snapshot the current thread's metrics state.
#[must_use]
pub fn metrics_report() -> metrics::EventReport {
    metrics::report()
}

/// Reset all metrics state.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override.
///
/// The previous sink is restored on every exit path, including unwinding.
pub fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let prev = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = prev;
            });
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}

///
/// TESTS
///
