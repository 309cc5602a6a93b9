//! Row-targeted table retrieval.
//!
//! Where the full walk sweeps whole subtrees, this operation fetches only
//! specific known rows of specific tables: per table it computes the column
//! OID set from the row schema and bounds the row-index range to what was
//! actually requested.

use crate::engine::{RetrievalOutcome, RowRangeRequest, SnmpEngine, WalkEventSink};
use crate::model::EntityDescription;
use crate::oid::Oid;
use crate::session::{SnmpSession, VariableBindingHandler, WalkError, WalkResponse};
use crate::value::Value;
use crate::varbind::VarBind;
use std::collections::BTreeSet;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, error, warn};

/// The rows wanted from one table, identified by the table-entry schema and
/// the row-index OIDs.
pub struct TableRowSelection {
    /// The table-entry (row) description.
    pub description: &'static EntityDescription,
    /// Wanted row indexes, each as an index OID.
    pub rows: Vec<Oid>,
}

// One bounded retrieval: the column set plus the index range covering every
// wanted row of one table.
struct RetrievalDescriptor {
    columns: Vec<Oid>,
    low_index: Oid,
    high_index: Oid,
}

impl RetrievalDescriptor {
    fn build(selection: &TableRowSelection) -> Option<Self> {
        let min = selection.rows.iter().min()?;
        let max = selection.rows.iter().max()?;

        // The engine treats the low bound as exclusive: a zero-suffixed low
        // index just drops the zero, anything else decrements its last arc.
        let low_index = if min.last() == Some(0) {
            min.parent().unwrap_or_else(Oid::empty)
        } else {
            min.with_last_decremented().unwrap_or_else(Oid::empty)
        };

        let columns: BTreeSet<Oid> = selection
            .description
            .fields()
            .map(|field| selection.description.oid().child(field.id()))
            .collect();

        Some(Self {
            columns: columns.into_iter().collect(),
            low_index,
            high_index: max.clone(),
        })
    }
}

struct TableState {
    finished: bool,
    requests: u64,
    objects: u64,
    error: Option<WalkError>,
}

// Accumulates counts across the sequential per-table retrievals; reset
// rearms the finished flag between tables without clearing the totals.
struct TableListener {
    handler: Arc<dyn VariableBindingHandler>,
    tx: mpsc::Sender<()>,
    state: Mutex<TableState>,
}

impl TableListener {
    fn create(handler: Arc<dyn VariableBindingHandler>, tx: mpsc::Sender<()>) -> Arc<Self> {
        Arc::new(Self {
            handler,
            tx,
            state: Mutex::new(TableState {
                finished: false,
                requests: 0,
                objects: 0,
                error: None,
            }),
        })
    }

    fn reset(&self) {
        self.state.lock().expect("table state poisoned").finished = false;
    }

    fn abort(&self) {
        self.state.lock().expect("table state poisoned").finished = true;
    }

    fn take_error(&self) -> Option<WalkError> {
        self.state.lock().expect("table state poisoned").error.take()
    }

    fn totals(&self) -> (u64, u64) {
        let state = self.state.lock().expect("table state poisoned");
        (state.requests, state.objects)
    }
}

impl WalkEventSink for TableListener {
    fn deliver(&self, batch: &[VarBind]) -> bool {
        let mut state = self.state.lock().expect("table state poisoned");
        if state.finished {
            return false;
        }
        state.requests += 1;
        // Every column slot counts as an object; absent columns arrive as
        // Null and are skipped rather than dispatched.
        state.objects += batch.len() as u64;
        for binding in batch {
            if binding.value == Value::Null || binding.value.is_exception() {
                continue;
            }
            if !self.handler.add_variable(binding) {
                debug!(binding = %binding, "table value not added");
            }
        }
        true
    }

    fn finished(&self, outcome: RetrievalOutcome) {
        let mut state = self.state.lock().expect("table state poisoned");
        if state.finished {
            return;
        }
        if let RetrievalOutcome::Error(e) = outcome {
            error!(error = %e, "engine error while retrieving table rows");
            state.error = Some(WalkError::Engine(e));
        }
        state.finished = true;
        let _ = self.tx.send(());
    }
}

impl<E: SnmpEngine + 'static> SnmpSession<E> {
    /// Retrieve specific rows of specific tables, forwarding every value to
    /// `handler`.
    ///
    /// Tables are retrieved sequentially; the first failing table skips the
    /// rest and its error is surfaced. On success the response aggregates
    /// request and object totals across all tables. An empty selection is
    /// reported as "nothing to retrieve" without contacting the engine.
    pub fn get_table_rows(
        &self,
        handler: Arc<dyn VariableBindingHandler>,
        selections: &[TableRowSelection],
    ) -> WalkResponse {
        let descriptors: Vec<RetrievalDescriptor> = selections
            .iter()
            .filter_map(RetrievalDescriptor::build)
            .collect();
        if descriptors.is_empty() {
            return WalkResponse::failed(WalkError::NothingToRetrieve);
        }

        let started = Instant::now();
        let (tx, rx) = mpsc::channel();
        let listener = TableListener::create(handler, tx);

        for descriptor in &descriptors {
            debug!(
                columns = descriptor.columns.len(),
                low = %descriptor.low_index,
                high = %descriptor.high_index,
                "retrieve table rows"
            );
            listener.reset();
            let request = RowRangeRequest {
                columns: descriptor.columns.clone(),
                low_index: descriptor.low_index.clone(),
                high_index: descriptor.high_index.clone(),
                max_columns_per_request: self.config.max_columns_per_request,
                max_rows_per_request: self.config.max_rows_per_request,
            };
            self.engine.fetch_rows(&request, listener.clone());

            match rx.recv_timeout(self.config.walk_timeout) {
                Ok(()) => {
                    if let Some(e) = listener.take_error() {
                        return WalkResponse::failed(e);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    listener.abort();
                    error!(device = %self.address(), "table walk timed out");
                    return WalkResponse::failed(WalkError::Timeout);
                }
                Err(RecvTimeoutError::Disconnected) => {
                    warn!(device = %self.address(), "table walk ended without a result");
                    return WalkResponse::failed(WalkError::Interrupted);
                }
            }
        }

        let (requests, objects) = listener.totals();
        WalkResponse::completed(requests, objects, started.elapsed())
    }
}
