//! Mock protocol engine for testing.
//!
//! Provides a programmable engine that delivers scripted result batches from
//! a background thread, so walk coordination is exercised across a real
//! thread boundary without a network.

use super::{EngineError, RetrievalOutcome, RowRangeRequest, SnmpEngine, WalkEventSink};
use crate::oid::Oid;
use crate::varbind::VarBind;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::thread;

/// A scripted reaction to one subtree or table retrieval.
#[derive(Clone, Debug)]
pub enum MockRetrieval {
    /// Deliver these batches, then finish successfully.
    Batches(Vec<Vec<VarBind>>),
    /// Finish immediately with an engine error.
    Error(EngineError),
    /// Never invoke the sink at all (for timeout scenarios).
    Silent,
}

#[derive(Default)]
struct MockState {
    /// Scripts keyed by subtree start OID.
    subtrees: HashMap<Oid, MockRetrieval>,
    /// FIFO scripts for row-scoped retrievals.
    tables: VecDeque<MockRetrieval>,
    /// Values served by `get`.
    values: HashMap<Oid, crate::value::Value>,
    /// Recorded row-range requests, for assertions.
    row_requests: Vec<RowRangeRequest>,
    /// Recorded set bindings, for assertions.
    set_bindings: Vec<VarBind>,
    /// Recorded subtree starts, in issue order.
    subtree_starts: Vec<Oid>,
}

/// Mock engine for testing walk orchestration.
///
/// Subtree scripts are keyed by start OID; a retrieval with no script
/// finishes immediately with no data. Table scripts are consumed in FIFO
/// order, one per [`fetch_rows`](SnmpEngine::fetch_rows) call.
///
/// # Example
///
/// ```
/// use mibgraph::engine::{MockEngine, MockRetrieval};
/// use mibgraph::{oid, VarBind, Value};
///
/// let engine = MockEngine::new();
/// engine.script_subtree(
///     oid!(1, 2),
///     MockRetrieval::Batches(vec![vec![
///         VarBind::new(oid!(1, 2, 1, 0), Value::Integer(3)),
///     ]]),
/// );
/// ```
#[derive(Clone, Default)]
pub struct MockEngine {
    state: Arc<Mutex<MockState>>,
}

impl MockEngine {
    /// Create a new mock engine with no scripts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the reaction to a subtree retrieval starting at `start`.
    pub fn script_subtree(&self, start: Oid, retrieval: MockRetrieval) {
        self.state.lock().unwrap().subtrees.insert(start, retrieval);
    }

    /// Queue the reaction to the next row-scoped retrieval.
    pub fn script_table(&self, retrieval: MockRetrieval) {
        self.state.lock().unwrap().tables.push_back(retrieval);
    }

    /// Serve `value` for GET requests on `oid`.
    pub fn script_value(&self, oid: Oid, value: crate::value::Value) {
        self.state.lock().unwrap().values.insert(oid, value);
    }

    /// The subtree start OIDs issued so far, in order.
    pub fn subtree_starts(&self) -> Vec<Oid> {
        self.state.lock().unwrap().subtree_starts.clone()
    }

    /// The row-range requests issued so far.
    pub fn row_requests(&self) -> Vec<RowRangeRequest> {
        self.state.lock().unwrap().row_requests.clone()
    }

    /// The bindings passed to `set` so far.
    pub fn set_bindings(&self) -> Vec<VarBind> {
        self.state.lock().unwrap().set_bindings.clone()
    }

    fn run_script(retrieval: MockRetrieval, sink: Arc<dyn WalkEventSink>) {
        // Deliver on a separate thread, like a real engine's worker would.
        thread::spawn(move || match retrieval {
            MockRetrieval::Batches(batches) => {
                for batch in &batches {
                    if !sink.deliver(batch) {
                        break;
                    }
                }
                sink.finished(RetrievalOutcome::Complete);
            }
            MockRetrieval::Error(error) => {
                sink.finished(RetrievalOutcome::Error(error));
            }
            MockRetrieval::Silent => {}
        });
    }
}

impl SnmpEngine for MockEngine {
    fn walk_subtree(&self, start: &Oid, _max_repetitions: u32, sink: Arc<dyn WalkEventSink>) {
        let retrieval = {
            let mut state = self.state.lock().unwrap();
            state.subtree_starts.push(start.clone());
            state
                .subtrees
                .get(start)
                .cloned()
                .unwrap_or(MockRetrieval::Batches(Vec::new()))
        };
        Self::run_script(retrieval, sink);
    }

    fn fetch_rows(&self, request: &RowRangeRequest, sink: Arc<dyn WalkEventSink>) {
        let retrieval = {
            let mut state = self.state.lock().unwrap();
            state.row_requests.push(request.clone());
            state
                .tables
                .pop_front()
                .unwrap_or(MockRetrieval::Batches(Vec::new()))
        };
        Self::run_script(retrieval, sink);
    }

    fn get(&self, oids: &[Oid]) -> Result<Vec<VarBind>, EngineError> {
        let state = self.state.lock().unwrap();
        let mut out = Vec::with_capacity(oids.len());
        for oid in oids {
            match state.values.get(oid) {
                Some(value) => out.push(VarBind::new(oid.clone(), value.clone())),
                None => return Err(EngineError::NoResponse),
            }
        }
        Ok(out)
    }

    fn set(&self, bindings: &[VarBind]) -> Result<(), EngineError> {
        self.state
            .lock()
            .unwrap()
            .set_bindings
            .extend_from_slice(bindings);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use crate::{oid, RetrievalOutcome};
    use std::sync::mpsc;

    struct CollectingSink {
        tx: Mutex<mpsc::Sender<Vec<VarBind>>>,
        done: Mutex<mpsc::Sender<bool>>,
    }

    impl WalkEventSink for CollectingSink {
        fn deliver(&self, batch: &[VarBind]) -> bool {
            self.tx.lock().unwrap().send(batch.to_vec()).unwrap();
            true
        }

        fn finished(&self, outcome: RetrievalOutcome) {
            let ok = matches!(outcome, RetrievalOutcome::Complete);
            self.done.lock().unwrap().send(ok).unwrap();
        }
    }

    #[test]
    fn scripted_batches_are_delivered_in_order() {
        let engine = MockEngine::new();
        engine.script_subtree(
            oid!(1, 2),
            MockRetrieval::Batches(vec![
                vec![VarBind::new(oid!(1, 2, 1, 0), Value::Integer(1))],
                vec![VarBind::new(oid!(1, 2, 2, 0), Value::Integer(2))],
            ]),
        );

        let (tx, rx) = mpsc::channel();
        let (done_tx, done_rx) = mpsc::channel();
        let sink = Arc::new(CollectingSink {
            tx: Mutex::new(tx),
            done: Mutex::new(done_tx),
        });

        engine.walk_subtree(&oid!(1, 2), 10, sink);

        assert!(done_rx
            .recv_timeout(std::time::Duration::from_secs(5))
            .unwrap());
        let batches: Vec<_> = rx.try_iter().collect();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0][0].oid, oid!(1, 2, 1, 0));
        assert_eq!(engine.subtree_starts(), vec![oid!(1, 2)]);
    }

    #[test]
    fn unscripted_subtree_finishes_empty() {
        let engine = MockEngine::new();
        let (tx, rx) = mpsc::channel();
        let (done_tx, done_rx) = mpsc::channel();
        let sink = Arc::new(CollectingSink {
            tx: Mutex::new(tx),
            done: Mutex::new(done_tx),
        });

        engine.walk_subtree(&oid!(9, 9), 10, sink);

        assert!(done_rx
            .recv_timeout(std::time::Duration::from_secs(5))
            .unwrap());
        assert!(rx.try_iter().next().is_none());
    }

    #[test]
    fn get_returns_scripted_values() {
        let engine = MockEngine::new();
        engine.script_value(oid!(1, 1, 0), Value::from("router"));

        let result = engine.get(&[oid!(1, 1, 0)]).unwrap();
        assert_eq!(result[0].value, Value::from("router"));

        assert_eq!(engine.get(&[oid!(5, 5, 0)]), Err(EngineError::NoResponse));
    }
}
