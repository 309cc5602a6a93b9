//! Full-tree walk orchestration.
//!
//! One foreground thread blocks on a channel with a bounded receive while
//! the engine's worker thread delivers batches to the listener. All listener
//! state lives behind a single mutex; the channel send is the only
//! completion signal. A walk that times out is marked finished so any
//! callback still in flight finds the flag set and is ignored.

use crate::engine::{RetrievalOutcome, SnmpEngine, WalkEventSink};
use crate::oid::Oid;
use crate::session::{SnmpSession, VariableBindingHandler, WalkError, WalkResponse};
use crate::varbind::VarBind;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, Weak};
use std::time::Instant;
use tracing::{debug, error, warn};

struct WalkState {
    /// The discovery roots, in ascending order (callers pass the registry's
    /// sorted discovery list).
    oids: Vec<Oid>,
    /// Cursor into `oids` for the subtree currently being retrieved.
    oid_index: usize,
    /// The last OID the handler accepted.
    last_processed: Option<Oid>,
    requests: u64,
    objects: u64,
    finished: bool,
    started: Instant,
}

pub(crate) struct WalkListener<E: SnmpEngine> {
    engine: Arc<E>,
    handler: Arc<dyn VariableBindingHandler>,
    max_repetitions: u32,
    tx: mpsc::Sender<WalkResponse>,
    state: Mutex<WalkState>,
    this: Weak<WalkListener<E>>,
}

impl<E: SnmpEngine + 'static> WalkListener<E> {
    pub(crate) fn create(
        engine: Arc<E>,
        handler: Arc<dyn VariableBindingHandler>,
        max_repetitions: u32,
        oids: Vec<Oid>,
        tx: mpsc::Sender<WalkResponse>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            engine,
            handler,
            max_repetitions,
            tx,
            state: Mutex::new(WalkState {
                oids,
                oid_index: 0,
                last_processed: None,
                requests: 0,
                objects: 0,
                finished: false,
                started: Instant::now(),
            }),
            this: this.clone(),
        })
    }

    /// Mark the walk finished without a result, so callbacks still in
    /// flight are ignored. Called by the foreground thread on timeout.
    pub(crate) fn abort(&self) {
        self.state.lock().expect("walk state poisoned").finished = true;
    }

    // Advance the root cursor past any remaining roots the device's sweep
    // already covered. Assumes the device returns strictly increasing OIDs;
    // out-of-order devices would make this skip roots it should not.
    fn advance(state: &mut WalkState) -> Option<Oid> {
        loop {
            state.oid_index += 1;
            let candidate = state.oids.get(state.oid_index)?;
            match &state.last_processed {
                Some(last) if last > candidate => continue,
                _ => return Some(candidate.clone()),
            }
        }
    }
}

impl<E: SnmpEngine + 'static> WalkEventSink for WalkListener<E> {
    fn deliver(&self, batch: &[VarBind]) -> bool {
        let mut state = self.state.lock().expect("walk state poisoned");
        if state.finished {
            return false;
        }
        state.requests += 1;
        for binding in batch {
            if self.handler.add_variable(binding) {
                state.objects += 1;
                state.last_processed = Some(binding.oid.clone());
            } else {
                // The device wandered outside the requested branch; abandon
                // this subtree's pagination and let completion advance to
                // the next root.
                debug!(binding = %binding, "unknown varbind, abandoning subtree");
                return false;
            }
        }
        true
    }

    fn finished(&self, outcome: RetrievalOutcome) {
        let mut state = self.state.lock().expect("walk state poisoned");
        if state.finished {
            return;
        }

        match outcome {
            RetrievalOutcome::Error(e) => {
                error!(error = %e, "engine error while walking");
                state.finished = true;
                let _ = self.tx.send(WalkResponse::failed(WalkError::Engine(e)));
            }
            RetrievalOutcome::Complete => {
                if let Some(next) = Self::advance(&mut state) {
                    debug!(next = %next, "next subtree");
                    drop(state);
                    if let Some(this) = self.this.upgrade() {
                        self.engine.walk_subtree(&next, self.max_repetitions, this);
                    }
                    return;
                }

                let elapsed = state.started.elapsed();
                debug!(
                    requests = state.requests,
                    objects = state.objects,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "walk finished"
                );
                state.finished = true;
                let _ = self.tx.send(WalkResponse::completed(
                    state.requests,
                    state.objects,
                    elapsed,
                ));
            }
        }
    }
}

impl<E: SnmpEngine + 'static> SnmpSession<E> {
    /// Walk the device's tree, forwarding every retrieved value to `handler`.
    ///
    /// `oids` is the ordered discovery list, normally
    /// [`EntityRegistry::discovery_oids`](crate::model::EntityRegistry::discovery_oids).
    /// Subtrees are retrieved in order, skipping any root the device's sweep
    /// already covered. The call blocks until the walk completes, fails, or
    /// the configured walk timeout expires.
    pub fn walk_device(
        &self,
        handler: Arc<dyn VariableBindingHandler>,
        oids: Vec<Oid>,
    ) -> WalkResponse {
        debug!(device = %self.address(), roots = oids.len(), "walk device");
        let Some(first) = oids.first().cloned() else {
            return WalkResponse::failed(WalkError::NothingToRetrieve);
        };

        let (tx, rx) = mpsc::channel();
        let listener = WalkListener::create(
            self.engine.clone(),
            handler,
            self.config.max_repetitions,
            oids,
            tx,
        );

        self.engine
            .walk_subtree(&first, self.config.max_repetitions, listener.clone());

        match rx.recv_timeout(self.config.walk_timeout) {
            Ok(response) => response,
            Err(RecvTimeoutError::Timeout) => {
                listener.abort();
                error!(device = %self.address(), "walk timed out");
                WalkResponse::failed(WalkError::Timeout)
            }
            Err(RecvTimeoutError::Disconnected) => {
                warn!(device = %self.address(), "walk ended without a recorded result");
                WalkResponse::failed(WalkError::Interrupted)
            }
        }
    }
}
