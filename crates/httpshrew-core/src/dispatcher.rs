//! Request dispatcher: a fixed worker pool fed by a bounded task queue
//!
//! Every request moves through `Queued -> InProgress -> Completed`. A worker
//! pulls a queued task, decodes it, runs the registered handler against a
//! [`ResponseRecorder`], encodes the result and fills the task's one-shot
//! slot. Completions are unordered across tasks.
//!
//! # Architecture
//!
//! - **Lazy start**: the queue and workers are created on first submission,
//!   exactly once, even under concurrent first calls.
//! - **Backpressure**: submitting blocks while the queue is full; nothing is
//!   dropped or rejected.
//! - **Fault isolation**: decode failures, a missing handler and handler
//!   panics all become well-formed HTTP responses; the worker keeps running.
//! - **No threads**: on targets where no worker can be spawned (for example
//!   `wasm32-unknown-unknown`) tasks are processed inline by the submitter.

use crate::codec;
use crate::config::DispatcherConfig;
use crate::handler::HandlerRegistry;
use crate::recorder::ResponseRecorder;
use crate::slot::{response_slot, PendingResponse, ResponseSlot, SlotWait};
use crossbeam_channel::{bounded, Receiver, SendError, Sender};
use once_cell::sync::OnceCell;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

struct Task {
    request: Vec<u8>,
    slot: ResponseSlot,
}

enum Pool {
    Threaded { sender: Sender<Task>, workers: usize },
    Inline,
}

pub struct Dispatcher {
    config: DispatcherConfig,
    registry: Arc<HandlerRegistry>,
    pool: OnceCell<Pool>,
}

impl Dispatcher {
    pub fn new(config: DispatcherConfig, registry: Arc<HandlerRegistry>) -> Self {
        Self {
            config,
            registry,
            pool: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Start the worker pool if it is not running yet. Idempotent.
    pub fn ensure_started(&self) {
        self.pool();
    }

    pub fn is_started(&self) -> bool {
        self.pool.get().is_some()
    }

    /// Number of worker threads actually running; 0 before start or in inline mode.
    pub fn worker_count(&self) -> usize {
        match self.pool.get() {
            Some(Pool::Threaded { workers, .. }) => *workers,
            _ => 0,
        }
    }

    /// Tasks waiting in the queue, not counting those being processed.
    pub fn queued_tasks(&self) -> usize {
        match self.pool.get() {
            Some(Pool::Threaded { sender, .. }) => sender.len(),
            _ => 0,
        }
    }

    fn pool(&self) -> &Pool {
        self.pool.get_or_init(|| self.start())
    }

    fn start(&self) -> Pool {
        let (sender, receiver) = bounded::<Task>(self.config.queue_depth);
        let mut workers = 0;
        for index in 0..self.config.workers {
            let receiver = receiver.clone();
            let registry = self.registry.clone();
            let spawned = thread::Builder::new()
                .name(format!("httpshrew-worker-{}", index))
                .spawn(move || worker_loop(receiver, registry));
            match spawned {
                Ok(_) => workers += 1,
                Err(e) => {
                    log::warn!("failed to spawn worker {}: {}", index, e);
                    break;
                }
            }
        }

        if workers == 0 {
            log::warn!("no worker threads available, processing requests inline");
            return Pool::Inline;
        }
        if self.config.enable_logging {
            log::info!(
                "dispatcher started with {} workers, queue depth {}",
                workers,
                self.config.queue_depth
            );
        }
        Pool::Threaded { sender, workers }
    }

    /// Enqueue a request, blocking while the queue is full.
    pub fn submit(&self, request: Vec<u8>) -> PendingResponse {
        let (slot, pending) = response_slot();
        match self.pool() {
            Pool::Threaded { sender, .. } => {
                if let Err(SendError(task)) = sender.send(Task { request, slot }) {
                    log::error!("all workers have exited, processing request inline");
                    task.slot.fill(process_request(&self.registry, &task.request));
                }
            }
            Pool::Inline => {
                slot.fill(process_request(&self.registry, &request));
            }
        }
        pending
    }

    /// Submit a request and wait for its encoded response.
    ///
    /// With a `response_timeout` configured, waiting (not enqueueing) is
    /// bounded and an expired wait yields `504 Gateway Timeout`. The worker
    /// still fills the abandoned slot when it finishes.
    pub fn dispatch(&self, request: Vec<u8>) -> Vec<u8> {
        let pending = self.submit(request);
        match self.config.response_timeout {
            None => pending.wait().unwrap_or_else(codec::internal_server_error),
            Some(timeout) => match pending.wait_timeout(timeout) {
                Ok(response) => response,
                Err(SlotWait::TimedOut(_)) => {
                    log::warn!("no response within {:?}, answering 504", timeout);
                    codec::gateway_timeout()
                }
                Err(SlotWait::Abandoned) => codec::internal_server_error(),
            },
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .field("started", &self.is_started())
            .field("workers", &self.worker_count())
            .finish()
    }
}

fn worker_loop(receiver: Receiver<Task>, registry: Arc<HandlerRegistry>) {
    for task in receiver.iter() {
        let response = process_request(&registry, &task.request);
        if !task.slot.fill(response) {
            log::debug!("caller stopped waiting, response discarded");
        }
    }
    log::debug!("task queue closed, worker exiting");
}

/// Turn raw request bytes into raw response bytes.
///
/// Unparsable input yields 400, a missing handler or a handler panic yields
/// 500. Never panics.
pub fn process_request(registry: &HandlerRegistry, bytes: &[u8]) -> Vec<u8> {
    let request = match codec::decode_request(bytes) {
        Ok(request) => request,
        Err(e) => {
            log::debug!("rejecting malformed request: {}", e);
            return codec::bad_request();
        }
    };

    let Some(handler) = registry.get() else {
        log::warn!("no request handler registered");
        return codec::internal_server_error();
    };

    log::trace!("{} {}", request.method(), request.uri());
    let mut recorder = ResponseRecorder::new();
    let served = catch_unwind(AssertUnwindSafe(|| handler.serve(request, &mut recorder)));
    if served.is_err() {
        log::error!("request handler panicked");
        return codec::internal_server_error();
    }
    codec::encode_response(&recorder.finish())
}
