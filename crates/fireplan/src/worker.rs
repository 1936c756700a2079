//! Background dispatcher for running simulations without blocking the caller.
//!
//! One thread hosts the simulation core. Requests and outcomes cross the
//! boundary over channels; only atomics (generation, progress, cancel flag)
//! are shared. Every request gets a generation number and an outcome is only
//! ever delivered if it belongs to the newest generation, so a superseded run
//! can never overwrite a later one.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, TryRecvError, channel};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use fireplan_core::error::SimulationError;
use fireplan_core::model::{SimulationParams, SimulationProgress, SimulationResult};
use fireplan_core::simulation::{effective_seed, simulate_with_progress};

/// Function the background thread runs for each request
pub(crate) type SimulationRunner =
    fn(&SimulationParams, u64, &SimulationProgress) -> Result<SimulationResult, SimulationError>;

use crate::config::DispatcherConfig;
use crate::error::DispatchError;

/// Identifies one submitted request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of the most recent request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchState {
    /// Nothing has been submitted yet
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
    Cancelled,
}

/// Result of one request, delivered exactly once
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchOutcome {
    pub request_id: RequestId,
    pub result: Result<SimulationResult, SimulationError>,
}

/// Message sent to the background thread
#[derive(Debug)]
enum WorkerRequest {
    Run {
        request_id: RequestId,
        params: Box<SimulationParams>,
    },
    Shutdown,
}

/// Runs simulations on a dedicated background thread.
///
/// Submitting while a run is in flight supersedes it: the old run is asked to
/// stop and its result is discarded whether or not it finishes.
pub struct SimulationDispatcher {
    request_tx: Sender<WorkerRequest>,
    response_rx: Receiver<DispatchOutcome>,
    /// Generation of the newest request; bumped by `submit` and `cancel`
    generation: Arc<AtomicU64>,
    last_submitted: AtomicU64,
    cancel_flag: Arc<AtomicBool>,
    progress: Arc<AtomicUsize>,
    total: Arc<AtomicUsize>,
    state: Mutex<DispatchState>,
    thread: Option<JoinHandle<()>>,
}

impl SimulationDispatcher {
    /// Create a dispatcher with default configuration
    pub fn new() -> Result<Self, DispatchError> {
        Self::with_config(DispatcherConfig::default())
    }

    /// Create a dispatcher and spawn its background thread
    pub fn with_config(config: DispatcherConfig) -> Result<Self, DispatchError> {
        Self::with_runner(config, simulate_with_progress)
    }

    pub(crate) fn with_runner(
        config: DispatcherConfig,
        runner: SimulationRunner,
    ) -> Result<Self, DispatchError> {
        let (request_tx, request_rx) = channel();
        let (response_tx, response_rx) = channel();
        let generation = Arc::new(AtomicU64::new(0));
        let cancel_flag = Arc::new(AtomicBool::new(false));
        let progress = Arc::new(AtomicUsize::new(0));
        let total = Arc::new(AtomicUsize::new(0));

        let ctx = WorkerContext {
            response_tx,
            generation: generation.clone(),
            cancel_flag: cancel_flag.clone(),
            progress: progress.clone(),
            total: total.clone(),
            default_seed: config.default_seed,
            max_simulations: config.max_simulations,
            runner,
        };

        let thread = thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || ctx.run(request_rx))
            .map_err(DispatchError::Spawn)?;

        tracing::debug!(thread = %config.thread_name, "Simulation dispatcher started");

        Ok(Self {
            request_tx,
            response_rx,
            generation,
            last_submitted: AtomicU64::new(0),
            cancel_flag,
            progress,
            total,
            state: Mutex::new(DispatchState::Idle),
            thread: Some(thread),
        })
    }

    /// Submit a simulation. Any request still in flight is superseded.
    pub fn submit(&self, params: SimulationParams) -> Result<RequestId, DispatchError> {
        // Bump the generation before raising the cancel flag; the worker
        // clears the flag and then re-reads the generation.
        let request_id = RequestId(self.generation.fetch_add(1, Ordering::SeqCst) + 1);
        self.cancel_flag.store(true, Ordering::SeqCst);
        self.last_submitted.store(request_id.0, Ordering::SeqCst);
        self.progress.store(0, Ordering::SeqCst);
        self.total
            .store(params.num_simulations as usize, Ordering::SeqCst);

        tracing::info!(
            request = %request_id,
            trials = params.num_simulations,
            years = params.years,
            "Submitting simulation"
        );

        self.request_tx
            .send(WorkerRequest::Run {
                request_id,
                params: Box::new(params),
            })
            .map_err(|_| {
                self.set_state(DispatchState::Failed);
                DispatchError::WorkerUnavailable
            })?;

        self.set_state(DispatchState::Running);
        Ok(request_id)
    }

    /// Try to receive the outcome of the latest request (non-blocking)
    pub fn try_recv(&self) -> Option<DispatchOutcome> {
        loop {
            match self.response_rx.try_recv() {
                Ok(outcome) => {
                    if let Some(outcome) = self.accept(outcome) {
                        return Some(outcome);
                    }
                }
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => return self.worker_lost(),
            }
        }
    }

    /// Wait up to `timeout` for the outcome of the latest request
    pub fn recv_timeout(&self, timeout: Duration) -> Option<DispatchOutcome> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.response_rx.recv_timeout(remaining) {
                Ok(outcome) => {
                    if let Some(outcome) = self.accept(outcome) {
                        return Some(outcome);
                    }
                }
                Err(RecvTimeoutError::Timeout) => return None,
                Err(RecvTimeoutError::Disconnected) => return self.worker_lost(),
            }
        }
    }

    /// Block until the latest request resolves.
    ///
    /// Returns `None` immediately when nothing is running.
    pub fn wait(&self) -> Option<DispatchOutcome> {
        while self.state() == DispatchState::Running {
            match self.response_rx.recv() {
                Ok(outcome) => {
                    if let Some(outcome) = self.accept(outcome) {
                        return Some(outcome);
                    }
                }
                Err(_) => return self.worker_lost(),
            }
        }
        None
    }

    /// Cancel the in-flight request. Its result will not be delivered.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.cancel_flag.store(true, Ordering::SeqCst);

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state == DispatchState::Running {
            *state = DispatchState::Cancelled;
            tracing::info!("Simulation cancelled");
        }
    }

    pub fn state(&self) -> DispatchState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Completed and total trials of the current run
    pub fn progress(&self) -> (usize, usize) {
        (
            self.progress.load(Ordering::Relaxed),
            self.total.load(Ordering::Relaxed),
        )
    }

    /// Id of the most recently submitted request, if any
    pub fn latest_request(&self) -> Option<RequestId> {
        match self.last_submitted.load(Ordering::SeqCst) {
            0 => None,
            id => Some(RequestId(id)),
        }
    }

    /// Ask the background thread to stop after its current run.
    ///
    /// Requests submitted afterwards are never run; they resolve as failed.
    pub fn shutdown(&self) {
        self.cancel_flag.store(true, Ordering::SeqCst);
        let _ = self.request_tx.send(WorkerRequest::Shutdown);
    }

    fn set_state(&self, next: DispatchState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }

    /// Keep an outcome only if it belongs to the newest generation
    fn accept(&self, outcome: DispatchOutcome) -> Option<DispatchOutcome> {
        let current = self.generation.load(Ordering::SeqCst);
        if outcome.request_id.0 != current {
            tracing::debug!(
                request = %outcome.request_id,
                current,
                "Discarding outcome of superseded request"
            );
            return None;
        }

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state != DispatchState::Running {
            return None;
        }
        *state = match &outcome.result {
            Ok(_) => DispatchState::Completed,
            Err(SimulationError::Cancelled) => DispatchState::Cancelled,
            Err(_) => DispatchState::Failed,
        };
        Some(outcome)
    }

    /// The worker thread is gone. Fail the pending request once.
    fn worker_lost(&self) -> Option<DispatchOutcome> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state != DispatchState::Running {
            return None;
        }
        *state = DispatchState::Failed;
        tracing::warn!("Simulation worker exited with a request in flight");
        Some(DispatchOutcome {
            request_id: RequestId(self.last_submitted.load(Ordering::SeqCst)),
            result: Err(DispatchError::WorkerUnavailable.into()),
        })
    }
}

impl Drop for SimulationDispatcher {
    fn drop(&mut self) {
        self.shutdown();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// State owned by the background thread
struct WorkerContext {
    response_tx: Sender<DispatchOutcome>,
    generation: Arc<AtomicU64>,
    cancel_flag: Arc<AtomicBool>,
    progress: Arc<AtomicUsize>,
    total: Arc<AtomicUsize>,
    default_seed: Option<u64>,
    max_simulations: u32,
    runner: SimulationRunner,
}

impl WorkerContext {
    fn run(&self, request_rx: Receiver<WorkerRequest>) {
        while let Ok(mut request) = request_rx.recv() {
            // Queue-of-one: only the newest pending request is worth running.
            // A queued shutdown wins over anything submitted after it.
            while let Ok(next) = request_rx.try_recv() {
                if matches!(request, WorkerRequest::Shutdown) {
                    continue;
                }
                if let WorkerRequest::Run { request_id, .. } = &request {
                    tracing::debug!(request = %request_id, "Skipping queued request");
                }
                request = next;
            }

            match request {
                WorkerRequest::Shutdown => break,
                WorkerRequest::Run { request_id, params } => {
                    self.handle(request_id, &params);
                }
            }
        }
        tracing::debug!("Simulation worker stopped");
    }

    fn is_current(&self, request_id: RequestId) -> bool {
        self.generation.load(Ordering::SeqCst) == request_id.0
    }

    fn handle(&self, request_id: RequestId, params: &SimulationParams) {
        self.cancel_flag.store(false, Ordering::SeqCst);
        if !self.is_current(request_id) {
            tracing::debug!(request = %request_id, "Request superseded before start");
            return;
        }

        let started = Instant::now();
        let result = self.execute(params);

        if !self.is_current(request_id) {
            tracing::debug!(request = %request_id, "Dropping result of superseded request");
            return;
        }

        match &result {
            Ok(r) => tracing::info!(
                request = %request_id,
                success_rate = r.success_rate,
                median_final_value = r.median_final_value,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Simulation complete"
            ),
            Err(e) => tracing::warn!(request = %request_id, error = %e, "Simulation failed"),
        }

        let _ = self.response_tx.send(DispatchOutcome { request_id, result });
    }

    fn execute(&self, params: &SimulationParams) -> Result<SimulationResult, SimulationError> {
        if params.num_simulations > self.max_simulations {
            return Err(SimulationError::InvalidParameters(format!(
                "num_simulations {} exceeds the dispatcher limit of {}",
                params.num_simulations, self.max_simulations
            )));
        }

        let seed = params
            .seed
            .or(self.default_seed)
            .unwrap_or_else(|| effective_seed(params));
        tracing::debug!(seed, "Starting simulation run");

        self.progress.store(0, Ordering::SeqCst);
        self.total
            .store(params.num_simulations as usize, Ordering::SeqCst);
        let progress =
            SimulationProgress::from_atomics(self.progress.clone(), self.cancel_flag.clone());

        panic::catch_unwind(AssertUnwindSafe(|| {
            (self.runner)(params, seed, &progress)
        }))
        .unwrap_or_else(|payload| {
            Err(SimulationError::ComputationFailure(panic_message(
                payload.as_ref(),
            )))
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("simulation panicked: {msg}")
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("simulation panicked: {msg}")
    } else {
        "simulation panicked".to_string()
    }
}
