//! Solving and deduction on a background thread.
//!
//! A request runs on its own thread and delivers exactly one [`WorkResponse`] through a channel.
//! [`WorkHandle::abort`] raises the request's [`CancelToken`]; the work stops before its next engine call and reports [`WorkResponse::Aborted`]
//! instead of a partial result.

use std::sync::mpsc;
use std::thread;

use log::error;
use serde::{Deserialize, Serialize};
use varisat::Solver;

use crate::backbone::deduct_with;
use crate::cancel::CancelToken;
use crate::entity::Entity;
use crate::solver::{solve_with, Outcome, SolverFailure};

/// Which operation a [`WorkRequest`] performs.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkMode {
    /// Find one solution.
    Solve,
    /// Find the edges fixed across all solutions.
    Deduct,
}

/// A request that can be offloaded to a background worker.
#[derive(Clone, Debug)]
pub struct WorkRequest {
    /// What to compute.
    pub mode: WorkMode,
    /// A snapshot of the puzzle.
    pub entities: Vec<Entity>,
}

/// A response produced by background work.
#[derive(Debug)]
pub enum WorkResponse {
    /// The work ran to completion.
    Finished(Outcome),
    /// Solving or deduction failed outright.
    Failed(SolverFailure),
    /// The work was aborted before it finished.
    Aborted,
}

/// Errors that can occur while scheduling or receiving background work.
#[derive(Clone, Copy, Debug, Eq, PartialEq, derive_more::Display, derive_more::Error)]
pub enum WorkError {
    /// The worker thread could not be started.
    #[display("failed to spawn worker thread")]
    SpawnFailed,
    /// The worker went away without responding, e.g. by panicking.
    #[display("worker disconnected")]
    WorkerDisconnected,
}

impl WorkRequest {
    /// Handle a request and produce the corresponding response.
    #[must_use]
    pub fn handle(self, cancel: &CancelToken) -> WorkResponse {
        let result = match self.mode {
            WorkMode::Solve => solve_with(&self.entities, Solver::new(), cancel),
            WorkMode::Deduct => deduct_with(&self.entities, Solver::new(), cancel),
        };

        match result {
            Ok(outcome) => WorkResponse::Finished(outcome),
            Err(SolverFailure::Cancelled) => WorkResponse::Aborted,
            Err(failure) => WorkResponse::Failed(failure),
        }
    }
}

/// A handle for polling background work completion.
pub struct WorkHandle {
    receiver: mpsc::Receiver<WorkResponse>,
    cancel: CancelToken,
}

impl std::fmt::Debug for WorkHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkHandle").field("cancelled", &self.cancel.is_cancelled()).finish()
    }
}

impl WorkHandle {
    /// Attempts to poll for a completed response.
    pub fn poll(&mut self) -> Result<Option<WorkResponse>, WorkError> {
        use mpsc::TryRecvError;

        match self.receiver.try_recv() {
            Ok(response) => Ok(Some(response)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(WorkError::WorkerDisconnected),
        }
    }

    /// Block until the response arrives.
    pub fn wait(self) -> Result<WorkResponse, WorkError> {
        self.receiver.recv().map_err(|_| WorkError::WorkerDisconnected)
    }

    /// Ask the work to stop.
    ///
    /// The response is still delivered: [`WorkResponse::Aborted`], or the finished result if the work completed first.
    pub fn abort(&self) {
        self.cancel.cancel();
    }
}

/// Start `request` on a new thread and return a handle for polling completion.
pub fn spawn(request: WorkRequest) -> Result<WorkHandle, WorkError> {
    let (response_tx, receiver) = mpsc::channel();
    let cancel = CancelToken::new();
    let token = cancel.clone();

    thread::Builder::new()
        .name(format!("linkbone-{:?}", request.mode).to_lowercase())
        .spawn(move || {
            let response = request.handle(&token);
            // nobody may be listening anymore
            let _ = response_tx.send(response);
        })
        .map_err(|err| {
            error!("could not spawn worker: {err}");
            WorkError::SpawnFailed
        })?;

    Ok(WorkHandle { receiver, cancel })
}
