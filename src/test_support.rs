//! Test support utilities shared across unit and integration tests.

use std::collections::{BTreeSet, VecDeque};
use std::env;
use std::ffi::OsString;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, MutexGuard};

use crate::compute::{
    ComputeApi, ComputeError, ComputeFuture, LaunchedInstance, RunInstancesRequest,
    RunInstancesResponse, TerminateInstancesRequest,
};

#[derive(Debug, Default)]
struct Recording {
    run_requests: Vec<RunInstancesRequest>,
    terminate_requests: Vec<TerminateInstancesRequest>,
    run_responses: VecDeque<Result<RunInstancesResponse, ComputeError>>,
    terminate_responses: VecDeque<Result<(), ComputeError>>,
}

/// Compute API double that records requests and replays scripted responses
/// in FIFO order.
///
/// Clones share state, so a test can keep a handle while the service owns
/// another.
#[derive(Clone, Debug, Default)]
pub struct RecordingComputeApi {
    state: Arc<Mutex<Recording>>,
}

impl RecordingComputeApi {
    /// Creates a double with no queued responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(&self, action: impl FnOnce(&mut Recording) -> T) -> T {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        action(&mut *guard)
    }

    /// Queues a launch reporting one instance per id.
    pub fn push_launched(&self, instance_ids: &[&str]) {
        let instances = instance_ids
            .iter()
            .map(|id| LaunchedInstance {
                instance_id: Some((*id).to_owned()),
            })
            .collect();
        self.push_run_response(Ok(RunInstancesResponse { instances }));
    }

    /// Queues a launch that reports no instances.
    pub fn push_empty_launch(&self) {
        self.push_run_response(Ok(RunInstancesResponse::default()));
    }

    /// Queues an arbitrary launch outcome.
    pub fn push_run_response(&self, response: Result<RunInstancesResponse, ComputeError>) {
        self.with_state(|state| state.run_responses.push_back(response));
    }

    /// Queues a successful termination.
    pub fn push_terminated(&self) {
        self.push_terminate_response(Ok(()));
    }

    /// Queues an arbitrary termination outcome.
    pub fn push_terminate_response(&self, response: Result<(), ComputeError>) {
        self.with_state(|state| state.terminate_responses.push_back(response));
    }

    /// Returns every run-instances request received so far.
    #[must_use]
    pub fn run_requests(&self) -> Vec<RunInstancesRequest> {
        self.with_state(|state| state.run_requests.clone())
    }

    /// Returns every terminate-instances request received so far.
    #[must_use]
    pub fn terminate_requests(&self) -> Vec<TerminateInstancesRequest> {
        self.with_state(|state| state.terminate_requests.clone())
    }
}

fn unscripted(operation: &str) -> ComputeError {
    ComputeError::Transport {
        message: format!("no scripted response available for {operation}"),
    }
}

impl ComputeApi for RecordingComputeApi {
    fn run_instances<'a>(
        &'a self,
        request: &'a RunInstancesRequest,
    ) -> ComputeFuture<'a, RunInstancesResponse> {
        let response = self.with_state(|state| {
            state.run_requests.push(request.clone());
            state
                .run_responses
                .pop_front()
                .unwrap_or_else(|| Err(unscripted("run_instances")))
        });
        Box::pin(async move { response })
    }

    fn terminate_instances<'a>(
        &'a self,
        request: &'a TerminateInstancesRequest,
    ) -> ComputeFuture<'a, ()> {
        let response = self.with_state(|state| {
            state.terminate_requests.push(request.clone());
            state
                .terminate_responses
                .pop_front()
                .unwrap_or_else(|| Err(unscripted("terminate_instances")))
        });
        Box::pin(async move { response })
    }
}

/// Global mutex used to serialise environment mutation in tests.
pub static ENV_LOCK: AsyncMutex<()> = AsyncMutex::const_new(());

/// Guard that holds the env mutex and restores variables on drop.
pub struct EnvGuard {
    previous: Vec<(String, Option<OsString>)>,
    _guard: MutexGuard<'static, ()>,
}

impl EnvGuard {
    /// Sets multiple environment variables while holding a global mutex.
    pub async fn set_vars(pairs: &[(&str, &str)]) -> Self {
        debug_assert!(
            {
                let mut seen = BTreeSet::new();
                pairs.iter().all(|(key, _)| seen.insert(*key))
            },
            "duplicate environment variable keys passed to EnvGuard::set_vars"
        );

        let guard = ENV_LOCK.lock().await;
        let mut previous = Vec::with_capacity(pairs.len());
        for (key, value) in pairs {
            let old = env::var_os(key);
            // SAFETY: Environment mutation is serialised by `ENV_LOCK`, preventing races.
            unsafe { env::set_var(key, value) };
            previous.push(((*key).to_owned(), old));
        }

        Self {
            previous,
            _guard: guard,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, old) in &self.previous {
            // SAFETY: Environment mutation is serialised by holding `_guard`.
            unsafe {
                match old {
                    Some(val) => env::set_var(key, val),
                    None => env::remove_var(key),
                }
            }
        }
    }
}
