//! Off-thread execution of the heavy point-cloud kernels.
//!
//! A [`ComputeDelegate`] hands standard-map and chaos-esthétique jobs to a
//! [`ComputeChannel`] (a thread here, a Web Worker in the browser) and keeps
//! only the response to its most recent request. When no channel is available
//! or posting fails, the job runs in-process through the same [`run_job`], so
//! both paths produce identical points.

use crate::kernels::{
    calculate_chaos_esthetique, calculate_standard_map, Point2, CHAOS_ESTHETIQUE_MAX_POINTS,
    STANDARD_MAP_MAX_POINTS,
};
use crate::params::{ChaosEsthetiqueParameters, ParameterSet, StandardMapParameters};
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "parameters", rename_all = "kebab-case")]
pub enum HeavyJob {
    StandardMap(StandardMapParameters),
    ChaosEsthetique(ChaosEsthetiqueParameters),
}

impl HeavyJob {
    /// `None` for map types that are cheap enough to run inline.
    pub fn from_parameters(parameters: &ParameterSet) -> Option<Self> {
        match *parameters {
            ParameterSet::Standard(p) => Some(HeavyJob::StandardMap(p)),
            ParameterSet::ChaosEsthetique(p) => Some(HeavyJob::ChaosEsthetique(p)),
            _ => None,
        }
    }

    pub fn default_max_points(&self) -> usize {
        match self {
            HeavyJob::StandardMap(_) => STANDARD_MAP_MAX_POINTS,
            HeavyJob::ChaosEsthetique(_) => CHAOS_ESTHETIQUE_MAX_POINTS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeRequest {
    pub id: u64,
    pub job: HeavyJob,
    pub max_points: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputeResponse {
    pub id: u64,
    pub points: Vec<Point2>,
}

/// The single computation both the worker and the in-process fallback run.
pub fn run_job(request: &ComputeRequest) -> ComputeResponse {
    let points = match &request.job {
        HeavyJob::StandardMap(params) => calculate_standard_map(params, request.max_points),
        HeavyJob::ChaosEsthetique(params) => calculate_chaos_esthetique(params, request.max_points),
    };
    ComputeResponse {
        id: request.id,
        points,
    }
}

/// Transport to a worker. Responses come back out of band and are handed to
/// [`ComputeDelegate::accept`].
pub trait ComputeChannel {
    fn post(&mut self, request: ComputeRequest) -> Result<()>;
}

/// A channel that never exists, for delegates that always compute in-process.
pub enum NoChannel {}

impl ComputeChannel for NoChannel {
    fn post(&mut self, _request: ComputeRequest) -> Result<()> {
        match *self {}
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// Posted to the worker; wait for a response with this id.
    Pending(u64),
    /// Computed in-process.
    Ready(ComputeResponse),
}

pub struct ComputeDelegate<C: ComputeChannel = NoChannel> {
    channel: Option<C>,
    next_id: u64,
    latest: Option<u64>,
}

impl ComputeDelegate<NoChannel> {
    pub fn in_process() -> Self {
        Self::new(None)
    }
}

impl<C: ComputeChannel> ComputeDelegate<C> {
    pub fn new(channel: Option<C>) -> Self {
        Self {
            channel,
            next_id: 1,
            latest: None,
        }
    }

    pub fn channel(&self) -> Option<&C> {
        self.channel.as_ref()
    }

    /// Issues a new request, superseding any that is still outstanding.
    pub fn submit(&mut self, job: HeavyJob, max_points: usize) -> Submission {
        let id = self.next_id;
        self.next_id += 1;
        self.latest = Some(id);
        let request = ComputeRequest {
            id,
            job,
            max_points,
        };

        if let Some(channel) = self.channel.as_mut() {
            match channel.post(request) {
                Ok(()) => {
                    debug!(id, "posted compute request to worker");
                    return Submission::Pending(id);
                }
                Err(err) => warn!(id, error = %err, "worker post failed, computing in-process"),
            }
        }
        self.latest = None;
        Submission::Ready(run_job(&request))
    }

    /// Points of `response` if it answers the latest request; stale or
    /// duplicate responses are dropped.
    pub fn accept(&mut self, response: ComputeResponse) -> Option<Vec<Point2>> {
        if self.latest == Some(response.id) {
            self.latest = None;
            Some(response.points)
        } else {
            debug!(id = response.id, latest = ?self.latest, "dropping stale compute response");
            None
        }
    }

    pub fn is_pending(&self) -> bool {
        self.latest.is_some()
    }
}

/// Worker backed by a background thread.
pub struct ThreadChannel {
    requests: Option<Sender<ComputeRequest>>,
    responses: Receiver<ComputeResponse>,
    handle: Option<JoinHandle<()>>,
}

impl ThreadChannel {
    pub fn spawn() -> Self {
        let (request_tx, request_rx) = mpsc::channel::<ComputeRequest>();
        let (response_tx, response_rx) = mpsc::channel();
        let handle = thread::spawn(move || {
            for request in request_rx {
                if response_tx.send(run_job(&request)).is_err() {
                    break;
                }
            }
        });
        Self {
            requests: Some(request_tx),
            responses: response_rx,
            handle: Some(handle),
        }
    }

    pub fn try_recv(&self) -> Option<ComputeResponse> {
        self.responses.try_recv().ok()
    }

    /// Blocks until the worker answers; `None` once it has stopped.
    pub fn recv(&self) -> Option<ComputeResponse> {
        self.responses.recv().ok()
    }
}

impl ComputeChannel for ThreadChannel {
    fn post(&mut self, request: ComputeRequest) -> Result<()> {
        self.requests
            .as_ref()
            .ok_or_else(|| anyhow!("compute worker is shut down"))?
            .send(request)
            .map_err(|_| anyhow!("compute worker has stopped"))
    }
}

impl Drop for ThreadChannel {
    fn drop(&mut self) {
        self.requests = None;
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Shared flag that tells an in-flight load to give up.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Per-call-site bookkeeping for loads: each new request cancels the previous
/// one and gets a fresh token and id.
#[derive(Debug, Default)]
pub struct RequestGate {
    token: CancellationToken,
    last_request_id: u64,
}

impl RequestGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> (u64, CancellationToken) {
        self.token.cancel();
        self.token = CancellationToken::new();
        self.last_request_id += 1;
        (self.last_request_id, self.token.clone())
    }

    pub fn is_current(&self, id: u64) -> bool {
        id == self.last_request_id && !self.token.is_cancelled()
    }

    pub fn cancel(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::default_parameters;
    use crate::schema::MapType;

    struct BrokenChannel;

    impl ComputeChannel for BrokenChannel {
        fn post(&mut self, _request: ComputeRequest) -> Result<()> {
            Err(anyhow!("worker unavailable"))
        }
    }

    fn standard_job(k: f64) -> HeavyJob {
        HeavyJob::StandardMap(StandardMapParameters {
            k,
            num_p: 6.0,
            num_q: 6.0,
            iterations: 300.0,
        })
    }

    #[test]
    fn only_heavy_map_types_become_jobs() {
        for map_type in MapType::ALL {
            let job = HeavyJob::from_parameters(&default_parameters(map_type));
            assert_eq!(job.is_some(), map_type.prefers_worker(), "{map_type}");
        }
    }

    #[test]
    fn in_process_fallback_is_immediate() {
        let mut delegate = ComputeDelegate::in_process();
        let job = standard_job(1.2);
        match delegate.submit(job, job.default_max_points()) {
            Submission::Ready(response) => assert_eq!(response.points.len(), 6 * 6 * 300),
            other => panic!("expected in-process result, got {other:?}"),
        }
        assert!(!delegate.is_pending());
    }

    #[test]
    fn failed_post_falls_back_in_process() {
        let mut delegate = ComputeDelegate::new(Some(BrokenChannel));
        assert!(matches!(
            delegate.submit(standard_job(0.5), 100),
            Submission::Ready(ref r) if r.points.len() == 100
        ));
    }

    #[test]
    fn worker_and_in_process_results_are_identical() {
        let job = HeavyJob::ChaosEsthetique(ChaosEsthetiqueParameters {
            a: 0.9,
            b: 0.9999,
            x0: 18.0,
            y0: 0.0,
            iterations: 5_000.0,
        });
        let mut local = ComputeDelegate::in_process();
        let Submission::Ready(expected) = local.submit(job, job.default_max_points()) else {
            panic!("in-process delegate must compute immediately");
        };

        let mut remote = ComputeDelegate::new(Some(ThreadChannel::spawn()));
        let Submission::Pending(id) = remote.submit(job, job.default_max_points()) else {
            panic!("thread channel accepts posts");
        };
        let response = remote.channel().and_then(ThreadChannel::recv).expect("worker reply");
        assert_eq!(response.id, id);
        let points = remote.accept(response).expect("latest response");
        assert_eq!(points.len(), expected.points.len());
        for (a, b) in points.iter().zip(&expected.points) {
            assert_eq!(a.x.to_bits(), b.x.to_bits());
            assert_eq!(a.y.to_bits(), b.y.to_bits());
        }
    }

    #[test]
    fn last_request_wins() {
        let mut delegate = ComputeDelegate::new(Some(ThreadChannel::spawn()));
        let first = delegate.submit(standard_job(0.3), 50);
        let second = delegate.submit(standard_job(0.6), 50);
        assert_eq!(first, Submission::Pending(1));
        assert_eq!(second, Submission::Pending(2));

        let channel = delegate.channel().expect("channel");
        let responses = [
            channel.recv().expect("first reply"),
            channel.recv().expect("second reply"),
        ];
        let [stale, fresh] = responses;
        assert_eq!(stale.id, 1);
        assert!(delegate.accept(stale).is_none());
        let duplicate = fresh.clone();
        assert!(delegate.accept(fresh).is_some());
        assert!(delegate.accept(duplicate).is_none());
    }

    #[test]
    fn request_gate_cancels_the_previous_load() {
        let mut gate = RequestGate::new();
        let (first_id, first_token) = gate.begin();
        let (second_id, second_token) = gate.begin();
        assert!(first_token.is_cancelled());
        assert!(!second_token.is_cancelled());
        assert!(!gate.is_current(first_id));
        assert!(gate.is_current(second_id));
        gate.cancel();
        assert!(second_token.is_cancelled());
        assert!(!gate.is_current(second_id));
    }

    #[test]
    fn requests_serialize_for_a_worker() {
        let request = ComputeRequest {
            id: 7,
            job: standard_job(0.9),
            max_points: 10,
        };
        let json = serde_json::to_value(request).expect("serialize");
        assert_eq!(json["job"]["kind"], "standard-map");
        assert_eq!(json["maxPoints"], 10);
        let back: ComputeRequest = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, request);
    }
}
