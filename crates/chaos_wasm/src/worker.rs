//! Web Worker plumbing for the heavy kernels.
//!
//! The worker script calls [`handle_compute_request`] on every message. The
//! page owns a [`WasmComputeDelegate`], which posts through a JS callback and
//! falls back to computing on the main thread when it has none.

use crate::shared::to_js;
use anyhow::anyhow;
use chaos_core::delegate::{
    run_job, ComputeChannel, ComputeDelegate, ComputeRequest, ComputeResponse, HeavyJob,
    Submission,
};
use chaos_core::params::ParameterSet;
use js_sys::Function;
use serde::Serialize;
use serde_wasm_bindgen::from_value;
use wasm_bindgen::prelude::*;

/// Worker side: `{ id, job, maxPoints }` in, `{ id, points }` out.
#[wasm_bindgen(js_name = handleComputeRequest)]
pub fn handle_compute_request(request: JsValue) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();
    let request: ComputeRequest = from_value(request)?;
    to_js(&run_job(&request))
}

struct JsChannel {
    post: Function,
}

impl ComputeChannel for JsChannel {
    fn post(&mut self, request: ComputeRequest) -> anyhow::Result<()> {
        let message = to_js(&request).map_err(|e| anyhow!("{:?}", e))?;
        self.post
            .call1(&JsValue::NULL, &message)
            .map(|_| ())
            .map_err(|e| anyhow!("postMessage failed: {:?}", e))
    }
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
enum SubmitPayload {
    Pending { id: u64 },
    Ready { id: u64, points: Vec<chaos_core::kernels::Point2> },
}

impl From<Submission> for SubmitPayload {
    fn from(submission: Submission) -> Self {
        match submission {
            Submission::Pending(id) => SubmitPayload::Pending { id },
            Submission::Ready(ComputeResponse { id, points }) => {
                SubmitPayload::Ready { id, points }
            }
        }
    }
}

#[wasm_bindgen]
pub struct WasmComputeDelegate {
    inner: ComputeDelegate<JsChannel>,
}

#[wasm_bindgen]
impl WasmComputeDelegate {
    /// `post` forwards a request to the worker, e.g. `(m) => worker.postMessage(m)`.
    /// Pass nothing to always compute on the calling thread.
    #[wasm_bindgen(constructor)]
    pub fn new(post: Option<Function>) -> WasmComputeDelegate {
        console_error_panic_hook::set_once();
        WasmComputeDelegate {
            inner: ComputeDelegate::new(post.map(|post| JsChannel { post })),
        }
    }

    /// `{ status: "pending", id }` or `{ status: "ready", id, points }`.
    pub fn submit(&mut self, parameters: JsValue, max_points: Option<u32>) -> Result<JsValue, JsValue> {
        let parameters: ParameterSet = from_value(parameters)?;
        let job = HeavyJob::from_parameters(&parameters).ok_or_else(|| {
            JsValue::from_str(&format!(
                "{} is computed inline, not by the worker.",
                parameters.map_type()
            ))
        })?;
        let max_points = max_points.map_or_else(|| job.default_max_points(), |n| n as usize);
        to_js(&SubmitPayload::from(self.inner.submit(job, max_points)))
    }

    /// Points for the latest request, or `null` for a stale response.
    pub fn accept(&mut self, response: JsValue) -> Result<JsValue, JsValue> {
        let response: ComputeResponse = from_value(response)?;
        match self.inner.accept(response) {
            Some(points) => to_js(&points),
            None => Ok(JsValue::NULL),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.inner.is_pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chaos_core::kernels::Point2;

    #[test]
    fn submit_payload_is_tagged_by_status() {
        let json = serde_json::to_value(SubmitPayload::from(Submission::Pending(4))).expect("serialize");
        assert_eq!(json, serde_json::json!({ "status": "pending", "id": 4 }));

        let ready = Submission::Ready(ComputeResponse {
            id: 5,
            points: vec![Point2 { x: 0.5, y: 1.5 }],
        });
        let json = serde_json::to_value(SubmitPayload::from(ready)).expect("serialize");
        assert_eq!(json["status"], "ready");
        assert_eq!(json["points"][0], serde_json::json!([0.5, 1.5]));
    }

    #[test]
    fn delegate_without_worker_computes_inline() {
        let mut delegate = WasmComputeDelegate::new(None);
        let job = HeavyJob::from_parameters(&chaos_core::default_parameters(
            chaos_core::MapType::ChaosEsthetique,
        ))
        .expect("heavy job");
        let submission = delegate.inner.submit(job, 10);
        assert!(matches!(submission, Submission::Ready(ref r) if r.points.len() == 10));
        assert!(!delegate.is_pending());
    }
}
