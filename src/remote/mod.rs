// ============================================================================
// Remote Client - the external aggregation API
// ============================================================================
//
// One request, one attempt. Transport errors, non-2xx statuses and bodies
// that are not JSON all surface as `RemoteOutcome::Failure`; nothing here
// retries or falls back. That policy lives in the controller.
//
// ============================================================================

mod client;
mod outcome;

pub use client::{HttpRemoteBackend, RemoteBackend, RemoteMethod, RemoteRequest, DEFAULT_REMOTE_TIMEOUT_SECS};
pub use outcome::{require_keys, RemoteFailure, RemoteOutcome};
