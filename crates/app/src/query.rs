//! Single-device state query with bounded retries.
//!
//! The request goes to one device; the answer arrives on the transport's
//! state-report channel. Each attempt waits up to [`QueryPolicy::timeout`];
//! an unanswered attempt is re-sent. The query fails with
//! [`QueryError::Timeout`] as soon as the [`QueryPolicy::max_retries`]-th
//! resend goes out, without waiting another window.

use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::time::{Instant, timeout_at};

use lampctl_domain::error::{LampError, QueryError};
use lampctl_domain::light::{BulbState, DeviceHandle};

use crate::ports::LightTransport;

/// Wait and retry budget for one state query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryPolicy {
    pub timeout: Duration,
    pub max_retries: u32,
}

impl Default for QueryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            max_retries: 5,
        }
    }
}

/// Ask `device` for its state and wait for the matching report.
///
/// Reports from other devices are never trusted; the first one seen in a
/// wait window causes the request to be re-issued to the right device.
///
/// # Errors
///
/// [`QueryError::Timeout`] once every retry is exhausted,
/// [`QueryError::Closed`] if the transport stops publishing reports, or a
/// transport error from sending the request.
#[tracing::instrument(skip(transport, device, policy), fields(device = %device.label))]
pub async fn query_state<T>(
    transport: &T,
    device: &DeviceHandle,
    policy: &QueryPolicy,
) -> Result<BulbState, LampError>
where
    T: LightTransport + ?Sized,
{
    // subscribe before sending so a fast answer cannot be missed
    let mut reports = transport.subscribe_states();
    transport.request_state(device).await?;

    let mut retries = 0;
    let mut deadline = Instant::now() + policy.timeout;
    let mut reissued = false;

    loop {
        match timeout_at(deadline, reports.recv()).await {
            Ok(Ok(report)) if report.device == device.id => {
                tracing::debug!(retries, "state received");
                return Ok(report.state);
            }
            Ok(Ok(report)) => {
                tracing::debug!(from = %report.device, "ignoring state reported by another device");
                if !reissued {
                    transport.request_state(device).await?;
                    reissued = true;
                }
            }
            Ok(Err(RecvError::Lagged(skipped))) => {
                tracing::debug!(skipped, "state reports lagged");
            }
            Ok(Err(RecvError::Closed)) => {
                return Err(QueryError::Closed {
                    device: device.label.clone(),
                }
                .into());
            }
            Err(_) => {
                if retries < policy.max_retries {
                    retries += 1;
                    tracing::debug!(retries, "no state yet, asking again");
                    transport.request_state(device).await?;
                }
                // the last resend is not waited on
                if retries >= policy.max_retries {
                    tracing::warn!(attempts = retries + 1, "device never reported its state");
                    return Err(QueryError::Timeout {
                        device: device.label.clone(),
                        attempts: retries + 1,
                    }
                    .into());
                }
                deadline = Instant::now() + policy.timeout;
                reissued = false;
            }
        }
    }
}
