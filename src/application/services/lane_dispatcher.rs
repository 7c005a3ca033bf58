use crate::application::ports::TranscriptionError;
use crate::domain::{Lane, LaneOutcome, TranscriptionRequest};

use super::admission_permit::AdmissionPermit;
use super::fast_lane::FastLaneExecutor;
use super::slow_lane::SlowLaneExecutor;

/// Routes every request to exactly one lane.
///
/// A missing hot engine fails the request outright. Otherwise the admission
/// permit is tried once without waiting: the winner runs on the fast lane and
/// everyone else goes straight to a cold worker.
pub struct LaneDispatcher {
    fast_lane: Option<FastLaneExecutor>,
    slow_lane: SlowLaneExecutor,
    permit: AdmissionPermit,
}

impl LaneDispatcher {
    /// `fast_lane` is `None` when the hot engine failed to load at startup.
    pub fn new(fast_lane: Option<FastLaneExecutor>, slow_lane: SlowLaneExecutor) -> Self {
        Self {
            fast_lane,
            slow_lane,
            permit: AdmissionPermit::new(),
        }
    }

    pub fn with_permit(mut self, permit: AdmissionPermit) -> Self {
        self.permit = permit;
        self
    }

    pub fn permit(&self) -> &AdmissionPermit {
        &self.permit
    }

    pub fn engine_loaded(&self) -> bool {
        self.fast_lane.is_some()
    }

    pub async fn dispatch(
        &self,
        request: &TranscriptionRequest,
    ) -> Result<LaneOutcome, TranscriptionError> {
        let Some(fast_lane) = &self.fast_lane else {
            return Err(TranscriptionError::EngineUnavailable);
        };

        match self.permit.try_acquire() {
            Some(ticket) => {
                tracing::debug!("Fast lane is free, sending request");
                let result = fast_lane.execute(ticket, request).await?;
                Ok(LaneOutcome {
                    lane: Lane::Fast,
                    result,
                })
            }
            None => {
                tracing::debug!("Fast lane is busy, rerouting to slow lane");
                let result = self.slow_lane.execute(request).await?;
                Ok(LaneOutcome {
                    lane: Lane::Slow,
                    result,
                })
            }
        }
    }
}
