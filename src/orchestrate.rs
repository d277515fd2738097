//! Multi-hat orchestration.
//!
//! Hats are applied one hop at a time, counting the iteration index down from the requested
//! count to 1. Every hop detects the face again on the previous hop's output, so hops are strictly
//! sequential.

use std::time::Duration;

use crate::composite::Compositor;
use crate::foundation::core::{HatAsset, HatCount, ImageBuffer, TransformKnobs};
use crate::foundation::error::{HatError, HatResult};
use crate::hop::wire::HopResponse;

/// Where the orchestration currently stands.
#[derive(Clone, Debug, PartialEq)]
pub enum HopState {
    /// More hops follow; the response will be decoded and fed back.
    Running {
        /// Iteration index of the next hop (> 1).
        iteration: u32,
        /// Photo the next hop will composite onto.
        current: ImageBuffer,
    },
    /// Last hop; its raw response is the result.
    Terminal {
        /// Photo the final hop will composite onto.
        current: ImageBuffer,
    },
}

impl HopState {
    /// State before the first hop of a run with `count` hats.
    pub fn start(face: ImageBuffer, count: HatCount) -> Self {
        Self::at(count.get(), face)
    }

    fn at(iteration: u32, current: ImageBuffer) -> Self {
        if iteration > 1 {
            Self::Running { iteration, current }
        } else {
            Self::Terminal { current }
        }
    }

    /// Iteration index of the hop this state is about to run.
    pub fn iteration(&self) -> u32 {
        match self {
            Self::Running { iteration, .. } => *iteration,
            Self::Terminal { .. } => 1,
        }
    }

    /// Knobs for the hop this state is about to run.
    pub fn knobs(&self) -> TransformKnobs {
        TransformKnobs::for_iteration(self.iteration())
    }
}

/// Output of a completed run.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositeResult {
    /// Raw body of the terminal hop, passed through unmodified.
    pub body: HopResponse,
    /// Number of hops performed.
    pub hops: u32,
}

/// Drives a [`Compositor`] through the hops of one run.
pub struct Orchestrator<'a> {
    compositor: &'a dyn Compositor,
    hop_timeout: Option<Duration>,
}

impl<'a> Orchestrator<'a> {
    /// Orchestrate with no per-hop deadline.
    pub fn new(compositor: &'a dyn Compositor) -> Self {
        Self {
            compositor,
            hop_timeout: None,
        }
    }

    /// Abort the run when any single hop takes longer than `timeout`.
    pub fn with_hop_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.hop_timeout = timeout;
        self
    }

    /// Apply `count` hats to `face`.
    ///
    /// Fails on the first failing hop; no partially hatted image is ever returned.
    #[tracing::instrument(level = "info", skip_all, fields(count = count.get(), style = ?hat.style))]
    pub async fn apply_hats(
        &self,
        face: ImageBuffer,
        hat: &HatAsset,
        count: HatCount,
    ) -> HatResult<CompositeResult> {
        let mut state = HopState::start(face, count);
        let mut hops = 0u32;
        loop {
            let knobs = state.knobs();
            tracing::info!(hat = knobs.iteration, of = count.get(), "applying hat");
            match state {
                HopState::Running { iteration, current } => {
                    let resp = self.hop(current, hat, knobs).await?;
                    hops += 1;
                    let next = resp.final_image()?;
                    tracing::debug!(hat = iteration, bytes = next.len(), "hop complete");
                    state = HopState::at(iteration - 1, next);
                }
                HopState::Terminal { current } => {
                    let body = self.hop(current, hat, knobs).await?;
                    hops += 1;
                    tracing::info!(hops, "all hats applied");
                    return Ok(CompositeResult { body, hops });
                }
            }
        }
    }

    async fn hop(
        &self,
        face: ImageBuffer,
        hat: &HatAsset,
        knobs: TransformKnobs,
    ) -> HatResult<HopResponse> {
        let call = self.compositor.composite(face, hat, knobs);
        let result = match self.hop_timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                HatError::backend(format!(
                    "hop {} did not complete within {} ms",
                    knobs.iteration,
                    limit.as_millis()
                ))
            })?,
            None => call.await,
        };
        if let Err(err) = &result {
            tracing::warn!(hat = knobs.iteration, error = %err, "hop failed, aborting run");
        }
        result
    }
}

#[cfg(test)]
#[path = "../tests/unit/orchestrate.rs"]
mod tests;
