use crate::model::{ProbeOutcome, ProbeSettings, TargetSpec};
use crate::probe::HeartbleedProbe;
use async_trait::async_trait;

/// Turns one target into one outcome. Implementations must not fail:
/// every error is reported inside the outcome.
#[async_trait]
pub trait TargetProcessor: Send + Sync {
    async fn process_target(&self, target: TargetSpec) -> ProbeOutcome;
}

pub struct HeartbleedProcessor {
    probe: HeartbleedProbe,
}

impl HeartbleedProcessor {
    pub fn new(settings: &ProbeSettings) -> Self {
        Self {
            probe: HeartbleedProbe::new(settings),
        }
    }
}

#[async_trait]
impl TargetProcessor for HeartbleedProcessor {
    async fn process_target(&self, target: TargetSpec) -> ProbeOutcome {
        self.probe.probe(&target).await
    }
}
