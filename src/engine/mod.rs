pub mod pipeline;
pub mod rate;

use crate::model::{Config, ScanSummary, Verdict};
use crate::output::OutputChannel;
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use pipeline::{HeartbleedProcessor, TargetProcessor};
use rate::RateLimiter;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, instrument, warn};

pub struct Engine {
    cfg: Config,
    output: OutputChannel,
    processor: Arc<dyn TargetProcessor>,
    limiter: RateLimiter,
    sem: Arc<Semaphore>,
}

impl Engine {
    pub fn new(cfg: Config, output: OutputChannel) -> anyhow::Result<Self> {
        let processor = Arc::new(HeartbleedProcessor::new(&cfg.probe));
        Self::with_processor(cfg, output, processor)
    }

    pub fn with_processor(
        cfg: Config,
        output: OutputChannel,
        processor: Arc<dyn TargetProcessor>,
    ) -> anyhow::Result<Self> {
        if cfg.concurrency == 0 {
            anyhow::bail!("concurrency must be greater than zero");
        }
        if cfg.rate == 0 {
            anyhow::bail!("rate must be greater than zero");
        }
        Ok(Self {
            limiter: RateLimiter::new(cfg.rate),
            sem: Arc::new(Semaphore::new(cfg.concurrency)),
            processor,
            cfg,
            output,
        })
    }

    /// Probes every target once and returns verdict counts after the
    /// output has been drained.
    #[instrument(skip(self))]
    pub async fn run(&mut self) -> anyhow::Result<ScanSummary> {
        let mut targets = crate::input::stream_targets(&self.cfg)?;
        let mut tasks = FuturesUnordered::new();

        while let Some(target) = targets.next().await {
            self.limiter.acquire().await;
            let permit = self.sem.clone().acquire_owned().await?;
            let processor = self.processor.clone();
            let output = self.output.clone();
            debug!(host = %target.host, port = target.port, "dispatching probe");
            tasks.push(tokio::spawn(async move {
                let _permit = permit;
                let outcome = processor.process_target(target).await;
                let verdict = outcome.verdict;
                if let Err(err) = output.emit(outcome).await {
                    warn!(error = %err, "dropping probe outcome");
                }
                verdict
            }));

            self.limiter.sleep_jitter().await;
        }

        let mut summary = ScanSummary::default();
        while let Some(joined) = tasks.next().await {
            match joined {
                Ok(verdict) => summary.record(verdict),
                Err(err) => {
                    warn!(error = %err, "probe task failed");
                    summary.record(Verdict::Unknown);
                }
            }
        }

        self.output.shutdown().await?;
        Ok(summary)
    }
}
