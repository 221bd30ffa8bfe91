use crate::model::{OutputConfig, ProbeOutcome};
use tokio::sync::mpsc;

use super::sink::OutputSink;

#[derive(Clone)]
pub struct OutputChannel {
    inner: std::sync::Arc<OutputInner>,
}

struct OutputInner {
    tx: tokio::sync::Mutex<Option<mpsc::Sender<OutputCommand>>>,
    handle: tokio::sync::Mutex<Option<tokio::task::JoinHandle<()>>>,
}

enum OutputCommand {
    Emit(Box<ProbeOutcome>),
}

impl OutputChannel {
    pub fn new(cfg: OutputConfig) -> anyhow::Result<Self> {
        let (tx, mut rx) = mpsc::channel(1024);
        let handle = tokio::task::spawn_blocking(move || {
            let mut sink = OutputSink::stdout(cfg);
            while let Some(cmd) = rx.blocking_recv() {
                if let Err(err) = match cmd {
                    OutputCommand::Emit(outcome) => sink.write_outcome(&outcome),
                } {
                    tracing::error!(error = %err, "failed to write probe outcome");
                }
            }
            if let Err(err) = sink.flush() {
                tracing::error!(error = %err, "failed to flush probe output");
            }
        });

        Ok(Self {
            inner: std::sync::Arc::new(OutputInner {
                tx: tokio::sync::Mutex::new(Some(tx)),
                handle: tokio::sync::Mutex::new(Some(handle)),
            }),
        })
    }

    pub async fn emit(&self, outcome: ProbeOutcome) -> anyhow::Result<()> {
        let guard = self.inner.tx.lock().await;
        if let Some(tx) = guard.as_ref() {
            tx.send(OutputCommand::Emit(Box::new(outcome)))
                .await
                .map_err(|err| anyhow::anyhow!("output worker not available: {err}"))?
        } else {
            anyhow::bail!("output worker not available; dropping probe outcome");
        }
        Ok(())
    }

    /// Closes the channel and waits for the writer to drain.
    pub async fn shutdown(&self) -> anyhow::Result<()> {
        self.inner.tx.lock().await.take();

        if let Some(handle) = self.inner.handle.lock().await.take() {
            handle
                .await
                .map_err(|err| anyhow::anyhow!("failed to join output worker: {err}"))?;
        }

        Ok(())
    }
}
