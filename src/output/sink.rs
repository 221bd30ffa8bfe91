use crate::model::{OutputConfig, OutputFormat, ProbeOutcome};
use std::io::{BufWriter, Write};

pub struct OutputSink<W: Write> {
    cfg: OutputConfig,
    writer: BufWriter<W>,
}

impl OutputSink<std::io::Stdout> {
    pub fn stdout(cfg: OutputConfig) -> Self {
        Self::new(cfg, std::io::stdout())
    }
}

impl<W: Write> OutputSink<W> {
    pub fn new(cfg: OutputConfig, writer: W) -> Self {
        Self {
            cfg,
            writer: BufWriter::new(writer),
        }
    }

    pub fn write_outcome(&mut self, outcome: &ProbeOutcome) -> anyhow::Result<()> {
        match self.cfg.format {
            OutputFormat::Jsonl => {
                let line = serde_json::to_string(outcome)?;
                writeln!(self.writer, "{line}")?;
            }
            OutputFormat::Pretty => {
                let addr = outcome.target.addr.as_deref().unwrap_or("unresolved");
                writeln!(
                    self.writer,
                    "{}:{} ({}) -> {}",
                    outcome.target.host, outcome.target.port, addr, outcome.verdict
                )?;
                writeln!(self.writer, "  diagnostic: {}", outcome.diagnostic)?;
                for record in &outcome.records {
                    writeln!(self.writer, "  record: {record}")?;
                }
            }
        }
        self.writer.flush()?;
        Ok(())
    }

    pub fn flush(&mut self) -> anyhow::Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    #[cfg(test)]
    fn into_inner(self) -> anyhow::Result<W> {
        self.writer
            .into_inner()
            .map_err(|err| anyhow::anyhow!("failed to flush output: {}", err.error()))
    }
}
