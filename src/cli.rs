use clap::{ArgAction, Parser};
use heartbleed_probe::model::{
    Config, OutputConfig, OutputFormat, ProbeSettings, TargetSpec, DEFAULT_TLS_PORT,
};
use heartbleed_probe::tls::record::DEFAULT_MAX_RECORD_BYTES;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(author, version, about = "Heartbleed (CVE-2014-0160) probe", long_about = None)]
pub struct Cli {
    /// Single host to probe
    #[arg(short = 'H', long = "host", value_name = "HOST")]
    pub host: Option<String>,

    /// Port for --host
    #[arg(short = 'p', long = "port", value_name = "PORT", default_value_t = DEFAULT_TLS_PORT)]
    pub port: u16,

    /// File containing targets (host[:port], one per line)
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    pub input: Option<String>,

    /// Concurrent probes
    #[arg(long = "concurrency", default_value_t = 16)]
    pub concurrency: usize,

    /// New connections per second
    #[arg(long = "rate", default_value_t = 16)]
    pub rate: u32,

    /// Connect timeout in milliseconds
    #[arg(long = "connect-timeout", default_value_t = 3000)]
    pub connect_timeout_ms: u64,

    /// Timeout for each record read or write in milliseconds
    #[arg(long = "read-timeout", default_value_t = 5000)]
    pub read_timeout_ms: u64,

    /// Overall timeout per target in milliseconds
    #[arg(long = "overall-timeout", default_value_t = 15000)]
    pub overall_timeout_ms: u64,

    /// Largest record payload accepted from the server
    #[arg(long = "max-record-bytes", default_value_t = DEFAULT_MAX_RECORD_BYTES)]
    pub max_record_bytes: usize,

    /// Handshake records to read before giving up on ServerHelloDone
    #[arg(long = "max-handshake-records", default_value_t = 32)]
    pub max_handshake_records: usize,

    /// Output format
    #[arg(long = "output", default_value_t = OutputFormat::Jsonl)]
    pub output: OutputFormat,

    /// Shorthand for --output pretty
    #[arg(long = "pretty", action = ArgAction::SetTrue)]
    pub pretty: bool,
}

impl Cli {
    pub fn into_config(self) -> anyhow::Result<Config> {
        if self.host.is_none() && self.input.is_none() {
            anyhow::bail!("either --host or --input is required");
        }

        if self.host.is_some() && self.input.is_some() {
            anyhow::bail!("--host and --input are mutually exclusive");
        }

        if self.concurrency == 0 {
            anyhow::bail!("concurrency must be greater than zero");
        }

        if self.rate == 0 {
            anyhow::bail!("rate must be greater than zero");
        }

        if self.connect_timeout_ms == 0 || self.read_timeout_ms == 0 || self.overall_timeout_ms == 0
        {
            anyhow::bail!("timeouts must be greater than zero");
        }

        if self.max_handshake_records == 0 {
            anyhow::bail!("max-handshake-records must be greater than zero");
        }

        let target = match self.host {
            Some(host) if host.trim().is_empty() => anyhow::bail!("--host must not be empty"),
            Some(_) if self.port == 0 => anyhow::bail!("--port must be between 1 and 65535"),
            Some(host) => Some(TargetSpec {
                host: host.trim().to_string(),
                port: self.port,
            }),
            None => None,
        };

        Ok(Config {
            target,
            input: self.input,
            concurrency: self.concurrency,
            rate: self.rate,
            probe: ProbeSettings {
                connect_timeout: Duration::from_millis(self.connect_timeout_ms),
                read_timeout: Duration::from_millis(self.read_timeout_ms),
                overall_timeout: Duration::from_millis(self.overall_timeout_ms),
                max_record_bytes: self.max_record_bytes,
                max_handshake_records: self.max_handshake_records,
            },
            output: OutputConfig {
                format: if self.pretty {
                    OutputFormat::Pretty
                } else {
                    self.output
                },
            },
        })
    }
}
