use crate::error::{ErrorKind, Phase};
use crate::tls::record::{RecordHeader, DEFAULT_MAX_RECORD_BYTES};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_TLS_PORT: u16 = 443;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TargetSpec {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub target: Option<TargetSpec>,
    pub input: Option<String>,
    pub concurrency: usize,
    pub rate: u32,
    pub probe: ProbeSettings,
    pub output: OutputConfig,
}

/// Bounds applied to a single probe.
#[derive(Debug, Clone)]
pub struct ProbeSettings {
    pub connect_timeout: Duration,
    /// Applies to each record read and each write.
    pub read_timeout: Duration,
    pub overall_timeout: Duration,
    pub max_record_bytes: usize,
    pub max_handshake_records: usize,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_millis(3000),
            read_timeout: Duration::from_millis(5000),
            overall_timeout: Duration::from_millis(15000),
            max_record_bytes: DEFAULT_MAX_RECORD_BYTES,
            max_handshake_records: 32,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputFormat {
    Jsonl,
    Pretty,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Jsonl => write!(f, "jsonl"),
            OutputFormat::Pretty => write!(f, "pretty"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Vulnerable,
    NotVulnerable,
    Unknown,
}

impl Verdict {
    pub fn diagnostic(&self) -> &'static str {
        match self {
            Verdict::Vulnerable => "server is vulnerable",
            Verdict::NotVulnerable => "server is NOT vulnerable",
            Verdict::Unknown => "no heartbeat response received",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Verdict::Vulnerable => "vulnerable",
            Verdict::NotVulnerable => "not-vulnerable",
            Verdict::Unknown => "unknown",
        };
        write!(f, "{}", label)
    }
}

/// Header fields of one record the server sent; the payload is never kept.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordSummary {
    pub record_type: u8,
    pub version: u16,
    pub length: u16,
}

impl From<&RecordHeader> for RecordSummary {
    fn from(header: &RecordHeader) -> Self {
        RecordSummary {
            record_type: header.record_type,
            version: header.version,
            length: header.length,
        }
    }
}

impl fmt::Display for RecordSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "type {}, ver 0x{:04x}, len {}",
            self.record_type, self.version, self.length
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetView {
    pub host: String,
    pub addr: Option<String>,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeOutcome {
    pub target: TargetView,
    pub verdict: Verdict,
    pub diagnostic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
    pub phase: Phase,
    pub heartbeat_sent: bool,
    pub records: Vec<RecordSummary>,
    pub connect_ms: Option<u128>,
    pub elapsed_ms: u128,
    pub timestamp: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub vulnerable: usize,
    pub not_vulnerable: usize,
    pub unknown: usize,
}

impl ScanSummary {
    pub fn record(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Vulnerable => self.vulnerable += 1,
            Verdict::NotVulnerable => self.not_vulnerable += 1,
            Verdict::Unknown => self.unknown += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.vulnerable + self.not_vulnerable + self.unknown
    }
}

impl TargetSpec {
    pub fn view(&self, addr: Option<String>) -> TargetView {
        TargetView {
            host: self.host.clone(),
            addr,
            port: self.port,
        }
    }
}
