use super::classify::{classify, is_server_hello_done};
use crate::error::{Phase, ProbeError};
use crate::model::{ProbeOutcome, ProbeSettings, RecordSummary, TargetSpec, Verdict};
use crate::tls::record::{write_raw, Record, RecordReader};
use crate::tls::templates::{CLIENT_HELLO, MALFORMED_HEARTBEAT};
use crate::util::{now_iso8601, now_millis};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info, instrument};

/// What the probe saw on the wire, kept even when the probe fails.
#[derive(Debug, Clone)]
pub struct Transcript {
    pub phase: Phase,
    pub peer: Option<String>,
    pub connect_ms: Option<u128>,
    pub heartbeat_sent: bool,
    pub records: Vec<RecordSummary>,
}

impl Default for Transcript {
    fn default() -> Self {
        Self {
            phase: Phase::Connecting,
            peer: None,
            connect_ms: None,
            heartbeat_sent: false,
            records: Vec::new(),
        }
    }
}

impl Transcript {
    fn observe(&mut self, record: &Record) {
        let summary = RecordSummary::from(&record.header);
        debug!(phase = %self.phase, record = %summary, "received record");
        self.records.push(summary);
    }
}

pub struct HeartbleedProbe {
    reader: RecordReader,
    connect_timeout: Duration,
    read_timeout: Duration,
    overall_timeout: Duration,
    max_handshake_records: usize,
}

impl HeartbleedProbe {
    pub fn new(settings: &ProbeSettings) -> Self {
        Self {
            reader: RecordReader::new(settings.max_record_bytes, settings.read_timeout),
            connect_timeout: settings.connect_timeout,
            read_timeout: settings.read_timeout,
            overall_timeout: settings.overall_timeout,
            max_handshake_records: settings.max_handshake_records,
        }
    }

    /// Connects to `spec`, runs the probe and folds every result, failure
    /// included, into a [`ProbeOutcome`]. The socket never outlives this call.
    #[instrument(skip_all, fields(host = %spec.host, port = spec.port))]
    pub async fn probe(&self, spec: &TargetSpec) -> ProbeOutcome {
        let start = now_millis();
        let mut transcript = Transcript::default();

        let res = timeout(
            self.overall_timeout,
            self.connect_and_run(spec, start, &mut transcript),
        )
        .await;
        let result = match res {
            Ok(result) => result,
            Err(_) => Err(ProbeError::Timeout {
                phase: transcript.phase,
            }),
        };
        conclude(spec, start, transcript, result)
    }

    async fn connect_and_run(
        &self,
        spec: &TargetSpec,
        start: u128,
        transcript: &mut Transcript,
    ) -> Result<Verdict, ProbeError> {
        let connected = timeout(
            self.connect_timeout,
            TcpStream::connect((spec.host.as_str(), spec.port)),
        )
        .await;
        let mut stream = match connected {
            Ok(Ok(stream)) => stream,
            Ok(Err(err)) => return Err(ProbeError::Connect(err)),
            Err(_) => {
                return Err(ProbeError::Timeout {
                    phase: Phase::Connecting,
                })
            }
        };
        transcript.connect_ms = Some(now_millis() - start);
        transcript.peer = stream.peer_addr().ok().map(|a| a.ip().to_string());
        debug!(peer = ?transcript.peer, "connected");

        self.run(&mut stream, transcript).await
    }

    /// Drives handshake, heartbeat and classification over an open stream.
    pub async fn run<S>(
        &self,
        stream: &mut S,
        transcript: &mut Transcript,
    ) -> Result<Verdict, ProbeError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        transcript.phase = Phase::Handshaking;
        debug!("sending client hello");
        write_raw(stream, &CLIENT_HELLO, self.read_timeout, Phase::Handshaking).await?;
        self.await_server_hello_done(stream, transcript).await?;

        transcript.phase = Phase::Probing;
        debug!("sending malformed heartbeat");
        write_raw(stream, &MALFORMED_HEARTBEAT, self.read_timeout, Phase::Probing).await?;
        transcript.heartbeat_sent = true;
        let response = self.reader.read_record(stream, Phase::Probing).await;

        transcript.phase = Phase::Classifying;
        match response {
            Ok(record) => {
                transcript.observe(&record);
                Ok(classify(&record))
            }
            // A silent close after the heartbeat is an answer in itself.
            Err(ProbeError::Closed) => Ok(Verdict::Unknown),
            Err(err) => Err(err),
        }
    }

    async fn await_server_hello_done<S>(
        &self,
        stream: &mut S,
        transcript: &mut Transcript,
    ) -> Result<(), ProbeError>
    where
        S: AsyncRead + Unpin,
    {
        for _ in 0..self.max_handshake_records {
            let record = match self.reader.read_record(stream, Phase::Handshaking).await {
                Ok(record) => record,
                Err(err) if err.is_stream_end() => {
                    return Err(ProbeError::HandshakeIncomplete {
                        records: transcript.records.len(),
                        reason: err.to_string(),
                    })
                }
                Err(err) => return Err(err),
            };
            transcript.observe(&record);
            if is_server_hello_done(&record) {
                return Ok(());
            }
        }

        Err(ProbeError::HandshakeIncomplete {
            records: transcript.records.len(),
            reason: format!(
                "no ServerHelloDone within {} records",
                self.max_handshake_records
            ),
        })
    }
}

fn conclude(
    spec: &TargetSpec,
    start: u128,
    transcript: Transcript,
    result: Result<Verdict, ProbeError>,
) -> ProbeOutcome {
    let (verdict, diagnostic, error) = match result {
        Ok(verdict) => (verdict, verdict.diagnostic().to_string(), None),
        Err(err) => (Verdict::Unknown, err.to_string(), Some(err.kind())),
    };
    info!(
        host = %spec.host,
        port = spec.port,
        verdict = %verdict,
        phase = %transcript.phase,
        "{diagnostic}"
    );

    ProbeOutcome {
        target: spec.view(transcript.peer),
        verdict,
        diagnostic,
        error,
        phase: transcript.phase,
        heartbeat_sent: transcript.heartbeat_sent,
        records: transcript.records,
        connect_ms: transcript.connect_ms,
        elapsed_ms: now_millis() - start,
        timestamp: now_iso8601(),
    }
}
