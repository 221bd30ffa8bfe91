use crate::error::{Phase, ProbeError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

/// Largest payload a single record may declare before it is rejected unread.
pub const DEFAULT_MAX_RECORD_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    ChangeCipherSpec,
    Alert,
    Handshake,
    ApplicationData,
    Heartbeat,
    Other(u8),
}

impl From<u8> for ContentType {
    fn from(v: u8) -> Self {
        match v {
            20 => Self::ChangeCipherSpec,
            21 => Self::Alert,
            22 => Self::Handshake,
            23 => Self::ApplicationData,
            24 => Self::Heartbeat,
            other => Self::Other(other),
        }
    }
}

impl From<ContentType> for u8 {
    fn from(ct: ContentType) -> Self {
        match ct {
            ContentType::ChangeCipherSpec => 20,
            ContentType::Alert => 21,
            ContentType::Handshake => 22,
            ContentType::ApplicationData => 23,
            ContentType::Heartbeat => 24,
            ContentType::Other(v) => v,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordHeader {
    pub record_type: u8,
    pub version: u16,
    pub length: u16,
}

impl RecordHeader {
    pub const SIZE: usize = 5;

    pub fn parse(data: [u8; Self::SIZE]) -> Self {
        RecordHeader {
            record_type: data[0],
            version: u16::from_be_bytes([data[1], data[2]]),
            length: u16::from_be_bytes([data[3], data[4]]),
        }
    }

    pub fn encode(&self) -> [u8; Self::SIZE] {
        let version = self.version.to_be_bytes();
        let length = self.length.to_be_bytes();
        [self.record_type, version[0], version[1], length[0], length[1]]
    }

    pub fn content_type(&self) -> ContentType {
        ContentType::from(self.record_type)
    }
}

/// A fully received record. `payload.len()` always equals `header.length`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub header: RecordHeader,
    pub payload: Vec<u8>,
}

impl Record {
    pub fn content_type(&self) -> ContentType {
        self.header.content_type()
    }
}

pub struct RecordReader {
    max_payload: usize,
    read_timeout: Duration,
}

impl RecordReader {
    pub fn new(max_payload: usize, read_timeout: Duration) -> Self {
        Self {
            max_payload,
            read_timeout,
        }
    }

    /// Reads one whole record, bounded by the read timeout.
    pub async fn read_record<T: AsyncRead + Unpin>(
        &self,
        stream: &mut T,
        phase: Phase,
    ) -> Result<Record, ProbeError> {
        match timeout(self.read_timeout, self.read_unbounded(stream)).await {
            Ok(res) => res,
            Err(_) => Err(ProbeError::Timeout { phase }),
        }
    }

    async fn read_unbounded<T: AsyncRead + Unpin>(
        &self,
        stream: &mut T,
    ) -> Result<Record, ProbeError> {
        let mut raw = [0u8; RecordHeader::SIZE];
        let got = fill(stream, &mut raw).await?;
        if got == 0 {
            return Err(ProbeError::Closed);
        }
        if got < RecordHeader::SIZE {
            return Err(ProbeError::Truncated {
                expected: RecordHeader::SIZE,
                received: got,
            });
        }

        let header = RecordHeader::parse(raw);
        let declared = header.length as usize;
        if declared > self.max_payload {
            return Err(ProbeError::Oversized {
                declared,
                limit: self.max_payload,
            });
        }

        let mut payload = vec![0u8; declared];
        let got = fill(stream, &mut payload).await?;
        if got < declared {
            return Err(ProbeError::Truncated {
                expected: declared,
                received: got,
            });
        }

        Ok(Record { header, payload })
    }
}

/// Reads until `buf` is full or the peer closes; returns the bytes filled.
async fn fill<T: AsyncRead + Unpin>(stream: &mut T, buf: &mut [u8]) -> Result<usize, ProbeError> {
    let mut filled = 0usize;
    while filled < buf.len() {
        let n = stream
            .read(&mut buf[filled..])
            .await
            .map_err(ProbeError::Io)?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

/// Writes `bytes` unmodified and flushes them, bounded by `limit`.
pub async fn write_raw<T: AsyncWrite + Unpin>(
    stream: &mut T,
    bytes: &[u8],
    limit: Duration,
    phase: Phase,
) -> Result<(), ProbeError> {
    let write = async {
        stream.write_all(bytes).await?;
        stream.flush().await
    };
    match timeout(limit, write).await {
        Ok(res) => res.map_err(ProbeError::Io),
        Err(_) => Err(ProbeError::Timeout { phase }),
    }
}
