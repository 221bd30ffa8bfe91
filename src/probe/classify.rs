use crate::model::Verdict;
use crate::tls::record::{ContentType, Record};
use crate::tls::templates::SERVER_HELLO_DONE;

/// Maps the single response to the malformed heartbeat onto a verdict.
pub fn classify(record: &Record) -> Verdict {
    match record.content_type() {
        ContentType::Heartbeat => Verdict::Vulnerable,
        ContentType::Alert => Verdict::NotVulnerable,
        _ => Verdict::Unknown,
    }
}

/// Heuristic end-of-flight check: a handshake record whose first payload
/// byte is the ServerHelloDone message type. Coalesced messages ahead of
/// ServerHelloDone in the same record are not inspected.
pub fn is_server_hello_done(record: &Record) -> bool {
    record.content_type() == ContentType::Handshake
        && record.payload.first() == Some(&SERVER_HELLO_DONE)
}
