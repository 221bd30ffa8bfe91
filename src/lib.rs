//! Heartbleed (CVE-2014-0160) detection over raw TLS record framing.
//!
//! The probe sends a fixed ClientHello, waits for the end of the server's
//! first flight, then sends one heartbeat request that claims far more
//! payload than it carries. The record type of the reply decides the verdict.

pub mod engine;
pub mod error;
pub mod input;
pub mod model;
pub mod output;
pub mod probe;
pub mod tls;
pub mod util;
