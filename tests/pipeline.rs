use heartbleed_probe::engine::Engine;
use heartbleed_probe::error::{ErrorKind, Phase};
use heartbleed_probe::model::{
    Config, OutputConfig, OutputFormat, ProbeSettings, TargetSpec, Verdict,
};
use heartbleed_probe::output::OutputChannel;
use heartbleed_probe::probe::HeartbleedProbe;
use heartbleed_probe::tls::templates::{CLIENT_HELLO, MALFORMED_HEARTBEAT};
use heartbleed_probe::tls::RecordHeader;
use std::io::Write;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

enum Reply {
    /// Finish the first flight, then answer the heartbeat with these bytes.
    Respond(Vec<u8>),
    /// Finish the first flight, answer the heartbeat with these bytes and
    /// close before the record is complete.
    RespondAndClose(Vec<u8>),
    /// Finish the first flight, read the heartbeat, then hang up.
    HangUp,
    /// Finish the first flight, read the heartbeat, then reset the connection.
    Reset,
    /// Send a ServerHello but never ServerHelloDone, then hang up.
    NoHelloDone,
    /// Accept and stay silent.
    Silent,
}

fn frame(record_type: u8, payload: &[u8]) -> Vec<u8> {
    let header = RecordHeader {
        record_type,
        version: 0x0302,
        length: payload.len() as u16,
    };
    let mut out = header.encode().to_vec();
    out.extend_from_slice(payload);
    out
}

fn first_flight() -> Vec<u8> {
    let mut out = frame(22, &[0x02, 0x00, 0x00, 0x04, 0x03, 0x02, 0x00, 0x00]);
    out.extend(frame(22, &[0x0e, 0x00, 0x00, 0x00]));
    out
}

fn leaked_heartbeat() -> Vec<u8> {
    let mut payload = vec![0x02, 0x40, 0x00];
    payload.resize(0x4000, 0x41);
    frame(24, &payload)
}

/// Runs a one-shot server and returns everything the client sent it.
async fn spawn_server(reply: Reply) -> (u16, JoinHandle<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut received = vec![0u8; CLIENT_HELLO.len()];
        socket.read_exact(&mut received).await.unwrap();

        match reply {
            Reply::Respond(bytes) => {
                socket.write_all(&first_flight()).await.ok();
                let mut hb = [0u8; MALFORMED_HEARTBEAT.len()];
                if socket.read_exact(&mut hb).await.is_ok() {
                    received.extend_from_slice(&hb);
                    socket.write_all(&bytes).await.ok();
                }
            }
            Reply::RespondAndClose(bytes) => {
                socket.write_all(&first_flight()).await.ok();
                let mut hb = [0u8; MALFORMED_HEARTBEAT.len()];
                socket.read_exact(&mut hb).await.ok();
                received.extend_from_slice(&hb);
                socket.write_all(&bytes).await.ok();
                return received;
            }
            Reply::Reset => {
                socket.write_all(&first_flight()).await.ok();
                let mut hb = [0u8; MALFORMED_HEARTBEAT.len()];
                socket.read_exact(&mut hb).await.ok();
                received.extend_from_slice(&hb);
                // zero linger turns the close into a RST
                socket.set_linger(Some(Duration::ZERO)).ok();
                return received;
            }
            Reply::HangUp => {
                socket.write_all(&first_flight()).await.ok();
                let mut hb = [0u8; MALFORMED_HEARTBEAT.len()];
                socket.read_exact(&mut hb).await.ok();
                received.extend_from_slice(&hb);
                return received;
            }
            Reply::NoHelloDone => {
                socket
                    .write_all(&frame(22, &[0x02, 0x00, 0x00, 0x00]))
                    .await
                    .ok();
                socket.shutdown().await.ok();
            }
            Reply::Silent => {
                tokio::time::sleep(Duration::from_secs(3)).await;
                return received;
            }
        }

        let mut rest = Vec::new();
        socket.read_to_end(&mut rest).await.ok();
        received.extend_from_slice(&rest);
        received
    });

    (port, handle)
}

fn settings() -> ProbeSettings {
    ProbeSettings {
        connect_timeout: Duration::from_millis(500),
        read_timeout: Duration::from_millis(1000),
        overall_timeout: Duration::from_millis(3000),
        ..ProbeSettings::default()
    }
}

fn local(port: u16) -> TargetSpec {
    TargetSpec {
        host: "127.0.0.1".into(),
        port,
    }
}

#[tokio::test]
async fn heartbeat_echo_is_vulnerable() {
    let (port, server) = spawn_server(Reply::Respond(leaked_heartbeat())).await;
    let outcome = HeartbleedProbe::new(&settings()).probe(&local(port)).await;

    assert_eq!(outcome.verdict, Verdict::Vulnerable);
    assert_eq!(outcome.error, None);
    assert!(outcome.heartbeat_sent);
    assert_eq!(outcome.records.len(), 3);
    assert_eq!(outcome.records[2].record_type, 24);
    assert_eq!(outcome.records[2].length, 0x4000);
    assert_eq!(outcome.target.addr.as_deref(), Some("127.0.0.1"));

    let sent = server.await.unwrap();
    assert_eq!(&sent[..CLIENT_HELLO.len()], &CLIENT_HELLO[..]);
    assert_eq!(&sent[CLIENT_HELLO.len()..], &MALFORMED_HEARTBEAT[..]);
}

#[tokio::test]
async fn alert_is_not_vulnerable() {
    let (port, _server) = spawn_server(Reply::Respond(frame(21, &[0x02, 0x32]))).await;
    let outcome = HeartbleedProbe::new(&settings()).probe(&local(port)).await;

    assert_eq!(outcome.verdict, Verdict::NotVulnerable);
    assert_eq!(outcome.diagnostic, "server is NOT vulnerable");
    assert_eq!(outcome.phase, Phase::Classifying);
}

#[tokio::test]
async fn hang_up_after_heartbeat_is_unknown() {
    let (port, _server) = spawn_server(Reply::HangUp).await;
    let outcome = HeartbleedProbe::new(&settings()).probe(&local(port)).await;

    assert_eq!(outcome.verdict, Verdict::Unknown);
    assert_eq!(outcome.error, None);
    assert_eq!(outcome.diagnostic, "no heartbeat response received");
    assert!(outcome.heartbeat_sent);
}

#[tokio::test]
async fn reset_after_heartbeat_is_unknown() {
    let (port, server) = spawn_server(Reply::Reset).await;
    let outcome = HeartbleedProbe::new(&settings()).probe(&local(port)).await;

    assert_eq!(outcome.verdict, Verdict::Unknown);
    assert_eq!(outcome.error, Some(ErrorKind::IoFailure));
    assert_eq!(outcome.phase, Phase::Classifying);
    assert!(outcome.heartbeat_sent);

    let sent = server.await.unwrap();
    assert_eq!(&sent[CLIENT_HELLO.len()..], &MALFORMED_HEARTBEAT[..]);
}

#[tokio::test]
async fn partial_heartbeat_reply_is_unknown() {
    let mut partial = leaked_heartbeat();
    partial.truncate(RecordHeader::SIZE + 10);
    let (port, _server) = spawn_server(Reply::RespondAndClose(partial)).await;
    let outcome = HeartbleedProbe::new(&settings()).probe(&local(port)).await;

    assert_eq!(outcome.verdict, Verdict::Unknown);
    assert_eq!(outcome.error, Some(ErrorKind::Truncated));
    assert!(outcome.heartbeat_sent);
    // only the two handshake records completed
    assert_eq!(outcome.records.len(), 2);
}

#[tokio::test]
async fn missing_hello_done_never_sends_heartbeat() {
    let (port, server) = spawn_server(Reply::NoHelloDone).await;
    let outcome = HeartbleedProbe::new(&settings()).probe(&local(port)).await;

    assert_eq!(outcome.verdict, Verdict::Unknown);
    assert_eq!(outcome.error, Some(ErrorKind::HandshakeIncomplete));
    assert_eq!(outcome.phase, Phase::Handshaking);
    assert!(!outcome.heartbeat_sent);

    let sent = server.await.unwrap();
    assert_eq!(sent, CLIENT_HELLO.to_vec());
}

#[tokio::test]
async fn oversized_response_is_unknown() {
    let (port, _server) = spawn_server(Reply::Respond(leaked_heartbeat())).await;
    let capped = ProbeSettings {
        max_record_bytes: 1024,
        ..settings()
    };
    let outcome = HeartbleedProbe::new(&capped).probe(&local(port)).await;

    assert_eq!(outcome.verdict, Verdict::Unknown);
    assert_eq!(outcome.error, Some(ErrorKind::Oversized));
    // the oversized record is rejected from its header alone
    assert_eq!(outcome.records.len(), 2);
}

#[tokio::test]
async fn silent_server_times_out() {
    let (port, _server) = spawn_server(Reply::Silent).await;
    let quick = ProbeSettings {
        read_timeout: Duration::from_millis(200),
        ..settings()
    };
    let outcome = HeartbleedProbe::new(&quick).probe(&local(port)).await;

    assert_eq!(outcome.verdict, Verdict::Unknown);
    assert_eq!(outcome.error, Some(ErrorKind::Timeout));
    assert_eq!(outcome.phase, Phase::Handshaking);
    assert!(outcome.records.is_empty());
}

#[tokio::test]
async fn socket_is_released_after_timeout() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = tokio::spawn(async move {
        let (mut socket, _): (TcpStream, _) = listener.accept().await.unwrap();
        let mut hello = vec![0u8; CLIENT_HELLO.len()];
        socket.read_exact(&mut hello).await.unwrap();
        socket.write_all(&frame(22, &[0x02])).await.unwrap();
        // wait for the client to go away without ever finishing the handshake
        let mut buf = [0u8; 16];
        tokio::time::timeout(Duration::from_secs(2), socket.read(&mut buf)).await
    });

    let quick = ProbeSettings {
        read_timeout: Duration::from_millis(200),
        ..settings()
    };
    let outcome = HeartbleedProbe::new(&quick).probe(&local(port)).await;
    assert_eq!(outcome.error, Some(ErrorKind::Timeout));

    let read = server.await.unwrap();
    assert!(matches!(read, Ok(Ok(0))));
}

#[tokio::test]
async fn engine_scans_targets_from_file() {
    let (vulnerable, _a) = spawn_server(Reply::Respond(leaked_heartbeat())).await;
    let (patched, _b) = spawn_server(Reply::Respond(frame(21, &[0x02, 0x32]))).await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "# lab hosts").unwrap();
    writeln!(file, "127.0.0.1:{vulnerable}").unwrap();
    writeln!(file).unwrap();
    writeln!(file, "127.0.0.1:{patched}").unwrap();
    writeln!(file, "not a target:port").unwrap();
    file.flush().unwrap();

    let cfg = Config {
        target: None,
        input: Some(file.path().to_string_lossy().into_owned()),
        concurrency: 2,
        rate: 10,
        probe: settings(),
        output: OutputConfig {
            format: OutputFormat::Jsonl,
        },
    };

    let output = OutputChannel::new(cfg.output.clone()).unwrap();
    let mut engine = Engine::new(cfg, output).unwrap();
    let summary = engine.run().await.unwrap();

    assert_eq!(summary.vulnerable, 1);
    assert_eq!(summary.not_vulnerable, 1);
    assert_eq!(summary.total(), 2);
}
