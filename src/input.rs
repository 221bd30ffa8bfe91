use crate::model::{Config, TargetSpec, DEFAULT_TLS_PORT};
use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

pub fn stream_targets(cfg: &Config) -> anyhow::Result<ReceiverStream<TargetSpec>> {
    let (tx, rx) = mpsc::channel(256);

    if let Some(spec) = cfg.target.clone() {
        let tx = tx.clone();
        tokio::spawn(async move {
            tx.send(spec).await.ok();
        });
    }

    if let Some(path) = cfg.input.clone() {
        let tx = tx.clone();
        tokio::spawn(async move {
            if let Err(err) = read_file(path, tx).await {
                tracing::error!(error = %err, "failed to read input file");
            }
        });
    }

    drop(tx);
    Ok(ReceiverStream::new(rx))
}

async fn read_file(path: String, tx: mpsc::Sender<TargetSpec>) -> anyhow::Result<()> {
    let file = tokio::fs::File::open(&path)
        .await
        .with_context(|| format!("cannot open input {}", path))?;
    let mut reader = BufReader::new(file).lines();
    while let Some(line) = reader.next_line().await? {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if let Some(spec) = parse_target(trimmed) {
            if tx.send(spec).await.is_err() {
                break;
            }
        } else {
            tracing::warn!(line = %trimmed, "skipping invalid target");
        }
    }
    Ok(())
}

/// Accepts `host`, `host:port`, `[v6]`, `[v6]:port` and bare IPv6 literals.
pub fn parse_target(line: &str) -> Option<TargetSpec> {
    let (host, port) = if let Some(rest) = line.strip_prefix('[') {
        let (host, tail) = rest.split_once(']')?;
        match tail {
            "" => (host, DEFAULT_TLS_PORT),
            _ => (host, tail.strip_prefix(':')?.parse().ok()?),
        }
    } else if line.matches(':').count() > 1 {
        (line, DEFAULT_TLS_PORT)
    } else if let Some((host, port)) = line.rsplit_once(':') {
        (host, port.parse().ok()?)
    } else {
        (line, DEFAULT_TLS_PORT)
    };

    let host = host.trim();
    if host.is_empty() || port == 0 {
        return None;
    }
    Some(TargetSpec {
        host: host.to_string(),
        port,
    })
}
