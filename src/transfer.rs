use std::error::Error;
use std::pin::pin;
use std::time::{Duration, Instant};

use futures::StreamExt;
use scatter_gather_lib::{pair_with_timeout, GatherStream, ScatterStream};
use tracing::{debug, info};

use crate::config::Config;

pub type Result<T> = std::result::Result<T, Box<dyn Error + Send + Sync>>;

/// Push a generated buffer through a stream pair, with the producer writing
/// chunks in the configured order while the consumer reads sequentially, and
/// check that the consumer reconstructed it exactly.
#[tokio::main]
pub async fn run(config: &Config) -> Result<()> {
    let chunk_size = config.chunk_size.max(1);
    let source = source_buffer(config.size);
    let order = config.order.chunks(config.size.div_ceil(chunk_size));

    let (scatter, gather) =
        pair_with_timeout(config.size, Duration::from_millis(config.timeout_ms));

    let start = Instant::now();
    let producer = tokio::spawn(produce(
        scatter,
        source.clone(),
        order,
        chunk_size,
        Duration::from_millis(config.write_delay_ms),
        !config.no_complete,
    ));

    let target = consume(gather, chunk_size).await?;
    producer.await??;

    if target != source {
        return Err("reconstructed buffer differs from source".into());
    }

    info!(
        size = config.size,
        chunk_size,
        order = ?config.order,
        elapsed = ?start.elapsed(),
        "transfer reconstructed"
    );

    Ok(())
}

/// Source data where `buffer[i] = i mod 253`.
fn source_buffer(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 253) as u8).collect()
}

async fn produce(
    scatter: ScatterStream,
    source: Vec<u8>,
    order: Vec<usize>,
    chunk_size: usize,
    delay: Duration,
    complete: bool,
) -> Result<()> {
    for index in order {
        let start = index * chunk_size;
        let end = (start + chunk_size).min(source.len());

        scatter.write_at(start, &source[start..end])?;
        debug!(start, end, "produced chunk");

        tokio::time::sleep(delay).await;
    }

    if complete {
        scatter.complete();
    }

    Ok(())
}

async fn consume(gather: GatherStream, chunk_size: usize) -> Result<Vec<u8>> {
    let mut chunks = pin!(gather.into_stream(chunk_size));
    let mut target = Vec::new();

    while let Some(chunk) = chunks.next().await {
        let chunk = chunk?;
        debug!(offset = target.len(), len = chunk.len(), "consumed chunk");
        target.extend_from_slice(&chunk);
    }

    Ok(target)
}
