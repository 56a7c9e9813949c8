use std::thread;
use std::time::Duration;

use crate::{pair, Endpoint, GatherStream, Result, ScatterStream};

mod gather;

const TIMEOUT: Duration = Duration::from_secs(1);

/// Source data where `buffer[i] = i mod 253`, so that chunk boundaries never
/// line up with the byte pattern.
fn source_buffer(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 253) as u8).collect()
}

fn sequential(len: usize, chunk_size: usize) -> Vec<usize> {
    (0..len.div_ceil(chunk_size)).collect()
}

fn chunk(index: usize, chunk_size: usize, len: usize) -> core::ops::Range<usize> {
    let start = index * chunk_size;
    start..(start + chunk_size).min(len)
}

/// Write every chunk of `source` in the given order, sleeping `delay` after
/// each one, then complete.
fn scatter_chunks(
    mut scatter: ScatterStream,
    source: &[u8],
    chunk_size: usize,
    order: &[usize],
    delay: Duration,
) -> Result<()> {
    for &index in order {
        let range = chunk(index, chunk_size, source.len());

        scatter.set_position(range.start)?;
        scatter.write(&source[range])?;

        thread::sleep(delay);
    }

    scatter.flush()?;
    scatter.complete();

    Ok(())
}

/// Read every chunk in the given order into `target`, looping over short
/// reads. Returns the total number of bytes read.
fn gather_chunks(
    gather: &mut GatherStream,
    target: &mut [u8],
    chunk_size: usize,
    order: &[usize],
    delay: Duration,
) -> Result<usize> {
    let mut volume = 0;

    for &index in order {
        let range = chunk(index, chunk_size, target.len());
        let mut offset = range.start;

        gather.set_position(offset)?;

        while offset < range.end {
            let count = gather.read(&mut target[offset..range.end])?;
            if count == 0 {
                return Ok(volume);
            }

            offset += count;
            volume += count;

            thread::sleep(delay);
        }
    }

    Ok(volume)
}

/// Copy `source` through a fresh pair with a producer thread and a consumer
/// thread running concurrently.
fn copy_concurrently(
    source: &[u8],
    write_chunk_size: usize,
    write_order: &[usize],
    write_delay: Duration,
    read_chunk_size: usize,
    read_order: &[usize],
    read_delay: Duration,
) -> Vec<u8> {
    let (scatter, mut gather) = pair(source.len());
    let mut target = vec![0; source.len()];

    thread::scope(|s| {
        let writer = s.spawn(|| {
            scatter_chunks(scatter, source, write_chunk_size, write_order, write_delay)
        });
        let reader = s.spawn(|| {
            gather_chunks(&mut gather, &mut target, read_chunk_size, read_order, read_delay)
        });

        writer.join().unwrap().unwrap();
        assert_eq!(reader.join().unwrap().unwrap(), source.len());
    });

    assert_eq!(gather.len(), source.len());

    target
}
