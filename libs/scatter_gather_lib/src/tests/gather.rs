use std::io::{Read, Seek, SeekFrom};
use std::thread;
use std::time::{Duration, Instant};

use futures::StreamExt;

use super::{source_buffer, TIMEOUT};
use crate::{pair, pair_with_timeout, Endpoint, Error, DEFAULT_TIMEOUT};

#[test]
fn test_capabilities() {
    let (_scatter, gather) = pair(10);

    assert!(gather.can_read());
    assert!(gather.can_seek());
    assert!(!gather.can_write());
    assert_eq!(gather.len(), 10);
    assert_eq!(gather.timeout(), DEFAULT_TIMEOUT);
}

#[test]
fn test_short_read() {
    let (mut scatter, mut gather) = pair_with_timeout(100, TIMEOUT);
    scatter.write(&[7; 30]).unwrap();

    let mut out = [0; 100];
    assert_eq!(gather.read(&mut out).unwrap(), 30);
    assert_eq!(gather.position(), 30);
}

#[test]
fn test_read_returns_on_first_byte() {
    let (scatter, mut gather) = pair_with_timeout(100, Duration::from_secs(5));

    thread::scope(|s| {
        let reader = s.spawn(|| {
            let mut out = [0; 100];
            let count = gather.read(&mut out);
            (count, out[0])
        });

        thread::sleep(Duration::from_millis(50));
        scatter.write_at(0, &[42]).unwrap();

        let (count, first) = reader.join().unwrap();
        assert_eq!(count, Ok(1));
        assert_eq!(first, 42);
    });
}

#[test]
fn test_read_ignores_unrelated_progress() {
    let (scatter, gather) = pair_with_timeout(100, Duration::from_millis(200));

    thread::scope(|s| {
        let reader = s.spawn(|| {
            let mut out = [0; 10];
            gather.read_at(50, &mut out)
        });

        thread::sleep(Duration::from_millis(20));
        scatter.write_at(0, &[1; 50]).unwrap();
        scatter.write_at(51, &[1; 10]).unwrap();

        assert_eq!(
            reader.join().unwrap(),
            Err(Error::Timeout {
                offset: 50,
                timeout: Duration::from_millis(200)
            })
        );
    });
}

#[test]
fn test_end_of_stream() {
    let source = source_buffer(1000);
    let (mut scatter, mut gather) = pair_with_timeout(1000, Duration::from_millis(200));

    scatter.write(&source[..500]).unwrap();
    scatter.complete();

    let mut out = vec![0; 1000];
    let mut volume = 0;
    while volume < 500 {
        volume += gather.read(&mut out[volume..]).unwrap();
    }
    assert_eq!(&out[..500], &source[..500]);

    // Waiting past the timeout still yields end-of-stream, not a timeout.
    thread::sleep(Duration::from_millis(300));
    assert_eq!(gather.read(&mut out), Ok(0));
    assert_eq!(gather.position(), 500);
}

#[test]
fn test_timeout() {
    let timeout = Duration::from_millis(200);
    let (_scatter, mut gather) = pair_with_timeout(1000, timeout);

    let start = Instant::now();
    let mut out = [0; 10];
    assert_eq!(
        gather.read(&mut out),
        Err(Error::Timeout { offset: 0, timeout })
    );
    assert!(start.elapsed() >= timeout);
    assert_eq!(gather.position(), 0);

    let err = Read::read(&mut gather, &mut out).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::TimedOut);
}

#[test]
fn test_scatter_drop_releases_reader() {
    let (scatter, mut gather) = pair_with_timeout(100, Duration::from_secs(5));

    thread::scope(|s| {
        let reader = s.spawn(|| {
            let mut out = [0; 10];
            gather.read(&mut out)
        });

        thread::sleep(Duration::from_millis(50));
        drop(scatter);

        assert_eq!(reader.join().unwrap(), Ok(0));
    });
}

#[test]
fn test_read_at_end_and_empty() {
    let (_scatter, mut gather) = pair_with_timeout(10, Duration::from_secs(5));

    let mut out = [0; 4];
    assert_eq!(gather.read(&mut [0u8; 0]), Ok(0));

    gather.set_position(10).unwrap();
    assert_eq!(gather.read(&mut out), Ok(0));

    assert_eq!(
        gather.set_position(11),
        Err(Error::OutOfRange {
            start: 11,
            end: 11,
            len: 10
        })
    );
}

#[test]
fn test_seek_and_read() {
    let source = source_buffer(300);
    let (scatter, mut gather) = pair_with_timeout(300, TIMEOUT);
    scatter.write_at(0, &source).unwrap();

    let mut out = [0; 10];
    assert_eq!(gather.seek(SeekFrom::Start(250)).unwrap(), 250);
    gather.read_exact(&mut out).unwrap();
    assert_eq!(&out[..], &source[250..260]);

    assert_eq!(gather.seek(SeekFrom::Current(-20)).unwrap(), 240);
    gather.read_exact(&mut out).unwrap();
    assert_eq!(&out[..], &source[240..250]);

    assert_eq!(gather.seek(SeekFrom::End(-10)).unwrap(), 290);
    gather.read_exact(&mut out).unwrap();
    assert_eq!(&out[..], &source[290..]);
}

#[test]
fn test_concurrent_readers() {
    let source = source_buffer(400);
    let (scatter, gather) = pair_with_timeout(400, Duration::from_secs(5));

    thread::scope(|s| {
        let readers: Vec<_> = (0..4)
            .map(|i| {
                let gather = &gather;
                s.spawn(move || {
                    let mut out = vec![0; 100];
                    let mut volume = 0;
                    while volume < 100 {
                        volume += gather.read_at(i * 100 + volume, &mut out[volume..]).unwrap();
                    }
                    out
                })
            })
            .collect();

        for i in (0..4).rev() {
            thread::sleep(Duration::from_millis(10));
            scatter.write_at(i * 100, &source[i * 100..(i + 1) * 100]).unwrap();
        }

        for (i, reader) in readers.into_iter().enumerate() {
            assert_eq!(reader.join().unwrap(), &source[i * 100..(i + 1) * 100]);
        }
    });
}

#[tokio::test]
async fn test_read_async() {
    let (scatter, mut gather) = pair_with_timeout(10, Duration::from_secs(5));

    let writer = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        scatter.write_at(0, b"abc").unwrap();
        scatter
    });

    let mut out = [0; 10];
    assert_eq!(gather.read_async(&mut out).await, Ok(3));
    assert_eq!(&out[..3], b"abc");

    drop(writer.await.unwrap());
    assert_eq!(gather.read_async(&mut out).await, Ok(0));
}

#[tokio::test]
async fn test_read_async_timeout() {
    let timeout = Duration::from_millis(50);
    let (_scatter, gather) = pair_with_timeout(10, timeout);

    let mut out = [0; 10];
    assert_eq!(
        gather.read_at_async(5, &mut out).await,
        Err(Error::Timeout { offset: 5, timeout })
    );
}

#[tokio::test]
async fn test_into_stream() {
    let source = source_buffer(1000);
    let (scatter, gather) = pair_with_timeout(1000, Duration::from_secs(5));

    let writer = {
        let source = source.clone();
        tokio::spawn(async move {
            for (i, part) in source.chunks(128).enumerate().rev() {
                scatter.write_at(i * 128, part).unwrap();
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
    };

    let chunks: Vec<_> = gather
        .into_stream(100)
        .map(|chunk| chunk.unwrap())
        .collect()
        .await;

    writer.await.unwrap();

    assert!(chunks.iter().all(|chunk| chunk.len() <= 100));
    assert_eq!(chunks.concat(), source);
}

#[tokio::test]
async fn test_into_stream_timeout() {
    let timeout = Duration::from_millis(50);
    let (scatter, gather) = pair_with_timeout(10, timeout);
    scatter.write_at(0, b"abcd").unwrap();

    let results: Vec<_> = gather.into_stream(100).collect().await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].as_deref(), Ok(&b"abcd"[..]));
    assert_eq!(results[1], Err(Error::Timeout { offset: 4, timeout }));
}
