//! Chunk planning for chunked uploads.
//!
//! Splits a file into fixed-size contiguous byte ranges and builds the
//! session identifier that correlates them server-side.

use bytes::Bytes;

use crate::error::AppError;
use crate::models::file::FileEntry;
use crate::models::upload::{ChunkRange, UploadSession};

/// Upload chunk size: 1 MiB.
pub const CHUNK_SIZE: u64 = 1_048_576;

/// Number of chunks needed for `file_size` bytes, rounding up.
///
/// A zero chunk size, or a count that does not fit the `u32` chunk index,
/// is a configuration error.
pub fn total_chunks(file_size: u64, chunk_size: u64) -> crate::error::Result<u32> {
    if chunk_size == 0 {
        return Err(AppError::Config("Chunk size must be greater than zero".into()));
    }
    u32::try_from(file_size.div_ceil(chunk_size)).map_err(|_| {
        AppError::Config(format!(
            "File of {} bytes needs more than {} chunks of {} bytes",
            file_size,
            u32::MAX,
            chunk_size
        ))
    })
}

/// Plan the chunk layout for a file of the given size.
///
/// Pure computation, no file I/O. Empty for a zero-byte file.
pub fn plan_chunks(file_size: u64, chunk_size: u64) -> crate::error::Result<Vec<ChunkRange>> {
    let count = total_chunks(file_size, chunk_size)?;
    Ok((0..count)
        .map(|chunk_index| {
            let start = chunk_index as u64 * chunk_size;
            ChunkRange {
                chunk_index,
                start,
                end: std::cmp::min(start.saturating_add(chunk_size), file_size),
            }
        })
        .collect())
}

/// Replace every character outside `[A-Za-z0-9.-]` with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

pub fn make_identifier(timestamp_millis: i64, file_name: &str) -> String {
    format!("{}-{}", timestamp_millis, sanitize_file_name(file_name))
}

/// Start a new in-memory session for `file`, stamped with the current time.
pub fn start_session(file: &FileEntry, chunk_size: u64) -> crate::error::Result<UploadSession> {
    let total_chunks = total_chunks(file.file_size, chunk_size)?;
    let identifier = make_identifier(chrono::Utc::now().timestamp_millis(), &file.file_name);
    Ok(UploadSession {
        identifier,
        file_size: file.file_size,
        chunk_size,
        total_chunks,
    })
}

/// Read the bytes of one chunk range from the file.
///
/// Uses spawn_blocking to avoid blocking the tokio runtime. The file is
/// opened read-only; a file that shrank since planning is an error.
pub async fn read_chunk_data(file_path: &str, range: ChunkRange) -> crate::error::Result<Bytes> {
    let file_path = file_path.to_string();
    tokio::task::spawn_blocking(move || {
        use std::io::{Read, Seek, SeekFrom};
        let mut file = std::fs::File::open(&file_path)?;
        file.seek(SeekFrom::Start(range.start))?;
        let mut buf = vec![0u8; range.len() as usize];
        file.read_exact(&mut buf).map_err(|e| {
            AppError::Io(format!(
                "Failed to read chunk {} [{}, {}) of {}: {}",
                range.chunk_index, range.start, range.end, file_path, e
            ))
        })?;
        Ok(Bytes::from(buf))
    })
    .await
    .map_err(|e| AppError::Internal(format!("spawn_blocking join error: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MIB: u64 = 1_048_576;

    #[test]
    fn test_total_chunks_rounds_up() {
        assert_eq!(total_chunks(0, CHUNK_SIZE).unwrap(), 0);
        assert_eq!(total_chunks(1, CHUNK_SIZE).unwrap(), 1);
        assert_eq!(total_chunks(MIB, CHUNK_SIZE).unwrap(), 1);
        assert_eq!(total_chunks(MIB + 1, CHUNK_SIZE).unwrap(), 2);
        assert_eq!(total_chunks(5 * MIB / 2, CHUNK_SIZE).unwrap(), 3);
    }

    #[test]
    fn test_total_chunks_zero_chunk_size_is_error() {
        match total_chunks(10, 0).unwrap_err() {
            AppError::Config(msg) => assert!(msg.contains("greater than zero"), "got: {}", msg),
            other => panic!("Expected AppError::Config, got: {:?}", other),
        }
        assert!(plan_chunks(0, 0).is_err());
    }

    #[test]
    fn test_total_chunks_count_beyond_u32_is_error() {
        let max = u32::MAX as u64;
        assert_eq!(total_chunks(max, 1).unwrap(), u32::MAX);
        match total_chunks(max + 1, 1).unwrap_err() {
            AppError::Config(msg) => assert!(msg.contains("needs more than"), "got: {}", msg),
            other => panic!("Expected AppError::Config, got: {:?}", other),
        }
        let file = FileEntry {
            file_name: "huge.bin".into(),
            file_path: "/tmp/huge.bin".into(),
            file_size: u64::MAX,
        };
        assert!(matches!(start_session(&file, 2).unwrap_err(), AppError::Config(_)));
    }

    // 2.5 MiB -> 1 MiB, 1 MiB, 0.5 MiB
    #[test]
    fn test_two_and_a_half_mib() {
        let file_size = 5 * MIB / 2;
        let chunks = plan_chunks(file_size, CHUNK_SIZE).unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), MIB);
        assert_eq!(chunks[1].len(), MIB);
        assert_eq!(chunks[2].len(), MIB / 2);
        assert_eq!(chunks[2].end, file_size);
        let indices: Vec<u32> = chunks.iter().map(|c| c.chunk_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_exactly_one_chunk() {
        let chunks = plan_chunks(MIB, CHUNK_SIZE).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].start, 0);
        assert_eq!(chunks[0].end, MIB);
    }

    #[test]
    fn test_1_byte() {
        let chunks = plan_chunks(1, CHUNK_SIZE).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].len(), 1);
    }

    #[test]
    fn test_0_bytes() {
        assert!(plan_chunks(0, CHUNK_SIZE).unwrap().is_empty());
    }

    // no gaps, no overlaps, full coverage
    #[test]
    fn test_offset_continuity() {
        let sizes: Vec<u64> = vec![1, 1023, MIB - 1, MIB, MIB + 1, 5 * MIB / 2, 10 * MIB, 37 * MIB + 12_345];

        for file_size in sizes {
            let chunks = plan_chunks(file_size, CHUNK_SIZE).unwrap();
            assert_eq!(chunks.len() as u32, total_chunks(file_size, CHUNK_SIZE).unwrap());

            let mut expected_offset = 0u64;
            for chunk in &chunks {
                assert_eq!(
                    chunk.start, expected_offset,
                    "Gap or overlap at chunk {} for file_size={}",
                    chunk.chunk_index, file_size
                );
                assert!(chunk.len() <= CHUNK_SIZE && !chunk.is_empty());
                expected_offset = chunk.end;
            }
            assert_eq!(
                expected_offset, file_size,
                "Chunks don't cover full file for file_size={}",
                file_size
            );
        }
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("My Song (final).mp3"), "My_Song__final_.mp3");
        assert_eq!(sanitize_file_name("cover-art_v2.PNG"), "cover-art_v2.PNG");
        assert_eq!(sanitize_file_name("trés.wav"), "tr_s.wav");
        assert_eq!(sanitize_file_name(""), "");
    }

    #[test]
    fn test_make_identifier() {
        assert_eq!(
            make_identifier(1_700_000_000_123, "a b.wav"),
            "1700000000123-a_b.wav"
        );
    }

    #[test]
    fn test_start_session() {
        let file = FileEntry {
            file_name: "Live @ Home.flac".into(),
            file_path: "/tmp/x".into(),
            file_size: 5 * MIB / 2,
        };
        let session = start_session(&file, CHUNK_SIZE).unwrap();
        assert_eq!(session.total_chunks, 3);
        assert_eq!(session.chunk_size, CHUNK_SIZE);
        assert_eq!(session.file_size, file.file_size);
        let (ts, name) = session.identifier.split_once('-').unwrap();
        assert!(ts.parse::<i64>().unwrap() > 0);
        assert_eq!(name, "Live___Home.flac");
    }

    #[tokio::test]
    async fn test_read_chunk_data_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.bin");
        {
            let mut f = std::fs::File::create(&path).unwrap();
            f.write_all(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]).unwrap();
        }
        let range = ChunkRange {
            chunk_index: 1,
            start: 3,
            end: 7,
        };
        let data = read_chunk_data(path.to_str().unwrap(), range).await.unwrap();
        assert_eq!(&data[..], &[3, 4, 5, 6]);
    }

    #[tokio::test]
    async fn test_read_chunk_data_short_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.bin");
        std::fs::write(&path, [10, 20, 30, 40, 50]).unwrap();
        let range = ChunkRange {
            chunk_index: 0,
            start: 3,
            end: 100,
        };
        let result = read_chunk_data(path.to_str().unwrap(), range).await;
        match result.unwrap_err() {
            AppError::Io(msg) => assert!(msg.contains("chunk 0"), "got: {}", msg),
            other => panic!("Expected AppError::Io, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_read_chunk_data_file_not_found() {
        let range = ChunkRange {
            chunk_index: 0,
            start: 0,
            end: 10,
        };
        let result = read_chunk_data("/nonexistent/path/file.bin", range).await;
        match result.unwrap_err() {
            AppError::Io(_) => {}
            other => panic!("Expected AppError::Io, got: {:?}", other),
        }
    }
}
