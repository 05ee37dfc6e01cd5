//! Durable job spool.
//!
//! Jobs are appended to a single log file. Each entry is framed as
//!
//! ```text
//! [4 bytes: payload length (little-endian u32)]
//! [4 bytes: CRC32 of payload (little-endian u32)]
//! [N bytes: payload (bincode-serialized Job)]
//! ```
//!
//! A process that crashes mid-append leaves a torn tail; [`SpoolJobQueue::recover`]
//! stops at it. Entries whose CRC does not match are skipped.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, info, warn};

use crate::error::{JobError, JobResult};
use crate::job::Job;
use crate::traits::JobQueue;

const HEADER_SIZE: u64 = 8;

#[derive(Clone, Debug, Default)]
pub struct SpoolConfig {
    /// `fsync` after every append instead of relying on the page cache.
    pub sync_every_write: bool,
}

struct SpoolWriter {
    writer: BufWriter<File>,
    offset: u64,
}

/// Crash-recoverable, append-only job log.
pub struct SpoolJobQueue {
    path: PathBuf,
    writer: Mutex<SpoolWriter>,
    config: SpoolConfig,
}

impl SpoolJobQueue {
    /// Open (or create) the spool at `path`.
    pub fn open(path: impl AsRef<Path>, config: SpoolConfig) -> JobResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;
        let offset = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(SpoolWriter {
                writer: BufWriter::new(file),
                offset,
            }),
            config,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one job and return the byte offset of its entry.
    pub fn append(&self, job: &Job) -> JobResult<u64> {
        let payload =
            bincode::serialize(job).map_err(|e| JobError::Serialization(e.to_string()))?;
        let length = u32::try_from(payload.len())
            .map_err(|_| JobError::Serialization("job too large for spool entry".into()))?;
        let crc = crc32fast::hash(&payload);

        let mut w = self.writer.lock().expect("spool mutex poisoned");
        let entry_offset = w.offset;
        w.writer.write_all(&length.to_le_bytes())?;
        w.writer.write_all(&crc.to_le_bytes())?;
        w.writer.write_all(&payload)?;
        w.writer.flush()?;
        if self.config.sync_every_write {
            w.writer.get_ref().sync_all()?;
        }
        w.offset += HEADER_SIZE + u64::from(length);

        debug!(offset = entry_offset, len = length, kind = %job.kind(), "spool append");
        Ok(entry_offset)
    }

    /// Read every intact job from the spool, oldest first.
    pub fn recover(&self) -> JobResult<Vec<Job>> {
        let mut reader = BufReader::new(File::open(&self.path)?);
        let file_len = reader.get_ref().metadata()?.len();
        let mut jobs = Vec::new();
        let mut offset = 0u64;

        while offset + HEADER_SIZE <= file_len {
            let mut header = [0u8; HEADER_SIZE as usize];
            match reader.read_exact(&mut header) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e.into()),
            }
            let length = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
            let expected_crc = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

            if length == 0 || offset + HEADER_SIZE + u64::from(length) > file_len {
                warn!(offset, length, file_len, "torn spool entry; stopping recovery");
                break;
            }

            let mut payload = vec![0u8; length as usize];
            reader.read_exact(&mut payload)?;
            offset += HEADER_SIZE + u64::from(length);

            let actual_crc = crc32fast::hash(&payload);
            if actual_crc != expected_crc {
                warn!(
                    offset,
                    expected = expected_crc,
                    actual = actual_crc,
                    "CRC mismatch; skipping spool entry"
                );
                continue;
            }

            match bincode::deserialize::<Job>(&payload) {
                Ok(job) => jobs.push(job),
                Err(e) => warn!(offset, error = %e, "undecodable spool entry; skipping"),
            }
        }

        info!(path = %self.path.display(), recovered = jobs.len(), "spool recovered");
        Ok(jobs)
    }

    /// Discard every entry, e.g. after the recovered jobs were handed off.
    pub fn clear(&self) -> JobResult<()> {
        let mut w = self.writer.lock().expect("spool mutex poisoned");
        w.writer.flush()?;
        w.writer.get_ref().set_len(0)?;
        w.offset = 0;
        debug!(path = %self.path.display(), "spool cleared");
        Ok(())
    }

    /// Bytes currently in the spool.
    pub fn len_bytes(&self) -> u64 {
        self.writer.lock().expect("spool mutex poisoned").offset
    }
}

impl JobQueue for SpoolJobQueue {
    fn enqueue(&self, job: Job) -> JobResult<()> {
        self.append(&job).map(|_| ())
    }
}

impl std::fmt::Debug for SpoolJobQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpoolJobQueue")
            .field("path", &self.path)
            .field("config", &self.config)
            .finish()
    }
}
