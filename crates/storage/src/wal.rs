// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only write-ahead log of [`Event`]s, durable across daemon restarts.

use dalston_core::Event;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Debug, thiserror::Error)]
pub enum WalError {
    #[error("wal io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("wal serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// One durable log record: a monotonically increasing sequence number
/// paired with the event it recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalEntry {
    pub seq: u64,
    pub event: Event,
}

const FLUSH_THRESHOLD: u32 = 100;
const FLUSH_INTERVAL: Duration = Duration::from_secs(5);
const MAX_BACKUPS: u32 = 3;

/// Append-only JSON-lines log. Each line is one [`WalEntry`]. Tolerates a
/// truncated or corrupt tail left by a crash mid-write: the offending tail
/// is rotated into a numbered `.bak` chain and discarded on open, and the
/// in-memory cursor skips corrupt lines written while the daemon is live.
pub struct Wal {
    path: PathBuf,
    file: File,
    write_seq: u64,
    processed_seq: u64,
    next_seq_to_emit: u64,
    count_since_flush: u32,
    last_flush_at: Instant,
}

impl Wal {
    pub fn open(path: impl AsRef<Path>, processed_seq: u64) -> Result<Self, WalError> {
        let path = path.as_ref().to_path_buf();
        let write_seq = if path.exists() { Self::recover(&path)? } else { File::create(&path)?; 0 };

        let file = OpenOptions::new().append(true).open(&path)?;

        Ok(Self {
            path,
            file,
            write_seq,
            processed_seq,
            next_seq_to_emit: processed_seq + 1,
            count_since_flush: 0,
            last_flush_at: Instant::now(),
        })
    }

    /// Scan `path` for a valid prefix of entries. The first line that fails
    /// to parse (malformed JSON, or the file isn't valid UTF-8 at all) marks
    /// the corruption point: everything from there on is rotated to a
    /// backup chain and the file is rewritten with only the valid prefix.
    /// Returns the highest valid sequence number found.
    fn recover(path: &Path) -> Result<u64, WalError> {
        let raw = std::fs::read(path)?;
        let mut valid_lines: Vec<String> = Vec::new();
        let mut write_seq = 0u64;
        let mut corrupted = false;

        match std::str::from_utf8(&raw) {
            Ok(text) => {
                for line in text.lines() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<WalEntry>(line) {
                        Ok(entry) => {
                            write_seq = entry.seq;
                            valid_lines.push(line.to_string());
                        }
                        Err(_) => {
                            corrupted = true;
                            break;
                        }
                    }
                }
            }
            Err(_) => corrupted = true,
        }

        if corrupted {
            tracing::warn!(path = %path.display(), "wal corruption detected on open, rotating backup");
            Self::rotate_backups(path)?;
            let mut clean = String::new();
            for line in &valid_lines {
                clean.push_str(line);
                clean.push('\n');
            }
            std::fs::write(path, clean)?;
        }

        Ok(write_seq)
    }

    fn rotate_backups(path: &Path) -> Result<(), WalError> {
        let bak3 = path.with_extension("bak.3");
        let bak2 = path.with_extension("bak.2");
        let bak1 = path.with_extension("bak");
        if bak3.exists() {
            std::fs::remove_file(&bak3)?;
        }
        if bak2.exists() {
            std::fs::rename(&bak2, &bak3)?;
        }
        if bak1.exists() {
            std::fs::rename(&bak1, &bak2)?;
        }
        std::fs::rename(path, &bak1)?;
        Ok(())
    }

    pub fn write_seq(&self) -> u64 {
        self.write_seq
    }

    pub fn processed_seq(&self) -> u64 {
        self.processed_seq
    }

    pub fn append(&mut self, event: &Event) -> Result<u64, WalError> {
        self.write_seq += 1;
        let entry = WalEntry { seq: self.write_seq, event: event.clone() };
        let line = serde_json::to_string(&entry)?;
        writeln!(self.file, "{line}")?;
        self.file.flush()?;
        self.count_since_flush += 1;
        Ok(self.write_seq)
    }

    /// Force the OS to persist buffered writes to disk. Separate from the
    /// cheap per-line `io::Write::flush` in [`Self::append`], which only
    /// makes a line visible to other readers of the file.
    pub fn flush(&mut self) -> Result<(), WalError> {
        self.file.sync_all()?;
        self.count_since_flush = 0;
        self.last_flush_at = Instant::now();
        Ok(())
    }

    pub fn needs_flush(&self) -> bool {
        self.count_since_flush >= FLUSH_THRESHOLD || self.last_flush_at.elapsed() >= FLUSH_INTERVAL
    }

    pub fn mark_processed(&mut self, seq: u64) {
        self.processed_seq = self.processed_seq.max(seq);
    }

    /// Pull the next entry past the cursor, skipping any line that fails to
    /// parse (a concurrent crash may have left a half-written line behind
    /// an otherwise valid, newer one). Returns `None` once no entry with
    /// the expected sequence number is found.
    pub fn next_unprocessed(&mut self) -> Result<Option<WalEntry>, WalError> {
        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        for line in reader.lines() {
            let line = match line {
                Ok(l) => l,
                Err(_) => continue,
            };
            if line.trim().is_empty() {
                continue;
            }
            if let Ok(entry) = serde_json::from_str::<WalEntry>(&line) {
                if entry.seq == self.next_seq_to_emit {
                    self.next_seq_to_emit += 1;
                    return Ok(Some(entry));
                }
            }
        }
        Ok(None)
    }

    /// All entries with `seq > after_seq`, in order, stopping at the first
    /// line that fails to parse rather than skipping past it — used for
    /// recovery, where trusting anything past a corruption point is unsafe.
    pub fn entries_after(&self, after_seq: u64) -> Result<Vec<WalEntry>, WalError> {
        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut out = Vec::new();
        for line in reader.lines() {
            let line = match line {
                Ok(l) => l,
                Err(_) => break,
            };
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<WalEntry>(&line) {
                Ok(entry) => {
                    if entry.seq > after_seq {
                        out.push(entry);
                    }
                }
                Err(_) => break,
            }
        }
        Ok(out)
    }

    /// Rewrite the log to drop every entry with `seq < keep_from_seq`,
    /// typically called right after a snapshot has captured everything up
    /// to that point.
    pub fn truncate_before(&mut self, keep_from_seq: u64) -> Result<(), WalError> {
        let entries = self.entries_after(keep_from_seq.saturating_sub(1))?;
        let mut buf = String::new();
        for entry in &entries {
            buf.push_str(&serde_json::to_string(entry)?);
            buf.push('\n');
        }
        std::fs::write(&self.path, buf)?;
        self.file = OpenOptions::new().append(true).open(&self.path)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
