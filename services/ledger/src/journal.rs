//! Journal store: append-only match journal with checksums
//!
//! Every store mutation is written as one journal entry before it is
//! applied in memory. On open the journal is replayed front to back to
//! rebuild all matches.
//!
//! # Binary Format (per entry)
//! ```text
//! [payload_len: u32]
//! [payload:     bytes]  // bincode-encoded JournalRecord
//! [checksum:    u32]    // CRC32C over payload
//! ```
//!
//! A truncated or checksum-failing *final* entry is treated as a torn write
//! and cut off. A bad entry followed by more data is corruption and fails
//! the open.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use crc32c::crc32c;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use types::ball::BallEvent;
use types::fixture::{Match, MatchStatus};
use types::ids::MatchId;

use crate::error::StoreError;
use crate::store::{MatchStore, MatchUpdate};

/// Length prefix plus trailing checksum.
const FRAME_OVERHEAD: usize = 8;

/// Reject absurd lengths before allocating (likely corruption).
const MAX_PAYLOAD_LEN: usize = 64 * 1024 * 1024;

// ── Records ─────────────────────────────────────────────────────────

/// One persisted store mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JournalRecord {
    MatchCreated(Match),
    BallRecorded { match_id: MatchId, event: BallEvent },
    StatusChanged { match_id: MatchId, status: MatchStatus },
}

impl JournalRecord {
    /// Frame the record for the journal file.
    pub fn encode(&self) -> Result<Vec<u8>, StoreError> {
        let payload = bincode::serialize(self)
            .map_err(|e| StoreError::Unavailable(format!("journal encode failed: {}", e)))?;
        let len = payload.len() as u32;

        let mut buf = Vec::with_capacity(FRAME_OVERHEAD + payload.len());
        buf.extend_from_slice(&len.to_le_bytes());
        buf.extend_from_slice(&payload);
        buf.extend_from_slice(&crc32c(&payload).to_le_bytes());
        Ok(buf)
    }

    fn label(&self) -> &'static str {
        match self {
            JournalRecord::MatchCreated(_) => "MatchCreated",
            JournalRecord::BallRecorded { .. } => "BallRecorded",
            JournalRecord::StatusChanged { .. } => "StatusChanged",
        }
    }
}

/// Why a frame could not be decoded
#[derive(Debug, Clone, PartialEq, Eq)]
enum FrameError {
    /// Ran out of bytes mid-frame
    Truncated,
    ChecksumMismatch,
    Undecodable(String),
}

/// Decode the frame at the start of `data`, returning the record and the
/// number of bytes consumed.
fn decode_frame(data: &[u8]) -> Result<(JournalRecord, usize), FrameError> {
    let len_bytes: [u8; 4] = data
        .get(..4)
        .and_then(|b| b.try_into().ok())
        .ok_or(FrameError::Truncated)?;
    let len = u32::from_le_bytes(len_bytes) as usize;

    if len > MAX_PAYLOAD_LEN {
        return Err(FrameError::Undecodable(format!("implausible payload length {}", len)));
    }

    let total = FRAME_OVERHEAD + len;
    let frame = data.get(..total).ok_or(FrameError::Truncated)?;
    let payload = &frame[4..4 + len];
    let crc_bytes: [u8; 4] = frame[4 + len..]
        .try_into()
        .map_err(|_| FrameError::Truncated)?;

    if crc32c(payload) != u32::from_le_bytes(crc_bytes) {
        return Err(FrameError::ChecksumMismatch);
    }

    let record = bincode::deserialize(payload).map_err(|e| FrameError::Undecodable(e.to_string()))?;
    Ok((record, total))
}

// ── Replay ──────────────────────────────────────────────────────────

/// Outcome of scanning a journal file
#[derive(Debug, Default)]
pub struct ReplayReport {
    pub records_replayed: u64,
    /// Byte length of the valid prefix
    pub valid_len: u64,
    /// Bytes cut off as a torn tail
    pub truncated_bytes: u64,
}

fn apply_record(
    matches: &mut BTreeMap<MatchId, Match>,
    record: JournalRecord,
    offset: u64,
) -> Result<(), StoreError> {
    let missing = |match_id: &MatchId| StoreError::Corrupt {
        offset,
        detail: format!("record for unknown match {}", match_id),
    };

    match record {
        JournalRecord::MatchCreated(fixture) => {
            matches.insert(fixture.match_id.clone(), fixture);
        }
        JournalRecord::BallRecorded { match_id, event } => {
            let fixture = matches.get_mut(&match_id).ok_or_else(|| missing(&match_id))?;
            MatchUpdate::append(event).apply_to(fixture);
        }
        JournalRecord::StatusChanged { match_id, status } => {
            let fixture = matches.get_mut(&match_id).ok_or_else(|| missing(&match_id))?;
            MatchUpdate::status(status).apply_to(fixture);
        }
    }
    Ok(())
}

/// Replay raw journal bytes into a match map.
pub fn replay(data: &[u8]) -> Result<(BTreeMap<MatchId, Match>, ReplayReport), StoreError> {
    let mut matches = BTreeMap::new();
    let mut report = ReplayReport::default();
    let mut pos = 0usize;

    while pos < data.len() {
        match decode_frame(&data[pos..]) {
            Ok((record, consumed)) => {
                debug!(offset = pos, kind = record.label(), "Replaying journal record");
                apply_record(&mut matches, record, pos as u64)?;
                pos += consumed;
                report.records_replayed += 1;
            }
            Err(FrameError::Truncated) => {
                report.truncated_bytes = (data.len() - pos) as u64;
                break;
            }
            Err(FrameError::ChecksumMismatch) if is_last_frame(data, pos) => {
                report.truncated_bytes = (data.len() - pos) as u64;
                break;
            }
            Err(err) => {
                return Err(StoreError::Corrupt {
                    offset: pos as u64,
                    detail: format!("{:?}", err),
                });
            }
        }
    }

    report.valid_len = pos as u64;
    Ok((matches, report))
}

/// Whether the frame at `pos` claims to extend exactly to end of file.
fn is_last_frame(data: &[u8], pos: usize) -> bool {
    data.get(pos..pos + 4)
        .and_then(|b| <[u8; 4]>::try_from(b).ok())
        .map(|b| pos + FRAME_OVERHEAD + u32::from_le_bytes(b) as usize >= data.len())
        .unwrap_or(true)
}

// ── Store ───────────────────────────────────────────────────────────

/// Append target for journal frames
///
/// `truncate_to` must leave the sink ready to append at `len`.
trait JournalSink: Write + Send + Sync {
    fn truncate_to(&mut self, len: u64) -> std::io::Result<()>;
}

impl JournalSink for File {
    fn truncate_to(&mut self, len: u64) -> std::io::Result<()> {
        // Opened in append mode, so the next write lands at the new end
        self.set_len(len)
    }
}

struct JournalInner {
    matches: BTreeMap<MatchId, Match>,
    sink: Box<dyn JournalSink>,
    /// File length covered by fully written frames
    committed_len: u64,
    /// Set when a failed write could not be rolled back
    poisoned: bool,
}

impl JournalInner {
    /// Write all frames in one go; memory is only touched after this
    /// succeeds. A failed write is cut back to the last committed frame so
    /// it can never resurface on replay.
    fn write_records(&mut self, records: &[JournalRecord]) -> Result<(), StoreError> {
        if self.poisoned {
            return Err(StoreError::Unavailable(
                "journal tail could not be repaired after a failed write".to_string(),
            ));
        }

        let mut batch = Vec::new();
        for record in records {
            batch.extend_from_slice(&record.encode()?);
        }

        let written = self.sink.write_all(&batch).and_then(|()| self.sink.flush());
        if let Err(err) = written {
            match self.sink.truncate_to(self.committed_len) {
                Ok(()) => warn!(
                    committed_len = self.committed_len,
                    error = %err,
                    "Journal write failed, partial frame discarded"
                ),
                Err(rollback) => {
                    self.poisoned = true;
                    error!(
                        committed_len = self.committed_len,
                        error = %err,
                        rollback_error = %rollback,
                        "Journal write failed and could not be rolled back"
                    );
                }
            }
            return Err(err.into());
        }

        self.committed_len += batch.len() as u64;
        Ok(())
    }
}

/// File-backed `MatchStore`
pub struct JournalStore {
    path: PathBuf,
    inner: RwLock<JournalInner>,
}

impl JournalStore {
    /// Open (or create) the journal at `path` and replay it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)?;

        let mut data = Vec::new();
        file.read_to_end(&mut data)?;

        let (matches, report) = replay(&data)?;
        if report.truncated_bytes > 0 {
            warn!(
                path = %path.display(),
                truncated_bytes = report.truncated_bytes,
                valid_len = report.valid_len,
                "Torn journal tail detected, truncating"
            );
            file.set_len(report.valid_len)?;
        }

        info!(
            path = %path.display(),
            records = report.records_replayed,
            matches = matches.len(),
            "Journal store opened"
        );

        Ok(Self {
            path,
            inner: RwLock::new(JournalInner {
                matches,
                sink: Box::new(file),
                committed_len: report.valid_len,
                poisoned: false,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Highest allocator-form id present, for seeding the allocator.
    pub async fn highest_match_sequence(&self) -> u64 {
        self.inner
            .read()
            .await
            .matches
            .keys()
            .filter_map(MatchId::sequence)
            .max()
            .unwrap_or(0)
    }
}

#[async_trait]
impl MatchStore for JournalStore {
    async fn save(&self, fixture: Match) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if inner.matches.contains_key(&fixture.match_id) {
            return Err(StoreError::Unavailable(format!(
                "duplicate match id {}",
                fixture.match_id
            )));
        }
        let record = JournalRecord::MatchCreated(fixture);
        inner.write_records(std::slice::from_ref(&record))?;
        if let JournalRecord::MatchCreated(fixture) = record {
            inner.matches.insert(fixture.match_id.clone(), fixture);
        }
        Ok(())
    }

    async fn find_by_match_id(&self, match_id: &MatchId) -> Result<Option<Match>, StoreError> {
        Ok(self.inner.read().await.matches.get(match_id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Match>, StoreError> {
        Ok(self.inner.read().await.matches.values().cloned().collect())
    }

    async fn update(
        &self,
        match_id: &MatchId,
        update: MatchUpdate,
    ) -> Result<Option<Match>, StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.matches.contains_key(match_id) {
            return Ok(None);
        }

        let mut records = Vec::with_capacity(2);
        if let Some(status) = update.status {
            records.push(JournalRecord::StatusChanged {
                match_id: match_id.clone(),
                status,
            });
        }
        if let Some(event) = &update.append {
            records.push(JournalRecord::BallRecorded {
                match_id: match_id.clone(),
                event: event.clone(),
            });
        }
        if !records.is_empty() {
            inner.write_records(&records)?;
        }

        Ok(inner.matches.get_mut(match_id).map(|fixture| {
            update.apply_to(fixture);
            fixture.clone()
        }))
    }
}
