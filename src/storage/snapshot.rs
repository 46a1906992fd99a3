//! Snapshot persistence for the point store.
//!
//! A snapshot is a point-in-time copy of every stored point plus the id
//! counter. It is written to a temporary file and renamed over the previous
//! snapshot, so a crash mid-write leaves the old snapshot intact.
//!
//! Layout (little-endian): magic, version byte, 16-byte timestamp, `next_id`
//! (u64), point count (u64), then per point `id` (u64), `lat` and `lon`
//! (f64 bit patterns).

use crate::error::{IncidexError, Result};
use incidex_types::{GeoPoint, PointId};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

const SNAPSHOT_MAGIC: &[u8] = b"INCIDEX_SNAPSHOT";
const SNAPSHOT_VERSION: u8 = 1;

#[derive(Debug, Clone, Default)]
pub struct SnapshotConfig {
    pub auto_snapshot_ops: Option<usize>,
}

/// Contents of a loaded snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotData {
    pub next_id: PointId,
    pub points: Vec<GeoPoint>,
}

pub struct SnapshotFile {
    path: PathBuf,
    config: SnapshotConfig,
    ops_since_snapshot: usize,
}

impl SnapshotFile {
    pub fn new<P: AsRef<Path>>(path: P, config: SnapshotConfig) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            config,
            ops_since_snapshot: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the snapshot. A missing or empty file yields `None`.
    pub fn load(&self) -> Result<Option<SnapshotData>> {
        if !self.exists() {
            return Ok(None);
        }

        let file = File::open(&self.path)?;
        if file.metadata()?.len() == 0 {
            return Ok(None);
        }

        let mut reader = BufReader::new(file);

        let mut magic = vec![0u8; SNAPSHOT_MAGIC.len()];
        reader.read_exact(&mut magic)?;
        if magic != SNAPSHOT_MAGIC {
            return Err(IncidexError::InvalidFormat);
        }

        if read_u8(&mut reader)? != SNAPSHOT_VERSION {
            return Err(IncidexError::InvalidFormat);
        }

        let mut timestamp_bytes = [0u8; 16];
        reader.read_exact(&mut timestamp_bytes)?;

        let next_id = read_u64(&mut reader)?;
        let count = read_u64(&mut reader)?;

        // Cap the preallocation; a corrupt count must not trigger a huge alloc.
        let mut points = Vec::with_capacity(count.min(1 << 20) as usize);
        for _ in 0..count {
            let id = read_u64(&mut reader)?;
            let lat = f64::from_bits(read_u64(&mut reader)?);
            let lon = f64::from_bits(read_u64(&mut reader)?);
            points.push(GeoPoint::new(id, lat, lon));
        }

        Ok(Some(SnapshotData { next_id, points }))
    }

    /// Write `points` and `next_id`, atomically replacing the previous snapshot.
    pub fn save(&mut self, next_id: PointId, points: &[GeoPoint]) -> Result<()> {
        let temp_path = self.temp_path();

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;

        let mut writer = BufWriter::new(file);

        writer.write_all(SNAPSHOT_MAGIC)?;
        write_u8(&mut writer, SNAPSHOT_VERSION)?;

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| IncidexError::InvalidTimestamp)?;
        let mut timestamp_buf = [0u8; 16];
        timestamp_buf[0..8].copy_from_slice(&timestamp.as_secs().to_le_bytes());
        timestamp_buf[8..12].copy_from_slice(&timestamp.subsec_nanos().to_le_bytes());
        writer.write_all(&timestamp_buf)?;

        write_u64(&mut writer, next_id)?;
        write_u64(&mut writer, points.len() as u64)?;

        for point in points {
            write_u64(&mut writer, point.id())?;
            write_u64(&mut writer, point.lat().to_bits())?;
            write_u64(&mut writer, point.lon().to_bits())?;
        }

        writer.flush()?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        drop(file);

        std::fs::rename(&temp_path, &self.path)?;
        self.sync_parent_dir()?;

        self.ops_since_snapshot = 0;

        Ok(())
    }

    pub fn record_operation(&mut self) {
        self.ops_since_snapshot += 1;
    }

    /// Writes recorded since the last save.
    pub fn pending_operations(&self) -> usize {
        self.ops_since_snapshot
    }

    pub fn should_snapshot(&self) -> bool {
        if let Some(threshold) = self.config.auto_snapshot_ops {
            self.ops_since_snapshot >= threshold
        } else {
            false
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        if let Some(name) = temp.file_name() {
            let mut new_name = name.to_string_lossy().into_owned();
            new_name.push_str(".tmp");
            temp.set_file_name(new_name);
        }
        temp
    }

    fn sync_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            let dir = File::open(parent)?;
            dir.sync_all()?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for SnapshotFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotFile")
            .field("path", &self.path)
            .field("ops_since_snapshot", &self.ops_since_snapshot)
            .finish()
    }
}

fn write_u8<W: Write>(writer: &mut W, value: u8) -> Result<()> {
    writer.write_all(&[value])?;
    Ok(())
}

fn write_u64<W: Write>(writer: &mut W, value: u64) -> Result<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn read_u8<R: Read>(reader: &mut R) -> Result<u8> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn read_u64<R: Read>(reader: &mut R) -> Result<u64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}
