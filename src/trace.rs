//! Binary trace files consumed by the evaluation drivers.
//!
//! A trace is a flat array of fixed-size records. Branch traces carry
//! [BranchRecord] entries; memory traces carry [MemoryRecord] entries.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{ensure, Context, Result};

use crate::branch::BranchRecord;
use crate::cache::AccessKind;

/// A record of one memory access.
///
/// NOTE: The layout of this struct doubles as the on-disk trace format.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MemoryRecord {
    /// The accessed data address
    pub addr: usize,

    kind: u32,
}
impl MemoryRecord {
    const LOAD: u32 = 0;
    const STORE: u32 = 1;

    pub fn new(addr: usize, kind: AccessKind) -> Self {
        let kind = match kind {
            AccessKind::Load => Self::LOAD,
            AccessKind::Store => Self::STORE,
        };
        Self { addr, kind }
    }

    pub fn kind(&self) -> AccessKind {
        match self.kind {
            Self::STORE => AccessKind::Store,
            _ => AccessKind::Load,
        }
    }
}

fn read_records(path: &Path, record_size: usize) -> Result<(Vec<u8>, usize, String)> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<trace>")
        .to_string();

    let len = std::fs::metadata(path)
        .with_context(|| format!("failed to stat {}", path.display()))?
        .len() as usize;
    ensure!(
        len % record_size == 0,
        "{}: {} bytes is not a whole number of {}-byte records",
        path.display(),
        len,
        record_size
    );

    let mut f = File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut data = vec![0; len];
    f.read_exact(&mut data)
        .with_context(|| format!("failed to read {}", path.display()))?;

    Ok((data, len / record_size, name))
}

/// A branch trace loaded into memory.
pub struct BranchTrace {
    pub data: Vec<u8>,
    name: String,
    /// Number of records
    num_entries: usize,
}
impl BranchTrace {
    pub fn from_file(path: &Path) -> Result<Self> {
        let (data, num_entries, name) =
            read_records(path, std::mem::size_of::<BranchRecord>())?;
        Ok(Self { data, name, num_entries })
    }

    /// Return the number of records
    pub fn num_entries(&self) -> usize {
        self.num_entries
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return a slice of records.
    pub fn as_slice(&self) -> &[BranchRecord] {
        unsafe {
            std::slice::from_raw_parts(
                self.data.as_ptr() as *const BranchRecord,
                self.num_entries,
            )
        }
    }

    /// Return a truncated slice of records
    pub fn as_slice_trunc(&self, limit: usize) -> &[BranchRecord] {
        &self.as_slice()[..self.num_entries.min(limit)]
    }
}

/// A memory access trace loaded into memory.
pub struct MemoryTrace {
    pub data: Vec<u8>,
    name: String,
    /// Number of records
    num_entries: usize,
}
impl MemoryTrace {
    pub fn from_file(path: &Path) -> Result<Self> {
        let (data, num_entries, name) =
            read_records(path, std::mem::size_of::<MemoryRecord>())?;
        Ok(Self { data, name, num_entries })
    }

    pub fn num_entries(&self) -> usize {
        self.num_entries
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return a slice of records.
    pub fn as_slice(&self) -> &[MemoryRecord] {
        unsafe {
            std::slice::from_raw_parts(
                self.data.as_ptr() as *const MemoryRecord,
                self.num_entries,
            )
        }
    }

    /// Return a truncated slice of records
    pub fn as_slice_trunc(&self, limit: usize) -> &[MemoryRecord] {
        &self.as_slice()[..self.num_entries.min(limit)]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::branch::{BranchKind, Outcome};

    fn record_bytes<T: Copy>(records: &[T]) -> &[u8] {
        unsafe {
            std::slice::from_raw_parts(
                records.as_ptr() as *const u8,
                std::mem::size_of_val(records),
            )
        }
    }

    #[test]
    fn branch_trace_roundtrip() {
        let records = vec![
            BranchRecord::new(0x1000, 0x2000, BranchKind::Conditional, Outcome::T, 4),
            BranchRecord::new(0x2000, 0x1000, BranchKind::Return, Outcome::T, 1),
        ];
        let path = std::env::temp_dir().join("axon-branch-trace-test.bin");
        std::fs::write(&path, record_bytes(&records)).unwrap();

        let trace = BranchTrace::from_file(&path).unwrap();
        assert_eq!(trace.num_entries(), 2);
        assert_eq!(trace.as_slice(), &records[..]);
        assert_eq!(trace.as_slice_trunc(1), &records[..1]);
        assert_eq!(trace.as_slice_trunc(10).len(), 2);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn memory_trace_roundtrip() {
        let records = vec![
            MemoryRecord::new(0xdead_0000, AccessKind::Load),
            MemoryRecord::new(0xbeef_0000, AccessKind::Store),
        ];
        let path = std::env::temp_dir().join("axon-memory-trace-test.bin");
        std::fs::write(&path, record_bytes(&records)).unwrap();

        let trace = MemoryTrace::from_file(&path).unwrap();
        assert_eq!(trace.num_entries(), 2);
        assert_eq!(trace.as_slice()[0].kind(), AccessKind::Load);
        assert_eq!(trace.as_slice()[1].kind(), AccessKind::Store);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn truncated_files_are_rejected() {
        let path = std::env::temp_dir().join("axon-bad-trace-test.bin");
        std::fs::write(&path, [0u8; 7]).unwrap();
        assert!(BranchTrace::from_file(&path).is_err());
        std::fs::remove_file(&path).ok();
    }
}
