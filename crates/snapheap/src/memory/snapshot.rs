//! Snapshot Memory - Segment-based captured address space
//!
//! A snapshot is a sparse set of captured ranges. Each range is a
//! [`Segment`] with its own protection flags, backed either by owned bytes
//! (synthetic images, small dumps) or by a read-only memory map of a raw
//! image file.
//!
//! Segments never overlap; lookups find the segment with the greatest base
//! not above the requested address.

use super::MemoryAccessor;
use crate::error::{Result, SnapheapError};
use memmap2::Mmap;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

/// Byte order of the captured process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    #[default]
    Little,
    Big,
}

/// Protection flags of a captured range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SegmentFlags {
    pub executable: bool,
    pub read_only: bool,
    pub shared: bool,
}

enum Storage {
    Owned(Vec<u8>),
    Mapped(Mmap),
}

struct Segment {
    storage: Storage,
    flags: SegmentFlags,
}

impl Segment {
    fn bytes(&self) -> &[u8] {
        match &self.storage {
            Storage::Owned(bytes) => bytes.as_slice(),
            Storage::Mapped(map) => &map[..],
        }
    }

    fn len(&self) -> u64 {
        self.bytes().len() as u64
    }
}

/// SnapshotMemory - captured address space
///
/// # Examples
///
/// ```rust
/// use snapheap::memory::{ByteOrder, MemoryAccessor, SegmentFlags, SnapshotMemory};
///
/// let mut memory = SnapshotMemory::new(8, ByteOrder::Little);
/// memory.add_segment(0x1000, vec![0u8; 64], SegmentFlags::default())?;
/// memory.write_u32(0x1008, 0xCAFE)?;
///
/// assert_eq!(memory.read_u32_at(0x1000, 8)?, 0xCAFE);
/// assert!(memory.read_u32(0x2000).is_err());
/// # Ok::<(), snapheap::SnapheapError>(())
/// ```
pub struct SnapshotMemory {
    pointer_size: u64,
    byte_order: ByteOrder,
    segments: BTreeMap<u64, Segment>,
}

impl SnapshotMemory {
    /// Create an empty snapshot
    ///
    /// # Arguments
    /// * `pointer_size` - Pointer width of the captured process; 4 selects
    ///   32-bit pointer reads, anything else 64-bit
    /// * `byte_order` - Byte order of the captured process
    pub fn new(pointer_size: u64, byte_order: ByteOrder) -> Self {
        Self {
            pointer_size,
            byte_order,
            segments: BTreeMap::new(),
        }
    }

    /// Byte order of the captured process
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Number of captured segments
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Add an owned segment at `base`
    ///
    /// # Returns
    /// * `Err(SnapheapError::InvalidArgument)` - Empty segment or overlap
    ///   with an existing one
    pub fn add_segment(&mut self, base: u64, bytes: Vec<u8>, flags: SegmentFlags) -> Result<()> {
        self.insert(
            base,
            Segment {
                storage: Storage::Owned(bytes),
                flags,
            },
        )
    }

    /// Map a raw memory image file read-only at `base`
    ///
    /// The file content is the captured range byte for byte.
    pub fn map_file<P: AsRef<Path>>(&mut self, base: u64, path: P, flags: SegmentFlags) -> Result<()> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            SnapheapError::SnapshotIo(format!("cannot open {}: {}", path.display(), e))
        })?;

        // SAFETY: the map is read-only and the snapshot file is not modified
        // while the walker holds it.
        let map = unsafe { Mmap::map(&file) }.map_err(|e| {
            SnapheapError::SnapshotIo(format!("cannot map {}: {}", path.display(), e))
        })?;

        self.insert(
            base,
            Segment {
                storage: Storage::Mapped(map),
                flags,
            },
        )
    }

    fn insert(&mut self, base: u64, segment: Segment) -> Result<()> {
        let len = segment.len();
        if len == 0 {
            return Err(SnapheapError::InvalidArgument(format!(
                "segment at {:#x} is empty",
                base
            )));
        }

        let end = base.checked_add(len).ok_or_else(|| {
            SnapheapError::InvalidArgument(format!(
                "segment at {:#x} ({} bytes) overflows the address space",
                base, len
            ))
        })?;

        if let Some((prev_base, prev)) = self.segments.range(..=base).next_back() {
            if prev_base + prev.len() > base {
                return Err(SnapheapError::InvalidArgument(format!(
                    "segment at {:#x} overlaps segment at {:#x}",
                    base, prev_base
                )));
            }
        }
        if let Some((next_base, _)) = self.segments.range(base..).next() {
            if *next_base < end {
                return Err(SnapheapError::InvalidArgument(format!(
                    "segment at {:#x} overlaps segment at {:#x}",
                    base, next_base
                )));
            }
        }

        self.segments.insert(base, segment);
        Ok(())
    }

    /// Locate `len` bytes at `address`, returning the segment and start index
    fn locate(&self, address: u64, len: usize) -> Result<(&Segment, usize)> {
        let unavailable = SnapheapError::MemoryUnavailable { address };
        let (base, segment) = self
            .segments
            .range(..=address)
            .next_back()
            .ok_or(unavailable.clone())?;

        let start = usize::try_from(address - base).map_err(|_| unavailable.clone())?;
        let end = start.checked_add(len).ok_or(unavailable.clone())?;
        if end > segment.bytes().len() {
            return Err(unavailable);
        }
        Ok((segment, start))
    }

    fn write_bytes(&mut self, address: u64, data: &[u8]) -> Result<()> {
        let (base, start) = {
            let (base, _) = self
                .segments
                .range(..=address)
                .next_back()
                .ok_or(SnapheapError::MemoryUnavailable { address })?;
            let (_, start) = self.locate(address, data.len())?;
            (*base, start)
        };

        match self.segments.get_mut(&base).map(|s| &mut s.storage) {
            Some(Storage::Owned(bytes)) => {
                bytes[start..start + data.len()].copy_from_slice(data);
                Ok(())
            }
            _ => Err(SnapheapError::InvalidArgument(format!(
                "segment holding {:#x} is a read-only mapping",
                address
            ))),
        }
    }

    /// Write a 32-bit word in the snapshot's byte order
    pub fn write_u32(&mut self, address: u64, value: u32) -> Result<()> {
        let bytes = match self.byte_order {
            ByteOrder::Little => value.to_le_bytes(),
            ByteOrder::Big => value.to_be_bytes(),
        };
        self.write_bytes(address, &bytes)
    }

    /// Write a 64-bit word in the snapshot's byte order
    pub fn write_u64(&mut self, address: u64, value: u64) -> Result<()> {
        let bytes = match self.byte_order {
            ByteOrder::Little => value.to_le_bytes(),
            ByteOrder::Big => value.to_be_bytes(),
        };
        self.write_bytes(address, &bytes)
    }

    /// Write a pointer-sized word
    pub fn write_pointer(&mut self, address: u64, value: u64) -> Result<()> {
        if self.pointer_size == 4 {
            let narrow = u32::try_from(value).map_err(|_| {
                SnapheapError::InvalidArgument(format!(
                    "pointer {:#x} does not fit a 32-bit snapshot",
                    value
                ))
            })?;
            self.write_u32(address, narrow)
        } else {
            self.write_u64(address, value)
        }
    }

    fn flags(&self, address: u64) -> Result<SegmentFlags> {
        self.locate(address, 1).map(|(segment, _)| segment.flags)
    }
}

impl MemoryAccessor for SnapshotMemory {
    fn pointer_size(&self) -> u64 {
        self.pointer_size
    }

    fn read_bytes(&self, address: u64, buf: &mut [u8]) -> Result<()> {
        let (segment, start) = self.locate(address, buf.len())?;
        buf.copy_from_slice(&segment.bytes()[start..start + buf.len()]);
        Ok(())
    }

    fn read_u32(&self, address: u64) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_bytes(address, &mut buf)?;
        Ok(match self.byte_order {
            ByteOrder::Little => u32::from_le_bytes(buf),
            ByteOrder::Big => u32::from_be_bytes(buf),
        })
    }

    fn read_u64(&self, address: u64) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.read_bytes(address, &mut buf)?;
        Ok(match self.byte_order {
            ByteOrder::Little => u64::from_le_bytes(buf),
            ByteOrder::Big => u64::from_be_bytes(buf),
        })
    }

    fn is_executable(&self, address: u64) -> Result<bool> {
        self.flags(address).map(|f| f.executable)
    }

    fn is_read_only(&self, address: u64) -> Result<bool> {
        self.flags(address).map(|f| f.read_only)
    }

    fn is_shared(&self, address: u64) -> Result<bool> {
        self.flags(address).map(|f| f.shared)
    }
}
