//! Heap Walker Tests - Cursor Movement and Corruption Containment
//!
//! These tests verify the walk over whole regions:
//! - Cursor advance by minimum-size, alignment-rounded footprints
//! - Extent sequencing and empty-extent skipping
//! - One corruption costs at most the rest of its extent
//! - Hash slot growth of moved objects

mod common;

use common::*;
use snapheap::{HeaderStyle, HeapEntry, HeapObject, SnapheapError};
use std::sync::Arc;

const PLAIN_20: u32 = 1;
const PLAIN_16: u32 = 2;
const BYTES: u32 = 3;

fn builder() -> SnapshotBuilder {
    SnapshotBuilder::new(8, 0x1000, 0x200)
        .class(PLAIN_20, ClassInfo::Plain { size: 20 })
        .class(PLAIN_16, ClassInfo::Plain { size: 16 })
        .class(
            BYTES,
            ClassInfo::Array {
                header_size: 16,
                element_size: 1,
                element: "byte",
            },
        )
}

/// ============================================================================
/// CURSOR MOVEMENT
/// ============================================================================

/// Test the canonical two-object extent
///
/// **Bug this finds:** Cursor advancing by raw instance size instead of the
/// aligned footprint
#[test]
fn test_second_object_follows_aligned_footprint() {
    let mut snapshot = builder();
    snapshot.object(0x1000, PLAIN_20, 0).object(0x1018, PLAIN_16, 0);
    let mut region = region(snapshot.build(), config(8, 16, 2048), HeaderStyle::MultiWord);
    region.add_extent(0x1000, 64, 2).unwrap();

    let entries: Vec<HeapEntry> = region.objects().collect();
    assert_eq!(entry_addresses(&entries), vec![0x1000, 0x1018]);
    assert!(entries.iter().all(|e| !e.is_corrupt()));
}

/// Test that small objects still consume the minimum object size
///
/// **Bug this finds:** Objects overlapping when instance size < minimum
#[test]
fn test_minimum_object_size_applied() {
    let mut snapshot = builder();
    snapshot.object(0x1000, PLAIN_16, 0).object(0x1020, PLAIN_16, 0);
    let mut region = region(snapshot.build(), config(8, 32, 2048), HeaderStyle::MultiWord);
    region.add_extent(0x1000, 64, 2).unwrap();

    let entries: Vec<HeapEntry> = region.objects().collect();
    assert_eq!(entry_addresses(&entries), vec![0x1000, 0x1020]);
}

/// Test that a clean walk yields exactly the resident counts
///
/// **Invariant verified:** objects == sum of resident counts without corruption
#[test]
fn test_object_count_matches_resident_counts() {
    let mut snapshot = builder();
    for address in [0x1000, 0x1010, 0x1180, 0x1190, 0x11A0] {
        snapshot.object(address, PLAIN_16, 0);
    }
    let mut region = region(snapshot.build(), config(8, 16, 2048), HeaderStyle::MultiWord);
    region.add_extent(0x1000, 0x40, 2).unwrap();
    region.add_extent(0x1100, 0x40, 0).unwrap();
    region.add_extent(0x1180, 0x40, 3).unwrap();

    let mut walker = region.objects();
    let entries: Vec<HeapEntry> = walker.by_ref().collect();
    let expected: usize = region.extents().iter().map(|e| e.resident_object_count()).sum();

    assert_eq!(entries.len(), expected);
    assert_eq!(entry_addresses(&entries), vec![0x1000, 0x1010, 0x1180, 0x1190, 0x11A0]);
    assert_eq!(walker.stats().objects, 5);
    assert_eq!(walker.stats().extents_visited, 2);
    assert_eq!(walker.stats().bytes_consumed, 5 * 16);
}

/// Test that a walk sees only extents appended before it started
#[test]
fn test_walk_reflects_extents_at_creation() {
    let mut snapshot = builder();
    snapshot.object(0x1000, PLAIN_16, 0).object(0x1100, PLAIN_16, 0);
    let mut region = region(snapshot.build(), config(8, 16, 2048), HeaderStyle::MultiWord);
    region.add_extent(0x1000, 0x10, 1).unwrap();

    assert_eq!(region.objects().count(), 1);

    region.add_extent(0x1100, 0x10, 1).unwrap();
    assert_eq!(region.objects().count(), 2);
}

/// ============================================================================
/// CORRUPTION CONTAINMENT
/// ============================================================================

/// Test that an undecodable object abandons only its own extent
///
/// **Bug this finds:** Walk aborting entirely, or continuing from garbage offsets
#[test]
fn test_corruption_abandons_current_extent_only() {
    let mut snapshot = builder();
    snapshot
        .object(0x1000, PLAIN_16, 0)
        .object(0x1010, 99, 0)
        .object(0x1020, PLAIN_16, 0)
        .object(0x1100, PLAIN_16, 0);
    let mut region = region(snapshot.build(), config(8, 16, 2048), HeaderStyle::MultiWord);
    region.add_extent(0x1000, 0x40, 3).unwrap();
    region.add_extent(0x1100, 0x40, 1).unwrap();

    let mut walker = region.objects();
    let entries: Vec<HeapEntry> = walker.by_ref().collect();

    assert_eq!(entry_addresses(&entries), vec![0x1000, 0x1010, 0x1100]);
    assert_corrupt_at(&entries[1], 0x1010);
    assert_eq!(walker.stats().corrupt_markers, 1);
    assert_eq!(walker.stats().extents_abandoned, 1);
    assert_eq!(walker.stats().objects, 2);
}

/// Test that a misaligned extent base yields an alignment marker
///
/// **Bug this finds:** Alignment violations decoded as objects
#[test]
fn test_misaligned_extent_base() {
    let mut snapshot = builder();
    snapshot.object(0x1100, PLAIN_16, 0);
    let mut region = region(snapshot.build(), config(8, 16, 2048), HeaderStyle::MultiWord);
    region.add_extent(0x1004, 0x40, 2).unwrap();
    region.add_extent(0x1100, 0x40, 1).unwrap();

    let entries: Vec<HeapEntry> = region.objects().collect();
    assert_eq!(entries.len(), 2);
    match &entries[0] {
        HeapEntry::Corrupt(corrupt) => assert_eq!(
            corrupt.error,
            SnapheapError::InvalidAlignment {
                address: 0x1004,
                alignment: 8
            }
        ),
        other => panic!("expected alignment marker, got {:?}", other),
    }
    assert_eq!(entries[1].as_object().map(HeapObject::address), Some(0x1100));
}

/// Test that an extent outside the snapshot is reported, not decoded
#[test]
fn test_unmapped_extent() {
    let region = {
        let mut region = region(builder().build(), config(8, 16, 2048), HeaderStyle::MultiWord);
        region.add_extent(0x8000, 0x40, 4).unwrap();
        region
    };

    let entries: Vec<HeapEntry> = region.objects().collect();
    assert_eq!(entries.len(), 1);
    match &entries[0] {
        HeapEntry::Corrupt(corrupt) => {
            // Arraylet identification reads the flags word first
            assert_eq!(corrupt.error, SnapheapError::MemoryUnavailable { address: 0x8004 });
            assert_eq!(corrupt.address, 0x8004);
        },
        other => panic!("expected corruption marker, got {:?}", other),
    }
}

/// Test that the walk terminates when every extent is corrupt
#[test]
fn test_walk_terminates_on_all_corrupt_extents() {
    let mut snapshot = builder();
    for address in [0x1000, 0x1040, 0x1080] {
        snapshot.object(address, 77, 0);
    }
    let mut region = region(snapshot.build(), config(8, 16, 2048), HeaderStyle::MultiWord);
    for base in [0x1000, 0x1040, 0x1080] {
        region.add_extent(base, 0x40, usize::MAX).unwrap();
    }

    let entries: Vec<HeapEntry> = region.objects().collect();
    assert_eq!(entries.len(), 3);
    assert!(entries.iter().all(HeapEntry::is_corrupt));
}

/// ============================================================================
/// HEADER FLAGS
/// ============================================================================

/// Test that a moved object grows by its hash slot (multi-word header)
///
/// **Bug this finds:** Next object decoded 4 bytes early after a moved object
#[test]
fn test_moved_object_multi_word() {
    let mut snapshot = builder();
    snapshot
        .object(0x1000, PLAIN_16, MOVED_FLAG)
        .object(0x1018, PLAIN_16, 0);
    let mut region = region(snapshot.build(), config(8, 16, 2048), HeaderStyle::MultiWord);
    region.add_extent(0x1000, 0x40, 2).unwrap();

    let entries: Vec<HeapEntry> = region.objects().collect();
    assert_eq!(entry_addresses(&entries), vec![0x1000, 0x1018]);
}

/// Test that single-word headers use their own moved bit
#[test]
fn test_moved_object_single_word() {
    let mut snapshot = builder();
    snapshot
        .object(0x1000, PLAIN_16, 0x04)
        .object(0x1018, PLAIN_16, MOVED_FLAG)
        .object(0x1028, PLAIN_16, 0);
    let mut region = region(snapshot.build(), config(8, 16, 2048), HeaderStyle::SingleWord);
    region.add_extent(0x1000, 0x40, 3).unwrap();

    // 0x04 moves the first object; 0x10000 means nothing to a single-word header
    let entries: Vec<HeapEntry> = region.objects().collect();
    assert_eq!(entry_addresses(&entries), vec![0x1000, 0x1018, 0x1028]);
}

/// ============================================================================
/// ARRAYLETS IN A WALK
/// ============================================================================

/// Test that the cursor skips interior leaves
///
/// **Bug this finds:** Leaf contents decoded as objects
#[test]
fn test_arraylet_with_interior_leaves() {
    let mut snapshot = builder();
    snapshot
        .array(0x1000, BYTES, 100, ARRAYLET_FLAG)
        .pointer(0x1010, 0x1020)
        .pointer(0x1018, 0x1060)
        .object(0x1088, PLAIN_16, 0);
    let mut region = region(snapshot.build(), config(8, 16, 64), HeaderStyle::MultiWord);
    region.add_extent(0x1000, 0x100, 2).unwrap();

    let mut walker = region.objects();
    let entries: Vec<HeapEntry> = walker.by_ref().collect();

    // spine 32 + leaf 64 + tail 36 = 132, padded to 136
    assert_eq!(entry_addresses(&entries), vec![0x1000, 0x1088]);
    assert!(entries[0].as_object().map(HeapObject::is_arraylet).unwrap_or(false));
    assert_eq!(walker.stats().arraylets, 1);
}

/// Test the zero-length arraylet probe with a null leaf slot
#[test]
fn test_empty_arraylet_with_null_leaf_slot() {
    let mut snapshot = builder();
    snapshot
        .array(0x1000, BYTES, 0, ARRAYLET_FLAG)
        .object(0x1018, PLAIN_16, 0);
    let mut region = region(snapshot.build(), config(8, 16, 64), HeaderStyle::MultiWord);
    region.add_extent(0x1000, 0x40, 2).unwrap();

    let entries: Vec<HeapEntry> = region.objects().collect();
    assert_eq!(entry_addresses(&entries), vec![0x1000, 0x1018]);
}

/// Test the zero-length arraylet probe when the next object starts at once
#[test]
fn test_empty_arraylet_followed_directly_by_object() {
    let mut snapshot = builder();
    snapshot
        .array(0x1000, BYTES, 0, ARRAYLET_FLAG)
        .object(0x1010, PLAIN_16, 0);
    let mut region = region(snapshot.build(), config(8, 16, 64), HeaderStyle::MultiWord);
    region.add_extent(0x1000, 0x40, 2).unwrap();

    let entries: Vec<HeapEntry> = region.objects().collect();
    assert_eq!(entry_addresses(&entries), vec![0x1000, 0x1010]);
}

/// Test that the last object of an extent is never probed
///
/// **Bug this finds:** Reads past the end of the snapshot for trailing empty arraylets
#[test]
fn test_empty_arraylet_last_in_extent() {
    let mut snapshot = builder();
    snapshot.array(0x11F0, BYTES, 0, ARRAYLET_FLAG);
    let mut region = region(snapshot.build(), config(8, 16, 64), HeaderStyle::MultiWord);
    region.add_extent(0x11F0, 0x10, 1).unwrap();

    let entries: Vec<HeapEntry> = region.objects().collect();
    assert_eq!(entries.len(), 1);
    assert!(!entries[0].is_corrupt());
}

/// ============================================================================
/// CONCURRENT WALKS
/// ============================================================================

/// Test independent walks of one region on several threads
#[test]
fn test_concurrent_walks() {
    let mut snapshot = builder();
    for i in 0..16u64 {
        snapshot.object(0x1000 + i * 0x10, PLAIN_16, 0);
    }
    let mut region = region(snapshot.build(), config(8, 16, 2048), HeaderStyle::MultiWord);
    region.add_extent(0x1000, 0x100, 16).unwrap();
    let region = Arc::new(region);

    let counts: Vec<usize> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let region = Arc::clone(&region);
                scope.spawn(move || region.objects().filter(|e| !e.is_corrupt()).count())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(counts, vec![16; 4]);
}
