//! Integration tests for fern-common crate.

use fern_common::{Arena, BytePos, Interner, LineIndex, Span};

#[test]
fn test_span_merge() {
    let a = Span::from_usize(10, 20);
    let b = Span::from_usize(15, 30);
    let merged = a.merge(b);
    assert_eq!(merged.start.0, 10);
    assert_eq!(merged.end.0, 30);
}

#[test]
fn test_span_range() {
    let span = Span::from_usize(5, 15);
    assert_eq!(span.range(), 5..15);
    assert_eq!(span.len(), 10);
    assert!(Span::from_usize(5, 5).is_empty());
}

#[test]
fn test_byte_pos_offset() {
    assert_eq!(BytePos(10).offset(5), BytePos(15));
}

#[test]
fn test_line_index() {
    let lines = LineIndex::new("program p\n  x = 1\nend\n");
    let pos = lines.line_col(BytePos(12));
    assert_eq!((pos.line, pos.col), (2, 3));
}

#[test]
fn test_intern() {
    let mut interner = Interner::new();
    let a = interner.intern("alpha");
    let b = interner.intern("beta");
    let c = interner.intern("alpha");

    assert_eq!(a, c);
    assert_ne!(a, b);
    assert_eq!(interner.get(a), "alpha");
    assert_eq!(interner.lookup("beta"), Some(b));
    assert_eq!(interner.lookup("gamma"), None);
    assert_eq!(interner.len(), 2);
}

// ============================================================================
// Arena
// ============================================================================

#[test]
fn test_handles_survive_growth() {
    let mut arena = Arena::new();
    let first = arena.alloc(String::from("first"));
    let handles: Vec<_> = (0..1000).map(|i| arena.alloc(i.to_string())).collect();

    assert_eq!(arena[first], "first");
    for (i, handle) in handles.iter().enumerate() {
        assert_eq!(arena[*handle], i.to_string());
    }
    assert_eq!(arena.len(), 1001);
    assert_eq!(arena.block_count(), 5);
}

#[test]
fn test_bytes_in_use_is_monotonic() {
    let mut arena = Arena::new();
    let mut last = arena.bytes_in_use();
    for i in 0..300u64 {
        arena.alloc(i);
        let now = arena.bytes_in_use();
        assert!(now > last);
        assert!(arena.bytes_reserved() >= now);
        last = now;
    }
}

#[test]
fn test_alloc_extend_is_contiguous() {
    let mut arena = Arena::new();
    arena.alloc(0u32);
    let range = arena.alloc_extend(1..=100u32);
    assert_eq!(range.len(), 100);
    let values: Vec<u32> = range.iter().map(|idx| arena[idx]).collect();
    assert_eq!(values, (1..=100).collect::<Vec<_>>());
}

#[test]
#[should_panic(expected = "internal compiler error")]
fn test_foreign_handle_is_fatal() {
    let mut a = Arena::new();
    let mut b = Arena::new();
    let handle = a.alloc(1u8);
    b.alloc(2u8);
    assert!(!b.contains(handle));
    b.get(handle);
}
