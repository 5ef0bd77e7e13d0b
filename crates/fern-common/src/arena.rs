//! Region allocator for tree nodes.
//!
//! An [`Arena`] owns every node of one kind for the lifetime of a compilation
//! unit. Nodes are never freed one by one; dropping the arena releases all of
//! them at once. Storage is a list of blocks whose capacities grow
//! geometrically. A full block is never reallocated, so a node never moves once
//! it has been allocated.
//!
//! Nodes are addressed by [`Idx`] handles instead of references. A handle
//! remembers which arena produced it, and using it with any other arena is an
//! internal compiler error. Handles from one compilation unit therefore
//! cannot leak into another.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};
use std::sync::atomic::{AtomicU32, Ordering};

use tracing::trace;

/// Capacity of the first block, in nodes.
const FIRST_BLOCK: usize = 64;

static NEXT_ARENA_TAG: AtomicU32 = AtomicU32::new(1);

/// A stable handle to a node stored in an [`Arena<T>`].
pub struct Idx<T> {
    raw: u32,
    arena: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Idx<T> {
    fn new(raw: u32, arena: u32) -> Self {
        Self {
            raw,
            arena,
            _marker: PhantomData,
        }
    }

    /// Position of the node in allocation order.
    pub fn index(self) -> usize {
        self.raw as usize
    }
}

impl<T> Clone for Idx<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Idx<T> {}

impl<T> PartialEq for Idx<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw && self.arena == other.arena
    }
}

impl<T> Eq for Idx<T> {}

impl<T> PartialOrd for Idx<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Idx<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.arena, self.raw).cmp(&(other.arena, other.raw))
    }
}

impl<T> Hash for Idx<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
        self.arena.hash(state);
    }
}

impl<T> fmt::Debug for Idx<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.raw)
    }
}

/// A contiguous run of handles produced by [`Arena::alloc_extend`].
pub struct IdxRange<T> {
    start: u32,
    len: u32,
    arena: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> IdxRange<T> {
    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = Idx<T>> + '_ {
        (self.start..self.start + self.len).map(|raw| Idx::new(raw, self.arena))
    }
}

impl<T> Clone for IdxRange<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for IdxRange<T> {}

impl<T> fmt::Debug for IdxRange<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}..#{}", self.start, self.start + self.len)
    }
}

struct Block<T> {
    /// Handle of the first node stored in this block.
    start: u32,
    nodes: Vec<T>,
}

impl<T> Block<T> {
    fn free(&self) -> usize {
        self.nodes.capacity() - self.nodes.len()
    }
}

/// A typed region allocator.
///
/// Single-threaded: an arena is moved between threads as a whole, never
/// shared while it is being mutated.
pub struct Arena<T> {
    tag: u32,
    blocks: Vec<Block<T>>,
    len: u32,
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            tag: NEXT_ARENA_TAG.fetch_add(1, Ordering::Relaxed),
            blocks: Vec::new(),
            len: 0,
        }
    }

    /// Create an arena whose first block holds `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut arena = Self::new();
        if capacity > 0 {
            arena.acquire_block(capacity);
        }
        arena
    }

    /// Move `value` into the arena and return its handle.
    pub fn alloc(&mut self, value: T) -> Idx<T> {
        self.reserve(1);
        self.push(value)
    }

    /// Make sure the next `additional` allocations land in one block.
    ///
    /// The current block is abandoned if it is too small; its unused tail is
    /// never handed out again.
    pub fn reserve(&mut self, additional: usize) {
        let free = self.blocks.last().map_or(0, Block::free);
        if free >= additional {
            return;
        }
        let next = self
            .blocks
            .last()
            .map_or(FIRST_BLOCK, |block| block.nodes.capacity().saturating_mul(2));
        self.acquire_block(next.max(additional));
    }

    /// Allocate every value of `values` into one contiguous run.
    pub fn alloc_extend<I>(&mut self, values: I) -> IdxRange<T>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let values = values.into_iter();
        self.reserve(values.len());
        let start = self.len;
        for value in values {
            self.push(value);
        }
        IdxRange {
            start,
            len: self.len - start,
            arena: self.tag,
            _marker: PhantomData,
        }
    }

    pub fn get(&self, idx: Idx<T>) -> &T {
        let (block, offset) = self.locate(idx);
        &self.blocks[block].nodes[offset]
    }

    pub fn get_mut(&mut self, idx: Idx<T>) -> &mut T {
        let (block, offset) = self.locate(idx);
        &mut self.blocks[block].nodes[offset]
    }

    /// Whether `idx` was produced by this arena.
    pub fn contains(&self, idx: Idx<T>) -> bool {
        idx.arena == self.tag && idx.raw < self.len
    }

    /// Iterate over all nodes in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (Idx<T>, &T)> + '_ {
        self.blocks.iter().flat_map(move |block| {
            block
                .nodes
                .iter()
                .enumerate()
                .map(move |(i, node)| (Idx::new(block.start + i as u32, self.tag), node))
        })
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bytes occupied by live nodes.
    pub fn bytes_in_use(&self) -> usize {
        self.len() * std::mem::size_of::<T>()
    }

    /// Bytes held by all blocks, including unused tails.
    pub fn bytes_reserved(&self) -> usize {
        self.blocks
            .iter()
            .map(|block| block.nodes.capacity() * std::mem::size_of::<T>())
            .sum()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    fn acquire_block(&mut self, capacity: usize) {
        trace!(
            capacity,
            bytes = capacity * std::mem::size_of::<T>(),
            blocks = self.blocks.len() + 1,
            "arena: acquiring block"
        );
        self.blocks.push(Block {
            start: self.len,
            nodes: Vec::with_capacity(capacity),
        });
    }

    fn push(&mut self, value: T) -> Idx<T> {
        let raw = self.len;
        let Some(len) = raw.checked_add(1) else {
            crate::ice!("arena exhausted after {raw} nodes");
        };
        match self.blocks.last_mut() {
            Some(block) => block.nodes.push(value),
            None => crate::ice!("arena has no block to allocate into"),
        }
        self.len = len;
        Idx::new(raw, self.tag)
    }

    fn locate(&self, idx: Idx<T>) -> (usize, usize) {
        if idx.arena != self.tag {
            crate::ice!(
                "handle {idx:?} from arena {} used with arena {}",
                idx.arena,
                self.tag
            );
        }
        if idx.raw >= self.len {
            crate::ice!("handle {idx:?} out of range for arena of {} nodes", self.len);
        }
        let block = self.blocks.partition_point(|block| block.start <= idx.raw) - 1;
        (block, (idx.raw - self.blocks[block].start) as usize)
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<Idx<T>> for Arena<T> {
    type Output = T;

    fn index(&self, idx: Idx<T>) -> &T {
        self.get(idx)
    }
}

impl<T> IndexMut<Idx<T>> for Arena<T> {
    fn index_mut(&mut self, idx: Idx<T>) -> &mut T {
        self.get_mut(idx)
    }
}

impl<T> fmt::Debug for Arena<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("len", &self.len)
            .field("blocks", &self.blocks.len())
            .field("bytes_in_use", &self.bytes_in_use())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_and_get() {
        let mut arena = Arena::new();
        let a = arena.alloc("a".to_string());
        let b = arena.alloc("b".to_string());
        assert_eq!(arena[a], "a");
        assert_eq!(arena[b], "b");
        assert_eq!(arena.len(), 2);
        assert_ne!(a, b);
    }

    #[test]
    fn test_handles_survive_growth() {
        let mut arena = Arena::new();
        let ids: Vec<_> = (0..1000u32).map(|i| arena.alloc(i)).collect();
        for (i, id) in ids.iter().enumerate() {
            assert_eq!(arena[*id], i as u32);
        }
        // 64 + 128 + 256 + 512 + 1024
        assert_eq!(arena.block_count(), 5);
    }

    #[test]
    fn test_blocks_grow_geometrically() {
        let mut arena: Arena<u64> = Arena::new();
        for i in 0..(FIRST_BLOCK as u64 + 1) {
            arena.alloc(i);
        }
        assert_eq!(arena.block_count(), 2);
        assert!(arena.bytes_reserved() >= 3 * FIRST_BLOCK * 8);
    }

    #[test]
    fn test_bytes_in_use() {
        let mut arena: Arena<u64> = Arena::new();
        assert_eq!(arena.bytes_in_use(), 0);
        arena.alloc(1);
        arena.alloc(2);
        assert_eq!(arena.bytes_in_use(), 16);
        assert!(arena.bytes_reserved() >= arena.bytes_in_use());
    }

    #[test]
    fn test_alloc_extend_is_contiguous() {
        let mut arena = Arena::new();
        arena.alloc(0u32);
        let run = arena.alloc_extend(1..=500u32);
        assert_eq!(run.len(), 500);
        let ids: Vec<_> = run.iter().collect();
        for pair in ids.windows(2) {
            assert_eq!(pair[0].index() + 1, pair[1].index());
        }
        assert_eq!(arena[ids[499]], 500);
    }

    #[test]
    fn test_get_mut_overwrites_in_place() {
        let mut arena = Arena::new();
        let id = arena.alloc(1);
        arena[id] = 7;
        assert_eq!(*arena.get(id), 7);
    }

    #[test]
    fn test_iter_in_allocation_order() {
        let mut arena = Arena::new();
        for i in 0..200 {
            arena.alloc(i);
        }
        let values: Vec<_> = arena.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, (0..200).collect::<Vec<_>>());
    }

    #[test]
    #[should_panic(expected = "internal compiler error")]
    fn test_foreign_handle_aborts() {
        let mut first = Arena::new();
        let second: Arena<i32> = Arena::new();
        let id = first.alloc(1);
        let _ = second.get(id);
    }

    #[test]
    fn test_contains() {
        let mut first = Arena::new();
        let second: Arena<i32> = Arena::new();
        let id = first.alloc(1);
        assert!(first.contains(id));
        assert!(!second.contains(id));
    }
}
