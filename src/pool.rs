use super::block::{Block, BlockTable};
use super::chunk::Chunk;
use super::coalesce::coalesce;
use super::growth::grow;
use super::placement::place;
use super::utils::{align_forward, is_power_of_two};
use super::{PoolError, SpinLock, DEFAULT_ALIGNMENT};
use alloc::vec;
use alloc::vec::Vec;
use core::alloc::{GlobalAlloc, Layout};
use core::ptr::{self, NonNull};
use log::{debug, trace, warn};

/// Everything guarded by the pool's lock.
pub struct PoolState {
    pub chunks: Vec<Chunk>,
    pub blocks: BlockTable,
    pub total_capacity: usize,
    pub max_capacity: usize,
}

impl PoolState {
    pub fn new(initial_size: usize, max_size: usize) -> Result<Self, PoolError> {
        if initial_size == 0 || max_size < initial_size {
            return Err(PoolError::InvalidArgument {
                initial_size,
                max_size,
            });
        }

        let chunk = Chunk::reserve(initial_size)
            .ok_or(PoolError::ReserveFailed { size: initial_size })?;

        let mut blocks = BlockTable::new();
        blocks.push_back(Block::free(0, 0, initial_size));

        Ok(Self {
            chunks: vec![chunk],
            blocks,
            total_capacity: initial_size,
            max_capacity: max_size,
        })
    }

    #[inline]
    pub fn block_start(&self, block: &Block) -> usize {
        self.chunks[block.chunk].start() + block.offset
    }

    pub fn allocate(&mut self, size: usize, align: usize) -> Option<NonNull<u8>> {
        if size == 0 {
            return None;
        }

        if let Some(ptr) = place(self, size, align) {
            return Some(ptr);
        }

        // one growth attempt, then one more scan over the whole table
        if grow(self, size) {
            if let Some(ptr) = place(self, size, align) {
                return Some(ptr);
            }
        }

        coalesce(&mut self.blocks);
        debug!("no block fits {size} bytes (align {align})");

        None
    }

    pub fn deallocate(&mut self, ptr: NonNull<u8>) {
        let addr = ptr.as_ptr() as usize;

        if !self.chunks.iter().any(|chunk| chunk.contains(addr)) {
            trace!("ignored release of foreign pointer {addr:#x}");
            return;
        }

        let found = self.blocks.iter().find_map(|(id, block)| {
            let issued = align_forward(self.block_start(block), block.align)?;
            (block.used && issued == addr).then_some(id)
        });

        match found {
            Some(id) => {
                self.blocks.get_mut(id).used = false;
                trace!("released block {id} at {addr:#x}");
                coalesce(&mut self.blocks);
            }
            None => trace!("ignored release of unknown pointer {addr:#x}"),
        }
    }

    pub fn used_size(&self) -> usize {
        self.blocks
            .iter()
            .filter(|(_, block)| block.used)
            .map(|(_, block)| block.len)
            .sum()
    }

    /// Asserts that the blocks of every chunk tile it exactly and that the
    /// capacity counters are consistent.
    #[cfg(test)]
    pub fn check_invariants(&self) {
        let mut covered = vec![0usize; self.chunks.len()];

        for (_, block) in self.blocks.iter() {
            assert!(block.chunk < self.chunks.len());
            assert_eq!(
                block.offset, covered[block.chunk],
                "gap or overlap in chunk {}",
                block.chunk
            );
            assert!(block.len > 0);
            covered[block.chunk] += block.len;
        }

        for (chunk, covered) in self.chunks.iter().zip(covered) {
            assert_eq!(chunk.size(), covered);
        }

        let total: usize = self.chunks.iter().map(Chunk::size).sum();
        assert_eq!(total, self.total_capacity);
        assert!(self.used_size() <= self.total_capacity);
        assert!(self.total_capacity <= self.max_capacity);
    }
}

/// A point-in-time view of a pool's bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub used: usize,
    pub free: usize,
    pub total_capacity: usize,
    pub max_capacity: usize,
    pub blocks: usize,
    pub chunks: usize,
}

/// A thread-safe first-fit memory pool.
///
/// All operations go through one lock, so concurrent callers share the pool
/// by reference and are served one at a time.
pub struct MemoryPool {
    state: SpinLock<PoolState>,
}

impl MemoryPool {
    /// Builds a fixed pool of `initial_size` bytes that never grows.
    pub fn new(initial_size: usize) -> Result<Self, PoolError> {
        Self::with_max_size(initial_size, initial_size)
    }

    /// Builds a pool of `initial_size` bytes that may grow up to `max_size`.
    ///
    /// Fails with [`PoolError::InvalidArgument`] if `initial_size` is zero
    /// or `max_size` is smaller than `initial_size`.
    pub fn with_max_size(initial_size: usize, max_size: usize) -> Result<Self, PoolError> {
        let state = PoolState::new(initial_size, max_size)?;
        debug!("created pool of {initial_size} bytes, max {max_size}");

        Ok(Self {
            state: SpinLock::new(state),
        })
    }

    /// Reserves `size` bytes aligned to `alignment`.
    ///
    /// Returns `None` for a zero size, or when neither the current chunks nor
    /// a new one can hold the request. An `alignment` of zero or one that is
    /// not a power of two (such as 24) is rejected the same way.
    pub fn allocate(&self, size: usize, alignment: usize) -> Option<NonNull<u8>> {
        if !is_power_of_two(alignment) {
            warn!("rejected allocation with alignment {alignment}");
            return None;
        }

        self.state.lock().allocate(size, alignment)
    }

    pub fn allocate_default(&self, size: usize) -> Option<NonNull<u8>> {
        self.allocate(size, DEFAULT_ALIGNMENT)
    }

    pub fn allocate_layout(&self, layout: Layout) -> Option<NonNull<u8>> {
        self.allocate(layout.size(), layout.align())
    }

    /// Returns a pointer from [`allocate`](Self::allocate) to the pool.
    ///
    /// `None`, pointers the pool did not issue and pointers already released
    /// are ignored.
    pub fn deallocate(&self, ptr: Option<NonNull<u8>>) {
        if let Some(ptr) = ptr {
            self.state.lock().deallocate(ptr);
        }
    }

    pub fn used_size(&self) -> usize {
        self.state.lock().used_size()
    }

    pub fn free_size(&self) -> usize {
        let state = self.state.lock();
        state.total_capacity - state.used_size()
    }

    pub fn max_size(&self) -> usize {
        self.state.lock().max_capacity
    }

    pub fn total_capacity(&self) -> usize {
        self.state.lock().total_capacity
    }

    pub fn is_empty(&self) -> bool {
        self.used_size() == 0
    }

    pub fn stats(&self) -> PoolStats {
        let state = self.state.lock();
        let used = state.used_size();

        PoolStats {
            used,
            free: state.total_capacity - used,
            total_capacity: state.total_capacity,
            max_capacity: state.max_capacity,
            blocks: state.blocks.len(),
            chunks: state.chunks.len(),
        }
    }
}

/// Lets a pool serve `Layout`-based requests.
///
/// The pool cannot be the `#[global_allocator]`: its chunks and block table
/// come from the global heap.
unsafe impl GlobalAlloc for MemoryPool {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        self.allocate_layout(layout).map_or(ptr::null_mut(), NonNull::as_ptr)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, _layout: Layout) {
        self.deallocate(NonNull::new(ptr));
    }
}
