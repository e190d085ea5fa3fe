//! # rspool - a first-fit memory pool
//!
//! `rspool` hands out byte ranges with a caller-chosen size and alignment
//! from one or more pre-reserved chunks, without going through the global
//! allocator for each request.
//!
//! ```text
//!   chunk 0                                chunk 1 (added by growth)
//!   +------+----------+--------------+     +-----------+-----------+
//!   | used |   free   |     used     |     |   used    |   free    |
//!   +------+----------+--------------+     +-----------+-----------+
//!      ^        ^            ^                   ^           ^
//!      b0  ->   b1    ->     b2        ->        b3    ->    b4
//!
//!   The block table visits blocks in this order. Inside a chunk the order
//!   is address order, chunks follow each other in creation order.
//! ```
//!
//! Every public operation takes the pool's single lock for its whole
//! duration, including any growth triggered by an allocation.
//!
//! ```rust
//! use rspool::MemoryPool;
//!
//! let pool = MemoryPool::with_max_size(512, 1024).unwrap();
//!
//! let ptr = pool.allocate(128, 16).expect("fits in the first chunk");
//! assert_eq!(ptr.as_ptr() as usize % 16, 0);
//! assert_eq!(pool.used_size(), 128);
//!
//! pool.deallocate(Some(ptr));
//! assert!(pool.is_empty());
//! ```

extern crate alloc;

mod block;
mod chunk;
mod coalesce;
mod error;
mod growth;
mod placement;
mod pool;
mod spin_lock;
mod utils;

pub use error::PoolError;
pub use pool::{MemoryPool, PoolStats};
pub use spin_lock::{Guard, SpinLock};

/// A free remainder must be strictly larger than this to get its own block,
/// otherwise the whole block is handed out.
pub const MIN_SPLIT_BYTES: usize = 32;

/// Alignment used by [`MemoryPool::allocate_default`].
pub const DEFAULT_ALIGNMENT: usize = core::mem::size_of::<usize>();

/// Alignment of the first byte of every chunk.
pub const CHUNK_ALIGNMENT: usize = 64;
