use super::CHUNK_ALIGNMENT;
use alloc::alloc::{alloc, dealloc, Layout};
use core::ptr::NonNull;

/// One contiguous buffer backing part of the pool.
///
/// The buffer is never resized and is only released when the chunk drops.
pub struct Chunk {
    ptr: NonNull<u8>,
    layout: Layout,
}

// SAFETY: the chunk exclusively owns its buffer, nothing else aliases it.
unsafe impl Send for Chunk {}

impl Chunk {
    /// Reserves a buffer of `size` bytes aligned to `CHUNK_ALIGNMENT`.
    ///
    /// Returns `None` for a zero size, a size too large for a `Layout`, or
    /// when the host allocator refuses the request.
    pub fn reserve(size: usize) -> Option<Self> {
        if size == 0 {
            return None;
        }

        let layout = Layout::from_size_align(size, CHUNK_ALIGNMENT).ok()?;

        // SAFETY: the layout has a non-zero size
        let ptr = NonNull::new(unsafe { alloc(layout) })?;

        Some(Self { ptr, layout })
    }

    #[inline]
    pub fn start(&self) -> usize {
        self.ptr.as_ptr() as usize
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.start() + self.size()
    }

    #[inline(always)]
    pub fn size(&self) -> usize {
        self.layout.size()
    }

    #[inline]
    pub fn contains(&self, addr: usize) -> bool {
        self.start() <= addr && addr < self.end()
    }
}

impl Drop for Chunk {
    fn drop(&mut self) {
        // SAFETY: `ptr` came from `alloc` with this exact layout
        unsafe { dealloc(self.ptr.as_ptr(), self.layout) };
    }
}
