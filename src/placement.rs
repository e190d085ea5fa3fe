use super::block::{Block, BlockId, BlockTable};
use super::pool::PoolState;
use super::utils::align_forward;
use super::MIN_SPLIT_BYTES;
use core::ptr::NonNull;
use log::trace;

/// A free block that can hold a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fit {
    pub id: BlockId,
    /// Aligned address handed back to the caller.
    pub addr: usize,
    /// Padding plus requested size.
    pub required: usize,
}

// iterates the table and finds the first free block with enough space
pub fn find_first(state: &PoolState, size: usize, align: usize) -> Option<Fit> {
    for (id, block) in state.blocks.iter() {
        if block.used {
            continue;
        }

        let start = state.block_start(block);
        let Some(addr) = align_forward(start, align) else {
            continue;
        };
        let Some(required) = size.checked_add(addr - start) else {
            continue;
        };

        if block.len >= required {
            return Some(Fit { id, addr, required });
        }
    }

    None
}

/// Shrinks block `id` to `required` bytes when the remainder is worth its own
/// descriptor, returning the id of the new free remainder.
pub fn split(blocks: &mut BlockTable, id: BlockId, required: usize) -> Option<BlockId> {
    let block = blocks.get(id);
    let remaining = block.len - required;

    if remaining <= MIN_SPLIT_BYTES {
        return None;
    }

    let remainder = Block::free(block.chunk, block.offset + required, remaining);
    blocks.get_mut(id).len = required;

    Some(blocks.insert_after(id, remainder))
}

/// Runs one first-fit scan and commits the placement if a block fits.
pub fn place(state: &mut PoolState, size: usize, align: usize) -> Option<NonNull<u8>> {
    let fit = find_first(state, size, align)?;

    if let Some(remainder) = split(&mut state.blocks, fit.id, fit.required) {
        trace!(
            "split block {} at {} bytes, remainder is block {}",
            fit.id,
            fit.required,
            remainder
        );
    }

    let block = state.blocks.get_mut(fit.id);
    block.used = true;
    block.align = align;

    trace!(
        "placed {size} bytes (align {align}) in block {} at {:#x}",
        fit.id,
        fit.addr
    );

    NonNull::new(fit.addr as *mut u8)
}
