use super::block::BlockTable;
use log::debug;

/// Merges every run of adjacent free blocks in a single pass.
///
/// After a merge the surviving block is compared against its new successor
/// before moving on, so a run of any length collapses into one block. Blocks
/// of different chunks are never merged. Returns the number of merges.
pub fn coalesce(blocks: &mut BlockTable) -> usize {
    let mut merged = 0;
    let mut cursor = blocks.head();

    while let Some(id) = cursor {
        let current = *blocks.get(id);

        let mergeable = current.next().map(|next_id| {
            let next = blocks.get(next_id);
            // chunks are separate buffers, a merged block must stay inside one
            !current.used && !next.used && current.chunk == next.chunk
        });

        if mergeable == Some(true) {
            if let Some(next) = blocks.unlink_next(id) {
                debug_assert_eq!(current.offset + current.len, next.offset);
                blocks.get_mut(id).len += next.len;
                merged += 1;
            }
        } else {
            cursor = current.next();
        }
    }

    if merged > 0 {
        debug!("coalesced {merged} free blocks, {} left in table", blocks.len());
    }

    merged
}
