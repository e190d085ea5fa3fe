use super::block::Block;
use super::chunk::Chunk;
use super::pool::PoolState;
use log::{debug, warn};

/// Tries to add a chunk big enough for a `requested`-byte allocation.
///
/// The new chunk is `min(2 * requested, headroom)` bytes, where headroom is
/// what is left below the configured maximum. Its single free block goes to
/// the tail of the table. Returns whether a chunk was added.
pub fn grow(state: &mut PoolState, requested: usize) -> bool {
    let headroom = state.max_capacity - state.total_capacity;
    if headroom == 0 {
        debug!("no headroom left to grow for {requested} bytes");
        return false;
    }

    let size = requested.saturating_mul(2).min(headroom);
    if size == 0 {
        return false;
    }

    let Some(chunk) = Chunk::reserve(size) else {
        warn!("host allocator refused a chunk of {size} bytes");
        return false;
    };

    let index = state.chunks.len();
    state.chunks.push(chunk);
    state.blocks.push_back(Block::free(index, 0, size));
    state.total_capacity += size;

    debug!(
        "added chunk {index} of {size} bytes, capacity {} of {}",
        state.total_capacity, state.max_capacity
    );

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn grows_by_twice_the_request() {
        let mut state = PoolState::new(64, 4096).unwrap();

        assert!(grow(&mut state, 100));
        assert_eq!(state.total_capacity, 64 + 200);
        assert_eq!(state.chunks.len(), 2);

        let (_, tail) = state.blocks.iter().last().unwrap();
        assert_eq!((tail.chunk, tail.offset, tail.len), (1, 0, 200));
        state.check_invariants();
    }

    #[test]
    fn growth_is_capped_by_headroom() {
        let mut state = PoolState::new(512, 1024).unwrap();

        assert!(grow(&mut state, 400));
        assert_eq!(state.total_capacity, 1024);

        assert!(!grow(&mut state, 1));
        assert_eq!(state.chunks.len(), 2);
    }

    #[test]
    fn zero_sized_request_does_not_grow() {
        let mut state = PoolState::new(64, 128).unwrap();

        assert!(!grow(&mut state, 0));
        assert_eq!(state.total_capacity, 64);
    }
}
