use core::fmt;

/// Failures raised while building a [`MemoryPool`](crate::MemoryPool).
///
/// Running out of room during `allocate` is not an error; it returns `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    /// `initial_size` was zero, or `max_size` was smaller than `initial_size`.
    InvalidArgument { initial_size: usize, max_size: usize },
    /// The host allocator could not reserve the initial chunk.
    ReserveFailed { size: usize },
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::InvalidArgument {
                initial_size,
                max_size,
            } => write!(
                f,
                "invalid pool sizes: initial {initial_size}, max {max_size} \
                 (initial must be > 0 and <= max)"
            ),
            PoolError::ReserveFailed { size } => {
                write!(f, "failed to reserve a chunk of {size} bytes")
            }
        }
    }
}

impl core::error::Error for PoolError {}
