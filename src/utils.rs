pub fn is_power_of_two(x: usize) -> bool {
    x != 0 && (x & (x - 1)) == 0
}

/// Rounds `addr` up to the next multiple of `alignment`.
///
/// Returns `None` when the rounded address does not fit in a `usize`.
pub fn align_forward(addr: usize, alignment: usize) -> Option<usize> {
    assert!(is_power_of_two(alignment));

    // Same as (addr % alignment) but faster as 'alignment' is a power of two
    let modulo = addr & (alignment - 1);

    if modulo == 0 {
        Some(addr)
    } else {
        addr.checked_add(alignment - modulo)
    }
}
