//! Distinct random index selection for DE mutation.

use rand::Rng;

/// Picks `count` distinct indices from `0..pool_size`, none equal to
/// `exclude`, uniformly without replacement.
///
/// Draws by rejection: `count` is tiny (3 for rand/1 mutation) relative to
/// any valid pool, so repeats are rare and the loop terminates quickly.
pub(crate) fn distinct_indices<R: Rng + ?Sized>(
    exclude: usize,
    count: usize,
    pool_size: usize,
    rng: &mut R,
) -> Vec<usize> {
    debug_assert!(count <= pool_size.saturating_sub(1));
    let mut out = Vec::with_capacity(count);
    while out.len() < count {
        let idx = rng.random_range(0..pool_size);
        if idx != exclude && !out.contains(&idx) {
            out.push(idx);
        }
    }
    out
}
