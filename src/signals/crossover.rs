// =============================================================================
// Crossover signals
// =============================================================================
//
//   state_i = 1 if fast_i > slow_i else 0      (undefined if either is)
//
//   state_{i-1} = 0 -> state_i = 1   => Buy   (golden cross)
//   state_{i-1} = 1 -> state_i = 0   => Sell  (death cross)
//   unchanged                        => Hold
//
// No signal at all where state_i or state_{i-1} is undefined, so the first
// bar with enough history never fires merely because the lines happen to be
// ordered already.
// =============================================================================

use crate::types::Signal;

/// Binary "fast above slow" state for each index.
pub fn crossover_state(fast: &[Option<f64>], slow: &[Option<f64>]) -> Vec<Option<bool>> {
    fast.iter()
        .zip(slow)
        .map(|(f, s)| Some((*f)? > (*s)?))
        .collect()
}

/// Crossover signals for `fast` against `slow`, aligned with the shorter input.
pub fn crossover_signals(fast: &[Option<f64>], slow: &[Option<f64>]) -> Vec<Option<Signal>> {
    let state = crossover_state(fast, slow);

    (0..state.len())
        .map(|i| {
            let prev = state[i.checked_sub(1)?]?;
            let curr = state[i]?;
            Some(match (prev, curr) {
                (false, true) => Signal::Buy,
                (true, false) => Signal::Sell,
                _ => Signal::Hold,
            })
        })
        .collect()
}
