//! Confirm-bar filter.
//!
//! `true` at bar t only if the raw condition held on each of the trailing
//! `confirm` bars, t included. Equivalent to casting to {0,1}, taking a
//! rolling sum over `confirm` bars and testing it equals `confirm`.
//! `confirm <= 1` passes the condition through unchanged.

pub fn confirm_bars(cond: &[bool], confirm: usize) -> Vec<bool> {
    if confirm <= 1 {
        return cond.to_vec();
    }

    let mut result = vec![false; cond.len()];
    let mut run = 0usize;
    for (i, &c) in cond.iter().enumerate() {
        run = if c { run + 1 } else { 0 };
        result[i] = run >= confirm;
    }
    result
}
