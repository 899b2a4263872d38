/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Integer helpers shared by the hyperperiod and frame-size analyses.

use super::HyperperiodError;

/// Iterative Euclidean GCD.  `gcd(0, n) == n`.
pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Checked LCM of two positive periods.
///
/// Divides before multiplying; the remaining multiplication is checked and
/// reported as [`HyperperiodError::Overflow`].
pub fn lcm(a: u64, b: u64) -> Result<u64, HyperperiodError> {
    if a == 0 || b == 0 {
        return Ok(0);
    }
    (a / gcd(a, b))
        .checked_mul(b)
        .ok_or(HyperperiodError::Overflow { a, b })
}

/// LCM of every value in `periods`; `Ok(1)` for an empty slice (the neutral
/// element, so callers must reject empty input themselves).
pub fn lcm_of_slice(periods: &[u64]) -> Result<u64, HyperperiodError> {
    periods.iter().try_fold(1u64, |acc, &p| lcm(acc, p))
}

/// All divisors of `n` in ascending order.  Empty for `n == 0`.
pub fn divisors(n: u64) -> Vec<u64> {
    let mut low = Vec::new();
    let mut high = Vec::new();
    let mut d = 1u64;
    while d.saturating_mul(d) <= n {
        if n % d == 0 {
            low.push(d);
            if d != n / d {
                high.push(n / d);
            }
        }
        d += 1;
    }
    low.extend(high.into_iter().rev());
    low
}
