//! Exact-sum division of an amount into integer-cent shares.
//!
//! Every function here returns shares that add up to the input amount exactly.
//! Leftover cents are handed out one at a time, earliest slot first, so the
//! same input always produces the same split.

use crate::money::Money;

/// Splits `total` into `count` shares that differ by at most one cent.
///
/// The first `total % count` shares carry the extra cent. `count == 0` yields
/// an empty vector.
pub fn equal_split(total: Money, count: usize) -> Vec<Money> {
    if count == 0 {
        return Vec::new();
    }

    let total = total.floor_zero().cents();
    let slots = count as i64;
    let base = total / slots;
    let remainder = (total - base * slots) as usize;

    (0..count)
        .map(|idx| {
            let mut share = base;
            if idx < remainder {
                share += 1;
            }
            Money::from_cents(share)
        })
        .collect()
}

/// [`equal_split`] keyed by member.
pub fn split_evenly<T: Copy>(total: Money, members: &[T]) -> Vec<(T, Money)> {
    members
        .iter()
        .copied()
        .zip(equal_split(total, members.len()))
        .collect()
}

/// Splits `total` in proportion to `weights` using largest remainders.
///
/// Each share starts at `floor(total * w / sum(w))`; the cents lost to flooring
/// go to the largest fractional parts, earliest slot first on ties. Negative
/// weights count as zero. When every weight is zero the split is equal.
pub fn prorate(total: Money, weights: &[Money]) -> Vec<Money> {
    if weights.is_empty() {
        return Vec::new();
    }

    let total = i128::from(total.floor_zero().cents());
    let weights: Vec<i128> = weights
        .iter()
        .map(|weight| i128::from(weight.floor_zero().cents()))
        .collect();
    let weight_sum: i128 = weights.iter().sum();
    if weight_sum == 0 {
        return equal_split(Money::from_cents(total as i64), weights.len());
    }

    let mut shares = Vec::with_capacity(weights.len());
    let mut remainders = Vec::with_capacity(weights.len());
    for (idx, weight) in weights.iter().enumerate() {
        let numerator = total * weight;
        shares.push(numerator / weight_sum);
        remainders.push((idx, numerator % weight_sum));
    }

    let leftover = (total - shares.iter().sum::<i128>()) as usize;
    remainders.sort_by(|(idx_a, rem_a), (idx_b, rem_b)| {
        rem_b.cmp(rem_a).then_with(|| idx_a.cmp(idx_b))
    });
    for (idx, _) in remainders.into_iter().take(leftover) {
        shares[idx] += 1;
    }

    shares
        .into_iter()
        .map(|share| Money::from_cents(share as i64))
        .collect()
}
