//! Even division of a cent amount.

use tripsplit_shared::types::Money;

/// Splits `total` into `count` parts that sum to `total` exactly.
///
/// Every part receives `floor(total / count)` cents; the leftover cents go one
/// each to the leading parts, so `100.00 / 3` yields `[33.34, 33.33, 33.33]`.
/// Returns an empty vector when `count` is zero.
#[must_use]
pub fn allocate_equal(total: Money, count: usize) -> Vec<Money> {
    if count == 0 {
        return Vec::new();
    }

    let Ok(divisor) = i64::try_from(count) else {
        return Vec::new();
    };

    let cents = total.cents();
    let base = cents.div_euclid(divisor);
    let remainder = cents.rem_euclid(divisor);

    (0..divisor)
        .map(|i| {
            if i < remainder {
                Money::from_cents(base + 1)
            } else {
                Money::from_cents(base)
            }
        })
        .collect()
}
