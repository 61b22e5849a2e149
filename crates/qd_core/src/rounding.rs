//! Integer-first share type and helpers.
//!
//! - A `Share` is an exact `num/den` over non-negative counts.
//! - Empty populations (`den == 0`) are a valid share worth exactly 0.
//! - Comparisons cross-multiply in `u128` (cannot overflow for `u64` counts).
//! - Percent formatting rounds half-to-even without float arithmetic.

use core::cmp::Ordering;
use core::fmt;

use serde::{Deserialize, Serialize};

/// Exact fraction of a population. Invariant: `num <= den` or `den == 0`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Share {
    pub num: u64,
    pub den: u64,
}

impl Share {
    /// The share of an empty or unrepresented cohort.
    pub const ZERO: Share = Share { num: 0, den: 0 };

    /// Build a share, clamping `num` into `0..=den`.
    ///
    /// A zero denominator yields `Share::ZERO` regardless of `num`.
    pub fn new(num: u64, den: u64) -> Self {
        if den == 0 {
            return Share::ZERO;
        }
        Share { num: num.min(den), den }
    }

    /// Float view in `[0, 1]`. Never NaN.
    pub fn value(&self) -> f64 {
        if self.den == 0 {
            0.0
        } else {
            self.num as f64 / self.den as f64
        }
    }

    /// Exact comparison of the represented values (`0/0` compares as 0).
    pub fn cmp_value(&self, other: &Share) -> Ordering {
        // x/0 is treated as 0/1 for comparison purposes.
        let (an, ad) = if self.den == 0 { (0u128, 1u128) } else { (self.num as u128, self.den as u128) };
        let (bn, bd) = if other.den == 0 { (0u128, 1u128) } else { (other.num as u128, other.den as u128) };
        (an * bd).cmp(&(bn * ad))
    }

    /// Percentage scaled by `10^decimals`, rounded half-to-even.
    ///
    /// `Share::new(2, 3).percent_scaled(1) == 667` (66.7%).
    pub fn percent_scaled(&self, decimals: u8) -> u64 {
        if self.den == 0 {
            return 0;
        }
        let scale = 100u128 * 10u128.pow(u32::from(decimals));
        let n = self.num as u128 * scale;
        let d = self.den as u128;
        let q = n / d;
        let r = n % d;
        let twice = r * 2;
        let rounded = match twice.cmp(&d) {
            Ordering::Less => q,
            Ordering::Greater => q + 1,
            Ordering::Equal => if q % 2 == 0 { q } else { q + 1 },
        };
        rounded as u64
    }

    /// Render as a percent string with a fixed number of decimals, e.g. `"66.7%"`.
    pub fn percent_string(&self, decimals: u8) -> String {
        let scaled = self.percent_scaled(decimals);
        if decimals == 0 {
            return format!("{scaled}%");
        }
        let unit = 10u64.pow(u32::from(decimals));
        format!(
            "{}.{:0width$}%",
            scaled / unit,
            scaled % unit,
            width = decimals as usize
        )
    }
}

impl fmt::Display for Share {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_denominator_is_zero() {
        let s = Share::new(5, 0);
        assert_eq!(s, Share::ZERO);
        assert_eq!(s.value(), 0.0);
        assert!(!s.value().is_nan());
    }

    #[test]
    fn numerator_is_clamped() {
        assert_eq!(Share::new(7, 3), Share { num: 3, den: 3 });
    }

    #[test]
    fn exact_compare_ignores_reduction() {
        assert_eq!(Share::new(2, 3).cmp_value(&Share::new(4, 6)), Ordering::Equal);
        assert_eq!(Share::new(1, 1).cmp_value(&Share::new(2, 3)), Ordering::Greater);
        assert_eq!(Share::ZERO.cmp_value(&Share::new(0, 9)), Ordering::Equal);
    }

    #[test]
    fn percent_rounds_half_even() {
        assert_eq!(Share::new(2, 3).percent_string(1), "66.7%");
        assert_eq!(Share::new(3, 5).percent_string(1), "60.0%");
        // 1/8 = 12.5% -> 12% at zero decimals (half to even)
        assert_eq!(Share::new(1, 8).percent_string(0), "12%");
        // 3/8 = 37.5% -> 38%
        assert_eq!(Share::new(3, 8).percent_string(0), "38%");
        assert_eq!(Share::ZERO.percent_string(2), "0.00%");
    }
}
