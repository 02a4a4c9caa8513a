//! # Money
//!
//! Integer arithmetic for rupee amounts. One [`Money`] is a signed
//! count of paise, the smallest unit the till ever records.
//!
//! ## No Floats, Ever
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │  f64:    0.1 + 0.2 == 0.30000000000000004            │
//! │  paise:   10 +  20 == 30                             │
//! │                                                      │
//! │  ₹10 split three ways is 333 paise a head with one   │
//! │  paisa left over. Integers make the leftover a fact  │
//! │  the code must place; floats smear it away.          │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kirana_core::money::Money;
//!
//! let rice = Money::from_paise(9500);
//! let two_bags = rice * 2i64;
//! assert_eq!(two_bags.paise(), 19000);
//! assert_eq!(two_bags.to_string(), "₹190.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::types::TaxRate;

// =============================================================================
// Money
// =============================================================================

/// A rupee amount stored as a signed count of paise.
///
/// Negative values are legal (adjustments, reversals). Ordering and
/// equality follow the raw paise count, and serde sees a bare integer.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Money(i64);

impl Money {
    /// Wraps a raw paise count.
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Builds an amount from whole rupees plus a paise remainder.
    ///
    /// The sign lives on the rupee part: `from_rupees(-5, 50)` is
    /// -₹5.50, not -₹4.50.
    ///
    /// ```rust
    /// use kirana_core::money::Money;
    ///
    /// assert_eq!(Money::from_rupees(10, 99).paise(), 1099);
    /// assert_eq!(Money::from_rupees(-5, 50).paise(), -550);
    /// ```
    #[inline]
    pub const fn from_rupees(rupees: i64, paise: i64) -> Self {
        let minor = if rupees < 0 { -paise } else { paise };
        Money(rupees * 100 + minor)
    }

    /// Raw paise count.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Whole-rupee part, truncated toward zero: ₹10.99 gives 10,
    /// -₹5.50 gives -5.
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Paise remainder below the rupee, always 0 to 99.
    #[inline]
    pub const fn paise_part(&self) -> i64 {
        self.0.abs() % 100
    }

    /// The zero amount.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Magnitude with the sign stripped.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// `true` when the amount lands exactly on a rupee.
    ///
    /// Change due must satisfy this: the drawer holds no unit smaller
    /// than the ₹1 note.
    #[inline]
    pub const fn is_whole_rupees(&self) -> bool {
        self.0 % 100 == 0
    }

    /// Tax owed on this amount at `rate`, rounded half-up to the paisa.
    ///
    /// The product is widened to i128 so a large bill times a large
    /// rate cannot overflow. Adding half the divisor before dividing
    /// performs the rounding: `(paise × bps + 5000) / 10000`.
    ///
    /// ```rust
    /// use kirana_core::money::Money;
    /// use kirana_core::types::TaxRate;
    ///
    /// // ₹10.00 at 12.5% GST
    /// let tax = Money::from_paise(1000).calculate_tax(TaxRate::from_bps(1250));
    /// assert_eq!(tax.paise(), 125);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        let scaled = self.0 as i128 * rate.bps() as i128;
        Money(((scaled + 5000) / 10000) as i64)
    }

    /// Nearest whole rupee, half-up, away from zero for negatives.
    ///
    /// Grand totals pass through here so the counter quotes figures
    /// the drawer can pay: 50 paise and up becomes the next rupee,
    /// 49 and below drops off.
    ///
    /// ```rust
    /// use kirana_core::money::Money;
    ///
    /// assert_eq!(Money::from_paise(22750).round_to_rupee().paise(), 22800);
    /// assert_eq!(Money::from_paise(22749).round_to_rupee().paise(), 22700);
    /// ```
    pub const fn round_to_rupee(&self) -> Money {
        let whole = ((self.0.abs() + 50) / 100) * 100;
        if self.0 < 0 {
            Money(-whole)
        } else {
            Money(whole)
        }
    }

    /// Unit price times a line quantity.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Operators & Formatting
// =============================================================================

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0 * i64::from(qty))
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

/// Receipt-style rendering: `₹10.99`, `-₹5.50`.
///
/// Output only. Nothing parses this back.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 0 {
            write!(f, "-₹{}.{:02}", self.rupees().abs(), self.paise_part())
        } else {
            write!(f, "₹{}.{:02}", self.rupees(), self.paise_part())
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paise_round_trip_and_parts() {
        let salt = Money::from_paise(2800);
        assert_eq!(salt.paise(), 2800);
        assert_eq!(salt.rupees(), 28);
        assert_eq!(salt.paise_part(), 0);

        let odd = Money::from_paise(1099);
        assert_eq!(odd.rupees(), 10);
        assert_eq!(odd.paise_part(), 99);
    }

    #[test]
    fn test_from_rupees_carries_sign_to_paise() {
        assert_eq!(Money::from_rupees(10, 99).paise(), 1099);
        assert_eq!(Money::from_rupees(-5, 50).paise(), -550);
        assert_eq!(Money::from_rupees(0, 75).paise(), 75);
    }

    #[test]
    fn test_display_matches_receipt_format() {
        assert_eq!(Money::from_paise(1099).to_string(), "₹10.99");
        assert_eq!(Money::from_paise(500).to_string(), "₹5.00");
        assert_eq!(Money::from_paise(-550).to_string(), "-₹5.50");
        assert_eq!(Money::zero().to_string(), "₹0.00");
    }

    #[test]
    fn test_operators() {
        let a = Money::from_paise(9500);
        let b = Money::from_paise(2800);

        assert_eq!((a + b).paise(), 12300);
        assert_eq!((a - b).paise(), 6700);
        assert_eq!((a * 3i64).paise(), 28500);
        assert_eq!((b * 2i64).paise(), 5600);

        let mut acc = Money::zero();
        acc += a;
        acc -= b;
        assert_eq!(acc.paise(), 6700);
    }

    #[test]
    fn test_tax_even_rate() {
        let rate = TaxRate::from_bps(1000);
        assert_eq!(Money::from_paise(1000).calculate_tax(rate).paise(), 100);
    }

    #[test]
    fn test_tax_rounds_half_up_at_the_paisa() {
        // ₹10.50 at 5% is 52.5 paise, which rounds to 53
        assert_eq!(
            Money::from_paise(1050)
                .calculate_tax(TaxRate::from_bps(500))
                .paise(),
            53
        );

        // ₹33.33 at 18% is 599.94 paise, which rounds to 600
        assert_eq!(
            Money::from_paise(3333)
                .calculate_tax(TaxRate::from_bps(1800))
                .paise(),
            600
        );
    }

    #[test]
    fn test_round_to_rupee_boundaries() {
        assert_eq!(Money::from_paise(22750).round_to_rupee().paise(), 22800);
        assert_eq!(Money::from_paise(22749).round_to_rupee().paise(), 22700);
        assert_eq!(Money::from_paise(22751).round_to_rupee().paise(), 22800);
        assert_eq!(Money::from_paise(22700).round_to_rupee().paise(), 22700);
        assert_eq!(Money::zero().round_to_rupee().paise(), 0);
    }

    #[test]
    fn test_round_to_rupee_negative_goes_away_from_zero() {
        assert_eq!(Money::from_paise(-150).round_to_rupee().paise(), -200);
        assert_eq!(Money::from_paise(-149).round_to_rupee().paise(), -100);
    }

    #[test]
    fn test_whole_rupee_predicate() {
        assert!(Money::from_paise(2800).is_whole_rupees());
        assert!(Money::zero().is_whole_rupees());
        assert!(!Money::from_paise(2850).is_whole_rupees());
    }

    #[test]
    fn test_sign_predicates() {
        assert!(Money::zero().is_zero());
        assert!(!Money::zero().is_positive());
        assert!(Money::from_paise(1).is_positive());
        assert!(Money::from_paise(-1).is_negative());
        assert_eq!(Money::from_paise(-550).abs().paise(), 550);
        assert_eq!(Money::default(), Money::zero());
    }

    #[test]
    fn test_multiply_quantity_scales_paise() {
        assert_eq!(Money::from_paise(1550).multiply_quantity(3).paise(), 4650);
    }

    #[test]
    fn test_three_way_split_leaves_a_visible_paisa() {
        // 1000 paise split three ways truncates to 333 each. The books
        // must show the leftover paisa, not absorb it.
        let share = Money::from_paise(1000 / 3);
        let rebuilt = share * 3i64;
        assert_eq!(rebuilt.paise(), 999);
        assert_eq!((Money::from_paise(1000) - rebuilt).paise(), 1);
    }
}
