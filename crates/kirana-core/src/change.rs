//! # Change Module
//!
//! Greedy change making against the cash drawer.
//!
//! ## How Change Is Made
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Greedy Drawer Walk                                  │
//! │                                                                         │
//! │  Change due: ₹87      Drawer: 500×5  200×5  50×5  20×5  10×5  5×5  1×5  │
//! │                                                                         │
//! │  500: 87/500 = 0                 → skip                                 │
//! │  200: 87/200 = 0                 → skip                                 │
//! │   50: 87/50  = 1, have 5 → use 1 → remaining 37                         │
//! │   20: 37/20  = 1, have 5 → use 1 → remaining 17                         │
//! │   10: 17/10  = 1, have 5 → use 1 → remaining  7                         │
//! │    5:  7/5   = 1, have 5 → use 1 → remaining  2                         │
//! │    1:  2/1   = 2, have 5 → use 2 → remaining  0  ✓ done                 │
//! │                                                                         │
//! │  Result: {50:1, 20:1, 10:1, 5:1, 1:2}                                   │
//! │                                                                         │
//! │  remaining > 0 after the walk ⇒ ChangeNotAvailable (nothing is          │
//! │  mutated anywhere - this function is pure)                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why Greedy?
//! The drawer holds the standard rupee note set, for which largest-first
//! is exact whenever the stock allows any answer at all. With arbitrary
//! denomination sets greedy can miss combinations a full search would
//! find; that trade is accepted for a counter that has to answer
//! instantly. See `test_greedy_is_not_a_solver` below.
//!
//! Deciding what to DO about infeasible change (reject the sale, or
//! record it with change owed) is the billing service's policy, not this
//! module's.

use crate::error::{CoreError, CoreResult};
use crate::types::{ChangeBreakdown, Denomination};

// =============================================================================
// Change Maker
// =============================================================================

/// Computes a change breakdown from the drawer's current counts.
///
/// Pure: looks at a snapshot of the drawer, never mutates it. The
/// checkout transaction applies the breakdown with guarded decrements
/// afterwards.
pub struct ChangeMaker;

impl ChangeMaker {
    /// Makes change for `amount` whole rupees from `denominations`.
    ///
    /// ## Arguments
    /// * `amount` - Change due in whole rupees. Must be non-negative.
    /// * `denominations` - Drawer snapshot, sorted descending by value.
    ///   The repository reads it in this order; it is the caller's
    ///   contract to keep it that way.
    ///
    /// ## Returns
    /// * `Ok(breakdown)` - with `breakdown.total_value()` equal to the
    ///   amount. An amount of zero yields an empty breakdown.
    /// * `Err(CoreError::ChangeNotAvailable)` - the drawer cannot compose
    ///   the amount; `short_by` is what remained after the walk.
    ///
    /// ## Example
    /// ```rust
    /// use kirana_core::change::ChangeMaker;
    /// use kirana_core::types::Denomination;
    ///
    /// let drawer = vec![
    ///     Denomination::new(50, 5),
    ///     Denomination::new(20, 5),
    ///     Denomination::new(10, 5),
    ///     Denomination::new(5, 5),
    ///     Denomination::new(1, 5),
    /// ];
    ///
    /// let breakdown = ChangeMaker::make_change(87, &drawer).unwrap();
    /// assert_eq!(breakdown.count_for(50), 1);
    /// assert_eq!(breakdown.count_for(1), 2);
    /// ```
    pub fn make_change(amount: i64, denominations: &[Denomination]) -> CoreResult<ChangeBreakdown> {
        debug_assert!(amount >= 0, "change amount must be non-negative");
        debug_assert!(
            denominations.windows(2).all(|w| w[0].value >= w[1].value),
            "denominations must be sorted descending by value"
        );

        let mut breakdown = ChangeBreakdown::new();
        if amount <= 0 {
            return Ok(breakdown);
        }

        let mut remaining = amount;
        for denom in denominations {
            if remaining == 0 {
                break;
            }
            if denom.value <= 0 || denom.available_count <= 0 {
                continue;
            }

            // Largest-first: take as many of this note as the amount
            // needs, capped by what the drawer actually holds.
            let needed = remaining / denom.value;
            let take = needed.min(denom.available_count);
            if take > 0 {
                breakdown.add(denom.value, take);
                remaining -= denom.value * take;
            }
        }

        if remaining > 0 {
            return Err(CoreError::ChangeNotAvailable {
                amount,
                short_by: remaining,
            });
        }

        Ok(breakdown)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
