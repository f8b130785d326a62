//! Running-balance arithmetic for the stock ledger
//!
//! The backend keeps `current_quantity`, `average_price` and `status` cached on
//! the item row and updates them in the same transaction as each movement. The
//! rules for those updates live here so that they can be checked without a
//! database, and so that the cache can be verified by folding the movement log.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::DomainError;
use crate::models::{MovementType, StockStatus};
use crate::validation::{validate_quantity, STORED_SCALE};

/// Decimal places kept on `average_price`
pub const PRICE_SCALE: u32 = STORED_SCALE;

/// A unit price only carries cost information when it is strictly positive.
pub fn cost_bearing(unit_price: Option<Decimal>) -> Option<Decimal> {
    unit_price.filter(|p| *p > Decimal::ZERO)
}

/// Weighted-average unit cost after receiving `quantity` at `unit_price`.
///
/// When the resulting balance is zero the incoming price is taken as-is.
pub fn weighted_average(
    old_quantity: Decimal,
    old_average: Decimal,
    quantity: Decimal,
    unit_price: Decimal,
) -> Decimal {
    let new_quantity = old_quantity + quantity;
    if new_quantity.is_zero() {
        return unit_price;
    }
    let value = old_quantity * old_average + quantity * unit_price;
    (value / new_quantity).round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Status change caused by one movement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusTransition {
    pub previous: StockStatus,
    pub current: StockStatus,
}

impl StatusTransition {
    pub fn new(previous: StockStatus, current: StockStatus) -> Self {
        Self { previous, current }
    }

    pub fn changed(&self) -> bool {
        self.previous != self.current
    }

    /// Edge-triggered: only a change into a non-normal status raises an alert.
    pub fn fires_low_stock_alert(&self) -> bool {
        self.changed() && self.current != StockStatus::Normal
    }
}

/// The cached balance columns of one stock item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Balance {
    pub quantity: Decimal,
    pub average_price: Decimal,
    pub min_quantity: Decimal,
    pub status: StockStatus,
}

impl Balance {
    pub fn new(quantity: Decimal, average_price: Decimal, min_quantity: Decimal) -> Self {
        Self {
            quantity,
            average_price,
            min_quantity,
            status: StockStatus::derive(quantity, min_quantity),
        }
    }

    /// Apply one movement, returning the status transition it caused.
    ///
    /// Exits that exceed the balance leave it untouched.
    pub fn apply(
        &mut self,
        movement_type: MovementType,
        quantity: Decimal,
        unit_price: Option<Decimal>,
    ) -> Result<StatusTransition, DomainError> {
        validate_quantity(quantity)?;

        match movement_type {
            MovementType::Entry => {
                if let Some(price) = cost_bearing(unit_price) {
                    self.average_price =
                        weighted_average(self.quantity, self.average_price, quantity, price);
                }
            }
            MovementType::Exit => {
                if quantity > self.quantity {
                    return Err(DomainError::InsufficientStock {
                        requested: quantity,
                        available: self.quantity,
                    });
                }
            }
        }

        self.quantity += movement_type.signed(quantity);
        Ok(self.settle_status())
    }

    /// Recompute status from the current quantity
    pub fn settle_status(&mut self) -> StatusTransition {
        let previous = self.status;
        self.status = StockStatus::derive(self.quantity, self.min_quantity);
        StatusTransition::new(previous, self.status)
    }
}

/// Balance implied by a movement log
pub fn fold_movements<I>(movements: I) -> Decimal
where
    I: IntoIterator<Item = (MovementType, Decimal)>,
{
    movements
        .into_iter()
        .fold(Decimal::ZERO, |acc, (kind, quantity)| acc + kind.signed(quantity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_first_priced_entry_sets_average() {
        assert_eq!(weighted_average(dec!(0), dec!(0), dec!(100), dec!(5)), dec!(5.0000));
    }

    #[test]
    fn test_purchase_on_existing_balance() {
        // (20*5 + 200*6) / 220 = 5.909090...
        assert_eq!(weighted_average(dec!(20), dec!(5), dec!(200), dec!(6)), dec!(5.9091));
    }

    #[test]
    fn test_zero_denominator_takes_incoming_price() {
        assert_eq!(weighted_average(dec!(-3), dec!(2), dec!(3), dec!(7)), dec!(7));
    }

    #[test]
    fn test_unpriced_entry_keeps_average() {
        let mut balance = Balance::new(dec!(10), dec!(4), dec!(0));
        balance.apply(MovementType::Entry, dec!(10), None).unwrap();
        assert_eq!(balance.average_price, dec!(4));
        balance.apply(MovementType::Entry, dec!(10), Some(dec!(0))).unwrap();
        assert_eq!(balance.average_price, dec!(4));
        assert_eq!(balance.quantity, dec!(30));
    }

    #[test]
    fn test_status_derivation() {
        assert_eq!(StockStatus::derive(dec!(0), dec!(10)), StockStatus::OutOfStock);
        assert_eq!(StockStatus::derive(dec!(10), dec!(10)), StockStatus::Critical);
        assert_eq!(StockStatus::derive(dec!(10.01), dec!(10)), StockStatus::Normal);
    }

    #[test]
    fn test_alert_fires_once_per_crossing() {
        let mut balance = Balance::new(dec!(100), dec!(5), dec!(20));

        let t1 = balance.apply(MovementType::Exit, dec!(80), None).unwrap();
        assert!(t1.fires_low_stock_alert());

        let t2 = balance.apply(MovementType::Exit, dec!(5), None).unwrap();
        assert_eq!(t2.current, StockStatus::Critical);
        assert!(!t2.fires_low_stock_alert());

        let t3 = balance.apply(MovementType::Exit, dec!(15), None).unwrap();
        assert_eq!(t3.current, StockStatus::OutOfStock);
        assert!(t3.fires_low_stock_alert());

        let t4 = balance.apply(MovementType::Entry, dec!(50), None).unwrap();
        assert_eq!(t4.current, StockStatus::Normal);
        assert!(!t4.fires_low_stock_alert());
    }

    #[test]
    fn test_overdraft_leaves_balance_untouched() {
        let mut balance = Balance::new(dec!(20), dec!(5), dec!(10));
        let err = balance.apply(MovementType::Exit, dec!(50), None).unwrap_err();
        assert_eq!(
            err,
            DomainError::InsufficientStock {
                requested: dec!(50),
                available: dec!(20)
            }
        );
        assert_eq!(balance.quantity, dec!(20));
        assert_eq!(balance.status, StockStatus::Critical);
    }

    #[test]
    fn test_fold_movements() {
        let log = vec![
            (MovementType::Entry, dec!(100)),
            (MovementType::Exit, dec!(80)),
            (MovementType::Entry, dec!(200)),
        ];
        assert_eq!(fold_movements(log), dec!(220));
    }
}
