//! Input validation for ledger and workflow operations

use rust_decimal::Decimal;

use crate::error::DomainError;

/// Decimal places the ledger stores for quantities and prices
pub const STORED_SCALE: u32 = 4;

/// Quantities moved, requested or delivered must be positive.
pub fn validate_quantity(quantity: Decimal) -> Result<(), DomainError> {
    validate_positive("quantity", quantity)
}

/// Purchase completion requires a real price.
pub fn validate_unit_price(unit_price: Decimal) -> Result<(), DomainError> {
    validate_positive("unit_price", unit_price)
}

/// An optional price may be absent or zero ("no cost information") but never negative.
pub fn validate_optional_unit_price(unit_price: Option<Decimal>) -> Result<(), DomainError> {
    match unit_price {
        Some(price) if price < Decimal::ZERO => Err(DomainError::Negative { field: "unit_price" }),
        Some(price) => validate_scale("unit_price", price),
        None => Ok(()),
    }
}

pub fn validate_positive(field: &'static str, value: Decimal) -> Result<(), DomainError> {
    if value <= Decimal::ZERO {
        return Err(DomainError::NonPositive { field });
    }
    validate_scale(field, value)
}

/// Values must be storable without rounding; trailing zeros do not count.
pub fn validate_scale(field: &'static str, value: Decimal) -> Result<(), DomainError> {
    if value.normalize().scale() > STORED_SCALE {
        return Err(DomainError::TooPrecise {
            field,
            max_scale: STORED_SCALE,
        });
    }
    Ok(())
}

/// Trim free text, mapping blank input to `None`
pub fn normalize_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(Decimal::from(3)).is_ok());
        assert!(validate_quantity(Decimal::new(1, 3)).is_ok());
        assert_eq!(
            validate_quantity(Decimal::ZERO),
            Err(DomainError::NonPositive { field: "quantity" })
        );
        assert!(validate_quantity(Decimal::from(-1)).is_err());
    }

    #[test]
    fn test_more_than_four_places_rejected() {
        let too_precise = DomainError::TooPrecise {
            field: "quantity",
            max_scale: 4,
        };
        assert_eq!(validate_quantity(Decimal::new(100005, 5)), Err(too_precise.clone()));
        assert_eq!(validate_quantity(Decimal::new(4, 5)), Err(too_precise));
        assert!(validate_quantity(Decimal::new(10001, 4)).is_ok());
        // 1.50000 is 1.5
        assert!(validate_quantity(Decimal::new(150000, 5)).is_ok());

        assert!(validate_unit_price(Decimal::new(599999, 5)).is_err());
        assert!(matches!(
            validate_optional_unit_price(Some(Decimal::new(1, 6))),
            Err(DomainError::TooPrecise { field: "unit_price", .. })
        ));
    }

    #[test]
    fn test_validate_unit_price() {
        assert!(validate_unit_price(Decimal::from(6)).is_ok());
        assert!(validate_unit_price(Decimal::ZERO).is_err());
    }

    #[test]
    fn test_optional_price_allows_zero() {
        assert!(validate_optional_unit_price(None).is_ok());
        assert!(validate_optional_unit_price(Some(Decimal::ZERO)).is_ok());
        assert_eq!(
            validate_optional_unit_price(Some(Decimal::from(-2))),
            Err(DomainError::Negative { field: "unit_price" })
        );
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text(Some("  ok ".into())), Some("ok".to_string()));
        assert_eq!(normalize_text(Some("   ".into())), None);
        assert_eq!(normalize_text(None), None);
    }
}
