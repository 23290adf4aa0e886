//! Money validation using rust_decimal for precision
//!
//! Prices travel as `f64` in the documents; every comparison happens on
//! `Decimal` rounded to 2 places.

use rust_decimal::prelude::*;
use shared::{AppError, ErrorCode};

use crate::db::models::{OrderCreate, OrderItemInput};

/// Rounding for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed unit price
const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per line item
const MAX_QUANTITY: i32 = 9999;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

fn rounded(value: f64) -> Decimal {
    to_decimal(value).round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Compare two monetary values at 2-decimal precision
pub fn money_eq(a: f64, b: f64) -> bool {
    rounded(a) == rounded(b)
}

fn require_finite(value: f64, field: &str) -> Result<(), AppError> {
    if !value.is_finite() {
        return Err(AppError::validation(format!(
            "{} must be a finite number, got {}",
            field, value
        )));
    }
    Ok(())
}

fn require_non_negative(value: f64, field: &str) -> Result<(), AppError> {
    require_finite(value, field)?;
    if value < 0.0 {
        return Err(AppError::validation(format!(
            "{} must be non-negative, got {}",
            field, value
        )));
    }
    Ok(())
}

/// Validate the line items of a checkout request
pub fn validate_line_items(items: &[OrderItemInput]) -> Result<(), AppError> {
    if items.is_empty() {
        return Err(AppError::new(ErrorCode::EmptyOrder));
    }

    for item in items {
        require_non_negative(item.price, "price")?;
        if item.price > MAX_PRICE {
            return Err(AppError::validation(format!(
                "price exceeds maximum allowed ({}), got {}",
                MAX_PRICE, item.price
            )));
        }
        if item.quantity <= 0 || item.quantity > MAX_QUANTITY {
            return Err(AppError::validation(format!(
                "quantity must be between 1 and {}, got {}",
                MAX_QUANTITY, item.quantity
            )));
        }
    }

    Ok(())
}

/// Validate that the supplied totals add up:
/// `items_price + tax_price + shipping_price == total_price`
///
/// 价格字段由客户端计算，等式在入口校验
pub fn validate_order_totals(payload: &OrderCreate) -> Result<(), AppError> {
    require_non_negative(payload.items_price, "items_price")?;
    require_non_negative(payload.tax_price, "tax_price")?;
    require_non_negative(payload.shipping_price, "shipping_price")?;
    require_non_negative(payload.total_price, "total_price")?;

    let expected = rounded(payload.items_price)
        + rounded(payload.tax_price)
        + rounded(payload.shipping_price);

    if expected != rounded(payload.total_price) {
        return Err(AppError::new(ErrorCode::PriceMismatch)
            .with_detail("expected", to_f64(expected))
            .with_detail("supplied", payload.total_price));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{PaymentInfo, PaymentStatus, ShippingInfo};

    fn payload(items_price: f64, tax: f64, shipping: f64, total: f64) -> OrderCreate {
        OrderCreate {
            items: vec![OrderItemInput {
                product: "product:p1".to_string(),
                name: "Swift 14".to_string(),
                price: items_price,
                quantity: 1,
                image: None,
            }],
            shipping: ShippingInfo {
                address: "1 Main St".to_string(),
                city: "Springfield".to_string(),
                postal_code: "12345".to_string(),
                country: "US".to_string(),
                phone: "555-0100".to_string(),
            },
            items_price,
            tax_price: tax,
            shipping_price: shipping,
            total_price: total,
            payment: PaymentInfo {
                method: "card".to_string(),
                status: PaymentStatus::Pending,
            },
        }
    }

    #[test]
    fn test_totals_add_up() {
        assert!(validate_order_totals(&payload(999.0, 99.9, 15.0, 1113.9)).is_ok());
    }

    #[test]
    fn test_totals_mismatch_rejected() {
        let err = validate_order_totals(&payload(999.0, 99.9, 15.0, 1100.0)).unwrap_err();
        assert_eq!(err.code, ErrorCode::PriceMismatch);
    }

    #[test]
    fn test_totals_float_noise_tolerated() {
        // 0.1 + 0.2 style accumulation noise must not fail the equality
        let total = 0.1_f64 + 0.2_f64; // 0.30000000000000004
        assert!(validate_order_totals(&payload(0.1, 0.2, 0.0, total)).is_ok());
        assert!(validate_order_totals(&payload(0.1, 0.2, 0.0, 0.3)).is_ok());
    }

    #[test]
    fn test_negative_component_rejected() {
        assert!(validate_order_totals(&payload(-1.0, 1.0, 0.0, 0.0)).is_err());
    }

    #[test]
    fn test_nan_rejected() {
        assert!(validate_order_totals(&payload(f64::NAN, 0.0, 0.0, 0.0)).is_err());
    }

    #[test]
    fn test_empty_items_rejected() {
        let err = validate_line_items(&[]).unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyOrder);
    }

    #[test]
    fn test_bad_quantity_rejected() {
        let mut p = payload(10.0, 0.0, 0.0, 10.0);
        p.items[0].quantity = 0;
        assert!(validate_line_items(&p.items).is_err());

        p.items[0].quantity = 10_000;
        assert!(validate_line_items(&p.items).is_err());

        p.items[0].quantity = 9999;
        assert!(validate_line_items(&p.items).is_ok());
    }

    #[test]
    fn test_money_eq() {
        assert!(money_eq(100.0, 100.0));
        assert!(money_eq(100.004, 100.0)); // Rounds to the same cent
        assert!(!money_eq(100.0, 100.02));
    }
}
