//! Quantity scaling
//!
//! Turns per-unit nutrition into the totals for a logged quantity and
//! produces the quantity-decorated display name.

use crate::models::Nutrition;

/// Quantity used when none (or an invalid one) was entered
pub const DEFAULT_QUANTITY: f64 = 1.0;

/// Scale per-unit nutrition by a serving quantity
///
/// `quantity` must already be validated (positive); see
/// [`crate::input::coerce_quantity`].
pub fn scale_by_quantity(base: &Nutrition, quantity: f64) -> Nutrition {
    base.scale(quantity)
}

/// Whether a quantity is exactly one serving
pub fn is_single_serving(quantity: f64) -> bool {
    quantity == DEFAULT_QUANTITY
}

/// Float noise tolerated when deciding an amount is whole
const WHOLE_EPSILON: f64 = 1e-9;

/// Format an amount with one decimal place, or none for whole numbers
///
/// Only a whole value drops its decimals, so a fractional value that rounds
/// to a whole number keeps them: `2.0 -> "2"`, `1.5 -> "1.5"`,
/// `0.96 -> "1.0"`, `33.33 -> "33.3"`.
pub fn format_amount(value: f64) -> String {
    if (value - value.round()).abs() < WHOLE_EPSILON {
        format!("{:.0}", value.round())
    } else {
        format!("{:.1}", value)
    }
}

/// Display name for a logged entry
///
/// A quantity of one leaves the name unchanged; anything else is prefixed
/// with `"{quantity} × "`.
pub fn decorate_name(name: &str, quantity: f64) -> String {
    if is_single_serving(quantity) {
        name.to_string()
    } else {
        format!("{} × {}", format_amount(quantity), name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_serving_name_unchanged() {
        assert_eq!(decorate_name("Chicken", 1.0), "Chicken");
    }

    #[test]
    fn test_whole_quantity_has_no_decimals() {
        assert_eq!(decorate_name("Chicken", 2.0), "2 × Chicken");
        assert_eq!(decorate_name("Rice", 10.0), "10 × Rice");
    }

    #[test]
    fn test_fractional_quantity_has_one_decimal() {
        assert_eq!(decorate_name("Chicken", 1.5), "1.5 × Chicken");
        assert_eq!(decorate_name("Chicken", 0.5), "0.5 × Chicken");
        assert_eq!(decorate_name("Oatmeal", 2.5), "2.5 × Oatmeal");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(2.0), "2");
        assert_eq!(format_amount(1400.0), "1400");
        assert_eq!(format_amount(33.333), "33.3");
        assert_eq!(format_amount(1399.9999999999998), "1400");
    }

    #[test]
    fn test_near_whole_quantity_keeps_decimal() {
        assert_eq!(decorate_name("Chicken", 0.96), "1.0 × Chicken");
        assert_eq!(decorate_name("Chicken", 1.04), "1.0 × Chicken");
        assert_eq!(decorate_name("Chicken", 0.04), "0.0 × Chicken");
        assert_eq!(decorate_name("Chicken", 1.0), "Chicken");
    }

    #[test]
    fn test_scale_by_quantity() {
        let base = Nutrition {
            calories: 100.0,
            protein: 4.0,
            carbohydrates: 20.0,
            fat: 2.0,
            sugar: 1.0,
            fiber: 3.0,
        };
        let total = scale_by_quantity(&base, 2.5);
        assert!((total.calories - 250.0).abs() < 1e-9);
        assert!((total.fiber - 7.5).abs() < 1e-9);
    }
}
