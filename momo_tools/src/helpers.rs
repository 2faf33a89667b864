use mpg_common::{Usd, Vnd};

use crate::data_objects::MIN_TRANSACTION_AMOUNT;

/// Converts an order total into the amount actually charged through the gateway:
/// whole dong, rounded up, and never below MoMo's minimum transaction amount.
pub fn settlement_amount(total: Usd, rate: i64) -> Vnd {
    total.to_vnd(rate).max(MIN_TRANSACTION_AMOUNT)
}

#[cfg(test)]
mod test {
    use mpg_common::VND_PER_USD;

    use super::*;

    #[test]
    fn settlement_is_ceil_of_converted_total() {
        // $2.00 → 50,000₫, comfortably above the minimum
        assert_eq!(settlement_amount(Usd::from_cents(200), VND_PER_USD), Vnd::from(50_000));
        // 7 cents at 333₫/$ = 23.31₫ → ceil 24₫, then clamped up to the minimum
        assert_eq!(settlement_amount(Usd::from_cents(7), 333), Vnd::from(1000));
    }

    #[test]
    fn tiny_totals_clamp_to_gateway_minimum() {
        assert_eq!(settlement_amount(Usd::from_cents(1), VND_PER_USD), Vnd::from(1000));
        assert_eq!(settlement_amount(Usd::from_cents(0), VND_PER_USD), Vnd::from(1000));
        // 3.99$ = 99,750₫: untouched by the clamp
        assert_eq!(settlement_amount(Usd::from_cents(399), VND_PER_USD), Vnd::from(99_750));
    }

    #[test]
    fn settlement_is_max_of_minimum_and_ceiling() {
        for cents in [0, 1, 3, 99, 100, 2500, 999_999] {
            let total = Usd::from_cents(cents);
            let expected = total.to_vnd(VND_PER_USD).value().max(1000);
            assert_eq!(settlement_amount(total, VND_PER_USD).value(), expected);
        }
    }
}
