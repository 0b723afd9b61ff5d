use serde::{Deserialize, Serialize};

use crate::domain::cart::CartLine;

/// All amounts are integer minor currency units (cents). Floating point
/// never enters the computation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceBreakdown {
    pub subtotal_cents: i64,
    pub shipping_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
}

impl PriceBreakdown {
    pub fn zero() -> Self {
        Self {
            subtotal_cents: 0,
            shipping_cents: 0,
            discount_cents: 0,
            total_cents: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShippingPolicy {
    pub flat_fee_cents: i64,
    pub free_threshold_cents: i64,
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self {
            flat_fee_cents: 499,
            free_threshold_cents: 5000,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum DiscountPolicy {
    #[default]
    None,
    Flat {
        amount_cents: i64,
    },
    Percent {
        percent: u8,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PricingPolicy {
    pub shipping: ShippingPolicy,
    pub discount: DiscountPolicy,
}

/// Price a set of cart lines. Pure: same lines and policy, same breakdown.
///
/// Shipping is waived once the subtotal reaches the free threshold. The
/// discount is clamped to `[0, subtotal]`, so the total can never go
/// negative. An empty line set prices to all zeroes.
pub fn compute_breakdown(lines: &[CartLine], policy: &PricingPolicy) -> PriceBreakdown {
    if lines.is_empty() {
        return PriceBreakdown::zero();
    }

    let subtotal_cents: i64 = lines
        .iter()
        .map(|l| l.unit_price_cents * i64::from(l.quantity))
        .sum();

    let shipping_cents = if subtotal_cents >= policy.shipping.free_threshold_cents {
        0
    } else {
        policy.shipping.flat_fee_cents
    };

    let raw_discount = match policy.discount {
        DiscountPolicy::None => 0,
        DiscountPolicy::Flat { amount_cents } => amount_cents,
        DiscountPolicy::Percent { percent } => {
            subtotal_cents * i64::from(percent.min(100)) / 100
        }
    };
    let discount_cents = raw_discount.clamp(0, subtotal_cents);

    PriceBreakdown {
        subtotal_cents,
        shipping_cents,
        discount_cents,
        total_cents: subtotal_cents + shipping_cents - discount_cents,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(unit_price_cents: i64, quantity: u32) -> CartLine {
        CartLine {
            product_id: "p1".into(),
            name: "Widget".into(),
            unit_price_cents,
            image_ref: None,
            quantity,
        }
    }

    #[test]
    fn flat_shipping_below_threshold() {
        let breakdown = compute_breakdown(&[line(1000, 2)], &PricingPolicy::default());
        assert_eq!(breakdown.subtotal_cents, 2000);
        assert_eq!(breakdown.shipping_cents, 499);
        assert_eq!(breakdown.discount_cents, 0);
        assert_eq!(breakdown.total_cents, 2499);
    }

    #[test]
    fn free_shipping_at_threshold() {
        let breakdown = compute_breakdown(&[line(1000, 6)], &PricingPolicy::default());
        assert_eq!(breakdown.subtotal_cents, 6000);
        assert_eq!(breakdown.shipping_cents, 0);
        assert_eq!(breakdown.total_cents, 6000);
    }

    #[test]
    fn threshold_boundary_is_inclusive() {
        let policy = PricingPolicy::default();
        let at = compute_breakdown(&[line(5000, 1)], &policy);
        assert_eq!(at.shipping_cents, 0);

        let just_below = compute_breakdown(&[line(4999, 1)], &policy);
        assert_eq!(just_below.shipping_cents, 499);
    }

    #[test]
    fn flat_discount_clamped_to_subtotal() {
        let policy = PricingPolicy {
            discount: DiscountPolicy::Flat { amount_cents: 9000 },
            ..PricingPolicy::default()
        };
        let breakdown = compute_breakdown(&[line(1000, 2)], &policy);
        assert_eq!(breakdown.discount_cents, 2000);
        assert_eq!(breakdown.total_cents, 499);
        assert!(breakdown.total_cents >= 0);
    }

    #[test]
    fn negative_flat_discount_is_ignored() {
        let policy = PricingPolicy {
            discount: DiscountPolicy::Flat { amount_cents: -500 },
            ..PricingPolicy::default()
        };
        let breakdown = compute_breakdown(&[line(1000, 1)], &policy);
        assert_eq!(breakdown.discount_cents, 0);
        assert_eq!(breakdown.total_cents, 1499);
    }

    #[test]
    fn percent_discount_rounds_down() {
        let policy = PricingPolicy {
            discount: DiscountPolicy::Percent { percent: 10 },
            ..PricingPolicy::default()
        };
        let breakdown = compute_breakdown(&[line(333, 3)], &policy);
        assert_eq!(breakdown.subtotal_cents, 999);
        assert_eq!(breakdown.discount_cents, 99);
        assert_eq!(breakdown.total_cents, 999 + 499 - 99);
    }

    #[test]
    fn empty_lines_price_to_zero() {
        let breakdown = compute_breakdown(&[], &PricingPolicy::default());
        assert_eq!(breakdown, PriceBreakdown::zero());
    }

    #[test]
    fn deterministic_for_identical_input() {
        let lines = [line(1250, 2), line(400, 1)];
        let policy = PricingPolicy {
            discount: DiscountPolicy::Percent { percent: 25 },
            ..PricingPolicy::default()
        };
        assert_eq!(
            compute_breakdown(&lines, &policy),
            compute_breakdown(&lines, &policy)
        );
    }
}
