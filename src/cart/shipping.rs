use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

/// Two-tier flat-rate shipping: free above a threshold, otherwise a local rate
/// for one designated city and a national rate for every other destination.
#[derive(Debug, Clone, PartialEq)]
pub struct ShippingPolicy {
    pub free_shipping_threshold: Decimal,
    pub local_city: String,
    pub local_rate: Decimal,
    pub national_rate: Decimal,
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self {
            free_shipping_threshold: Decimal::from(250_000),
            local_city: "Cali".to_string(),
            local_rate: Decimal::from(5_000),
            national_rate: Decimal::from(16_000),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ShippingStatus {
    Free,
    Local,
    National,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShippingQuote {
    /// Subtotal reached the free-shipping threshold.
    Free,
    Local(Decimal),
    National(Decimal),
    /// No destination yet. Counts as zero in displayed totals but cannot be checked out.
    Pending,
}

impl ShippingQuote {
    pub fn amount(&self) -> Decimal {
        match self {
            ShippingQuote::Free | ShippingQuote::Pending => Decimal::ZERO,
            ShippingQuote::Local(rate) | ShippingQuote::National(rate) => *rate,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ShippingQuote::Pending)
    }

    pub fn status(&self) -> ShippingStatus {
        match self {
            ShippingQuote::Free => ShippingStatus::Free,
            ShippingQuote::Local(_) => ShippingStatus::Local,
            ShippingQuote::National(_) => ShippingStatus::National,
            ShippingQuote::Pending => ShippingStatus::Pending,
        }
    }
}

impl ShippingPolicy {
    pub fn quote(&self, city: Option<&str>, subtotal: Decimal) -> ShippingQuote {
        if subtotal >= self.free_shipping_threshold {
            return ShippingQuote::Free;
        }
        let Some(city) = city.map(str::trim).filter(|c| !c.is_empty()) else {
            return ShippingQuote::Pending;
        };
        if city.to_lowercase() == self.local_city.trim().to_lowercase() {
            ShippingQuote::Local(self.local_rate)
        } else {
            ShippingQuote::National(self.national_rate)
        }
    }

    pub fn cost(&self, city: Option<&str>, subtotal: Decimal) -> Decimal {
        self.quote(city, subtotal).amount()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cop(v: i64) -> Decimal {
        Decimal::from(v)
    }

    #[test]
    fn local_city_matches_case_insensitively() {
        let policy = ShippingPolicy::default();
        assert_eq!(policy.cost(Some("Cali"), cop(100_000)), cop(5_000));
        assert_eq!(policy.cost(Some("cali"), cop(100_000)), cop(5_000));
        assert_eq!(policy.cost(Some("  CALI "), cop(100_000)), cop(5_000));
    }

    #[test]
    fn other_cities_pay_national_rate() {
        let policy = ShippingPolicy::default();
        assert_eq!(policy.cost(Some("Bogota"), cop(100_000)), cop(16_000));
        assert_eq!(
            policy.quote(Some("Medellin"), cop(1)),
            ShippingQuote::National(cop(16_000))
        );
    }

    #[test]
    fn threshold_makes_shipping_free_regardless_of_city() {
        let policy = ShippingPolicy::default();
        for city in [None, Some(""), Some("Cali"), Some("Bogota")] {
            assert_eq!(policy.quote(city, cop(250_000)), ShippingQuote::Free);
            assert_eq!(policy.cost(city, cop(900_000)), Decimal::ZERO);
        }
        assert_eq!(policy.cost(Some("Cali"), cop(249_999)), cop(5_000));
    }

    #[test]
    fn unset_city_is_pending_and_costs_nothing() {
        let policy = ShippingPolicy::default();
        let quote = policy.quote(Some("   "), cop(100_000));
        assert!(quote.is_pending());
        assert_eq!(quote.amount(), Decimal::ZERO);
        assert!(policy.quote(None, cop(10)).is_pending());
    }

    #[test]
    fn configured_policy_is_honored() {
        let policy = ShippingPolicy {
            free_shipping_threshold: cop(100),
            local_city: "Palmira".into(),
            local_rate: cop(3),
            national_rate: cop(9),
        };
        assert_eq!(policy.cost(Some("palmira"), cop(50)), cop(3));
        assert_eq!(policy.cost(Some("Cali"), cop(50)), cop(9));
        assert_eq!(policy.cost(Some("Cali"), cop(100)), Decimal::ZERO);
    }
}
