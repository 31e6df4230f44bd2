use crate::models::Availability;

/// Category values that mean "no category restriction".
const ALL_SENTINELS: [&str; 2] = ["all", "todas"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AvailabilityFilter {
    #[default]
    All,
    Only(Availability),
}

impl AvailabilityFilter {
    /// Unknown values fall back to [`AvailabilityFilter::All`].
    pub fn parse(value: &str) -> Self {
        Availability::parse(value)
            .map(AvailabilityFilter::Only)
            .unwrap_or_default()
    }
}

/// Sanitized catalog filters. Build from untrusted input with [`ProductFilters::from_raw`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilters {
    pub category: Option<String>,
    pub on_offer_only: bool,
    pub availability: AvailabilityFilter,
    pub limit: Option<u64>,
    pub product_id: Option<i64>,
}

impl ProductFilters {
    pub fn from_raw(
        category: Option<&str>,
        on_offer: Option<&str>,
        availability: Option<&str>,
        limit: Option<&str>,
    ) -> Self {
        Self {
            category: category.and_then(parse_category),
            on_offer_only: on_offer.is_some_and(parse_flag),
            availability: availability
                .map(AvailabilityFilter::parse)
                .unwrap_or_default(),
            limit: limit.and_then(parse_limit),
            product_id: None,
        }
    }

    pub fn by_id(product_id: i64) -> Self {
        Self {
            product_id: Some(product_id),
            limit: Some(1),
            ..Self::default()
        }
    }
}

fn parse_category(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || ALL_SENTINELS.iter().any(|s| value.eq_ignore_ascii_case(s)) {
        None
    } else {
        Some(value.to_string())
    }
}

pub(crate) fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "si" | "sí" | "on"
    )
}

/// Non-numeric, zero or negative limits mean "no limit".
fn parse_limit(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok().filter(|l| *l > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_category_means_no_restriction() {
        assert_eq!(
            ProductFilters::from_raw(Some("todas"), None, None, None),
            ProductFilters::default()
        );
        assert_eq!(
            ProductFilters::from_raw(Some("ALL"), None, None, None),
            ProductFilters::default()
        );
        assert_eq!(
            ProductFilters::from_raw(Some("  "), None, None, None).category,
            None
        );
        assert_eq!(
            ProductFilters::from_raw(Some("camisetas"), None, None, None).category,
            Some("camisetas".to_string())
        );
    }

    #[test]
    fn malformed_limit_is_dropped() {
        for raw in ["abc", "-3", "0", "1.5", ""] {
            assert_eq!(
                ProductFilters::from_raw(None, None, None, Some(raw)).limit,
                None,
                "limit {raw:?}"
            );
        }
        assert_eq!(
            ProductFilters::from_raw(None, None, None, Some(" 12 ")).limit,
            Some(12)
        );
    }

    #[test]
    fn availability_values() {
        let parse = |v| ProductFilters::from_raw(None, None, Some(v), None).availability;
        assert_eq!(parse("agotado"), AvailabilityFilter::Only(Availability::SoldOut));
        assert_eq!(
            parse("disponible"),
            AvailabilityFilter::Only(Availability::Available)
        );
        assert_eq!(parse("todas"), AvailabilityFilter::All);
        assert_eq!(parse("whatever"), AvailabilityFilter::All);
    }

    #[test]
    fn offer_flag_accepts_common_truthy_values() {
        for raw in ["1", "true", "TRUE", "si"] {
            assert!(ProductFilters::from_raw(None, Some(raw), None, None).on_offer_only);
        }
        for raw in ["0", "false", "nope", ""] {
            assert!(!ProductFilters::from_raw(None, Some(raw), None, None).on_offer_only);
        }
    }
}
