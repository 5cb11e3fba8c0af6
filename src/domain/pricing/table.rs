//! Day-range pricing tables.
//!
//! Tables are read from product metadata in one of two shapes:
//!
//! - ACF-style keys: `price_1_2_days = "20"`, `price_3_6_days = "15"`,
//!   `price_7_plus_days = "10"`.
//! - A `pricing_tiers` entry holding a JSON array (or a JSON string of one) of
//!   `{"min_days": 1, "max_days": 2, "price": "20"}` objects; `max_days` may be
//!   omitted or null for an open-ended tier.
//!
//! Both shapes may be present; explicit tiers from `pricing_tiers` come first.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::catalog::{Bike, MetaEntry};
use crate::domain::foundation::Money;

const TIERS_META_KEY: &str = "pricing_tiers";

/// One day-range rule, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTier {
    pub min_days: u32,
    /// `None` means open-ended ("7+ days").
    pub max_days: Option<u32>,
    pub price_per_day: Money,
}

impl PricingTier {
    pub fn new(min_days: u32, max_days: Option<u32>, price_per_day: Money) -> Self {
        Self {
            min_days,
            max_days,
            price_per_day,
        }
    }

    pub fn contains(&self, days: u32) -> bool {
        days >= self.min_days && self.max_days.map_or(true, |max| days <= max)
    }
}

/// Ordered tiers plus the base rate used when no tier matches.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PricingTable {
    tiers: Vec<PricingTier>,
    base_rate: Money,
}

impl PricingTable {
    /// Builds a table from explicit tiers. Tiers are ordered by `min_days`;
    /// tiers with a non-positive price or an inverted range are dropped.
    pub fn new(tiers: Vec<PricingTier>, base_rate: Money) -> Self {
        let mut tiers: Vec<PricingTier> = tiers
            .into_iter()
            .filter(|tier| tier.price_per_day.is_positive())
            .filter(|tier| tier.max_days.map_or(true, |max| max >= tier.min_days))
            .collect();
        tiers.sort_by_key(|tier| tier.min_days);
        Self { tiers, base_rate }
    }

    /// A table with no tiers: every duration pays `base_rate`.
    pub fn flat(base_rate: Money) -> Self {
        Self {
            tiers: Vec::new(),
            base_rate,
        }
    }

    /// Reads tiers out of product or variation metadata.
    pub fn from_meta(meta: &[MetaEntry], base_rate: Money) -> Self {
        let mut tiers = Vec::new();
        for entry in meta {
            if entry.key == TIERS_META_KEY {
                tiers.extend(parse_tier_list(&entry.value));
            }
        }
        for entry in meta {
            if entry.key.starts_with('_') {
                continue;
            }
            if let Some(tier) = parse_acf_key(&entry.key, &entry.value) {
                // An explicit tier for the same start day wins.
                if !tiers.iter().any(|t| t.min_days == tier.min_days) {
                    tiers.push(tier);
                }
            }
        }
        Self::new(tiers, base_rate)
    }

    /// Table for a bike, optionally in a given size.
    ///
    /// The base rate is the size variation's own price when it has one, the
    /// bike's listed daily rate otherwise. Variation metadata tiers take
    /// precedence over product metadata tiers.
    pub fn for_bike(bike: &Bike, size: Option<&str>) -> Self {
        let variation = size.and_then(|s| bike.variation_for_size(s));
        let base_rate = variation
            .and_then(|v| v.price)
            .unwrap_or(bike.price_per_day);

        let variation_meta = variation.and_then(|v| {
            bike.source_data
                .variations
                .iter()
                .find(|record| record.id.to_string() == v.id)
                .map(|record| record.meta_data.as_slice())
        });
        if let Some(meta) = variation_meta {
            let table = Self::from_meta(meta, base_rate);
            if !table.tiers.is_empty() {
                return table;
            }
        }

        match &bike.source_data.product {
            Some(product) => Self::from_meta(&product.meta_data, base_rate),
            None => Self::flat(base_rate),
        }
    }

    pub fn tiers(&self) -> &[PricingTier] {
        &self.tiers
    }

    pub fn base_rate(&self) -> Money {
        self.base_rate
    }

    pub fn is_tiered(&self) -> bool {
        !self.tiers.is_empty()
    }

    /// Daily rate for a rental of `days` days.
    ///
    /// Falls back to the base rate when no tier covers `days`, and to the
    /// first tier when there is no positive base rate either.
    pub fn price_per_day(&self, days: u32) -> Money {
        if let Some(tier) = self.tiers.iter().find(|tier| tier.contains(days)) {
            return tier.price_per_day;
        }
        if self.base_rate.is_positive() {
            return self.base_rate;
        }
        self.tiers
            .first()
            .map(|tier| tier.price_per_day)
            .unwrap_or(self.base_rate)
    }
}

/// `price_{min}_{max}_days` or `price_{min}_plus_days`.
fn parse_acf_key(key: &str, value: &Value) -> Option<PricingTier> {
    let range = key.strip_prefix("price_")?.strip_suffix("_days")?;
    let (min, max) = range.split_once('_')?;
    let min_days: u32 = min.parse().ok()?;
    let max_days = if max == "plus" {
        None
    } else {
        Some(max.parse().ok()?)
    };
    Some(PricingTier::new(min_days, max_days, value_to_money(value)?))
}

fn parse_tier_list(value: &Value) -> Vec<PricingTier> {
    let decoded;
    let value = match value {
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(parsed) => {
                decoded = parsed;
                &decoded
            }
            Err(_) => return Vec::new(),
        },
        other => other,
    };

    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let min_days = item.get("min_days")?.as_u64()? as u32;
                    let max_days = item
                        .get("max_days")
                        .and_then(Value::as_u64)
                        .map(|max| max as u32);
                    let price = value_to_money(item.get("price")?)?;
                    Some(PricingTier::new(min_days, max_days, price))
                })
                .collect()
        })
        .unwrap_or_default()
}

fn value_to_money(value: &Value) -> Option<Money> {
    match value {
        Value::String(raw) => Money::parse(raw),
        Value::Number(number) => Money::parse(&number.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn euros(units: i64) -> Money {
        Money::from_units(units)
    }

    fn standard_table() -> PricingTable {
        PricingTable::new(
            vec![
                PricingTier::new(1, Some(2), euros(20)),
                PricingTier::new(3, Some(6), euros(15)),
                PricingTier::new(7, None, euros(10)),
            ],
            euros(20),
        )
    }

    #[test]
    fn picks_tier_containing_days() {
        let table = standard_table();
        assert_eq!(table.price_per_day(1), euros(20));
        assert_eq!(table.price_per_day(4), euros(15));
        assert_eq!(table.price_per_day(10), euros(10));
    }

    #[test]
    fn unmatched_duration_uses_base_rate() {
        let table = PricingTable::new(vec![PricingTier::new(3, Some(6), euros(15))], euros(22));
        assert_eq!(table.price_per_day(1), euros(22));
        assert_eq!(table.price_per_day(8), euros(22));
    }

    #[test]
    fn unmatched_duration_without_base_rate_uses_first_tier() {
        let table = PricingTable::new(
            vec![
                PricingTier::new(5, None, euros(9)),
                PricingTier::new(2, Some(4), euros(12)),
            ],
            Money::ZERO,
        );
        assert_eq!(table.price_per_day(1), euros(12));
    }

    #[test]
    fn reads_acf_style_keys() {
        let meta = vec![
            MetaEntry::new("price_1_2_days", json!("20")),
            MetaEntry::new("price_3_6_days", json!(15)),
            MetaEntry::new("price_7_plus_days", json!("10.50")),
            MetaEntry::new("_price_1_2_days", json!("field_123")),
            MetaEntry::new("color", json!("red")),
        ];
        let table = PricingTable::from_meta(&meta, euros(25));
        assert_eq!(table.tiers().len(), 3);
        assert_eq!(table.price_per_day(2), euros(20));
        assert_eq!(table.price_per_day(5), euros(15));
        assert_eq!(table.price_per_day(30), Money::from_cents(1050));
    }

    #[test]
    fn reads_pricing_tiers_json_string() {
        let meta = vec![MetaEntry::new(
            "pricing_tiers",
            json!(r#"[{"min_days":1,"max_days":3,"price":"18"},{"min_days":4,"price":12}]"#),
        )];
        let table = PricingTable::from_meta(&meta, Money::ZERO);
        assert_eq!(table.price_per_day(3), euros(18));
        assert_eq!(table.price_per_day(40), euros(12));
    }

    #[test]
    fn explicit_tiers_win_over_acf_keys_for_same_start() {
        let meta = vec![
            MetaEntry::new("price_1_2_days", json!("99")),
            MetaEntry::new(
                "pricing_tiers",
                json!([{"min_days": 1, "max_days": 2, "price": "19"}]),
            ),
        ];
        let table = PricingTable::from_meta(&meta, Money::ZERO);
        assert_eq!(table.price_per_day(1), euros(19));
    }

    #[test]
    fn drops_zero_priced_and_inverted_tiers() {
        let table = PricingTable::new(
            vec![
                PricingTier::new(1, Some(2), Money::ZERO),
                PricingTier::new(5, Some(3), euros(8)),
            ],
            euros(14),
        );
        assert!(!table.is_tiered());
        assert_eq!(table.price_per_day(4), euros(14));
    }

    #[test]
    fn open_ended_tier_contains_everything_above_min() {
        let tier = PricingTier::new(7, None, euros(10));
        assert!(!tier.contains(6));
        assert!(tier.contains(7));
        assert!(tier.contains(365));
    }
}
