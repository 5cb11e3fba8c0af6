//! Normalized bike representation served to the booking UI.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Money;

use super::records::{ProductRecord, VariationRecord};

/// A rentable bike, built fresh from whichever source answered.
///
/// Never mutated after construction; every resolution yields new values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bike {
    /// External commerce product id, as a string.
    pub id: String,
    pub name: String,
    /// First usable category slug, the rentals bucket excluded.
    pub category: Option<String>,
    pub price_per_day: Money,
    pub available_quantity: u32,
    pub image_url: Option<String>,
    pub description: String,
    #[serde(default)]
    pub variations: Vec<BikeVariation>,
    /// Original product (and variations) payload, kept for pricing lookups.
    #[serde(default)]
    pub source_data: SourceData,
}

impl Bike {
    pub fn is_available(&self) -> bool {
        self.available_quantity > 0
    }

    /// Commerce product id as a number.
    pub fn product_id(&self) -> Option<u64> {
        self.id.parse().ok()
    }

    /// Variation carrying the given size, compared case-insensitively.
    pub fn variation_for_size(&self, size: &str) -> Option<&BikeVariation> {
        self.variations.iter().find(|variation| {
            variation
                .size
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case(size))
        })
    }
}

/// A purchasable configuration (usually a frame size) of a bike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BikeVariation {
    pub id: String,
    pub size: Option<String>,
    pub price: Option<Money>,
    pub stock_quantity: u32,
    pub in_stock: bool,
}

impl BikeVariation {
    pub fn variation_id(&self) -> Option<u64> {
        self.id.parse().ok()
    }
}

impl From<&VariationRecord> for BikeVariation {
    fn from(record: &VariationRecord) -> Self {
        Self {
            id: record.id.to_string(),
            size: record.size().map(str::to_string),
            price: Money::parse(&record.price).filter(Money::is_positive),
            stock_quantity: record.stock_quantity.unwrap_or(0).max(0) as u32,
            in_stock: record.is_in_stock(),
        }
    }
}

/// Raw payload a bike was built from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceData {
    #[serde(default)]
    pub product: Option<ProductRecord>,
    #[serde(default)]
    pub variations: Vec<VariationRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variation(id: &str, size: &str) -> BikeVariation {
        BikeVariation {
            id: id.to_string(),
            size: Some(size.to_string()),
            price: None,
            stock_quantity: 1,
            in_stock: true,
        }
    }

    fn bike() -> Bike {
        Bike {
            id: "42".to_string(),
            name: "Trekking".to_string(),
            category: Some("trekking".to_string()),
            price_per_day: Money::from_units(20),
            available_quantity: 2,
            image_url: None,
            description: String::new(),
            variations: vec![variation("1", "M"), variation("2", "L")],
            source_data: SourceData::default(),
        }
    }

    #[test]
    fn finds_variation_by_size_case_insensitively() {
        let bike = bike();
        assert_eq!(bike.variation_for_size("l").map(|v| v.id.as_str()), Some("2"));
        assert!(bike.variation_for_size("XL").is_none());
    }

    #[test]
    fn product_id_parses_numeric_id() {
        assert_eq!(bike().product_id(), Some(42));
    }

    #[test]
    fn negative_stock_on_variation_clamps_to_zero() {
        let record: VariationRecord = serde_json::from_value(serde_json::json!({
            "id": 5,
            "price": "",
            "stock_quantity": -3,
            "stock_status": "outofstock",
            "attributes": [{"name": "Size", "option": "S"}]
        }))
        .unwrap();
        let variation = BikeVariation::from(&record);
        assert_eq!(variation.stock_quantity, 0);
        assert_eq!(variation.price, None);
        assert_eq!(variation.size.as_deref(), Some("S"));
        assert!(!variation.in_stock);
    }
}
