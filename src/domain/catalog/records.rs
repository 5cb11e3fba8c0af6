//! Commerce wire records.
//!
//! Mirrors the product and variation shapes served by the WooCommerce REST API.
//! The product database stores rows in the same shape, so both transports
//! decode into these types.

use serde::{Deserialize, Serialize};

/// Product kind as reported by the commerce API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    #[default]
    Simple,
    Variable,
    #[serde(other)]
    Other,
}

/// Stock status as reported by the commerce API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockStatus {
    #[serde(rename = "instock")]
    InStock,
    #[serde(rename = "outofstock")]
    OutOfStock,
    #[serde(rename = "onbackorder")]
    OnBackorder,
    #[default]
    #[serde(other)]
    Unknown,
}

impl StockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::InStock => "instock",
            StockStatus::OutOfStock => "outofstock",
            StockStatus::OnBackorder => "onbackorder",
            StockStatus::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRef {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub src: String,
    #[serde(default)]
    pub alt: String,
}

/// Free-form metadata entry (ACF fields land here).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub key: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

impl MetaEntry {
    pub fn new(key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            id: None,
            key: key.into(),
            value: value.into(),
        }
    }
}

/// `{name, option}` pair on a variation, e.g. `{"name": "Size", "option": "M"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariationAttribute {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
    pub option: String,
}

impl VariationAttribute {
    /// Whether this attribute encodes the frame size.
    pub fn is_size(&self) -> bool {
        let name = self.name.to_ascii_lowercase();
        name == "size" || name == "pa_size" || name.ends_with("size")
    }
}

/// Product as returned by `GET /products`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(rename = "type", default)]
    pub product_type: ProductType,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub regular_price: String,
    #[serde(default)]
    pub sale_price: String,
    #[serde(default)]
    pub stock_quantity: Option<i64>,
    #[serde(default)]
    pub stock_status: StockStatus,
    #[serde(default)]
    pub categories: Vec<CategoryRef>,
    #[serde(default)]
    pub images: Vec<ImageRef>,
    #[serde(default)]
    pub variations: Vec<u64>,
    #[serde(default)]
    pub meta_data: Vec<MetaEntry>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub short_description: String,
}

impl ProductRecord {
    pub fn is_variable(&self) -> bool {
        self.product_type == ProductType::Variable
    }

    /// First metadata value stored under `key`.
    pub fn meta(&self, key: &str) -> Option<&serde_json::Value> {
        self.meta_data
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| &entry.value)
    }
}

/// Variation as returned by `GET /products/{id}/variations`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariationRecord {
    pub id: u64,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub regular_price: String,
    #[serde(default)]
    pub sale_price: String,
    #[serde(default)]
    pub stock_quantity: Option<i64>,
    #[serde(default)]
    pub stock_status: StockStatus,
    #[serde(default)]
    pub attributes: Vec<VariationAttribute>,
    #[serde(default)]
    pub meta_data: Vec<MetaEntry>,
}

impl VariationRecord {
    pub fn size(&self) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.is_size())
            .map(|attr| attr.option.as_str())
    }

    pub fn is_in_stock(&self) -> bool {
        self.stock_status == StockStatus::InStock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_commerce_product_with_defaults() {
        let product: ProductRecord = serde_json::from_value(json!({
            "id": 12,
            "name": "City Bike",
            "type": "variable",
            "price": "20",
            "stock_quantity": null,
            "stock_status": "instock",
            "categories": [{"id": 3, "name": "City", "slug": "city"}],
            "variations": [101, 102]
        }))
        .unwrap();

        assert!(product.is_variable());
        assert_eq!(product.stock_status, StockStatus::InStock);
        assert_eq!(product.variations, vec![101, 102]);
        assert!(product.images.is_empty());
        assert_eq!(product.stock_quantity, None);
    }

    #[test]
    fn unknown_product_type_and_stock_status_are_tolerated() {
        let product: ProductRecord = serde_json::from_value(json!({
            "id": 1,
            "name": "Bundle",
            "type": "grouped",
            "stock_status": "preorder"
        }))
        .unwrap();
        assert_eq!(product.product_type, ProductType::Other);
        assert_eq!(product.stock_status, StockStatus::Unknown);
    }

    #[test]
    fn variation_size_attribute_is_found() {
        let variation: VariationRecord = serde_json::from_value(json!({
            "id": 7,
            "price": "18",
            "stock_quantity": 2,
            "stock_status": "instock",
            "attributes": [
                {"name": "Color", "option": "Red"},
                {"name": "Size", "option": "L"}
            ]
        }))
        .unwrap();
        assert_eq!(variation.size(), Some("L"));
        assert!(variation.is_in_stock());
    }

    #[test]
    fn meta_lookup_returns_first_match() {
        let product = ProductRecord {
            meta_data: vec![
                MetaEntry::new("price_1_2_days", "20"),
                MetaEntry::new("price_1_2_days", "99"),
            ],
            ..serde_json::from_value(json!({"id": 1, "name": "x"})).unwrap()
        };
        assert_eq!(product.meta("price_1_2_days"), Some(&json!("20")));
        assert_eq!(product.meta("missing"), None);
    }
}
