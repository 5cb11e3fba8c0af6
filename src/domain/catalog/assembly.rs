//! Conversion from commerce records to bikes.
//!
//! Stock and price derivation rules:
//! - A product with variations is available in the sum of its in-stock
//!   variations' quantities; without variations, its own stock quantity.
//! - Price per day is the product price, unless a variation with available
//!   stock carries its own positive price.
//! - Category is the first category slug that is not the rentals bucket.

use crate::domain::foundation::Money;

use super::bike::{Bike, BikeVariation, SourceData};
use super::records::{ProductRecord, VariationRecord};

/// Top-level grouping category every rental product sits in; not a facet.
pub const RENTAL_BUCKET_SLUG: &str = "rentals";

/// Builds a bike from a product and, when they could be fetched, its variations.
///
/// `variations == None` means the variation lookup failed or was not needed;
/// the product's own stock is used instead.
pub fn assemble_bike(product: &ProductRecord, variations: Option<&[VariationRecord]>) -> Bike {
    let variations = variations.filter(|v| !v.is_empty()).unwrap_or(&[]);

    Bike {
        id: product.id.to_string(),
        name: product.name.trim().to_string(),
        category: primary_category(product),
        price_per_day: price_per_day(product, variations),
        available_quantity: available_quantity(product, variations),
        image_url: product
            .images
            .iter()
            .map(|image| image.src.trim())
            .find(|src| !src.is_empty())
            .map(str::to_string),
        description: plain_text(if product.short_description.trim().is_empty() {
            &product.description
        } else {
            &product.short_description
        }),
        variations: variations.iter().map(BikeVariation::from).collect(),
        source_data: SourceData {
            product: Some(product.clone()),
            variations: variations.to_vec(),
        },
    }
}

/// Units available for rental.
pub fn available_quantity(product: &ProductRecord, variations: &[VariationRecord]) -> u32 {
    if variations.is_empty() {
        return clamp_stock(product.stock_quantity);
    }
    variations
        .iter()
        .filter(|variation| variation.is_in_stock())
        .map(|variation| clamp_stock(variation.stock_quantity))
        .fold(0u32, u32::saturating_add)
}

/// Listed daily rate before tiered pricing is applied.
pub fn price_per_day(product: &ProductRecord, variations: &[VariationRecord]) -> Money {
    let own = Money::parse(&product.price)
        .or_else(|| Money::parse(&product.regular_price))
        .unwrap_or(Money::ZERO);

    variations
        .iter()
        .find(|variation| variation.is_in_stock() && clamp_stock(variation.stock_quantity) > 0)
        .and_then(|variation| Money::parse(&variation.price))
        .filter(Money::is_positive)
        .unwrap_or(own)
}

/// First category slug usable as a filter facet.
pub fn primary_category(product: &ProductRecord) -> Option<String> {
    product
        .categories
        .iter()
        .map(|category| category.slug.trim())
        .find(|slug| !slug.is_empty() && !slug.eq_ignore_ascii_case(RENTAL_BUCKET_SLUG))
        .map(str::to_string)
}

fn clamp_stock(quantity: Option<i64>) -> u32 {
    quantity.unwrap_or(0).clamp(0, u32::MAX as i64) as u32
}

/// Strips HTML tags the commerce API leaves in descriptions.
fn plain_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
