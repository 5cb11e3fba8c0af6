//! Hard-coded catalogue served when every live source and the fallback cache
//! are unavailable, so the booking list never renders empty.

use once_cell::sync::Lazy;
use serde_json::json;

use super::assembly::assemble_bike;
use super::bike::Bike;
use super::records::{CategoryRef, MetaEntry, ProductRecord, ProductType, StockStatus};

static STATIC_PRODUCTS: Lazy<Vec<ProductRecord>> = Lazy::new(|| {
    vec![
        product(
            9001,
            "City Comfort",
            "city",
            "City",
            20,
            6,
            "Upright city bike with basket and lights.",
            [20, 17, 14],
        ),
        product(
            9002,
            "Trekking Pro",
            "trekking",
            "Trekking",
            25,
            4,
            "Hybrid for long routes, rear rack included.",
            [25, 21, 18],
        ),
        product(
            9003,
            "Mountain Trail",
            "mtb",
            "Mountain",
            30,
            3,
            "Front-suspension mountain bike for forest tracks.",
            [30, 26, 22],
        ),
        product(
            9004,
            "E-Bike Urban",
            "ebike",
            "E-Bike",
            40,
            2,
            "Pedal-assist bike, up to 80 km per charge.",
            [40, 35, 30],
        ),
    ]
});

#[allow(clippy::too_many_arguments)]
fn product(
    id: u64,
    name: &str,
    slug: &str,
    category: &str,
    price: i64,
    stock: i64,
    description: &str,
    tiers: [i64; 3],
) -> ProductRecord {
    let [short, medium, long] = tiers;
    ProductRecord {
        id,
        name: name.to_string(),
        slug: slug.to_string(),
        product_type: ProductType::Simple,
        status: "publish".to_string(),
        price: price.to_string(),
        regular_price: price.to_string(),
        sale_price: String::new(),
        stock_quantity: Some(stock),
        stock_status: StockStatus::InStock,
        categories: vec![
            CategoryRef {
                id: 1,
                name: "Rentals".to_string(),
                slug: super::RENTAL_BUCKET_SLUG.to_string(),
            },
            CategoryRef {
                id: id % 1000 + 10,
                name: category.to_string(),
                slug: slug.to_string(),
            },
        ],
        images: Vec::new(),
        variations: Vec::new(),
        meta_data: vec![
            MetaEntry::new("price_1_2_days", json!(short.to_string())),
            MetaEntry::new("price_3_6_days", json!(medium.to_string())),
            MetaEntry::new("price_7_plus_days", json!(long.to_string())),
        ],
        description: description.to_string(),
        short_description: String::new(),
    }
}

/// Static catalogue as bikes, freshly built on every call.
pub fn static_bikes() -> Vec<Bike> {
    STATIC_PRODUCTS
        .iter()
        .map(|product| assemble_bike(product, None))
        .collect()
}
