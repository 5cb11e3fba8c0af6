//! Product catalogue: commerce records, normalized bikes and the rules that
//! derive one from the other.

mod assembly;
mod bike;
mod records;
mod static_fallback;

pub use assembly::{
    assemble_bike, available_quantity, price_per_day, primary_category, RENTAL_BUCKET_SLUG,
};
pub use bike::{Bike, BikeVariation, SourceData};
pub use records::{
    CategoryRef, ImageRef, MetaEntry, ProductRecord, ProductType, StockStatus, VariationAttribute,
    VariationRecord,
};
pub use static_fallback::static_bikes;
