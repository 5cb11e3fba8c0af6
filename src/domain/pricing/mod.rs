//! Pricing: day-range tables and the engine that prices reservations.

mod engine;
mod table;

pub use engine::{
    BikeLine, InsuranceLine, InsuranceSelection, PricingBreakdown, PricingEngine,
    MAX_QUANTITY_PER_BIKE,
    PricingValidation, ReservationPricingInput, SelectedBike,
};
pub use table::{PricingTable, PricingTier};
