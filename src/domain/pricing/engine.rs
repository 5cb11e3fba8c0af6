//! Pricing engine - authoritative totals at checkout time.
//!
//! Every checkout path (pricing preview, direct order, fallback checkout URL)
//! prices through this engine. The per-day rate the UI displayed is recorded
//! for comparison only; the rate actually charged is re-derived from the
//! bike's pricing table.

use serde::Serialize;

use crate::domain::catalog::Bike;
use crate::domain::foundation::Money;

use super::PricingTable;

/// Largest quantity of one bike a single reservation may ask for.
pub const MAX_QUANTITY_PER_BIKE: u32 = 100;

/// A bike picked for the reservation.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedBike {
    pub bike: Bike,
    pub quantity: u32,
    pub size: Option<String>,
    /// Rate the UI showed when the bike was picked.
    pub displayed_price_per_day: Option<Money>,
}

impl SelectedBike {
    pub fn new(bike: Bike, quantity: u32) -> Self {
        Self {
            bike,
            quantity,
            size: None,
            displayed_price_per_day: None,
        }
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn with_displayed_price(mut self, price: Money) -> Self {
        self.displayed_price_per_day = Some(price);
        self
    }
}

/// Insurance option chosen for the whole reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsuranceSelection {
    pub name: String,
    /// Zero denotes an included (free) tier.
    pub price_per_bike_per_day: Money,
}

/// Everything needed to price a reservation.
#[derive(Debug, Clone, PartialEq)]
pub struct ReservationPricingInput {
    pub bikes: Vec<SelectedBike>,
    /// Signed so invalid durations reach validation instead of wrapping.
    pub total_days: i64,
    pub insurance: Option<InsuranceSelection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BikeLine {
    pub bike_id: String,
    pub name: String,
    pub size: Option<String>,
    pub quantity: u32,
    pub days: u32,
    pub price_per_day: Money,
    pub total: Money,
    pub displayed_price_per_day: Option<Money>,
    /// The displayed rate differed from the computed one.
    pub price_corrected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsuranceLine {
    pub name: String,
    pub price_per_bike_per_day: Money,
    pub bike_count: u32,
    pub days: u32,
    pub total: Money,
    pub included: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricingBreakdown {
    pub total_days: u32,
    pub lines: Vec<BikeLine>,
    pub insurance: Option<InsuranceLine>,
    pub bikes_total: Money,
    pub insurance_total: Money,
    pub grand_total: Money,
}

impl PricingBreakdown {
    pub fn bike_count(&self) -> u32 {
        total_quantity(&self.lines)
    }
}

/// Outcome of a validation run: itemized errors next to corrected totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricingValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub breakdown: PricingBreakdown,
}

/// Stateless pricing rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct PricingEngine;

impl PricingEngine {
    pub fn new() -> Self {
        Self
    }

    /// Daily rate for `total_days` under `table`.
    pub fn price_per_day(&self, total_days: u32, table: &PricingTable) -> Money {
        table.price_per_day(total_days)
    }

    /// Priced line for one selected bike.
    pub fn bike_line(&self, selected: &SelectedBike, days: u32) -> BikeLine {
        let table = PricingTable::for_bike(&selected.bike, selected.size.as_deref());
        let price_per_day = self.price_per_day(days, &table);
        let total = price_per_day
            .times(i64::from(days))
            .times(i64::from(selected.quantity));

        BikeLine {
            bike_id: selected.bike.id.clone(),
            name: selected.bike.name.clone(),
            size: selected.size.clone(),
            quantity: selected.quantity,
            days,
            price_per_day,
            total,
            displayed_price_per_day: selected.displayed_price_per_day,
            price_corrected: selected
                .displayed_price_per_day
                .is_some_and(|shown| shown != price_per_day),
        }
    }

    /// Insurance line: per-bike-per-day price times bikes times days.
    ///
    /// A zero price still yields a line, flagged as included.
    pub fn insurance_line(
        &self,
        insurance: &InsuranceSelection,
        bike_count: u32,
        days: u32,
    ) -> InsuranceLine {
        let total = insurance
            .price_per_bike_per_day
            .times(i64::from(bike_count))
            .times(i64::from(days));

        InsuranceLine {
            name: insurance.name.clone(),
            price_per_bike_per_day: insurance.price_per_bike_per_day,
            bike_count,
            days,
            total,
            included: insurance.price_per_bike_per_day == Money::ZERO,
        }
    }

    /// Totals for the reservation, computed even when it is invalid.
    pub fn breakdown(&self, input: &ReservationPricingInput) -> PricingBreakdown {
        let days = u32::try_from(input.total_days.max(0)).unwrap_or(u32::MAX);
        let lines: Vec<BikeLine> = input
            .bikes
            .iter()
            .map(|selected| self.bike_line(selected, days))
            .collect();
        let bike_count = total_quantity(&lines);
        let insurance = input
            .insurance
            .as_ref()
            .map(|insurance| self.insurance_line(insurance, bike_count, days));

        let bikes_total: Money = lines.iter().map(|line| line.total).sum();
        let insurance_total = insurance.as_ref().map_or(Money::ZERO, |line| line.total);

        PricingBreakdown {
            total_days: days,
            lines,
            insurance,
            bikes_total,
            insurance_total,
            grand_total: bikes_total + insurance_total,
        }
    }

    /// Checks the reservation can be submitted.
    ///
    /// Never fails: problems come back as messages alongside the corrected
    /// breakdown so the caller decides whether to block checkout.
    pub fn validate(&self, input: &ReservationPricingInput) -> PricingValidation {
        let breakdown = self.breakdown(input);
        let mut errors = Vec::new();

        if input.bikes.is_empty() {
            errors.push("Select at least one bike".to_string());
        }
        if input.total_days <= 0 {
            errors.push(format!(
                "Rental must last at least one day (got {} days)",
                input.total_days
            ));
        }
        for line in &breakdown.lines {
            if line.quantity == 0 {
                errors.push(format!("Quantity for {} must be at least 1", line.name));
            }
            if line.quantity > MAX_QUANTITY_PER_BIKE {
                errors.push(format!(
                    "Quantity for {} cannot exceed {} (got {})",
                    line.name, MAX_QUANTITY_PER_BIKE, line.quantity
                ));
            }
            if !line.price_per_day.is_positive() {
                errors.push(format!(
                    "No valid daily price for {} ({})",
                    line.name, line.price_per_day
                ));
            }
        }

        if let Some(insurance) = &input.insurance {
            if insurance.price_per_bike_per_day < Money::ZERO {
                errors.push(format!(
                    "Insurance {} has a negative price ({})",
                    insurance.name, insurance.price_per_bike_per_day
                ));
            }
        }

        PricingValidation {
            is_valid: errors.is_empty(),
            errors,
            breakdown,
        }
    }
}

/// Bikes across all lines, saturating at `u32::MAX`.
fn total_quantity(lines: &[BikeLine]) -> u32 {
    lines
        .iter()
        .fold(0u32, |count, line| count.saturating_add(line.quantity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{MetaEntry, ProductRecord, SourceData};
    use proptest::prelude::*;
    use serde_json::json;

    fn euros(units: i64) -> Money {
        Money::from_units(units)
    }

    fn tiered_bike(id: &str, list_price: i64) -> Bike {
        let mut product: ProductRecord =
            serde_json::from_value(json!({"id": 1, "name": "Tiered"})).unwrap();
        product.meta_data = vec![
            MetaEntry::new("price_1_2_days", json!("20")),
            MetaEntry::new("price_3_6_days", json!("15")),
            MetaEntry::new("price_7_plus_days", json!("10")),
        ];
        Bike {
            id: id.to_string(),
            name: format!("Bike {}", id),
            category: None,
            price_per_day: euros(list_price),
            available_quantity: 5,
            image_url: None,
            description: String::new(),
            variations: Vec::new(),
            source_data: SourceData {
                product: Some(product),
                variations: Vec::new(),
            },
        }
    }

    fn flat_bike(price: Money) -> Bike {
        Bike {
            source_data: SourceData::default(),
            price_per_day: price,
            ..tiered_bike("9", 0)
        }
    }

    fn input(bikes: Vec<SelectedBike>, days: i64) -> ReservationPricingInput {
        ReservationPricingInput {
            bikes,
            total_days: days,
            insurance: None,
        }
    }

    #[test]
    fn bike_line_uses_tier_not_displayed_price() {
        let engine = PricingEngine::new();
        let selected = SelectedBike::new(tiered_bike("1", 20), 2).with_displayed_price(euros(20));
        let line = engine.bike_line(&selected, 4);
        assert_eq!(line.price_per_day, euros(15));
        assert_eq!(line.total, euros(120));
        assert!(line.price_corrected);
    }

    #[test]
    fn insurance_total_multiplies_price_bikes_and_days() {
        let engine = PricingEngine::new();
        let insurance = InsuranceSelection {
            name: "Premium".to_string(),
            price_per_bike_per_day: euros(5),
        };
        let line = engine.insurance_line(&insurance, 3, 4);
        assert_eq!(line.total, euros(60));
        assert!(!line.included);
    }

    #[test]
    fn free_insurance_produces_included_line() {
        let engine = PricingEngine::new();
        let mut reservation = input(vec![SelectedBike::new(tiered_bike("1", 20), 1)], 2);
        reservation.insurance = Some(InsuranceSelection {
            name: "Basic".to_string(),
            price_per_bike_per_day: Money::ZERO,
        });
        let breakdown = engine.breakdown(&reservation);
        let line = breakdown.insurance.expect("insurance line present");
        assert!(line.included);
        assert_eq!(line.total, Money::ZERO);
        assert_eq!(breakdown.insurance_total, Money::ZERO);
    }

    #[test]
    fn breakdown_sums_bikes_and_insurance() {
        let engine = PricingEngine::new();
        let mut reservation = input(
            vec![
                SelectedBike::new(tiered_bike("1", 20), 2),
                SelectedBike::new(flat_bike(euros(30)), 1),
            ],
            3,
        );
        reservation.insurance = Some(InsuranceSelection {
            name: "Premium".to_string(),
            price_per_bike_per_day: euros(5),
        });
        let breakdown = engine.breakdown(&reservation);
        assert_eq!(breakdown.bikes_total, euros(15 * 3 * 2 + 30 * 3));
        assert_eq!(breakdown.insurance_total, euros(5 * 3 * 3));
        assert_eq!(breakdown.grand_total, euros(180 + 45));
        assert_eq!(breakdown.bike_count(), 3);
    }

    #[test]
    fn empty_selection_is_invalid() {
        let validation = PricingEngine::new().validate(&input(Vec::new(), 3));
        assert!(!validation.is_valid);
        assert!(validation.errors.iter().any(|e| e.contains("at least one bike")));
    }

    #[test]
    fn zero_days_is_invalid() {
        let validation =
            PricingEngine::new().validate(&input(vec![SelectedBike::new(tiered_bike("1", 20), 1)], 0));
        assert!(!validation.is_valid);
        assert!(validation.errors.iter().any(|e| e.contains("days")));
        assert_eq!(validation.breakdown.grand_total, Money::ZERO);
    }

    #[test]
    fn unpriced_bike_is_invalid() {
        let validation =
            PricingEngine::new().validate(&input(vec![SelectedBike::new(flat_bike(Money::ZERO), 1)], 2));
        assert!(!validation.is_valid);
        assert!(validation.errors.iter().any(|e| e.contains("No valid daily price")));
    }

    #[test]
    fn zero_quantity_is_invalid() {
        let validation =
            PricingEngine::new().validate(&input(vec![SelectedBike::new(tiered_bike("1", 20), 0)], 2));
        assert!(!validation.is_valid);
        assert!(validation.errors.iter().any(|e| e.contains("Quantity")));
    }

    #[test]
    fn negative_insurance_is_invalid_and_not_included() {
        let engine = PricingEngine::new();
        let mut reservation = input(vec![SelectedBike::new(tiered_bike("1", 20), 1)], 3);
        reservation.insurance = Some(InsuranceSelection {
            name: "Basic".to_string(),
            price_per_bike_per_day: Money::from_cents(-100_000),
        });

        let validation = engine.validate(&reservation);

        assert!(!validation.is_valid);
        assert!(validation.errors.iter().any(|e| e.contains("negative price")));
        let line = validation.breakdown.insurance.expect("insurance line present");
        assert!(!line.included);
    }

    #[test]
    fn huge_quantities_are_rejected_without_overflow() {
        let engine = PricingEngine::new();
        let reservation = input(
            vec![
                SelectedBike::new(tiered_bike("1", 20), u32::MAX),
                SelectedBike::new(tiered_bike("2", 20), 1),
            ],
            3,
        );

        let validation = engine.validate(&reservation);

        assert!(!validation.is_valid);
        assert!(validation.errors.iter().any(|e| e.contains("cannot exceed")));
        assert_eq!(validation.breakdown.bike_count(), u32::MAX);
    }

    #[test]
    fn quantity_at_the_limit_is_accepted() {
        let validation = PricingEngine::new().validate(&input(
            vec![SelectedBike::new(tiered_bike("1", 20), MAX_QUANTITY_PER_BIKE)],
            1,
        ));
        assert!(validation.is_valid);
    }

    #[test]
    fn negative_displayed_price_is_never_charged() {
        let engine = PricingEngine::new();
        let selected =
            SelectedBike::new(tiered_bike("1", 20), 1).with_displayed_price(Money::from_cents(-500));

        let validation = engine.validate(&input(vec![selected], 3));

        assert!(validation.is_valid);
        let line = &validation.breakdown.lines[0];
        assert_eq!(line.price_per_day, euros(15));
        assert!(line.price_corrected);
        assert_eq!(validation.breakdown.grand_total, euros(45));
    }

    #[test]
    fn valid_reservation_has_no_errors() {
        let validation =
            PricingEngine::new().validate(&input(vec![SelectedBike::new(tiered_bike("1", 20), 1)], 7));
        assert!(validation.is_valid);
        assert!(validation.errors.is_empty());
        assert_eq!(validation.breakdown.grand_total, euros(70));
    }

    proptest! {
        #[test]
        fn line_total_is_rate_times_days_times_quantity(days in 1u32..60, quantity in 1u32..6) {
            let engine = PricingEngine::new();
            let line = engine.bike_line(&SelectedBike::new(tiered_bike("1", 20), quantity), days);
            prop_assert_eq!(
                line.total,
                line.price_per_day.times(i64::from(days)).times(i64::from(quantity))
            );
            prop_assert!([euros(20), euros(15), euros(10)].contains(&line.price_per_day));
        }

        #[test]
        fn longer_rentals_never_raise_the_daily_rate(days in 1u32..60) {
            let engine = PricingEngine::new();
            let selected = SelectedBike::new(tiered_bike("1", 20), 1);
            let shorter = engine.bike_line(&selected, days).price_per_day;
            let longer = engine.bike_line(&selected, days + 1).price_per_day;
            prop_assert!(longer <= shorter);
        }

        #[test]
        fn insurance_total_is_exact(cents in -5_000i64..5_000, bikes in 0u32..10, days in 0u32..30) {
            let insurance = InsuranceSelection {
                name: "Any".to_string(),
                price_per_bike_per_day: Money::from_cents(cents),
            };
            let line = PricingEngine::new().insurance_line(&insurance, bikes, days);
            prop_assert_eq!(line.total.cents(), cents * i64::from(bikes) * i64::from(days));
            prop_assert_eq!(line.included, cents == 0);

            let mut reservation = input(vec![SelectedBike::new(tiered_bike("1", 20), 1)], 2);
            reservation.insurance = Some(insurance);
            let validation = PricingEngine::new().validate(&reservation);
            prop_assert_eq!(validation.is_valid, cents >= 0);
        }

        #[test]
        fn quantities_never_overflow(quantities in prop::collection::vec(any::<u32>(), 1..5)) {
            let bikes = quantities
                .iter()
                .enumerate()
                .map(|(i, quantity)| SelectedBike::new(tiered_bike(&i.to_string(), 20), *quantity))
                .collect();
            let validation = PricingEngine::new().validate(&input(bikes, 3));
            let in_range = quantities
                .iter()
                .all(|quantity| (1..=MAX_QUANTITY_PER_BIKE).contains(quantity));
            prop_assert_eq!(validation.is_valid, in_range);
        }
    }
}
