//! Order payload for `POST /orders`.

use serde::{Deserialize, Serialize};

use crate::domain::catalog::MetaEntry;
use crate::domain::foundation::{DomainError, ErrorCode, Money};
use crate::domain::pricing::{BikeLine, PricingBreakdown};

use super::Reservation;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Billing {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderLineItem {
    pub product_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variation_id: Option<u64>,
    pub quantity: u32,
    pub subtotal: String,
    pub total: String,
    pub meta_data: Vec<MetaEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeeLine {
    pub name: String,
    pub total: String,
    pub tax_status: String,
}

/// Pending, unpaid order; payment happens on the pay-for-order page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderDraft {
    pub status: String,
    pub set_paid: bool,
    pub currency: String,
    pub billing: Billing,
    pub line_items: Vec<OrderLineItem>,
    pub fee_lines: Vec<FeeLine>,
    pub meta_data: Vec<MetaEntry>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub customer_note: String,
}

impl OrderDraft {
    /// Builds the order from a reservation and its authoritative breakdown.
    ///
    /// Line totals come from the breakdown only; nothing is re-priced here.
    pub fn build(
        reservation: &Reservation,
        breakdown: &PricingBreakdown,
        currency: &str,
    ) -> Result<Self, DomainError> {
        let start = reservation.start_date.to_string();
        let end = reservation.end_date.to_string();

        let line_items = reservation
            .bikes
            .iter()
            .zip(&breakdown.lines)
            .map(|(selected, line)| {
                let product_id = selected.bike.product_id().ok_or_else(|| {
                    DomainError::new(
                        ErrorCode::ProductNotFound,
                        format!("Bike {} has no commerce product id", selected.bike.id),
                    )
                    .with_detail("bike_id", selected.bike.id.clone())
                })?;
                let variation_id = selected
                    .size
                    .as_deref()
                    .and_then(|size| selected.bike.variation_for_size(size))
                    .and_then(|variation| variation.variation_id());
                Ok(line_item(product_id, variation_id, line, &start, &end))
            })
            .collect::<Result<Vec<_>, DomainError>>()?;

        let fee_lines = breakdown
            .insurance
            .iter()
            .map(|insurance| FeeLine {
                name: if insurance.included {
                    format!("Insurance: {} (included)", insurance.name)
                } else {
                    format!("Insurance: {}", insurance.name)
                },
                total: insurance.total.to_decimal_string(),
                tax_status: "none".to_string(),
            })
            .collect();

        let mut meta_data = vec![
            MetaEntry::new("_rental_start_date", start.clone()),
            MetaEntry::new("_rental_end_date", end.clone()),
            MetaEntry::new("_rental_days", breakdown.total_days.to_string()),
            MetaEntry::new("_pricing_total", breakdown.grand_total.to_decimal_string()),
        ];
        if let Some(time) = &reservation.pickup_time {
            meta_data.push(MetaEntry::new("_pickup_time", time.clone()));
        }
        if let Some(time) = &reservation.return_time {
            meta_data.push(MetaEntry::new("_return_time", time.clone()));
        }
        if let Some(insurance) = &breakdown.insurance {
            meta_data.push(MetaEntry::new("_insurance_type", insurance.name.clone()));
        }

        let customer = &reservation.customer;
        Ok(Self {
            status: "pending".to_string(),
            set_paid: false,
            currency: currency.to_string(),
            billing: Billing {
                first_name: customer.first_name.trim().to_string(),
                last_name: customer.last_name.trim().to_string(),
                email: customer.email.trim().to_string(),
                phone: customer.phone.clone(),
            },
            line_items,
            fee_lines,
            meta_data,
            customer_note: format!("Bike rental {} to {}", start, end),
        })
    }

    /// Sum of line and fee totals, as the backend will compute it.
    pub fn total(&self) -> Money {
        let lines = self
            .line_items
            .iter()
            .filter_map(|item| Money::parse(&item.total));
        let fees = self.fee_lines.iter().filter_map(|fee| Money::parse(&fee.total));
        lines.chain(fees).sum()
    }
}

fn line_item(
    product_id: u64,
    variation_id: Option<u64>,
    line: &BikeLine,
    start: &str,
    end: &str,
) -> OrderLineItem {
    let mut meta_data = vec![
        MetaEntry::new("Rental start", start.to_string()),
        MetaEntry::new("Rental end", end.to_string()),
        MetaEntry::new("Rental days", line.days.to_string()),
        MetaEntry::new("Price per day", line.price_per_day.to_decimal_string()),
    ];
    if let Some(size) = &line.size {
        meta_data.push(MetaEntry::new("Size", size.clone()));
    }

    OrderLineItem {
        product_id,
        variation_id,
        quantity: line.quantity,
        subtotal: line.total.to_decimal_string(),
        total: line.total.to_decimal_string(),
        meta_data,
    }
}

/// Order identity returned by the commerce API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedOrder {
    pub id: u64,
    pub order_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{Bike, BikeVariation, SourceData};
    use crate::domain::checkout::Customer;
    use crate::domain::pricing::{InsuranceSelection, PricingEngine, SelectedBike};
    use chrono::NaiveDate;

    fn bike(id: &str, price: i64) -> Bike {
        Bike {
            id: id.to_string(),
            name: format!("Bike {}", id),
            category: None,
            price_per_day: Money::from_units(price),
            available_quantity: 3,
            image_url: None,
            description: String::new(),
            variations: vec![BikeVariation {
                id: "501".to_string(),
                size: Some("M".to_string()),
                price: None,
                stock_quantity: 3,
                in_stock: true,
            }],
            source_data: SourceData::default(),
        }
    }

    fn reservation(insurance_price: i64) -> Reservation {
        Reservation {
            start_date: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 6, 3).unwrap(),
            pickup_time: Some("10:00".to_string()),
            return_time: None,
            bikes: vec![
                SelectedBike::new(bike("12", 20), 2).with_size("M"),
                SelectedBike::new(bike("15", 30), 1),
            ],
            insurance: Some(InsuranceSelection {
                name: "Premium".to_string(),
                price_per_bike_per_day: Money::from_units(insurance_price),
            }),
            customer: Customer {
                first_name: "Ana".to_string(),
                last_name: "García".to_string(),
                email: "ana@example.com".to_string(),
                phone: None,
            },
        }
    }

    fn draft(insurance_price: i64) -> OrderDraft {
        let reservation = reservation(insurance_price);
        let breakdown = PricingEngine::new().breakdown(&reservation.pricing_input());
        OrderDraft::build(&reservation, &breakdown, "EUR").unwrap()
    }

    #[test]
    fn builds_pending_unpaid_order() {
        let order = draft(5);
        assert_eq!(order.status, "pending");
        assert!(!order.set_paid);
        assert_eq!(order.billing.email, "ana@example.com");
    }

    #[test]
    fn line_items_carry_variation_and_totals() {
        let order = draft(5);
        assert_eq!(order.line_items.len(), 2);
        let first = &order.line_items[0];
        assert_eq!(first.product_id, 12);
        assert_eq!(first.variation_id, Some(501));
        assert_eq!(first.total, "120.00");
        assert!(first.meta_data.iter().any(|m| m.key == "Size"));
        assert_eq!(order.line_items[1].variation_id, None);
    }

    #[test]
    fn insurance_becomes_fee_line() {
        let order = draft(5);
        assert_eq!(order.fee_lines.len(), 1);
        assert_eq!(order.fee_lines[0].total, "45.00");
        assert_eq!(order.total(), Money::from_units(120 + 90 + 45));
    }

    #[test]
    fn free_insurance_is_an_explicit_zero_fee() {
        let order = draft(0);
        assert_eq!(order.fee_lines.len(), 1);
        assert_eq!(order.fee_lines[0].total, "0.00");
        assert!(order.fee_lines[0].name.contains("included"));
    }

    #[test]
    fn non_numeric_bike_id_is_rejected() {
        let mut reservation = reservation(5);
        reservation.bikes[0].bike.id = "static-1".to_string();
        let breakdown = PricingEngine::new().breakdown(&reservation.pricing_input());
        let err = OrderDraft::build(&reservation, &breakdown, "EUR").unwrap_err();
        assert_eq!(err.code, ErrorCode::ProductNotFound);
    }

    #[test]
    fn serializes_without_absent_variation_id() {
        let json = serde_json::to_value(draft(5)).unwrap();
        assert!(json["line_items"][1].get("variation_id").is_none());
        assert_eq!(json["set_paid"], serde_json::json!(false));
    }
}
