//! Reservation state submitted at checkout.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::DomainError;
use crate::domain::pricing::{InsuranceSelection, ReservationPricingInput, SelectedBike};

/// Billing contact for the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

impl Customer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.first_name.trim().is_empty() {
            return Err(DomainError::empty_field("first_name"));
        }
        if self.last_name.trim().is_empty() {
            return Err(DomainError::empty_field("last_name"));
        }
        let email = self.email.trim();
        if email.is_empty() {
            return Err(DomainError::empty_field("email"));
        }
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
            _ => Err(DomainError::validation("email", "Email address is not valid")),
        }
    }
}

/// Rental days between two dates, counting both the start and the end date.
///
/// Zero or negative when the end precedes the start.
pub fn rental_days(start_date: NaiveDate, end_date: NaiveDate) -> i64 {
    (end_date - start_date).num_days() + 1
}

/// A booking ready to be priced and handed to the commerce backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Reservation {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub pickup_time: Option<String>,
    pub return_time: Option<String>,
    pub bikes: Vec<SelectedBike>,
    pub insurance: Option<InsuranceSelection>,
    pub customer: Customer,
}

impl Reservation {
    pub fn total_days(&self) -> i64 {
        rental_days(self.start_date, self.end_date)
    }

    pub fn pricing_input(&self) -> ReservationPricingInput {
        ReservationPricingInput {
            bikes: self.bikes.clone(),
            total_days: self.total_days(),
            insurance: self.insurance.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer() -> Customer {
        Customer {
            first_name: "Ana".to_string(),
            last_name: "García".to_string(),
            email: "ana@example.com".to_string(),
            phone: Some("+34 600 000 000".to_string()),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn reservation(start: NaiveDate, end: NaiveDate) -> Reservation {
        Reservation {
            start_date: start,
            end_date: end,
            pickup_time: None,
            return_time: None,
            bikes: Vec::new(),
            insurance: None,
            customer: customer(),
        }
    }

    #[test]
    fn same_day_rental_lasts_one_day() {
        let day = date(2026, 5, 1);
        assert_eq!(reservation(day, day).total_days(), 1);
    }

    #[test]
    fn days_count_both_ends() {
        assert_eq!(reservation(date(2026, 5, 1), date(2026, 5, 4)).total_days(), 4);
    }

    #[test]
    fn end_before_start_gives_non_positive_days() {
        assert!(reservation(date(2026, 5, 4), date(2026, 5, 1)).total_days() <= 0);
    }

    #[test]
    fn pricing_input_carries_day_count() {
        let input = reservation(date(2026, 5, 1), date(2026, 5, 7)).pricing_input();
        assert_eq!(input.total_days, 7);
    }

    #[test]
    fn customer_requires_valid_email() {
        assert!(customer().validate().is_ok());
        let mut bad = customer();
        bad.email = "ana.example.com".to_string();
        assert!(bad.validate().is_err());
        bad.email = "  ".to_string();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn customer_requires_names() {
        let mut bad = customer();
        bad.first_name = String::new();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn full_name_joins_parts() {
        assert_eq!(customer().full_name(), "Ana García");
    }
}
