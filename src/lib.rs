//! Rental Booking - bike rental booking backend
//!
//! Resolves the rental catalogue through a chain of sources (product
//! database, commerce API, cached snapshots, a static list), prices
//! reservations authoritatively and hands them to the shop's checkout. Every
//! outbound call is guarded by per-upstream circuit breakers and rate limiters.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
