//! Checkout: reservation state, the commerce order payload and the handoff
//! URLs the customer is redirected to.

mod handoff;
mod order;
mod reservation;

pub use handoff::{
    fallback_checkout_url, pay_for_order_url, CheckoutHandoff, CrmBike, CrmInsurance, CrmPayload,
    CrmRental,
};
pub use order::{Billing, CreatedOrder, FeeLine, OrderDraft, OrderLineItem};
pub use reservation::{rental_days, Customer, Reservation};
