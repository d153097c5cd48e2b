//! Payments domain module (no IO, no HTTP, no storage).
//!
//! Only the minimal create/confirm state needed to mark an order paid.

pub mod payment;

pub use payment::{Confirmation, Payment, PaymentError};
