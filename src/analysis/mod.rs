//! Analysis Layer
//!
//! Turns raw recognized text into candidate line items.

pub mod extract;
