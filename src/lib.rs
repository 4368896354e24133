//! Flashsale
//!
//! Flashsale resolves which time-bounded promotion applies to an order at a
//! given instant, including an optional dynamic pricing tail after a campaign
//! ends, and prices orders under the resolved offer.

pub mod countdown;
pub mod fixtures;
pub mod instants;
pub mod observability;
pub mod orders;
pub mod prelude;
pub mod pricing;
pub mod promotions;
pub mod receipt;
pub mod resolver;
pub mod ticker;
