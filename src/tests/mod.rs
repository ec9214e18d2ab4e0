//! # Crate Test Suite
//!
//! Cross-module tests that run whole itinerary searches against synthetic
//! tide data, a leg analysis over a stored one-day NOAA payload, plus the
//! fakes shared with the per-module unit tests. Nothing here touches the
//! network.

mod itinerary_tests;
mod scenario_tests;
pub(crate) mod support;
