//! Logging front-end selection.
//!
//! On-target builds enable the `defmt` feature and log through an RTT
//! sink; host builds (and tests) fall back to the `log` facade.

#[cfg(feature = "defmt")]
pub use defmt::{info, warn};

#[cfg(not(feature = "defmt"))]
pub use log::{info, warn};
