//! The two independent clusterers whose outputs are merged into a palette.
//!
//! [`kmeans`] is the primary, randomly seeded algorithm. [`median_cut`] is
//! deterministic and is run alongside it to validate and fill gaps.

pub mod kmeans;
pub mod median_cut;

pub use kmeans::kmeans;
pub use median_cut::median_cut;
