//! Core harmonization stages.

pub mod cloud_mask;
pub mod harmonize;
pub mod indices;
pub mod merge;
pub mod scale;

// Re-export main entry points
pub use cloud_mask::mask_clouds;
pub use harmonize::harmonize_bands;
pub use indices::{ndmi, ndvi, NDVI_PALETTE};
pub use merge::{merge_collections, CollectionSnapshot};
pub use scale::apply_scale_factors;
