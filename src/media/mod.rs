//! Payloads that travel through the pipeline.

/// Coded input units.
pub mod access_unit;
/// Decoded and composed pictures.
pub mod picture;
