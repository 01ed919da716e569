//! # Cascade Cap Table
//!
//! This crate assembles the immutable capitalization snapshot the waterfall
//! engine consumes. It resolves each class's share count to include vested
//! as-if-exercised options and as-if-converted convertible instruments, and
//! derives the original investment basis from closed funding rounds.
//!
//! The builder produces a *new* snapshot array on every call; cap table
//! records are never mutated, so a snapshot handed to the engine can never
//! change underneath it.

// Declare the modules that constitute this crate.
pub mod builder;
pub mod convertible;
pub mod error;
pub mod records;
pub mod vesting;

// Re-export the key components to create a clean, public-facing API.
pub use builder::{CapSnapshot, SnapshotBuilder};
pub use convertible::ConversionOutcome;
pub use error::CapTableError;
pub use records::{
    CapTable, ConvertibleInstrument, FundingRound, OptionGrant, ShareClassRecord, Shareholding,
};
