//! # Cascade Waterfall Engine
//!
//! This crate implements the exit-waterfall distribution across a stack of
//! equity classes and the breakeven search between common and preferred
//! proceeds. It is the numerical heart of the system.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of
//!   files, configuration, or rendering. It depends only on `core-types`
//!   (Layer 0).
//! - **Stateless Calculation:** The `DistributionEngine` builds fresh working
//!   data on every call and discards it on return. This keeps it re-entrant,
//!   which the `BreakevenSolver` relies on when it drives the engine through
//!   up to a hundred bisection iterations.
//! - **Exact Arithmetic:** All money flows through `rust_decimal::Decimal`.
//!   Binary floating point never appears in the money path, so identical
//!   inputs always produce byte-identical outputs.
//!
//! ## Public API
//!
//! - `analyze`: The main entry point; resolves the stacking order, runs the
//!   distribution and breakeven search, and assembles a `WaterfallAnalysis`.
//! - `DistributionEngine`: Applies preferences, residual sharing, caps and
//!   conversion analysis for a single exit amount.
//! - `BreakevenSolver`: Bounded bisection over the engine.
//! - `WaterfallError`: The specific error types that can be returned from
//!   this crate.

// Declare the modules that constitute this crate.
pub mod breakeven;
pub mod engine;
pub mod error;
pub mod report;
pub mod rounding;
pub mod stacking;

// Re-export the key components to create a clean, public-facing API.
pub use breakeven::{BreakevenResult, BreakevenSolver};
pub use engine::DistributionEngine;
pub use error::WaterfallError;
pub use report::{ShareClassAllocation, WaterfallAnalysis};
pub use stacking::resolve_stacking_order;

use core_types::ShareClassInput;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Runs a complete waterfall analysis for one exit amount.
///
/// Resolves the stacking order (honoring `custom_order` when supplied),
/// distributes the proceeds, solves for the common/preferred breakeven and
/// assembles the timestamped result.
///
/// # Arguments
///
/// * `classes` - The capitalization snapshot, one record per equity class.
/// * `exit_amount` - Total proceeds of the exit to distribute.
/// * `custom_order` - Optional list of class IDs overriding the seniority
///   stacking order.
///
/// # Returns
///
/// A `Result` containing the `WaterfallAnalysis` or a `WaterfallError` if
/// the snapshot is empty or the custom order names an unknown class.
pub fn analyze(
    classes: &[ShareClassInput],
    exit_amount: Decimal,
    custom_order: Option<&[Uuid]>,
) -> Result<WaterfallAnalysis, WaterfallError> {
    if classes.is_empty() {
        return Err(WaterfallError::EmptySnapshot);
    }

    let ordered = resolve_stacking_order(classes, custom_order)?;

    let engine = DistributionEngine::new();
    let allocations = engine.distribute(&ordered, exit_amount);
    let breakeven = BreakevenSolver::new().solve(&ordered);

    tracing::debug!(
        classes = ordered.len(),
        %exit_amount,
        "generated waterfall analysis"
    );

    Ok(WaterfallAnalysis::assemble(exit_amount, allocations, breakeven))
}
