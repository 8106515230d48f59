//! Allotment
//!
//! Allotment finds the cheapest way to draw a number of units from several
//! independent lanes. Each lane offers a run of discounted units up to its capacity,
//! then penalty units without limit, and every unit costs more than the one before it.
//! The allocator searches for the least marginal cost that covers the target, trims
//! the units tied at that cost, and tallies the exact total in 128-bit arithmetic.

pub mod allocation;
pub mod cases;
pub mod fixtures;
pub mod lanes;
pub mod observer;
pub mod prelude;
pub mod report;
pub mod solvers;
pub mod tally;
pub mod threshold;
