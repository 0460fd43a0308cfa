//! Diff selection and budgeting.
//!
//! Narrows a pull request's changed files with include/exclude globs, clamps
//! the character budget, and concatenates the surviving patches into a
//! digest that never exceeds that budget.

pub mod budget;
pub mod chunker;
pub mod filter;
pub mod glob;
