//! Literals and variables.
pub use satyr_formula::{lit::LitIdx, Lit, Var};
