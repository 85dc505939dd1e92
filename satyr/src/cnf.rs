//! CNF formulas.
pub use satyr_formula::cnf::CnfFormula;
