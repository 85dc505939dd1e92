//! DIMACS CNF parsing and writing.
pub use satyr_dimacs::{
    write_dimacs, write_dimacs_clauses, write_dimacs_header, DimacsHeader, DimacsParser,
    ParserError,
};
