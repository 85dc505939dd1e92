//! DIMACS CNF parser and writer for the Satyr SAT solver.

use std::{borrow::Borrow, io, mem::replace};

use satyr_formula::{CnfFormula, Lit, Var};

use anyhow::Error;
use thiserror::Error;

/// Possible errors while parsing a DIMACS CNF formula.
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("line {}: Unexpected character in DIMACS CNF input: '{}'", line, unexpected)]
    UnexpectedInput { line: usize, unexpected: char },
    #[error("line {}: Literal index is too large: {}", line, index)]
    LiteralTooLarge { line: usize, index: usize },
    #[error("line {}: Invalid header syntax: {}", line, header)]
    InvalidHeader { line: usize, header: String },
    #[error("line {}: Unterminated clause", line)]
    UnterminatedClause { line: usize },
    #[error(
        "Formula has {} variables while the header specifies {} variables",
        var_count,
        header_var_count
    )]
    VarCount {
        var_count: usize,
        header_var_count: usize,
    },
    #[error(
        "Formula has {} clauses while the header specifies {} clauses",
        clause_count,
        header_clause_count
    )]
    ClauseCount {
        clause_count: usize,
        header_clause_count: usize,
    },
}

/// Variable and clause count of a DIMACS CNF header.
#[derive(Copy, Clone, Debug)]
pub struct DimacsHeader {
    pub var_count: usize,
    pub clause_count: usize,
}

/// Parser for DIMACS CNF files.
///
/// Comment lines start with `c`. A `p cnf <vars> <clauses>` header, if
/// present, is checked against the parsed formula. Clauses are lists of
/// non-zero signed integers terminated by `0`; a clause may span lines and a
/// line may hold several clauses.
#[derive(Default)]
pub struct DimacsParser {
    formula: CnfFormula,
    partial_clause: Vec<Lit>,
    header: Option<DimacsHeader>,

    line_number: usize,
    clause_count: usize,
}

impl DimacsParser {
    /// Create a new DIMACS CNF parser.
    pub fn new() -> DimacsParser {
        DimacsParser {
            formula: CnfFormula::new(),
            partial_clause: vec![],
            header: None,
            line_number: 1,
            clause_count: 0,
        }
    }

    /// Parse the given input into a formula, checking the header if present.
    pub fn parse(mut input: impl io::Read) -> Result<CnfFormula, Error> {
        let mut bytes = vec![];
        input.read_to_end(&mut bytes)?;

        let mut parser = DimacsParser::new();
        parser.parse_bytes(&bytes)?;
        parser.eof()?;
        parser.check_header()?;
        Ok(parser.take_formula())
    }

    /// Parse a complete byte buffer.
    pub fn parse_bytes(&mut self, bytes: &[u8]) -> Result<(), ParserError> {
        let mut pos = 0;
        let mut start_of_line = true;

        while pos < bytes.len() {
            let byte = bytes[pos];
            match byte {
                b'\n' => {
                    self.line_number += 1;
                    start_of_line = true;
                    pos += 1;
                }
                b'\r' => {
                    pos += 1;
                }
                b' ' | b'\t' => {
                    start_of_line = false;
                    pos += 1;
                }
                b'c' if start_of_line => {
                    pos = skip_line(bytes, pos);
                }
                b'p' if start_of_line && self.header.is_none() => {
                    let end = line_end(bytes, pos);
                    self.parse_header_line(&bytes[pos..end])?;
                    pos = end;
                }
                b'-' | b'0'..=b'9' => {
                    pos = self.parse_literal(bytes, pos)?;
                    start_of_line = false;
                }
                _ => {
                    return Err(ParserError::UnexpectedInput {
                        line: self.line_number,
                        unexpected: byte as char,
                    });
                }
            }
        }

        Ok(())
    }

    /// Finish parsing the input.
    ///
    /// This does not compare against the header, call
    /// [`check_header`](DimacsParser::check_header) for that.
    pub fn eof(&self) -> Result<(), ParserError> {
        if !self.partial_clause.is_empty() {
            return Err(ParserError::UnterminatedClause {
                line: self.line_number,
            });
        }
        Ok(())
    }

    /// Verify the header information when present.
    ///
    /// Does nothing when the input had no header.
    pub fn check_header(&self) -> Result<(), ParserError> {
        if let Some(header) = self.header {
            let var_count = self.formula.var_count();
            if var_count != header.var_count {
                return Err(ParserError::VarCount {
                    var_count,
                    header_var_count: header.var_count,
                });
            }

            if self.clause_count != header.clause_count {
                return Err(ParserError::ClauseCount {
                    clause_count: self.clause_count,
                    header_clause_count: header.clause_count,
                });
            }
        }

        Ok(())
    }

    /// Remove and return the formula parsed so far.
    ///
    /// The variable count of the returned formula is the maximum of the
    /// largest variable seen and the header's count if present.
    pub fn take_formula(&mut self) -> CnfFormula {
        let mut new_formula = CnfFormula::new();
        new_formula.set_var_count(self.formula.var_count());
        replace(&mut self.formula, new_formula)
    }

    /// The DIMACS CNF header data if present.
    pub fn header(&self) -> Option<DimacsHeader> {
        self.header
    }

    /// Number of clauses parsed.
    pub fn clause_count(&self) -> usize {
        self.clause_count
    }

    /// Number of variables in the parsed formula.
    pub fn var_count(&self) -> usize {
        self.formula.var_count()
    }

    fn parse_literal(&mut self, bytes: &[u8], mut pos: usize) -> Result<usize, ParserError> {
        let negative = bytes[pos] == b'-';
        if negative {
            pos += 1;
        }

        let mut value = 0usize;
        let mut digits = 0;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            value = value * 10 + (bytes[pos] - b'0') as usize;
            if value > Var::max_count() {
                return Err(ParserError::LiteralTooLarge {
                    line: self.line_number,
                    index: value,
                });
            }
            digits += 1;
            pos += 1;
        }

        if digits == 0 || (pos < bytes.len() && !bytes[pos].is_ascii_whitespace()) {
            return Err(ParserError::UnexpectedInput {
                line: self.line_number,
                unexpected: bytes.get(pos).map(|&b| b as char).unwrap_or('-'),
            });
        }

        if value == 0 {
            self.formula.add_clause(&self.partial_clause);
            self.partial_clause.clear();
            self.clause_count += 1;
        } else {
            self.partial_clause
                .push(Var::from_dimacs(value as isize).lit(!negative));
        }

        Ok(pos)
    }

    fn parse_header_line(&mut self, line: &[u8]) -> Result<(), ParserError> {
        let header_line = String::from_utf8_lossy(line).trim_end().to_owned();

        let mut fields = header_line.split_whitespace();

        if fields.next() != Some("p") || fields.next() != Some("cnf") {
            return self.invalid_header(header_line);
        }

        let var_count: usize = match fields.next().and_then(|value| str::parse(value).ok()) {
            None => return self.invalid_header(header_line),
            Some(value) => value,
        };

        if var_count > Var::max_count() {
            return Err(ParserError::LiteralTooLarge {
                line: self.line_number,
                index: var_count,
            });
        }

        let clause_count: usize = match fields.next().and_then(|value| str::parse(value).ok()) {
            None => return self.invalid_header(header_line),
            Some(value) => value,
        };

        if fields.next().is_some() {
            return self.invalid_header(header_line);
        }

        self.header = Some(DimacsHeader {
            var_count,
            clause_count,
        });

        self.formula.set_var_count(var_count);

        Ok(())
    }

    fn invalid_header(&self, header_line: String) -> Result<(), ParserError> {
        Err(ParserError::InvalidHeader {
            line: self.line_number,
            header: header_line,
        })
    }
}

/// Byte offset just past the current line's contents, excluding the newline.
fn line_end(bytes: &[u8], pos: usize) -> usize {
    bytes[pos..]
        .iter()
        .position(|&b| b == b'\n')
        .map(|offset| pos + offset)
        .unwrap_or(bytes.len())
}

fn skip_line(bytes: &[u8], pos: usize) -> usize {
    line_end(bytes, pos)
}

/// Write a DIMACS CNF header.
///
/// Can be used with [`write_dimacs_clauses`] to implement incremental writing.
pub fn write_dimacs_header(target: &mut impl io::Write, header: DimacsHeader) -> io::Result<()> {
    writeln!(target, "p cnf {} {}", header.var_count, header.clause_count)
}

/// Write an iterator of clauses as headerless DIMACS CNF.
pub fn write_dimacs_clauses(
    target: &mut impl io::Write,
    clauses: impl IntoIterator<Item = impl IntoIterator<Item = impl Borrow<Lit>>>,
) -> io::Result<()> {
    for clause in clauses.into_iter() {
        for lit in clause.into_iter() {
            itoa::write(&mut *target, lit.borrow().to_dimacs())?;
            target.write_all(b" ")?;
        }
        target.write_all(b"0\n")?;
    }
    Ok(())
}

/// Write a formula as DIMACS CNF.
pub fn write_dimacs(target: &mut impl io::Write, formula: &CnfFormula) -> io::Result<()> {
    write_dimacs_header(
        &mut *target,
        DimacsHeader {
            var_count: formula.var_count(),
            clause_count: formula.len(),
        },
    )?;
    write_dimacs_clauses(&mut *target, formula.iter())
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::*;

    use satyr_formula::{cnf::strategy::*, cnf_formula};

    #[test]
    fn odd_whitespace() -> Result<(), Error> {
        let parsed = DimacsParser::parse(
            b"p  cnf  4   3  \n  1  \n 2  3\n0 -4 0 2\nccomment  \n\n0\n\n" as &[_],
        )?;

        let expected = cnf_formula![
            1, 2, 3;
            -4;
            2;
        ];

        assert_eq!(parsed, expected);

        Ok(())
    }

    macro_rules! expect_error {
        ( $input:expr, $( $cases:tt )* ) => {
            match DimacsParser::parse($input as &[_]) {
                Ok(parsed) => panic!("expected an error but got {:?}", parsed),
                Err(err) => match err.downcast_ref() {
                    Some(casted_err) => match casted_err {
                        $( $cases )*,
                        _ => panic!("unexpected error {:?}", casted_err),
                    },
                    None => panic!("unexpected error type {:?}", err),
                }
            }
        };
    }

    #[test]
    fn invalid_headers() {
        expect_error!(b"p notcnf 1 3", ParserError::InvalidHeader { .. } => ());
        expect_error!(b"p cnf 1", ParserError::InvalidHeader { .. } => ());
        expect_error!(b"p cnf 1 2 3", ParserError::InvalidHeader { .. } => ());
        expect_error!(b"p cnf foo bar", ParserError::InvalidHeader { .. } => ());
        expect_error!(b"p cnf -3 -6", ParserError::InvalidHeader { .. } => ());
    }

    #[test]
    fn count_mismatches() {
        expect_error!(b"p cnf 2 2\n1 2 0\n", ParserError::ClauseCount { .. } => ());
        expect_error!(b"p cnf 1 1\n1 2 0\n", ParserError::VarCount { .. } => ());
    }

    #[test]
    fn unterminated_clause() {
        expect_error!(b"p cnf 2 1\n1 2\n", ParserError::UnterminatedClause { .. } => ());
    }

    #[test]
    fn unexpected_characters() {
        expect_error!(b"p cnf 2 1\n1 x 0\n", ParserError::UnexpectedInput { .. } => ());
        expect_error!(b"1 2- 0\n", ParserError::UnexpectedInput { .. } => ());
        expect_error!(b"1 c 0\n", ParserError::UnexpectedInput { .. } => ());
    }

    proptest! {
        #[test]
        fn write_parse_roundtrip(formula in cnf_formula(1..100usize, 0..100, 0..10)) {
            let mut written = vec![];
            write_dimacs(&mut written, &formula).unwrap();

            let parsed = DimacsParser::parse(&written[..]).unwrap();

            prop_assert_eq!(parsed, formula);
        }
    }
}
