//! Temporary data.
use crate::lit::Lit;

/// Scratch buffers shared by clause loading and simplification.
#[derive(Default)]
pub struct TmpData {
    pub lits: Vec<Lit>,
}
