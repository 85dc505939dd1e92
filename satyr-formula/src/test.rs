//! Formula generators for solver tests.
use proptest::{prelude::*, *};

use rand::distributions::Bernoulli;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::cnf::CnfFormula;
use crate::lit::Lit;

/// Generate a satisfiable instance.
///
/// Plants a random full assignment and emits only clauses compatible with it,
/// so the result is satisfiable by construction.
pub fn sat_formula(
    vars: impl Strategy<Value = usize>,
    clause_count: impl Strategy<Value = usize>,
    density: impl Strategy<Value = f64>,
    polarity_dist: impl Strategy<Value = f64>,
) -> impl Strategy<Value = CnfFormula> {
    (vars, clause_count, density, polarity_dist).prop_flat_map(
        |(vars, clause_count, density, polarity_dist)| {
            let density = Bernoulli::new(density).unwrap();
            let polarity_dist = Bernoulli::new(polarity_dist).unwrap();

            collection::vec(bool::ANY, vars).prop_perturb(move |polarity, mut rng| {
                let mut clauses: Vec<Vec<Lit>> = vec![];
                let lits = polarity
                    .into_iter()
                    .enumerate()
                    .map(|(index, polarity)| Lit::from_index(index, polarity))
                    .collect::<Vec<_>>();

                for _ in 0..clause_count {
                    let &fixed_lit = lits.choose(&mut rng).unwrap();
                    let mut clause = vec![fixed_lit];
                    for &lit in lits.iter() {
                        if lit != fixed_lit && rng.sample(density) {
                            clause.push(lit ^ rng.sample(polarity_dist));
                        }
                    }
                    clause.shuffle(&mut rng);
                    clauses.push(clause);
                }

                clauses.shuffle(&mut rng);
                CnfFormula::from(clauses)
            })
        },
    )
}

/// Generate small hard unsat instances.
///
/// Implementation of http://www.cs.qub.ac.uk/~i.spence/sgen/ but with random
/// partitions.
pub fn sgen_unsat_formula(
    blocks: impl Strategy<Value = usize>,
) -> impl Strategy<Value = CnfFormula> {
    blocks.prop_flat_map(|blocks| {
        collection::vec(bool::ANY, blocks * 4 + 1).prop_perturb(|polarity, mut rng| {
            let mut clauses: Vec<Vec<Lit>> = vec![];
            let mut lits = polarity
                .into_iter()
                .enumerate()
                .map(|(index, polarity)| Lit::from_index(index, polarity))
                .collect::<Vec<_>>();

            for &invert in [false, true].iter() {
                lits.shuffle(&mut rng);
                for block in lits.chunks_exact(4) {
                    for a in 0..4 {
                        for b in 0..a {
                            for c in 0..b {
                                let mut clause =
                                    vec![block[a] ^ invert, block[b] ^ invert, block[c] ^ invert];
                                clause.shuffle(&mut rng);
                                clauses.push(clause);
                            }
                        }
                    }
                }
                let &lit_a = lits.last().unwrap();
                for b in 0..4 {
                    for c in 0..b {
                        let mut clause = vec![lit_a ^ invert, lits[b] ^ invert, lits[c] ^ invert];
                        clause.shuffle(&mut rng);
                        clauses.push(clause);
                    }
                }
            }

            clauses.shuffle(&mut rng);
            CnfFormula::from(clauses)
        })
    })
}

/// The pigeon hole principle for `holes + 1` pigeons and `holes` holes.
///
/// Variable `pigeon * holes + hole` (0-based) means the pigeon sits in the
/// hole. Unsatisfiable for every `holes >= 1`.
pub fn pigeon_hole_formula(holes: usize) -> CnfFormula {
    let pigeons = holes + 1;
    let mut formula = CnfFormula::new();

    for pigeon in 0..pigeons {
        let clause: Vec<_> = (0..holes)
            .map(|hole| Lit::from_index(pigeon * holes + hole, true))
            .collect();
        formula.add_clause(clause);
    }

    for hole in 0..holes {
        for pigeon_a in 0..pigeons {
            for pigeon_b in 0..pigeon_a {
                formula.add_clause(
                    [
                        Lit::from_index(pigeon_a * holes + hole, false),
                        Lit::from_index(pigeon_b * holes + hole, false),
                    ]
                    .iter()
                    .cloned(),
                );
            }
        }
    }

    formula
}

/// Generate a pigeon hole instance with shuffled clause and literal order.
pub fn pigeon_hole(holes: impl Strategy<Value = usize>) -> impl Strategy<Value = CnfFormula> {
    holes.prop_flat_map(|holes| {
        Just(()).prop_perturb(move |_, mut rng| {
            let mut clauses: Vec<Vec<Lit>> = pigeon_hole_formula(holes)
                .iter()
                .map(|clause| clause.to_vec())
                .collect();
            for clause in clauses.iter_mut() {
                clause.shuffle(&mut rng);
            }
            clauses.shuffle(&mut rng);
            CnfFormula::from(clauses)
        })
    })
}
