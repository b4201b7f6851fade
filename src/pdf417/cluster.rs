//! Codeword bar/space patterns.
//!
//! A pattern is 4 bars and 4 spaces, alternating and starting with a bar, each
//! 1 to 6 modules wide and 17 modules in total. Its cluster is given by
//! `(b1 - b2 + b3 - b4) mod 9`, which must be 0, 3 or 6. Consecutive rows
//! cycle through the three clusters.
use lazy_static::lazy_static;

use super::Codeword;

pub const PATTERN_MODULES: usize = 17;

pub const MAX_WIDTH: u8 = 6;

pub const CLUSTER_COUNT: usize = 3;

/// Run lengths, bar first.
pub type Pattern = [u8; 8];

lazy_static! {
    static ref TABLES: [Vec<Pattern>; CLUSTER_COUNT] = build_tables();
}

fn build_tables() -> [Vec<Pattern>; CLUSTER_COUNT] {
    let mut tables: [Vec<Pattern>; CLUSTER_COUNT] = Default::default();
    let widths = 1..=MAX_WIDTH;

    for b1 in widths.clone() {
        for s1 in widths.clone() {
            for b2 in widths.clone() {
                for s2 in widths.clone() {
                    for b3 in widths.clone() {
                        for s3 in widths.clone() {
                            for b4 in widths.clone() {
                                let used = b1 + s1 + b2 + s2 + b3 + s3 + b4;
                                let Some(s4) = (PATTERN_MODULES as u8).checked_sub(used) else {
                                    continue;
                                };

                                if !widths.contains(&s4) {
                                    continue;
                                }

                                let pattern = [b1, s1, b2, s2, b3, s3, b4, s4];
                                if let Some(cluster) = cluster_of(&pattern) {
                                    tables[cluster].push(pattern);
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    tables
}

/// Cluster a pattern belongs to, if any.
pub fn cluster_of(pattern: &Pattern) -> Option<usize> {
    let [b1, _, b2, _, b3, _, b4, _] = (*pattern).map(|w| w as i32);
    match (b1 - b2 + b3 - b4).rem_euclid(9) {
        0 => Some(0),
        3 => Some(1),
        6 => Some(2),
        _ => None,
    }
}

/// Every pattern of a cluster, in enumeration order.
pub fn table(cluster: usize) -> &'static [Pattern] {
    &TABLES[cluster % CLUSTER_COUNT]
}

/// Pattern of a codeword in the given cluster.
pub fn pattern(codeword: Codeword, cluster: usize) -> &'static Pattern {
    let table = table(cluster);
    &table[codeword as usize % table.len()]
}

/// Appends the modules of a run length sequence, bars as `1`.
pub fn push_modules(out: &mut Vec<u8>, widths: &[u8]) {
    for (i, &width) in widths.iter().enumerate() {
        let bit = if i % 2 == 0 { 1 } else { 0 };
        out.extend(std::iter::repeat(bit).take(width as usize));
    }
}

/// Run lengths of a module sequence starting with a bar.
pub fn run_lengths(modules: &[u8]) -> Vec<u8> {
    let mut runs: Vec<u8> = Vec::new();
    let mut current = None;

    for &m in modules {
        if current == Some(m) {
            if let Some(last) = runs.last_mut() {
                *last += 1;
            }
        } else {
            runs.push(1);
            current = Some(m);
        }
    }

    runs
}
