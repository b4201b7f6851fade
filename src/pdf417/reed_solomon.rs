//! Reed-Solomon error correction over GF(929).
//!
//! Polynomials are stored highest degree first.
use lazy_static::lazy_static;

use super::{Codeword, EcLevel, MODULUS};

const M: u32 = MODULUS as u32;

/// Generator polynomial roots are powers of this element.
pub const PRIMITIVE: u32 = 3;

lazy_static! {
    static ref GENERATORS: Vec<Vec<u32>> = (0..=EcLevel::MAX.get())
        .map(|level| generator(2usize << level))
        .collect();
}

fn sub(a: u32, b: u32) -> u32 {
    (a + M - b % M) % M
}

pub fn pow(base: u32, mut exp: usize) -> u32 {
    let mut base = base % M;
    let mut result = 1;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result * base % M;
        }
        base = base * base % M;
        exp >>= 1;
    }
    result
}

/// Product of `(x - 3^i)` for `i` in `0..count`, monic.
fn generator(count: usize) -> Vec<u32> {
    let mut g = Vec::with_capacity(count + 1);
    g.push(1);

    let mut root = 1;
    for _ in 0..count {
        g.push(0);
        for j in (1..g.len()).rev() {
            g[j] = sub(g[j], root * g[j - 1] % M);
        }
        root = root * PRIMITIVE % M;
    }

    g
}

/// Generator polynomial of the given level.
pub fn generator_for(level: EcLevel) -> &'static [u32] {
    &GENERATORS[level.get() as usize]
}

/// Error correction codewords for `data`.
///
/// The result is the negated remainder of `data(x) * x^k` divided by the
/// generator, so that appending it to `data` yields a polynomial with a root
/// at every `3^i`.
pub fn error_correction(data: &[Codeword], level: EcLevel) -> Vec<Codeword> {
    let g = generator_for(level);
    let k = g.len() - 1;
    let mut r = vec![0u32; k];

    for &d in data {
        let feedback = (d as u32 + r[0]) % M;
        for i in 0..k - 1 {
            r[i] = sub(r[i + 1], feedback * g[i + 1] % M);
        }
        r[k - 1] = sub(0, feedback * g[k] % M);
    }

    r.into_iter().map(|c| sub(0, c) as Codeword).collect()
}

/// Evaluates a codeword polynomial at `x`.
pub fn evaluate(poly: &[Codeword], x: u32) -> u32 {
    poly.iter()
        .fold(0, |acc, &c| (acc * x % M + c as u32) % M)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn level(n: u8) -> EcLevel {
        EcLevel::new(n).unwrap()
    }

    fn assert_roots(data: &[Codeword], level: EcLevel) {
        let ec = error_correction(data, level);
        assert_eq!(ec.len(), level.codeword_count());
        assert!(ec.iter().all(|&c| c < MODULUS));

        let mut full = data.to_vec();
        full.extend(ec);
        for i in 0..level.codeword_count() {
            assert_eq!(evaluate(&full, pow(PRIMITIVE, i)), 0, "root 3^{i}");
        }
    }

    #[test]
    fn generator_roots() {
        for n in 0..=EcLevel::MAX.get() {
            let g = generator_for(level(n));
            assert_eq!(g.len(), level(n).codeword_count() + 1);
            assert_eq!(g[0], 1);

            let g: Vec<Codeword> = g.iter().map(|&c| c as Codeword).collect();
            assert_eq!(evaluate(&g, 1), 0);
            assert_eq!(evaluate(&g, PRIMITIVE), 0);
        }
    }

    #[test]
    fn level_zero() {
        // (x - 1)(x - 3) = x^2 - 4x + 3
        assert_eq!(generator_for(level(0)), &[1, M - 4, 3]);
        assert_roots(&[5, 453, 178, 121, 239], level(0));
    }

    #[test]
    fn all_levels() {
        let data: Vec<Codeword> = (0..40).map(|i| (i * 37 % 929) as Codeword).collect();
        for n in 0..=EcLevel::MAX.get() {
            assert_roots(&data, level(n));
        }
    }

    #[test]
    fn zero_data() {
        assert!(error_correction(&[0; 10], level(3)).iter().all(|&c| c == 0));
    }

    proptest! {
        #[test]
        fn codeword_polynomial_vanishes(
            data in proptest::collection::vec(0u16..929, 1..100),
            n in 0u8..=5,
        ) {
            let level = level(n);
            let mut full = data.clone();
            full.extend(error_correction(&data, level));
            for i in 0..level.codeword_count() {
                prop_assert_eq!(evaluate(&full, pow(PRIMITIVE, i)), 0);
            }
        }
    }
}
