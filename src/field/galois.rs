//! Finite fields GF(q) backed by precomputed arithmetic tables.
//!
//! Elements are integer indices in `[0, q)`. Index `i` stands for the
//! polynomial whose coefficients are the base-p digits of `i` (least
//! significant digit = constant term). Addition and multiplication are
//! looked up in q×q tables built once at construction time and validated
//! against the field axioms before the field is handed out.

use std::ops::Range;

use log::debug;

use super::poly::{Poly, PolyRing, MAX_EXTENSION_DEGREE};
use crate::error::{Result, TopologyError};

/// An element of GF(q), as an index in `[0, q)`.
pub type FieldElement = u32;

/// Largest field order whose construction is supported.
///
/// Tables are q×q, and the reducing polynomial must fit the fixed-width
/// polynomial representation (2^8 = 256 is the largest binary field).
pub const MAX_FIELD_ORDER: u32 = 256;

/// Deterministic trial-division primality test.
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut d = 3u64;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}

/// Splits a field order into `(p, n)` with `q = p^n` and `p` prime.
///
/// # Errors
///
/// `InvalidFieldOrder` if `q < 2` or `q` is not a prime power.
pub fn factor(q: u32) -> Result<(u32, u32)> {
    if q < 2 {
        return Err(TopologyError::InvalidFieldOrder(q as u64));
    }
    let wide = q as u64;
    let p = if is_prime(wide) {
        q
    } else {
        (2u64..)
            .take_while(|d| d * d <= wide)
            .find(|d| wide % d == 0)
            .ok_or(TopologyError::InvalidFieldOrder(wide))? as u32
    };

    let mut rest = q;
    let mut n = 0;
    while rest % p == 0 {
        rest /= p;
        n += 1;
    }
    if rest != 1 {
        return Err(TopologyError::InvalidFieldOrder(q as u64));
    }
    Ok((p, n))
}

/// Returns true if `q` is a prime power `p^n` with `n >= 1`.
pub fn is_prime_power(q: u32) -> bool {
    factor(q).is_ok()
}

/// Finds the first monic irreducible polynomial of degree `n` over GF(p).
///
/// Candidates are visited in lexicographic order of their tail coefficients
/// `(c_{n-1}, ..., c_0)`: candidate `k` has tail coefficients equal to the
/// base-p digits of `k`, constant term least significant. This order fixes
/// the concrete multiplication table, e.g. GF(4) uses `x^2 + x + 1`, GF(8)
/// uses `x^3 + x + 1` and GF(9) uses `x^2 + 1`.
///
/// For `n = 1` the trivial polynomial `x` is returned.
pub fn find_irreducible(p: u32, n: u32) -> Result<Poly> {
    let q = p.saturating_pow(n);
    let degree = n as usize;
    if degree == 0 || degree > MAX_EXTENSION_DEGREE {
        return Err(TopologyError::FieldConstruction {
            q,
            reason: format!("extension degree {} outside 1..={}", n, MAX_EXTENSION_DEGREE),
        });
    }
    if degree == 1 {
        return Poly::monic(&[0]).ok_or_else(|| TopologyError::FieldConstruction {
            q,
            reason: "cannot represent x".to_string(),
        });
    }

    let ring = PolyRing::new(p);
    let found = ring.monic_polys(degree).find(|f| ring.is_irreducible(f));
    found.ok_or_else(|| TopologyError::FieldConstruction {
        q,
        reason: format!("no irreducible polynomial of degree {} over GF({})", n, p),
    })
}

/// A validated finite field GF(q).
///
/// Built once and never mutated. Share it by reference or through a
/// [`FieldCache`](super::FieldCache).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GaloisField {
    q: u32,
    p: u32,
    n: u32,
    ring: PolyRing,
    modulus: Poly,
    elements: Vec<Poly>,
    add_mat: Vec<FieldElement>,
    mul_mat: Vec<FieldElement>,
    add_inv: Vec<FieldElement>,
    /// `mul_inv[0]` is a placeholder and never handed out.
    mul_inv: Vec<FieldElement>,
}

impl GaloisField {
    /// Constructs and validates GF(q).
    ///
    /// # Errors
    ///
    /// * `InvalidFieldOrder` if `q` is not a prime power.
    /// * `UnsupportedFieldSize` if `q > MAX_FIELD_ORDER`.
    /// * `FieldConstruction` if the generated tables violate a field axiom.
    pub fn new(q: u32) -> Result<Self> {
        let (p, n) = factor(q)?;
        if q > MAX_FIELD_ORDER {
            return Err(TopologyError::UnsupportedFieldSize {
                q: q as u64,
                max: MAX_FIELD_ORDER as u64,
            });
        }

        let modulus = find_irreducible(p, n)?;
        debug!("Building GF({}) = GF({}^{}) with reducing polynomial {}", q, p, n, modulus);

        let ring = PolyRing::new(p);
        let elements: Vec<Poly> = (0..q).map(|i| Poly::from_digits(i as u64, p, n as usize)).collect();

        let mut field = Self {
            q,
            p,
            n,
            ring,
            modulus,
            elements,
            add_mat: Vec::new(),
            mul_mat: Vec::new(),
            add_inv: Vec::new(),
            mul_inv: Vec::new(),
        };
        field.generate_tables()?;
        field.validate()?;

        debug!("GF({}) tables validated", q);
        Ok(field)
    }

    fn construction_error(&self, reason: String) -> TopologyError {
        TopologyError::FieldConstruction { q: self.q, reason }
    }

    fn idx(&self, x: FieldElement, y: FieldElement) -> usize {
        x as usize * self.q as usize + y as usize
    }

    /// Fills the addition and multiplication tables, then derives the
    /// inverse vectors from them.
    fn generate_tables(&mut self) -> Result<()> {
        let q = self.q as usize;
        let mut add_mat = vec![0; q * q];
        let mut mul_mat = vec![0; q * q];

        for i in 0..q {
            for j in 0..q {
                let (a, b) = (&self.elements[i], &self.elements[j]);

                let sum = self.ring.add(a, b);
                add_mat[i * q + j] = self.index_of(&sum)?;

                let product = self.ring.checked_mul(a, b).ok_or_else(|| {
                    self.construction_error(format!("product of {} and {} overflows", i, j))
                })?;
                let reduced = self.ring.rem(&product, &self.modulus).ok_or_else(|| {
                    self.construction_error("reducing polynomial is zero".to_string())
                })?;
                mul_mat[i * q + j] = self.index_of(&reduced)?;
            }
        }
        self.add_mat = add_mat;
        self.mul_mat = mul_mat;

        let mut add_inv = vec![0; q];
        let mut mul_inv = vec![0; q];
        for i in 0..q {
            let row = &self.add_mat[i * q..(i + 1) * q];
            add_inv[i] = unique_position(row, 0, 0)
                .map_err(|count| self.construction_error(format!(
                    "element {} has {} additive inverses", i, count
                )))?;

            if i > 0 {
                let row = &self.mul_mat[i * q..(i + 1) * q];
                mul_inv[i] = unique_position(row, 1, 1)
                    .map_err(|count| self.construction_error(format!(
                        "element {} has {} multiplicative inverses", i, count
                    )))?;
            }
        }
        self.add_inv = add_inv;
        self.mul_inv = mul_inv;
        Ok(())
    }

    /// Checks table symmetry, identity rows and inverse consistency.
    fn validate(&self) -> Result<()> {
        let q = self.q;
        for i in 0..q {
            if self.add(0, i) != i {
                return Err(self.construction_error(format!("0 + {} != {}", i, i)));
            }
            if self.mul(0, i) != 0 {
                return Err(self.construction_error(format!("0 * {} != 0", i)));
            }
            if self.mul(1, i) != i {
                return Err(self.construction_error(format!("1 * {} != {}", i, i)));
            }
            for j in (i + 1)..q {
                if self.add(i, j) != self.add(j, i) {
                    return Err(self.construction_error(format!("addition not symmetric at ({}, {})", i, j)));
                }
                if self.mul(i, j) != self.mul(j, i) {
                    return Err(self.construction_error(format!("multiplication not symmetric at ({}, {})", i, j)));
                }
            }
            if self.add(i, self.add_inv[i as usize]) != 0 {
                return Err(self.construction_error(format!("bad additive inverse for {}", i)));
            }
            if i > 0 && self.mul(i, self.mul_inv[i as usize]) != 1 {
                return Err(self.construction_error(format!("bad multiplicative inverse for {}", i)));
            }
        }
        Ok(())
    }

    fn index_of(&self, poly: &Poly) -> Result<FieldElement> {
        poly.to_index(self.p)
            .filter(|&i| i < self.q as u64)
            .map(|i| i as FieldElement)
            .ok_or_else(|| self.construction_error(format!("polynomial {} is not a reduced element", poly)))
    }

    /// Field order q.
    pub fn order(&self) -> u32 {
        self.q
    }

    /// Prime characteristic p.
    pub fn characteristic(&self) -> u32 {
        self.p
    }

    /// Extension degree n, with q = p^n.
    pub fn degree(&self) -> u32 {
        self.n
    }

    /// The monic reducing polynomial.
    pub fn modulus(&self) -> &Poly {
        &self.modulus
    }

    /// Tail coefficients `[c_0, ..., c_{n-1}]` of the reducing polynomial
    /// `x^n + c_{n-1} x^(n-1) + ... + c_0`. Only meaningful when n > 1.
    pub fn reducing_polynomial(&self) -> Vec<u32> {
        self.modulus.coeffs()[..self.n as usize].to_vec()
    }

    /// All elements in index order.
    pub fn elements(&self) -> Range<FieldElement> {
        0..self.q
    }

    /// Base-p digits of element `i`, length n, constant term first.
    ///
    /// # Panics
    ///
    /// Panics if `i >= q`.
    pub fn compute_coeffs(&self, i: FieldElement) -> Vec<u32> {
        self.elements[i as usize].coeffs()[..self.n as usize].to_vec()
    }

    /// Reduces a coefficient vector modulo p and the reducing polynomial,
    /// then linearises it to an element index.
    ///
    /// Accepts vectors longer than n, such as unreduced products.
    pub fn compute_index(&self, coeffs: &[u32]) -> Result<FieldElement> {
        let poly = Poly::from_coeffs(coeffs).ok_or_else(|| {
            self.construction_error(format!("coefficient vector of length {} is too wide", coeffs.len()))
        })?;
        let reduced = self.ring.rem(&poly, &self.modulus).ok_or_else(|| {
            self.construction_error("reducing polynomial is zero".to_string())
        })?;
        self.index_of(&reduced)
    }

    /// Row `x` of the addition table.
    pub fn add_row(&self, x: FieldElement) -> &[FieldElement] {
        let q = self.q as usize;
        &self.add_mat[x as usize * q..(x as usize + 1) * q]
    }

    /// Row `x` of the multiplication table.
    pub fn mul_row(&self, x: FieldElement) -> &[FieldElement] {
        let q = self.q as usize;
        &self.mul_mat[x as usize * q..(x as usize + 1) * q]
    }

    pub fn add(&self, x: FieldElement, y: FieldElement) -> FieldElement {
        self.add_mat[self.idx(x, y)]
    }

    pub fn add_inv(&self, x: FieldElement) -> FieldElement {
        self.add_inv[x as usize]
    }

    pub fn sub(&self, x: FieldElement, y: FieldElement) -> FieldElement {
        self.add(x, self.add_inv(y))
    }

    pub fn mul(&self, x: FieldElement, y: FieldElement) -> FieldElement {
        self.mul_mat[self.idx(x, y)]
    }

    /// Multiplicative inverse of `x`.
    ///
    /// # Errors
    ///
    /// `DivisionByZero` if `x == 0`.
    pub fn mul_inv(&self, x: FieldElement) -> Result<FieldElement> {
        if x == 0 {
            return Err(TopologyError::DivisionByZero { q: self.q });
        }
        Ok(self.mul_inv[x as usize])
    }

    /// `x / y`, failing with `DivisionByZero` if `y == 0`.
    pub fn div(&self, x: FieldElement, y: FieldElement) -> Result<FieldElement> {
        Ok(self.mul(x, self.mul_inv(y)?))
    }

    /// `x^exp` by square-and-multiply.
    pub fn pow(&self, x: FieldElement, mut exp: u64) -> FieldElement {
        let mut result = 1;
        let mut base = x;
        while exp > 0 {
            if exp & 1 == 1 {
                result = self.mul(result, base);
            }
            base = self.mul(base, base);
            exp >>= 1;
        }
        result
    }

    /// True iff the powers of `g` run through all q-1 nonzero elements.
    pub fn is_primitive_elem(&self, g: FieldElement) -> bool {
        if g == 0 || g >= self.q {
            return false;
        }
        let mut seen = vec![false; self.q as usize];
        let mut current = g;
        for _ in 0..self.q - 1 {
            if current == 0 || seen[current as usize] {
                return false;
            }
            seen[current as usize] = true;
            current = self.mul(current, g);
        }
        true
    }

    /// The smallest primitive element, found by linear scan from 1.
    pub fn primitive_elem(&self) -> Result<FieldElement> {
        (1..self.q)
            .find(|&g| self.is_primitive_elem(g))
            .ok_or_else(|| self.construction_error("no primitive element".to_string()))
    }
}

/// Position of the single entry in `row[start..]` equal to `target`.
///
/// Returns the number of matches as the error when it is not exactly one.
fn unique_position(row: &[FieldElement], target: FieldElement, start: usize) -> std::result::Result<FieldElement, usize> {
    let mut matches = row
        .iter()
        .enumerate()
        .skip(start)
        .filter(|(_, &v)| v == target)
        .map(|(j, _)| j as FieldElement);
    match (matches.next(), matches.next()) {
        (Some(j), None) => Ok(j),
        (None, _) => Err(0),
        (Some(_), Some(_)) => Err(2 + matches.count()),
    }
}
