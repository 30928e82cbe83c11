//! Polynomial arithmetic over Z/pZ.
//!
//! Polynomials are stored in a fixed-width coefficient array, lowest degree
//! first. The width holds the product of two reduced field elements of the
//! largest supported extension degree, as well as the monic reducing
//! polynomial itself, so table generation never needs to grow a buffer.

use std::fmt;

/// Largest extension degree n supported for GF(p^n).
pub const MAX_EXTENSION_DEGREE: usize = 8;

/// Number of coefficient slots in a [`Poly`].
pub const POLY_WIDTH: usize = 2 * MAX_EXTENSION_DEGREE;

/// A polynomial with coefficients in Z/pZ, lowest degree first.
///
/// A `Poly` does not know its modulus; all arithmetic goes through a
/// [`PolyRing`], which keeps every coefficient reduced into `[0, p)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Poly {
    coeffs: [u32; POLY_WIDTH],
}

impl Poly {
    /// The zero polynomial.
    pub const ZERO: Poly = Poly { coeffs: [0; POLY_WIDTH] };

    /// Builds a polynomial from coefficients, lowest degree first.
    ///
    /// Returns `None` if a nonzero coefficient falls outside the fixed width.
    pub fn from_coeffs(coeffs: &[u32]) -> Option<Self> {
        let mut out = [0u32; POLY_WIDTH];
        for (k, &c) in coeffs.iter().enumerate() {
            if k < POLY_WIDTH {
                out[k] = c;
            } else if c != 0 {
                return None;
            }
        }
        Some(Self { coeffs: out })
    }

    /// Builds the monic polynomial `x^n + tail[n-1] x^(n-1) + ... + tail[0]`.
    pub fn monic(tail: &[u32]) -> Option<Self> {
        let n = tail.len();
        if n >= POLY_WIDTH {
            return None;
        }
        let mut out = [0u32; POLY_WIDTH];
        out[..n].copy_from_slice(tail);
        out[n] = 1;
        Some(Self { coeffs: out })
    }

    /// Base-p expansion of `index` into `n` digits, least significant first.
    ///
    /// Digits beyond the fixed width are dropped, so `n` should not exceed
    /// [`POLY_WIDTH`].
    pub fn from_digits(index: u64, p: u32, n: usize) -> Self {
        let mut out = [0u32; POLY_WIDTH];
        let mut rest = index;
        for slot in out.iter_mut().take(n.min(POLY_WIDTH)) {
            *slot = (rest % p as u64) as u32;
            rest /= p as u64;
        }
        Self { coeffs: out }
    }

    /// Linearises the coefficients back into an integer: `sum c_k * p^k`.
    ///
    /// Returns `None` on overflow.
    pub fn to_index(&self, p: u32) -> Option<u64> {
        let Some(degree) = self.degree() else {
            return Some(0);
        };
        self.coeffs[..=degree].iter().rev().try_fold(0u64, |acc, &c| {
            acc.checked_mul(p as u64)?.checked_add(c as u64)
        })
    }

    pub fn coeff(&self, k: usize) -> u32 {
        self.coeffs.get(k).copied().unwrap_or(0)
    }

    /// All coefficient slots, lowest degree first.
    pub fn coeffs(&self) -> &[u32; POLY_WIDTH] {
        &self.coeffs
    }

    /// Degree of the polynomial, or `None` for the zero polynomial.
    pub fn degree(&self) -> Option<usize> {
        self.coeffs.iter().rposition(|&c| c != 0)
    }

    pub fn is_zero(&self) -> bool {
        self.degree().is_none()
    }

    /// Coefficient of the highest-degree term (0 for the zero polynomial).
    pub fn leading(&self) -> u32 {
        self.degree().map_or(0, |d| self.coeffs[d])
    }
}

impl fmt::Display for Poly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(degree) = self.degree() else {
            return write!(f, "0");
        };
        let mut first = true;
        for k in (0..=degree).rev() {
            let c = self.coeffs[k];
            if c == 0 {
                continue;
            }
            if !first {
                write!(f, " + ")?;
            }
            first = false;
            match (k, c) {
                (0, c) => write!(f, "{}", c)?,
                (1, 1) => write!(f, "x")?,
                (1, c) => write!(f, "{}x", c)?,
                (k, 1) => write!(f, "x^{}", k)?,
                (k, c) => write!(f, "{}x^{}", c, k)?,
            }
        }
        Ok(())
    }
}

/// The polynomial ring (Z/pZ)[x] for a prime `p`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolyRing {
    p: u32,
}

impl PolyRing {
    /// Creates the ring over Z/pZ. `p` is expected to be prime.
    pub fn new(p: u32) -> Self {
        Self { p }
    }

    pub fn characteristic(&self) -> u32 {
        self.p
    }

    fn reduce(&self, c: u64) -> u32 {
        (c % self.p as u64) as u32
    }

    /// Reduces every coefficient into `[0, p)`.
    pub fn normalize(&self, a: &Poly) -> Poly {
        let mut out = *a;
        for c in out.coeffs.iter_mut() {
            *c = self.reduce(*c as u64);
        }
        out
    }

    pub fn add(&self, a: &Poly, b: &Poly) -> Poly {
        let mut out = Poly::ZERO;
        for k in 0..POLY_WIDTH {
            out.coeffs[k] = self.reduce(a.coeffs[k] as u64 + b.coeffs[k] as u64);
        }
        out
    }

    pub fn neg(&self, a: &Poly) -> Poly {
        let mut out = Poly::ZERO;
        for k in 0..POLY_WIDTH {
            let c = self.reduce(a.coeffs[k] as u64);
            out.coeffs[k] = if c == 0 { 0 } else { self.p - c };
        }
        out
    }

    pub fn sub(&self, a: &Poly, b: &Poly) -> Poly {
        self.add(a, &self.neg(b))
    }

    /// Multiplies every coefficient by the scalar `s`.
    pub fn scale(&self, a: &Poly, s: u32) -> Poly {
        let mut out = Poly::ZERO;
        for k in 0..POLY_WIDTH {
            out.coeffs[k] = self.reduce(a.coeffs[k] as u64 * s as u64);
        }
        out
    }

    /// Schoolbook product, or `None` if the result does not fit in [`POLY_WIDTH`].
    pub fn checked_mul(&self, a: &Poly, b: &Poly) -> Option<Poly> {
        let (Some(da), Some(db)) = (a.degree(), b.degree()) else {
            return Some(Poly::ZERO);
        };
        if da + db >= POLY_WIDTH {
            return None;
        }
        let mut acc = [0u64; POLY_WIDTH];
        for i in 0..=da {
            if a.coeffs[i] == 0 {
                continue;
            }
            for j in 0..=db {
                acc[i + j] = (acc[i + j] + a.coeffs[i] as u64 * b.coeffs[j] as u64) % self.p as u64;
            }
        }
        let mut out = Poly::ZERO;
        for (slot, c) in out.coeffs.iter_mut().zip(acc) {
            *slot = c as u32;
        }
        Some(out)
    }

    /// Inverse of a scalar modulo p via Fermat's little theorem.
    pub fn inv_coeff(&self, c: u32) -> Option<u32> {
        let c = self.reduce(c as u64);
        if c == 0 {
            return None;
        }
        let modulus = self.p as u64;
        let mut result = 1u64;
        let mut base = c as u64;
        let mut exp = self.p - 2;
        while exp > 0 {
            if exp & 1 == 1 {
                result = result * base % modulus;
            }
            base = base * base % modulus;
            exp >>= 1;
        }
        Some(result as u32)
    }

    /// Remainder of `a` modulo `m`. Returns `None` if `m` is zero.
    pub fn rem(&self, a: &Poly, m: &Poly) -> Option<Poly> {
        let dm = m.degree()?;
        let lead_inv = self.inv_coeff(m.leading())? as u64;
        let modulus = self.p as u64;
        let mut r = self.normalize(a);
        while let Some(dr) = r.degree() {
            if dr < dm {
                break;
            }
            let factor = r.coeffs[dr] as u64 * lead_inv % modulus;
            let shift = dr - dm;
            for j in 0..=dm {
                let sub = factor * m.coeffs[j] as u64 % modulus;
                r.coeffs[shift + j] = ((r.coeffs[shift + j] as u64 + modulus - sub) % modulus) as u32;
            }
        }
        Some(r)
    }

    /// Monic polynomials of the given degree, in lexicographic order of
    /// their tail coefficients `(c_{n-1}, ..., c_0)`.
    ///
    /// Candidate `k` has tail coefficients equal to the base-p digits of `k`.
    pub fn monic_polys(&self, degree: usize) -> impl Iterator<Item = Poly> + '_ {
        let count = if degree < POLY_WIDTH {
            (self.p as u64).saturating_pow(degree as u32)
        } else {
            0
        };
        (0..count).map(move |k| {
            let mut poly = Poly::from_digits(k, self.p, degree);
            poly.coeffs[degree] = 1;
            poly
        })
    }

    /// Trial division by every monic polynomial of degree `1..=deg(f)/2`.
    ///
    /// Constants and the zero polynomial are not irreducible.
    pub fn is_irreducible(&self, f: &Poly) -> bool {
        let f = self.normalize(f);
        let degree = match f.degree() {
            None | Some(0) => return false,
            Some(1) => return true,
            Some(d) => d,
        };
        for k in 1..=degree / 2 {
            for divisor in self.monic_polys(k) {
                if self.rem(&f, &divisor).map_or(false, |r| r.is_zero()) {
                    return false;
                }
            }
        }
        true
    }
}
