//! The standard membership functions referenced by `MF` lines.
//!
//! Every evaluator is a closed-form formula over [`Float`]. Results nominally lie in
//! `[0, 1]` but are never clamped: parameters outside a function's intended domain
//! may produce values outside that interval, or NaN.

use std::fmt;
use std::str::FromStr;

use num::Float;

use crate::error::MembershipError;

fn two<F: Float>() -> F {
    F::one() + F::one()
}

fn indicator<F: Float>(cond: bool) -> F {
    if cond {
        F::one()
    } else {
        F::zero()
    }
}

/// Sigmoid with slope `a` centered at `c`.
pub fn sigmf<F: Float>(x: F, a: F, c: F) -> F {
    F::one() / (F::one() + F::exp(-a * (x - c)))
}

/// Absolute difference of two sigmoids.
pub fn dsigmf<F: Float>(x: F, a1: F, c1: F, a2: F, c2: F) -> F {
    F::abs(sigmf(x, a1, c1) - sigmf(x, a2, c2))
}

/// Gaussian with standard deviation `s` centered at `c`.
pub fn gaussmf<F: Float>(x: F, s: F, c: F) -> F {
    let t = (x - c) / s;
    F::exp(-(t * t) / two())
}

/// Two-sided Gaussian: the left half applies below `c1`, the right half above `c2`,
/// and the plateau in between is 1.
pub fn gauss2mf<F: Float>(x: F, s1: F, c1: F, s2: F, c2: F) -> F {
    let t1 = if x < c1 { gaussmf(x, s1, c1) } else { F::one() };
    let t2 = if x > c2 { gaussmf(x, s2, c2) } else { F::one() };
    t1 * t2
}

/// Generalized bell `1 / (1 + t^b)` with `t = (x - c) / a`.
///
/// At `t == 0` the power is undefined for `b <= 0`, so `b == 0` yields 0.5 and
/// `b < 0` yields 0.
pub fn gbellmf<F: Float>(x: F, a: F, b: F, c: F) -> F {
    let t = (x - c) / a;
    if t == F::zero() && b == F::zero() {
        return F::one() / two();
    }
    if t == F::zero() && b < F::zero() {
        return F::zero();
    }
    F::one() / (F::one() + t.powf(b))
}

/// S-shaped curve rising from 0 at `a` to 1 at `b`.
///
/// When `a >= b` this is a unit step at the midpoint.
pub fn smf<F: Float>(x: F, a: F, b: F) -> F {
    let m = (a + b) / two();
    if a >= b {
        return indicator(x >= m);
    }
    if x <= a {
        return F::zero();
    }
    if x <= m {
        let t = (x - a) / (b - a);
        return two::<F>() * t * t;
    }
    if x <= b {
        let t = (b - x) / (b - a);
        return F::one() - two::<F>() * t * t;
    }
    F::one()
}

/// Z-shaped curve falling from 1 at `a` to 0 at `b`, the mirror of [`smf`].
///
/// The tail above the midpoint is `2t²`, so the curve reaches 0 at `b`. Formulas that
/// use `1 - 2t²` there climb back to 1 at `b` instead.
pub fn zmf<F: Float>(x: F, a: F, b: F) -> F {
    let m = (a + b) / two();
    if x <= a {
        return F::one();
    }
    if x <= m {
        let t = (x - a) / (b - a);
        return F::one() - two::<F>() * t * t;
    }
    if x <= b {
        let t = (b - x) / (b - a);
        return two::<F>() * t * t;
    }
    F::zero()
}

/// Trapezoid rising over `a..b`, flat over `b..c`, falling over `c..d`.
pub fn trapmf<F: Float>(x: F, a: F, b: F, c: F, d: F) -> F {
    let falling = if x <= c {
        F::one()
    } else if d < x {
        F::zero()
    } else if c != d {
        (d - x) / (d - c)
    } else {
        F::zero()
    };

    let rising = if b <= x {
        F::one()
    } else if x < a {
        F::zero()
    } else if a != b {
        (x - a) / (b - a)
    } else {
        F::zero()
    };

    F::min(falling, rising)
}

/// Pi-shaped bump: `smf(a1, b1) * zmf(a2, b2)`.
pub fn pimf<F: Float>(x: F, a1: F, b1: F, a2: F, b2: F) -> F {
    smf(x, a1, b1) * zmf(x, a2, b2)
}

/// Product of two sigmoids.
pub fn psigmf<F: Float>(x: F, a1: F, c1: F, a2: F, c2: F) -> F {
    sigmf(x, a1, c1) * sigmf(x, a2, c2)
}

/// Triangle with feet at `a` and `c` and peak at `b`.
pub fn trimf<F: Float>(x: F, a: F, b: F, c: F) -> F {
    if a == b && b == c {
        return indicator(x == a);
    }
    if a == b {
        let t2 = (c - x) / (c - b);
        return t2 * indicator(b <= x) * indicator(x <= c);
    }
    if b == c {
        let t1 = (x - a) / (b - a);
        return t1 * indicator(a <= x) * indicator(x <= b);
    }
    let t1 = (x - a) / (b - a);
    let t2 = (c - x) / (c - b);
    F::max(F::min(t1, t2), F::zero())
}

/// The catalogue of membership functions, keyed by the method names used in `MF` lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MfKind {
    Sigmf,
    Dsigmf,
    Gaussmf,
    Gauss2mf,
    Gbellmf,
    Smf,
    Zmf,
    Trapmf,
    Pimf,
    Psigmf,
    Trimf,
}

impl MfKind {
    pub const ALL: [MfKind; 11] = [
        Self::Sigmf,
        Self::Dsigmf,
        Self::Gaussmf,
        Self::Gauss2mf,
        Self::Gbellmf,
        Self::Smf,
        Self::Zmf,
        Self::Trapmf,
        Self::Pimf,
        Self::Psigmf,
        Self::Trimf,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Sigmf => "sigmf",
            Self::Dsigmf => "dsigmf",
            Self::Gaussmf => "gaussmf",
            Self::Gauss2mf => "gauss2mf",
            Self::Gbellmf => "gbellmf",
            Self::Smf => "smf",
            Self::Zmf => "zmf",
            Self::Trapmf => "trapmf",
            Self::Pimf => "pimf",
            Self::Psigmf => "psigmf",
            Self::Trimf => "trimf",
        }
    }

    /// Number of parameters following the query point.
    pub fn arity(self) -> usize {
        match self {
            Self::Sigmf | Self::Gaussmf | Self::Smf | Self::Zmf => 2,
            Self::Gbellmf | Self::Trimf => 3,
            Self::Dsigmf | Self::Gauss2mf | Self::Trapmf | Self::Pimf | Self::Psigmf => 4,
        }
    }

    /// Evaluates the function at `x`. `params` must hold exactly [`MfKind::arity`] values.
    pub fn call<F: Float>(self, x: F, params: &[F]) -> Result<F, MembershipError> {
        if params.len() != self.arity() {
            return Err(MembershipError::ArityMismatch {
                method: self.name(),
                expected: self.arity(),
                found: params.len(),
            });
        }

        let p = params;
        Ok(match self {
            Self::Sigmf => sigmf(x, p[0], p[1]),
            Self::Dsigmf => dsigmf(x, p[0], p[1], p[2], p[3]),
            Self::Gaussmf => gaussmf(x, p[0], p[1]),
            Self::Gauss2mf => gauss2mf(x, p[0], p[1], p[2], p[3]),
            Self::Gbellmf => gbellmf(x, p[0], p[1], p[2]),
            Self::Smf => smf(x, p[0], p[1]),
            Self::Zmf => zmf(x, p[0], p[1]),
            Self::Trapmf => trapmf(x, p[0], p[1], p[2], p[3]),
            Self::Pimf => pimf(x, p[0], p[1], p[2], p[3]),
            Self::Psigmf => psigmf(x, p[0], p[1], p[2], p[3]),
            Self::Trimf => trimf(x, p[0], p[1], p[2]),
        })
    }
}

impl FromStr for MfKind {
    type Err = MembershipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| MembershipError::UnknownMethod(s.to_owned()))
    }
}

impl fmt::Display for MfKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[test]
fn test_identities() {
    assert_eq!(gaussmf(3., 0.7, 3.), 1.);
    assert_eq!(gaussmf(-2., -4., -2.), 1.);
    assert_eq!(trimf(5., 0., 5., 10.), 1.);
    assert_eq!(trimf(0., 0., 5., 10.), 0.);
    assert_eq!(trimf(7.5, 0., 5., 10.), 0.5);
    assert_eq!(trimf(12., 0., 5., 10.), 0.);
    assert_eq!(trapmf(2., 0., 1., 4., 5.), 1.);
    assert_eq!(trapmf(0.5, 0., 1., 4., 5.), 0.5);
    assert_eq!(trapmf(4.5, 0., 1., 4., 5.), 0.5);
    assert_eq!(sigmf(4., 1., 4.), 0.5);
    assert_eq!(sigmf(-1., 13., -1.), 0.5);
}

#[test]
fn test_sigmoid_family() {
    assert!(sigmf(10., 2., 0.) > 0.99);
    assert!(sigmf(-10., 2., 0.) < 0.01);
    // Same sigmoid twice cancels out.
    assert_eq!(dsigmf(1.3, 2., 0., 2., 0.), 0.);
    assert_eq!(dsigmf(0., 5., 0., 5., 10.), (0.5 - sigmf(0., 5., 10.)).abs());
    assert_eq!(psigmf(0., 1., 0., -1., 0.), 0.25);
}

#[test]
fn test_gauss2mf_plateau() {
    assert_eq!(gauss2mf(5., 1., 4., 1., 6.), 1.);
    assert_eq!(gauss2mf(4., 1., 4., 1., 6.), 1.);
    assert_eq!(gauss2mf(3., 1., 4., 1., 6.), gaussmf(3., 1., 4.));
    assert_eq!(gauss2mf(8., 1., 4., 2., 6.), gaussmf(8., 2., 6.));
}

#[test]
fn test_gbellmf() {
    assert_eq!(gbellmf(5., 2., 4., 5.), 1.);
    assert_eq!(gbellmf(7., 2., 4., 5.), 0.5);
    assert_eq!(gbellmf(5., 2., 0., 5.), 0.5);
    assert_eq!(gbellmf(5., 2., -1., 5.), 0.);
    // Negative base with a fractional exponent has no real value.
    assert!(gbellmf(3., 2., 2.5, 5.).is_nan());
}

#[test]
fn test_s_and_z_curves() {
    assert_eq!(smf(5., 5., 5.), 1.);
    assert_eq!(smf(4., 5., 5.), 0.);
    assert_eq!(smf(1., 2., 6.), 0.);
    assert_eq!(smf(4., 2., 6.), 0.5);
    assert_eq!(smf(3., 2., 6.), 0.125);
    assert_eq!(smf(5., 2., 6.), 0.875);
    assert_eq!(smf(7., 2., 6.), 1.);

    assert_eq!(zmf(1., 2., 6.), 1.);
    assert_eq!(zmf(3., 2., 6.), 0.875);
    assert_eq!(zmf(4., 2., 6.), 0.5);
    assert_eq!(zmf(5., 2., 6.), 0.125);
    assert_eq!(zmf(6., 2., 6.), 0.);
    assert_eq!(zmf(7., 2., 6.), 0.);
    assert_eq!(zmf(5., 5., 5.), 1.);
    assert_eq!(zmf(5.5, 5., 5.), 0.);

    for x in [1., 2.5, 4., 5.5, 7.] {
        assert_eq!(pimf(x, 2., 4., 5., 7.), smf(x, 2., 4.) * zmf(x, 5., 7.));
    }
    assert_eq!(pimf(4.5, 2., 4., 5., 7.), 1.);
}

#[test]
fn test_degenerate_edges() {
    // Vertical rising edge.
    assert_eq!(trapmf(1., 1., 1., 3., 4.), 1.);
    assert_eq!(trapmf(0.9, 1., 1., 3., 4.), 0.);
    // Vertical falling edge.
    assert_eq!(trapmf(3., 0., 1., 3., 3.), 1.);
    assert_eq!(trapmf(3.1, 0., 1., 3., 3.), 0.);

    assert_eq!(trimf(0., 0., 0., 10.), 1.);
    assert_eq!(trimf(5., 0., 0., 10.), 0.5);
    assert_eq!(trimf(-1., 0., 0., 10.), 0.);
    assert_eq!(trimf(10., 0., 10., 10.), 1.);
    assert_eq!(trimf(5., 0., 10., 10.), 0.5);
    assert_eq!(trimf(11., 0., 10., 10.), 0.);
    assert_eq!(trimf(3., 3., 3., 3.), 1.);
    assert_eq!(trimf(3.1, 3., 3., 3.), 0.);
}

#[test]
fn test_f32() {
    assert_eq!(trimf(5f32, 0., 5., 10.), 1f32);
    assert_eq!(sigmf(2f32, 3., 2.), 0.5f32);
}

#[test]
fn test_catalogue() {
    for kind in MfKind::ALL {
        assert_eq!(kind.name().parse::<MfKind>(), Ok(kind));
    }
    assert_eq!(
        "triangle".parse::<MfKind>(),
        Err(MembershipError::UnknownMethod("triangle".into()))
    );
    assert_eq!(MfKind::Trimf.call(5., &[0., 5., 10.]), Ok(1.));
    assert_eq!(MfKind::Gbellmf.call(7., &[2., 4., 5.]), Ok(0.5));
    assert_eq!(
        MfKind::Trapmf.call(1., &[0., 1., 2.]),
        Err(MembershipError::ArityMismatch {
            method: "trapmf",
            expected: 4,
            found: 3,
        })
    );
}
