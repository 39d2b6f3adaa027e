use evalue_core::{ErrorInfo, EvalueError};
use tracing::debug;

/// Maximum number of geometric expansions attempted by [`find_bracket_mono`].
pub const BRACKET_MAX_EXPANSIONS: usize = 200;

/// Maximum number of iterations performed by [`brent`].
pub const BRENT_MAX_ITERATIONS: usize = 1000;

/// Searches for an interval around the root of an increasing function.
///
/// The search starts from `guess`, moves it to the side of the origin where
/// the root must lie (judged by the sign of `f(0)`), and then grows or
/// shrinks the candidate geometrically by a factor of two until the sign of
/// `f` changes or an exact zero is hit. The returned pair is unordered. After
/// [`BRACKET_MAX_EXPANSIONS`] steps the last pair is returned as-is and the
/// caller's root finder reports the failure.
pub fn find_bracket_mono<F>(mut f: F, guess: f64) -> (f64, f64)
where
    F: FnMut(f64) -> f64,
{
    let f0 = f(0.0);
    let guess = if (guess < 0.0 && f0 < 0.0) || (guess > 0.0 && f0 > 0.0) {
        -guess
    } else {
        guess
    };

    let mut a = guess;
    let mut fa = f(a);
    // Grow away from zero when the root lies beyond `a`, shrink otherwise.
    let ratio = if (a > 0.0) == (fa < 0.0) { 2.0 } else { 0.5 };
    let mut b = a * ratio;
    let mut fb = f(b);

    for _ in 0..BRACKET_MAX_EXPANSIONS {
        if fa.is_sign_negative() != fb.is_sign_negative() || fa == 0.0 || fb == 0.0 {
            break;
        }
        a = b;
        fa = fb;
        b *= ratio;
        fb = f(b);
    }
    (a, b)
}

/// Brent's bracketed root finder.
///
/// `lower` and `upper` may be given in either order but must bracket a sign
/// change of `f`. Iteration stops once the bracket is narrower than
/// `2·ε·|x| + tol/2`. Infinite function values are allowed at the ends and
/// force a bisection step; NaN is an error.
pub fn brent<F>(mut f: F, lower: f64, upper: f64, tol: f64) -> Result<f64, EvalueError>
where
    F: FnMut(f64) -> f64,
{
    let mut a = lower;
    let mut b = upper;
    let mut fa = f(a);
    let mut fb = f(b);

    if fa.is_nan() || fb.is_nan() {
        return Err(EvalueError::Root(
            ErrorInfo::new("non-finite", "function is NaN at a bracket end")
                .with_context("lower", a.to_string())
                .with_context("upper", b.to_string()),
        ));
    }
    if fa == 0.0 {
        return Ok(a);
    }
    if fb == 0.0 {
        return Ok(b);
    }
    if fa.is_sign_negative() == fb.is_sign_negative() {
        return Err(EvalueError::Root(
            ErrorInfo::new("not-bracketed", "function has the same sign at both ends")
                .with_context("lower", a.to_string())
                .with_context("upper", b.to_string())
                .with_hint("widen the search interval"),
        ));
    }

    let mut c = a;
    let mut fc = fa;
    let mut d = b - a;
    let mut e = d;

    for iteration in 0..BRENT_MAX_ITERATIONS {
        if fb.is_sign_negative() == fc.is_sign_negative() {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }

        let tol1 = 2.0 * f64::EPSILON * b.abs() + 0.5 * tol;
        let xm = 0.5 * (c - b);
        if xm.abs() <= tol1 || fb == 0.0 {
            debug!(iteration, root = b, "brent converged");
            return Ok(b);
        }

        let interpolate =
            e.abs() >= tol1 && fa.abs() > fb.abs() && fa.is_finite() && fc.is_finite();
        if interpolate {
            let s = fb / fa;
            let (mut p, mut q) = if a == c {
                (2.0 * xm * s, 1.0 - s)
            } else {
                let q0 = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * xm * q0 * (q0 - r) - (b - a) * (r - 1.0)),
                    (q0 - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            if p > 0.0 {
                q = -q;
            }
            p = p.abs();
            let min1 = 3.0 * xm * q - (tol1 * q).abs();
            let min2 = (e * q).abs();
            if 2.0 * p < min1.min(min2) {
                e = d;
                d = p / q;
            } else {
                d = xm;
                e = d;
            }
        } else {
            d = xm;
            e = d;
        }

        a = b;
        fa = fb;
        if d.abs() > tol1 {
            b += d;
        } else {
            b += tol1.copysign(xm);
        }
        fb = f(b);
        if fb.is_nan() {
            return Err(EvalueError::Root(
                ErrorInfo::new("non-finite", "function returned NaN inside the bracket")
                    .with_context("x", b.to_string()),
            ));
        }
    }

    Err(EvalueError::Root(
        ErrorInfo::new("max-iterations", "root finder did not converge")
            .with_context("iterations", BRENT_MAX_ITERATIONS.to_string()),
    ))
}
