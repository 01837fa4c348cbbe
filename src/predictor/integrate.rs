//! Composite trapezoidal rule

/// Integrate `f` over `[a, b]` with `n` equal subintervals.
///
/// `n` of zero is treated as one. Reversed bounds give the negated integral.
pub fn trapezoid<F>(f: F, a: f64, b: f64, n: usize) -> f64
where
    F: Fn(f64) -> f64,
{
    let n = n.max(1);
    let h = (b - a) / n as f64;

    let mut sum = (f(a) + f(b)) / 2.0;
    for i in 1..n {
        sum += f(a + i as f64 * h);
    }
    sum * h
}
