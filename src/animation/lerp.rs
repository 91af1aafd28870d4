/// Linear interpolation between two values of the same type.
///
/// Implementations return exactly `a` at `t = 0` and exactly `b` at `t = 1`.
pub trait Lerp: Sized {
    /// Interpolate from `a` (at `t = 0`) to `b` (at `t = 1`).
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a * (1.0 - t) + b * t
    }
}
