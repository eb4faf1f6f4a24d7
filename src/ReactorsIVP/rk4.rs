//! Classical fourth-order Runge-Kutta step for small fixed-size ODE systems.
//!
//! ```text
//! k1 = dt·f(x0)
//! k2 = dt·f(x0 + k1/2)
//! k3 = dt·f(x0 + k2/2)
//! k4 = dt·f(x0 + k3)
//! x1 = x0 + (k1 + 2·k2 + 2·k3 + k4)/6
//! ```
//!
//! The system is autonomous (the right-hand side does not depend on time explicitly), so the
//! stage times are not passed to `f`.
use nalgebra::SVector;

/// Advances `x0` by one step of size `dt`.
///
/// Every stage is evaluated from `x0` plus the previous stage increment; `x0` itself is never
/// modified and the intermediate stage states are discarded.
pub fn rk4_step<const N: usize, F>(x0: &SVector<f64, N>, dt: f64, mut f: F) -> SVector<f64, N>
where
    F: FnMut(&SVector<f64, N>) -> SVector<f64, N>,
{
    let k1 = f(x0) * dt;
    let k2 = f(&(x0 + k1 / 2.0)) * dt;
    let k3 = f(&(x0 + k2 / 2.0)) * dt;
    let k4 = f(&(x0 + k3)) * dt;
    x0 + (k1 + k2 * 2.0 + k3 * 2.0 + k4) / 6.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Vector1, Vector2};

    #[test]
    fn test_constant_rhs_is_exact() {
        let x0 = Vector1::new(2.0);
        let x1 = rk4_step(&x0, 0.5, |_| Vector1::new(3.0));
        assert_relative_eq!(x1[0], 3.5, epsilon = 1e-15);
    }

    #[test]
    fn test_exponential_decay_single_step() {
        // dy/dt = -y, one step reproduces the 4th order Taylor polynomial of exp(-dt)
        let dt = 0.1;
        let x1 = rk4_step(&Vector1::new(1.0), dt, |x| -x);
        let taylor = 1.0 - dt + dt * dt / 2.0 - dt.powi(3) / 6.0 + dt.powi(4) / 24.0;
        assert_relative_eq!(x1[0], taylor, epsilon = 1e-15);
    }

    #[test]
    fn test_stage_count() {
        let mut calls = 0;
        let _ = rk4_step(&Vector2::new(1.0, 0.0), 0.01, |x| {
            calls += 1;
            Vector2::new(x[1], -x[0])
        });
        assert_eq!(calls, 4);
    }

    #[test]
    fn test_harmonic_oscillator_energy() {
        // x'' = -x over one period; RK4 keeps the energy within a tight bound
        let dt = 0.01;
        let n = (2.0 * std::f64::consts::PI / dt).round() as usize;
        let mut x = Vector2::new(1.0, 0.0);
        for _ in 0..n {
            x = rk4_step(&x, dt, |y| Vector2::new(y[1], -y[0]));
        }
        let energy = 0.5 * (x[0] * x[0] + x[1] * x[1]);
        assert_relative_eq!(energy, 0.5, epsilon = 1e-8);
    }
}
