use flowmap_core::{State, VectorField};

/// A two-variable population system.
///
/// `P` follows linear loss with a constant supply, a sigmoidal (Hill-type)
/// self-reinforcing growth term, and a suppression term proportional to `F`.
/// `F` follows logistic dynamics whose net rate is raised by a saturating
/// function of `P`:
///
/// ```text
/// dP/dt = p_d − δ F − α P + r Pᵠ / (mᵠ + Pᵠ)
/// dF/dt = s F (1 − F) (−v + ξ F + κ Pᵇ / (Hᵇ + Pᵇ))
/// ```
///
/// Both Hill terms are bounded by their prefactors, so the derivative stays
/// finite for finite states.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Population {
    /// Half-saturation level of `P` in the `F` growth term.
    pub h: f64,
    /// Self-reinforcement of `F`.
    pub xi: f64,
    /// Constant supply of `P`.
    pub p_d: f64,
    /// Linear loss rate of `P`.
    pub alpha: f64,
    /// Maximum Hill growth rate of `P`.
    pub r: f64,
    /// Hill exponent of the `P` growth term.
    pub q: f64,
    /// Half-saturation level of the `P` growth term.
    pub m: f64,
    /// Suppression of `P` by `F`.
    pub delta: f64,
    /// Maximum boost of `F` growth by `P`.
    pub kappa: f64,
    /// Baseline decline rate of `F`.
    pub v: f64,
    /// Hill exponent of the `F` growth term.
    pub b: f64,
    /// Time scale of `F`.
    pub s: f64,
}

impl Default for Population {
    fn default() -> Self {
        Self {
            h: 0.328,
            xi: 0.043,
            p_d: 0.06,
            alpha: 0.28,
            r: 0.5,
            q: 2.0,
            m: 1.0,
            delta: 0.05,
            kappa: 0.05,
            v: 0.041,
            b: 2.0,
            s: 1.0,
        }
    }
}

impl VectorField<2> for Population {
    fn derivative(&self, state: &State<2>, _time: f64) -> [f64; 2] {
        let [p, f] = *state.as_array();

        let p_q = p.powf(self.q);
        let p_b = p.powf(self.b);

        let growth_p = self.r * p_q / (self.m.powf(self.q) + p_q);
        let boost_f = self.kappa * p_b / (self.h.powf(self.b) + p_b);

        [
            self.p_d - self.delta * f - self.alpha * p + growth_p,
            self.s * f * (1.0 - f) * (-self.v + self.xi * f + boost_f),
        ]
    }

    fn variables(&self) -> [&'static str; 2] {
        ["P", "F"]
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn f_is_invariant_at_zero_and_one() {
        let system = Population::default();

        for p in [0.0, 0.4, 1.2] {
            assert_eq!(system.derivative(&State::new([p, 0.0]), 0.0)[1], 0.0);
            assert_eq!(system.derivative(&State::new([p, 1.0]), 0.0)[1], 0.0);
        }
    }

    #[test]
    fn evaluates_default_parameters() {
        let system = Population::default();
        let [dp, df] = system.derivative(&State::new([1.0, 0.5]), 0.0);

        // Hill terms at P = 1: 0.5 * 1 / 2 and 0.05 * 1 / (0.328² + 1).
        let expected_dp = 0.06 - 0.05 * 0.5 - 0.28 + 0.25;
        let boost = 0.05 / (0.328_f64.powi(2) + 1.0);
        let expected_df = 0.5 * 0.5 * (-0.041 + 0.043 * 0.5 + boost);

        assert_relative_eq!(dp, expected_dp, epsilon = 1e-12);
        assert_relative_eq!(df, expected_df, epsilon = 1e-12);
    }

    #[test]
    fn stays_finite_for_large_states() {
        let derivative = Population::default().derivative(&State::new([1e6, 0.3]), 0.0);

        assert!(derivative.iter().all(|d| d.is_finite()));
    }
}
