//! Triode transfer curve.
//!
//! The anode current follows a cubic law in the effective control voltage:
//!   Ia = g * (Vgk + Vak / h)^3        (Ia = 0 when the bracket is <= 0)
//!
//! where the perveance g depends on the grid-cathode voltage:
//!   g = g_inf + (g0 - g_inf) / (1 - D * Vgk)    for Vgk <= 0
//!   g = g_inf + (g0 - g_inf) * (1 + D * Vgk)    for Vgk > 0
//!
//! Both branches meet at Vgk = 0 with the same value and slope. For Newton
//! iteration the curve is linearized in Vak:
//!   dIa/dVak = 3 * g / h * (Vgk + Vak / h)^2

use crate::sample::Sample;

use super::TubeParams;

/// Transfer-curve coefficients converted to the processing sample type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TubeModel<T> {
    pub g0: T,
    pub g_inf: T,
    pub d: T,
    pub h: T,
}

impl<T: Sample> TubeModel<T> {
    /// Convert the tube coefficients of a parameter set.
    pub fn from_params(params: &TubeParams) -> Self {
        Self {
            g0: T::from_f64(params.g0),
            g_inf: T::from_f64(params.g_inf),
            d: T::from_f64(params.d),
            h: T::from_f64(params.h),
        }
    }

    /// Perveance at the given grid-cathode voltage.
    #[inline]
    pub fn perveance(&self, vgk: T) -> T {
        let span = self.g0 - self.g_inf;
        if vgk <= T::zero() {
            self.g_inf + span / (T::one() - self.d * vgk)
        } else {
            self.g_inf + span * (T::one() + self.d * vgk)
        }
    }

    /// Effective control voltage Vgk + Vak / h.
    #[inline]
    fn control(&self, vgk: T, vak: T) -> T {
        vgk + vak / self.h
    }

    /// Anode current for perveance `g`.
    #[inline]
    pub fn anode_current(&self, g: T, vgk: T, vak: T) -> T {
        let x = self.control(vgk, vak);
        if x <= T::zero() {
            // Cut off
            T::zero()
        } else {
            g * x * x * x
        }
    }

    /// Anode conductance dIa/dVak for perveance `g`.
    #[inline]
    pub fn anode_conductance(&self, g: T, vgk: T, vak: T) -> T {
        let x = self.control(vgk, vak);
        if x <= T::zero() {
            T::zero()
        } else {
            T::from_f64(3.0) * g / self.h * x * x
        }
    }

    /// Output resistance seen by a following stage: Ra in parallel with the
    /// differential anode resistance 1 / (dIa/dVak).
    ///
    /// A cut-off tube has infinite differential resistance, leaving Ra.
    #[inline]
    pub fn output_resistance(&self, g: T, vgk: T, vak: T, ra: T) -> T {
        let conductance = self.anode_conductance(g, vgk, vak);
        if conductance <= T::zero() {
            return ra;
        }
        let xi = T::one() / conductance;
        ra * xi / (ra + xi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tube::{lookup, TubeType};
    use approx::assert_relative_eq;

    fn ecc83() -> TubeModel<f64> {
        TubeModel::from_params(lookup(TubeType::Ecc83))
    }

    #[test]
    fn test_perveance_limits() {
        let m = ecc83();
        assert_relative_eq!(m.perveance(0.0), m.g0, max_relative = 1e-12);

        // Strongly negative grid approaches g_inf
        let deep = m.perveance(-1e12);
        assert!(deep < m.g0 * 1e-6);
        assert_relative_eq!(deep, m.g_inf, max_relative = 1e-3);

        // Monotonic across zero
        assert!(m.perveance(-2.0) < m.perveance(-1.0));
        assert!(m.perveance(0.5) > m.perveance(0.0));
    }

    #[test]
    fn test_perveance_is_continuous_at_zero() {
        let m = ecc83();
        let eps = 1e-9;
        assert_relative_eq!(m.perveance(-eps), m.perveance(eps), max_relative = 1e-6);
    }

    #[test]
    fn test_cutoff() {
        let m = ecc83();
        let g = m.perveance(-1.5);
        // Vgk + Vak/h <= 0
        assert_eq!(m.anode_current(g, -10.0, 0.05), 0.0);
        assert_eq!(m.anode_conductance(g, -10.0, 0.05), 0.0);
        assert_eq!(m.output_resistance(g, -10.0, 0.05, 50e3), 50e3);
    }

    #[test]
    fn test_conductance_matches_derivative() {
        let m = ecc83();
        let g = m.perveance(-1.5);
        let vak = 150.0;
        let dv = 1e-3;
        let numeric =
            (m.anode_current(g, -1.5, vak + dv) - m.anode_current(g, -1.5, vak - dv)) / (2.0 * dv);
        assert_relative_eq!(m.anode_conductance(g, -1.5, vak), numeric, max_relative = 1e-6);
    }

    #[test]
    fn test_output_resistance_below_ra() {
        let m = ecc83();
        let g = m.perveance(-1.5);
        let ri = m.output_resistance(g, -1.5, 150.0, 50e3);
        assert!(ri > 0.0 && ri < 50e3, "ri = {ri}");
    }
}
