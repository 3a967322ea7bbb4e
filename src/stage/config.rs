//! Circuit configuration of a triode stage.

use log::{debug, warn};

use crate::error::{Result, TriodeError};
use crate::sample::Sample;
use crate::solver::solve_vak;
use crate::tube::{lookup, TubeModel, TubeParams, TubeType};
use crate::{CATHODE_LP_CUTOFF, DEFAULT_GRID_THRESHOLD};

/// Default source resistance in front of the coupling capacitor.
pub const DEFAULT_RI: f64 = 100e3;
/// Default grid leak resistor (also loads the output coupling capacitor).
pub const DEFAULT_RG: f64 = 1000e3;
/// Default input coupling capacitor.
pub const DEFAULT_CI: f64 = 10e-9;
/// Default output coupling capacitor.
pub const DEFAULT_CO: f64 = 10e-9;

/// Component values of one triode stage.
///
/// The tube coefficients come from the tube table and never change; every
/// circuit value can be set independently. With `auto_adjust_cathode_lp`
/// enabled (the default), setting the cathode voltage recomputes `rk` and
/// `ck` so the cathode network is a 2 Hz low-pass at the new bias point.
#[derive(Debug, Clone, PartialEq)]
pub struct StageConfig<T> {
    pub(crate) model: TubeModel<T>,

    pub(crate) ri: T,
    pub(crate) rg: T,
    pub(crate) ci: T,
    pub(crate) co: T,
    pub(crate) vgamma: T,

    // Loaded from the tube table
    pub(crate) rk: T,
    pub(crate) ra: T,
    pub(crate) ck: T,
    pub(crate) vk: T,
    pub(crate) vb: T,

    pub(crate) auto_adjust_cathode_lp: bool,
}

impl<T: Sample> Default for StageConfig<T> {
    fn default() -> Self {
        Self::new(TubeType::default())
    }
}

impl<T: Sample> StageConfig<T> {
    /// Create the reference circuit of a tube type.
    pub fn new(tube: TubeType) -> Self {
        Self::from_params(lookup(tube))
    }

    /// Create a configuration from a full parameter set.
    ///
    /// The cathode network is adjusted to `params.vk` right away, so the
    /// stage rests at the configured bias point. The listed `rk`/`ck` serve
    /// as the fallback when no quiescent current exists.
    pub fn from_params(params: &TubeParams) -> Self {
        let mut config = Self {
            model: TubeModel::from_params(params),
            ri: T::from_f64(DEFAULT_RI),
            rg: T::from_f64(DEFAULT_RG),
            ci: T::from_f64(DEFAULT_CI),
            co: T::from_f64(DEFAULT_CO),
            vgamma: T::from_f64(DEFAULT_GRID_THRESHOLD),
            rk: T::from_f64(params.rk),
            ra: T::from_f64(params.ra),
            ck: T::from_f64(params.ck),
            vk: T::from_f64(params.vk),
            vb: T::from_f64(params.vb),
            auto_adjust_cathode_lp: true,
        };
        config.adjust_cathode_lp();
        config
    }

    /// Create a configuration with every circuit value given explicitly.
    ///
    /// The values are taken as-is; no cathode adjustment is applied.
    #[allow(clippy::too_many_arguments)]
    pub fn custom(tube: TubeType, ri: T, rk: T, rg: T, ra: T, ci: T, ck: T, co: T, vk: T, vb: T) -> Self {
        Self {
            ri,
            rk,
            rg,
            ra,
            ci,
            ck,
            co,
            vk,
            vb,
            ..Self::new(tube)
        }
    }

    /// Check that every component value is usable.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("ri", self.ri),
            ("rk", self.rk),
            ("rg", self.rg),
            ("ra", self.ra),
            ("ci", self.ci),
            ("ck", self.ck),
            ("co", self.co),
            ("vk", self.vk),
            ("vb", self.vb),
        ];
        for (param, value) in positive {
            if !value.is_finite() {
                return Err(TriodeError::invalid_parameter(param, value.into_f64(), "must be finite"));
            }
            if value <= T::zero() {
                return Err(TriodeError::invalid_parameter(param, value.into_f64(), "must be positive"));
            }
        }
        if !self.vgamma.is_finite() {
            return Err(TriodeError::invalid_parameter(
                "vgamma",
                self.vgamma.into_f64(),
                "must be finite",
            ));
        }
        if self.vk >= self.vb {
            return Err(TriodeError::invalid_parameter(
                "vk",
                self.vk.into_f64(),
                "cathode voltage must be below the supply voltage",
            ));
        }
        Ok(())
    }

    /// Transfer-curve coefficients of the tube.
    pub fn model(&self) -> &TubeModel<T> {
        &self.model
    }

    pub fn ri(&self) -> T {
        self.ri
    }

    pub fn rk(&self) -> T {
        self.rk
    }

    pub fn rg(&self) -> T {
        self.rg
    }

    pub fn ra(&self) -> T {
        self.ra
    }

    pub fn ci(&self) -> T {
        self.ci
    }

    pub fn ck(&self) -> T {
        self.ck
    }

    pub fn co(&self) -> T {
        self.co
    }

    pub fn vk(&self) -> T {
        self.vk
    }

    pub fn vb(&self) -> T {
        self.vb
    }

    /// Grid conduction threshold voltage.
    pub fn vgamma(&self) -> T {
        self.vgamma
    }

    pub fn auto_adjust_cathode_lp(&self) -> bool {
        self.auto_adjust_cathode_lp
    }

    pub fn set_ri(&mut self, v: T) {
        self.ri = v;
    }

    pub fn set_rk(&mut self, v: T) {
        self.rk = v;
    }

    pub fn set_rg(&mut self, v: T) {
        self.rg = v;
    }

    pub fn set_ra(&mut self, v: T) {
        self.ra = v;
    }

    pub fn set_ci(&mut self, v: T) {
        self.ci = v;
    }

    pub fn set_ck(&mut self, v: T) {
        self.ck = v;
    }

    pub fn set_co(&mut self, v: T) {
        self.co = v;
    }

    /// Set the cathode voltage, readjusting the cathode low-pass if enabled.
    pub fn set_vk(&mut self, v: T) {
        self.vk = v;
        self.adjust_cathode_lp();
    }

    pub fn set_vb(&mut self, v: T) {
        self.vb = v;
    }

    pub fn set_vgamma(&mut self, v: T) {
        self.vgamma = v;
    }

    /// Enable/disable automatic adjustment of Rk and Ck to match a 2 Hz
    /// cutoff based on the configured Vk.
    pub fn set_auto_adjust_cathode_lp(&mut self, enabled: bool) {
        self.auto_adjust_cathode_lp = enabled;
    }

    /// Set the source resistance.
    pub fn with_ri(mut self, v: T) -> Self {
        self.set_ri(v);
        self
    }

    /// Set the cathode resistor.
    pub fn with_rk(mut self, v: T) -> Self {
        self.set_rk(v);
        self
    }

    /// Set the grid leak resistor.
    pub fn with_rg(mut self, v: T) -> Self {
        self.set_rg(v);
        self
    }

    /// Set the anode resistor.
    pub fn with_ra(mut self, v: T) -> Self {
        self.set_ra(v);
        self
    }

    /// Set the input coupling capacitor.
    pub fn with_ci(mut self, v: T) -> Self {
        self.set_ci(v);
        self
    }

    /// Set the cathode bypass capacitor.
    pub fn with_ck(mut self, v: T) -> Self {
        self.set_ck(v);
        self
    }

    /// Set the output coupling capacitor.
    pub fn with_co(mut self, v: T) -> Self {
        self.set_co(v);
        self
    }

    /// Set the cathode (bias) voltage.
    pub fn with_vk(mut self, v: T) -> Self {
        self.set_vk(v);
        self
    }

    /// Set the supply voltage.
    pub fn with_vb(mut self, v: T) -> Self {
        self.set_vb(v);
        self
    }

    /// Set the grid conduction threshold.
    pub fn with_vgamma(mut self, v: T) -> Self {
        self.set_vgamma(v);
        self
    }

    /// Enable/disable the cathode low-pass auto adjustment.
    pub fn with_auto_adjust_cathode_lp(mut self, enabled: bool) -> Self {
        self.set_auto_adjust_cathode_lp(enabled);
        self
    }

    /// Anode current at the bias point: grid at 0 V, cathode at `vk`.
    ///
    /// Uses the same fixed-count Newton solve as the per-sample path,
    /// started from the full anode-cathode supply.
    pub fn quiescent_current(&self) -> T {
        let vgk = -self.vk;
        let g = self.model.perveance(vgk);
        let vb_n = self.vb - self.vk;
        let vak = solve_vak(&self.model, g, vgk, vb_n, self.ra, vb_n);
        self.model.anode_current(g, vgk, vak)
    }

    /// Adjust Rk and Ck to hold the cathode low-pass at 2 Hz.
    ///
    /// Rk is chosen so the quiescent current develops `vk` across it; when no
    /// usable quiescent current exists Rk is kept and only Ck follows.
    pub fn adjust_cathode_lp(&mut self) {
        if !self.auto_adjust_cathode_lp {
            return;
        }

        let ia = self.quiescent_current();
        if ia > T::zero() && ia.is_finite() && self.vk > T::zero() {
            self.rk = self.vk / ia;
        } else {
            warn!(
                "No quiescent anode current at Vk = {:.3} V, keeping Rk = {:.1} ohm",
                self.vk.into_f64(),
                self.rk.into_f64()
            );
        }

        let two = T::from_f64(2.0);
        self.ck = T::one() / (two * T::PI() * T::from_f64(CATHODE_LP_CUTOFF) * self.rk);

        debug!(
            "Cathode low-pass adjusted: Vk = {:.3} V, Ia = {:.3e} A, Rk = {:.1} ohm, Ck = {:.3e} F",
            self.vk.into_f64(),
            ia.into_f64(),
            self.rk.into_f64(),
            self.ck.into_f64()
        );
    }

    /// Corner frequency of the cathode Rk/Ck low-pass.
    pub fn cathode_cutoff(&self) -> T {
        T::one() / (T::from_f64(2.0) * T::PI() * self.rk * self.ck)
    }
}
