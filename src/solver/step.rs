//! One sample of the triode stage.

use crate::sample::Sample;
use crate::stage::StageConfig;

use super::{solve_vak, StageState};

/// Which output a sample produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// DC-blocked output voltage, for the last stage of a chain
    Final,
    /// Raw anode voltage and output resistance, for a following stage
    Pre,
}

/// Result of one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StageOutput<T> {
    Final { vo: T },
    Pre { va: T, ri: T },
}

impl<T: Sample> StageOutput<T> {
    /// Output voltage, zero for a pre stage result.
    #[inline]
    pub fn vo(&self) -> T {
        match *self {
            StageOutput::Final { vo } => vo,
            StageOutput::Pre { .. } => T::zero(),
        }
    }

    /// Anode voltage, zero for a final result.
    #[inline]
    pub fn va(&self) -> T {
        match *self {
            StageOutput::Pre { va, .. } => va,
            StageOutput::Final { .. } => T::zero(),
        }
    }

    /// Output resistance, zero for a final result.
    #[inline]
    pub fn ri(&self) -> T {
        match *self {
            StageOutput::Pre { ri, .. } => ri,
            StageOutput::Final { .. } => T::zero(),
        }
    }
}

/// Solve the next sample.
///
/// `vi_n` is the input voltage and `ri_n` the resistance of the source
/// driving it (the configured Ri, or the previous stage's output
/// resistance). Consumes the previous-sample state and replaces it with this
/// sample's solution.
#[inline]
pub fn step<T: Sample>(
    config: &StageConfig<T>,
    state: &mut StageState<T>,
    kind: OutputKind,
    vi_n: T,
    ri_n: T,
) -> StageOutput<T> {
    let model = &config.model;
    let t = state.t;

    // Grid voltage through the coupling high-pass
    let mut vg_n = (config.rg * (vi_n - state.vi_n1) + (ri_n + config.rg) * state.vg_n1)
        / (ri_n + config.rg + t / config.ci);

    // Grid conduction clamps Vgk at Vgamma and charges the coupling capacitor
    let vgk_drive = vg_n - state.vk_n1;
    let ig_n = if vgk_drive > config.vgamma {
        vg_n = state.vk_n1 + config.vgamma;
        (vgk_drive - config.vgamma) / ri_n
    } else {
        T::zero()
    };

    // Tube: the grid-cathode voltage of the previous sample drives the anode
    let vgk = state.vgk_n1;
    let g = model.perveance(vgk);
    let vak_n = solve_vak(model, g, vgk, config.vb - state.vk_n1, config.ra, state.vak_n1);
    let ia_n = model.anode_current(g, vgk, vak_n);

    // Cathode low-pass
    let vk_n = (state.vk_n1 + t / config.ck * (ia_n + ig_n)) / (T::one() + t / (config.rk * config.ck));

    let va_n = config.vb - config.ra * ia_n;

    let output = match kind {
        OutputKind::Final => {
            // Output DC blocker
            let vo = va_n - state.va_n1 + state.vo_n1 * (T::one() - t / (config.co * config.rg));
            StageOutput::Final { vo }
        }
        OutputKind::Pre => StageOutput::Pre {
            va: va_n,
            ri: model.output_resistance(g, vgk, vak_n, config.ra),
        },
    };

    *state = StageState {
        vk_n,
        vk_n1: vk_n,
        vg_n1: vg_n,
        va_n1: va_n,
        vo_n1: output.vo(),
        vi_n1: vi_n,
        vgk_n1: vg_n - vk_n,
        vak_n1: vak_n,
        ig_n1: ig_n,
        ia_n1: ia_n,
        ..*state
    };

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tube::TubeType;

    const T48K: f64 = 1.0 / 48000.0;

    fn setup(tube: TubeType) -> (StageConfig<f64>, StageState<f64>) {
        let config = StageConfig::new(tube);
        let state = StageState::initial(&config, T48K);
        (config, state)
    }

    #[test]
    fn test_settles_to_bias_point() {
        let (config, mut state) = setup(TubeType::Ecc83);
        let ri = config.ri();
        for _ in 0..96000 {
            step(&config, &mut state, OutputKind::Final, 0.0, ri);
        }
        // Cathode sits at Rk * Ia, anode on the load line
        assert!((state.vk_n1 - config.rk() * state.ia_n1).abs() < 1e-3);
        assert!((state.va_n1 - (config.vb() - config.ra() * state.ia_n1)).abs() < 1e-9);
        assert!(state.va_n1 > 0.0 && state.va_n1 < config.vb());
        assert_eq!(state.ig_n1, 0.0);
    }

    #[test]
    fn test_state_fields_all_advance() {
        let (config, mut state) = setup(TubeType::Ecc82);
        let before = state;
        let out = step(&config, &mut state, OutputKind::Final, 0.25, config.ri());
        assert_eq!(state.vi_n1, 0.25);
        assert_eq!(state.vo_n1, out.vo());
        assert_eq!(state.vk_n, state.vk_n1);
        assert_eq!(state.vgk_n1, state.vg_n1 - state.vk_n1);
        assert_ne!(state.vak_n1, before.vak_n1);
        assert_ne!(state.ia_n1, before.ia_n1);
        assert_eq!(state.t, before.t);
        assert_eq!(state.first_sample, before.first_sample);
    }

    #[test]
    fn test_pre_output_pairing() {
        let (config, mut state) = setup(TubeType::Ecc83);
        let out = step(&config, &mut state, OutputKind::Pre, 0.1, config.ri());
        match out {
            StageOutput::Pre { va, ri } => {
                assert_eq!(va, state.va_n1);
                assert!(ri > 0.0 && ri < config.ra());
            }
            StageOutput::Final { .. } => panic!("expected pre output"),
        }
        assert_eq!(out.vo(), 0.0);
        assert_eq!(state.vo_n1, 0.0);
    }

    #[test]
    fn test_final_output_pairing() {
        let (config, mut state) = setup(TubeType::Ecc83);
        let out = step(&config, &mut state, OutputKind::Final, 0.1, config.ri());
        assert!(matches!(out, StageOutput::Final { .. }));
        assert_eq!(out.va(), 0.0);
        assert_eq!(out.ri(), 0.0);
    }

    #[test]
    fn test_grid_conduction_clamps() {
        let (config, mut state) = setup(TubeType::Ecc83);
        // A 50 V step drives the grid far above the cathode
        step(&config, &mut state, OutputKind::Final, 50.0, config.ri());
        assert!(state.ig_n1 > 0.0);
        assert!((state.vg_n1 - (config.vk() + config.vgamma())).abs() < 1e-12);
    }

    #[test]
    fn test_inverting_gain() {
        let (config, mut state) = setup(TubeType::Ecc83);
        let ri = config.ri();
        for _ in 0..96000 {
            step(&config, &mut state, OutputKind::Pre, 0.0, ri);
        }
        let rest = state.va_n1;
        // A small positive grid step lowers the anode voltage
        for _ in 0..4 {
            step(&config, &mut state, OutputKind::Pre, 0.05, ri);
        }
        assert!(state.va_n1 < rest);
    }
}
