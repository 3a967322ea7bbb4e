//! Runtime state carried from one sample to the next.

use crate::sample::Sample;
use crate::stage::StageConfig;

/// Previous-sample voltages and currents of one stage.
///
/// The `_n1` fields hold the solved values of the previous sample. The
/// solver replaces them all at once at the end of a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageState<T> {
    /// Cathode voltage of the current sample
    pub vk_n: T,
    pub vk_n1: T,
    pub vg_n1: T,
    pub va_n1: T,
    pub vo_n1: T,
    pub vi_n1: T,
    pub vgk_n1: T,
    pub vak_n1: T,
    /// Grid current
    pub ig_n1: T,
    /// Anode current
    pub ia_n1: T,
    /// Set until a follower stage has seeded `vi_n1` from its first input
    pub first_sample: bool,
    /// Time delta between two samples
    pub t: T,
}

impl<T: Sample> StageState<T> {
    /// State of a stage at rest: no signal, anode at the supply, cathode at
    /// its bias voltage.
    pub fn initial(config: &StageConfig<T>, t: T) -> Self {
        let mut state = Self {
            vk_n: T::zero(),
            vk_n1: T::zero(),
            vg_n1: T::zero(),
            va_n1: T::zero(),
            vo_n1: T::zero(),
            vi_n1: T::zero(),
            vgk_n1: T::zero(),
            vak_n1: T::zero(),
            ig_n1: T::zero(),
            ia_n1: T::zero(),
            first_sample: true,
            t,
        };
        state.reset(config, t);
        state
    }

    /// Return to the rest state.
    ///
    /// `first_sample` is left alone: a follower seeds once per lifetime.
    pub fn reset(&mut self, config: &StageConfig<T>, t: T) {
        self.vg_n1 = T::zero();
        self.vo_n1 = T::zero();
        self.vi_n1 = T::zero();
        self.ig_n1 = T::zero();
        self.ia_n1 = T::zero();
        self.va_n1 = config.vb;
        self.vak_n1 = config.vb;
        self.vk_n = config.vk;
        self.vk_n1 = config.vk;
        self.vgk_n1 = self.vg_n1 - self.vk_n1;
        self.t = t;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tube::TubeType;

    #[test]
    fn test_initial_state() {
        let config = StageConfig::<f64>::new(TubeType::Ecc82);
        let state = StageState::initial(&config, 1.0 / 48000.0);
        assert_eq!(state.va_n1, 250.0);
        assert_eq!(state.vak_n1, 250.0);
        assert_eq!(state.vk_n, 6.0);
        assert_eq!(state.vk_n1, 6.0);
        assert_eq!(state.vgk_n1, -6.0);
        assert_eq!(state.vi_n1, 0.0);
        assert_eq!(state.vo_n1, 0.0);
        assert!(state.first_sample);
    }

    #[test]
    fn test_reset_keeps_seed_flag() {
        let config = StageConfig::<f64>::new(TubeType::Ecc83);
        let mut state = StageState::initial(&config, 1.0 / 48000.0);
        state.first_sample = false;
        state.vi_n1 = 180.0;
        state.reset(&config, 1.0 / 96000.0);
        assert!(!state.first_sample);
        assert_eq!(state.vi_n1, 0.0);
        assert_eq!(state.t, 1.0 / 96000.0);
    }
}
