//! Triode stage processor.
//!
//! [`TriodeStage`] owns the circuit configuration and runtime state of one
//! stage and runs the per-sample solver over buffers. The host supplies one
//! input slice per input port and one output slice per output port; the
//! number of ports follows the stage mode (see [`StageMode`]).

use log::debug;

use crate::error::{Result, TriodeError};
use crate::sample::Sample;
use crate::solver::{step, OutputKind, StageState};
use crate::tube::{TubeParams, TubeType};
use crate::DEFAULT_SAMPLE_RATE;

use super::{StageConfig, StageMode};

/// One triode preamp stage.
///
/// Lifecycle: construct, [`setup`](Self::setup), then call
/// [`process_buffer`](Self::process_buffer) for consecutive buffers. Mode
/// flags and circuit values are changed between buffers, never during one.
#[derive(Debug, Clone)]
pub struct TriodeStage<T: Sample> {
    config: StageConfig<T>,
    state: StageState<T>,
    mode: StageMode,
    nb_input_ports: usize,
    nb_output_ports: usize,
    sample_rate: f64,
    input_delay: usize,
    output_delay: usize,
}

impl<T: Sample> Default for TriodeStage<T> {
    fn default() -> Self {
        Self::new(TubeType::default())
    }
}

impl<T: Sample> TriodeStage<T> {
    /// Create a single-mode stage with the reference circuit of a tube type.
    pub fn new(tube: TubeType) -> Self {
        Self::from_config(StageConfig::new(tube))
    }

    /// Create a single-mode stage from a full parameter set.
    pub fn with_params(params: &TubeParams) -> Self {
        Self::from_config(StageConfig::from_params(params))
    }

    /// Create a single-mode stage from a circuit configuration.
    pub fn from_config(config: StageConfig<T>) -> Self {
        let t = T::from_f64(1.0 / DEFAULT_SAMPLE_RATE);
        let state = StageState::initial(&config, t);
        let mode = StageMode::default();
        Self {
            config,
            state,
            mode,
            nb_input_ports: mode.input_ports(),
            nb_output_ports: mode.output_ports(),
            sample_rate: DEFAULT_SAMPLE_RATE,
            input_delay: 0,
            output_delay: 0,
        }
    }

    /// Initialize the runtime state and sampling-dependent values.
    ///
    /// Puts the stage back at rest. A follower stage that has already seeded
    /// its input does not seed again.
    pub fn setup(&mut self) -> Result<()> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(TriodeError::InvalidSampleRate {
                sample_rate: self.sample_rate,
            });
        }

        let t = T::from_f64(1.0 / self.sample_rate);
        self.state.reset(&self.config, t);
        self.input_delay = 1;
        self.output_delay = 1;

        debug!(
            "Triode stage setup: {} mode, {} Hz, Vk = {:.3} V",
            self.mode,
            self.sample_rate,
            self.config.vk.into_f64()
        );
        Ok(())
    }

    /// Set the sampling rate used by the next [`setup`](Self::setup).
    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Input latency reported to the host, in samples.
    pub fn input_delay(&self) -> usize {
        self.input_delay
    }

    /// Output latency reported to the host, in samples.
    pub fn output_delay(&self) -> usize {
        self.output_delay
    }

    pub fn nb_input_ports(&self) -> usize {
        self.nb_input_ports
    }

    pub fn nb_output_ports(&self) -> usize {
        self.nb_output_ports
    }

    pub fn mode(&self) -> StageMode {
        self.mode
    }

    pub fn config(&self) -> &StageConfig<T> {
        &self.config
    }

    /// Runtime state after the last processed sample.
    pub fn state(&self) -> &StageState<T> {
        &self.state
    }

    pub fn pre_stage(&self) -> bool {
        self.mode.is_pre()
    }

    pub fn follower_stage(&self) -> bool {
        self.mode.is_follower()
    }

    /// Enable/disable the pre stage mode.
    pub fn set_pre_stage(&mut self, pre_stage: bool) {
        self.set_mode(self.mode.with_pre(pre_stage));
    }

    /// Enable/disable the follower stage mode.
    pub fn set_follower_stage(&mut self, follower_stage: bool) {
        self.set_mode(self.mode.with_follower(follower_stage));
    }

    fn set_mode(&mut self, mode: StageMode) {
        if mode != self.mode {
            debug!("Triode stage mode: {} -> {}", self.mode, mode);
        }
        self.mode = mode;
        self.nb_input_ports = mode.input_ports();
        self.nb_output_ports = mode.output_ports();
    }

    pub fn ri(&self) -> T {
        self.config.ri
    }

    pub fn rk(&self) -> T {
        self.config.rk
    }

    pub fn rg(&self) -> T {
        self.config.rg
    }

    pub fn ra(&self) -> T {
        self.config.ra
    }

    pub fn ci(&self) -> T {
        self.config.ci
    }

    pub fn ck(&self) -> T {
        self.config.ck
    }

    pub fn co(&self) -> T {
        self.config.co
    }

    pub fn vk(&self) -> T {
        self.config.vk
    }

    pub fn vb(&self) -> T {
        self.config.vb
    }

    pub fn auto_adjust_cathode_lp(&self) -> bool {
        self.config.auto_adjust_cathode_lp
    }

    pub fn set_ri(&mut self, v: T) {
        self.config.set_ri(v);
    }

    pub fn set_rk(&mut self, v: T) {
        self.config.set_rk(v);
    }

    pub fn set_rg(&mut self, v: T) {
        self.config.set_rg(v);
    }

    pub fn set_ra(&mut self, v: T) {
        self.config.set_ra(v);
    }

    pub fn set_ci(&mut self, v: T) {
        self.config.set_ci(v);
    }

    pub fn set_ck(&mut self, v: T) {
        self.config.set_ck(v);
    }

    pub fn set_co(&mut self, v: T) {
        self.config.set_co(v);
    }

    /// Set the cathode voltage. The cathode state jumps to the new value.
    pub fn set_vk(&mut self, v: T) {
        self.config.set_vk(v);
        self.state.vk_n = v;
        self.state.vk_n1 = v;
    }

    pub fn set_vb(&mut self, v: T) {
        self.config.set_vb(v);
    }

    /// Enable/disable automatic adjustment of Rk and Ck to match a 2 Hz
    /// cutoff based on the defined Vk.
    pub fn set_auto_adjust_cathode_lp(&mut self, enabled: bool) {
        self.config.set_auto_adjust_cathode_lp(enabled);
    }

    /// Process `size` samples.
    ///
    /// `inputs` must hold [`nb_input_ports`](Self::nb_input_ports) slices and
    /// `outputs` [`nb_output_ports`](Self::nb_output_ports) slices, each at
    /// least `size` long. Missing ports or short slices are a caller error:
    /// debug builds assert, release builds process what is there. A follower
    /// needs a positive Ri on port 1; a zero Ri with a conducting grid makes
    /// the grid current infinite and the stage state non-finite from then on.
    pub fn process_buffer(&mut self, inputs: &[&[T]], outputs: &mut [&mut [T]], size: usize) {
        debug_assert!(
            inputs.len() >= self.nb_input_ports,
            "{} mode needs {} input ports, got {}",
            self.mode,
            self.nb_input_ports,
            inputs.len()
        );
        debug_assert!(
            outputs.len() >= self.nb_output_ports,
            "{} mode needs {} output ports, got {}",
            self.mode,
            self.nb_output_ports,
            outputs.len()
        );
        debug_assert!(inputs.iter().take(self.nb_input_ports).all(|port| port.len() >= size));
        debug_assert!(outputs.iter().take(self.nb_output_ports).all(|port| port.len() >= size));

        if size == 0 {
            return;
        }

        match self.mode {
            StageMode::Single => self.process_loop_single(inputs, outputs, size),
            StageMode::Pre => self.process_loop_pre(inputs, outputs, size),
            StageMode::Follower => self.process_loop_follower(inputs, outputs, size),
            StageMode::PreFollower => self.process_loop_pre_follower(inputs, outputs, size),
        }
    }

    /// Single stage: Vi in, Vo out.
    fn process_loop_single(&mut self, inputs: &[&[T]], outputs: &mut [&mut [T]], size: usize) {
        let ([vi, ..], [vo, ..]) = (inputs, outputs) else {
            return;
        };
        let ri = self.config.ri;
        for (out, &v) in vo.iter_mut().zip(vi.iter()).take(size) {
            *out = step(&self.config, &mut self.state, OutputKind::Final, v, ri).vo();
        }
    }

    /// Pre stage, no follower: Vi in, Va and Ri out.
    fn process_loop_pre(&mut self, inputs: &[&[T]], outputs: &mut [&mut [T]], size: usize) {
        let ([vi, ..], [va, ri_out, ..]) = (inputs, outputs) else {
            return;
        };
        let ri = self.config.ri;
        for ((va, ri_out), &v) in va.iter_mut().zip(ri_out.iter_mut()).zip(vi.iter()).take(size) {
            let r = step(&self.config, &mut self.state, OutputKind::Pre, v, ri);
            *va = r.va();
            *ri_out = r.ri();
        }
    }

    /// Follower stage, no pre: Va and Ri in, Vo out.
    fn process_loop_follower(&mut self, inputs: &[&[T]], outputs: &mut [&mut [T]], size: usize) {
        let ([va_in, ri_in, ..], [vo, ..]) = (inputs, outputs) else {
            return;
        };
        self.prepare_follower(va_in);
        for (out, (&v, &ri)) in vo.iter_mut().zip(va_in.iter().zip(ri_in.iter())).take(size) {
            *out = step(&self.config, &mut self.state, OutputKind::Final, v, ri).vo();
        }
    }

    /// Pre stage and follower: Va and Ri in, Va and Ri out.
    fn process_loop_pre_follower(&mut self, inputs: &[&[T]], outputs: &mut [&mut [T]], size: usize) {
        let ([va_in, ri_in, ..], [va_out, ri_out, ..]) = (inputs, outputs) else {
            return;
        };
        self.prepare_follower(va_in);
        let outs = va_out.iter_mut().zip(ri_out.iter_mut());
        let ins = va_in.iter().zip(ri_in.iter());
        for ((va, ri_out), (&v, &ri)) in outs.zip(ins).take(size) {
            let r = step(&self.config, &mut self.state, OutputKind::Pre, v, ri);
            *va = r.va();
            *ri_out = r.ri();
        }
    }

    /// The anode signal of a previous stage carries a large DC offset. The
    /// first input sample ever seen becomes the previous input, so the
    /// coupling network starts in steady state instead of on a step.
    #[inline]
    fn prepare_follower(&mut self, va_in: &[T]) {
        if self.state.first_sample {
            if let Some(&first) = va_in.first() {
                self.state.vi_n1 = first;
                self.state.first_sample = false;
            }
        }
    }
}
