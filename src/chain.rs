//! Linear cascades of triode stages.
//!
//! Each stage except the last runs in pre mode and hands its anode voltage
//! and output resistance to the next stage, which runs in follower mode.
//! [`StageChain`] owns the stages plus one Va/Ri link buffer between each
//! adjacent pair and processes them upstream first.

use log::debug;

use crate::error::{Result, TriodeError};
use crate::sample::Sample;
use crate::stage::TriodeStage;
use crate::tube::TubeType;
use crate::DEFAULT_SAMPLE_RATE;

/// Default number of samples processed per chunk.
pub const DEFAULT_MAX_BUFFER_SIZE: usize = 1024;

/// Mark `upstream` as a pre stage feeding `downstream` as a follower.
///
/// Only the mode flags change; routing upstream's Va/Ri outputs into
/// downstream's inputs is up to the caller (or [`StageChain`]).
pub fn connect_stage<T: Sample>(upstream: &mut TriodeStage<T>, downstream: &mut TriodeStage<T>) {
    upstream.set_pre_stage(true);
    downstream.set_follower_stage(true);
}

/// Va/Ri buffers between two stages.
#[derive(Debug, Clone)]
struct Link<T> {
    va: Vec<T>,
    ri: Vec<T>,
}

impl<T: Sample> Link<T> {
    fn new(size: usize) -> Self {
        Self {
            va: vec![T::zero(); size],
            ri: vec![T::zero(); size],
        }
    }

    fn resize(&mut self, size: usize) {
        self.va.resize(size, T::zero());
        self.ri.resize(size, T::zero());
    }
}

/// A mono cascade of triode stages.
#[derive(Debug, Clone)]
pub struct StageChain<T: Sample> {
    stages: Vec<TriodeStage<T>>,
    links: Vec<Link<T>>,
    max_buffer_size: usize,
}

impl<T: Sample> Default for StageChain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Sample> StageChain<T> {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self {
            stages: Vec::new(),
            links: Vec::new(),
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
        }
    }

    /// Build and set up a cascade with one stage per tube, in order.
    pub fn with_tubes(tubes: &[TubeType], sample_rate: f64) -> Result<Self> {
        if tubes.is_empty() {
            return Err(TriodeError::EmptyChain);
        }

        let mut chain = Self::new();
        for &tube in tubes {
            chain.push(TriodeStage::new(tube));
        }
        chain.set_sample_rate(sample_rate);
        chain.setup()?;

        debug!("Built {} stage chain at {} Hz", chain.len(), sample_rate);
        Ok(chain)
    }

    /// Set the number of samples each stage processes per call. Longer host
    /// buffers are split into chunks of this size.
    pub fn with_max_buffer_size(mut self, size: usize) -> Self {
        self.max_buffer_size = size.max(1);
        for link in &mut self.links {
            link.resize(self.max_buffer_size);
        }
        self
    }

    pub fn max_buffer_size(&self) -> usize {
        self.max_buffer_size
    }

    /// Append a stage, connecting it after the current last stage.
    pub fn push(&mut self, mut stage: TriodeStage<T>) {
        if let Some(tail) = self.stages.last_mut() {
            connect_stage(tail, &mut stage);
            self.links.push(Link::new(self.max_buffer_size));
        }
        self.stages.push(stage);
    }

    /// Set the sampling rate of every stage.
    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        for stage in &mut self.stages {
            stage.set_sample_rate(sample_rate);
        }
    }

    /// Sampling rate of the first stage.
    pub fn sample_rate(&self) -> f64 {
        self.stages
            .first()
            .map_or(DEFAULT_SAMPLE_RATE, TriodeStage::sample_rate)
    }

    /// Set up every stage.
    pub fn setup(&mut self) -> Result<()> {
        for stage in &mut self.stages {
            stage.setup()?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stage(&self, index: usize) -> Option<&TriodeStage<T>> {
        self.stages.get(index)
    }

    pub fn stage_mut(&mut self, index: usize) -> Option<&mut TriodeStage<T>> {
        self.stages.get_mut(index)
    }

    pub fn stages(&self) -> &[TriodeStage<T>] {
        &self.stages
    }

    /// Process a mono buffer through every stage.
    ///
    /// Processes `min(input.len(), output.len())` samples. An empty chain
    /// copies its input.
    pub fn process_buffer(&mut self, input: &[T], output: &mut [T]) {
        let len = input.len().min(output.len());
        if self.stages.is_empty() {
            output[..len].copy_from_slice(&input[..len]);
            return;
        }

        let chunk = self.max_buffer_size;
        for (inp, out) in input[..len].chunks(chunk).zip(output[..len].chunks_mut(chunk)) {
            self.process_chunk(inp, out);
        }
    }

    fn process_chunk(&mut self, input: &[T], output: &mut [T]) {
        let size = input.len();
        let last = self.stages.len() - 1;

        for (i, stage) in self.stages.iter_mut().enumerate() {
            match (i == 0, i == last) {
                (true, true) => stage.process_buffer(&[input], &mut [&mut *output], size),
                (true, false) => {
                    let link = &mut self.links[0];
                    stage.process_buffer(&[input], &mut [&mut link.va[..size], &mut link.ri[..size]], size);
                }
                (false, true) => {
                    let link = &self.links[i - 1];
                    stage.process_buffer(&[&link.va[..size], &link.ri[..size]], &mut [&mut *output], size);
                }
                (false, false) => {
                    let (before, after) = self.links.split_at_mut(i);
                    let upstream = &before[i - 1];
                    let downstream = &mut after[0];
                    stage.process_buffer(
                        &[&upstream.va[..size], &upstream.ri[..size]],
                        &mut [&mut downstream.va[..size], &mut downstream.ri[..size]],
                        size,
                    );
                }
            }
        }
    }
}
