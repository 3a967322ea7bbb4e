//! WASM bindings for Triode Core.
//!
//! This module provides JavaScript-friendly bindings for use in web browsers
//! with Web Audio API's AudioWorklet.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmTriodeChain } from 'triode_core';
//!
//! await init();
//!
//! const chain = new WasmTriodeChain("ecc83,ecc83,ecc82", 48000);
//!
//! // In AudioWorkletProcessor.process():
//! const input = inputBuffer.getChannelData(0);
//! const output = outputBuffer.getChannelData(0);
//! chain.process_block(input, output);
//! ```

use wasm_bindgen::prelude::*;

use crate::chain::StageChain;
use crate::error::{Result, TriodeError};
use crate::tube::TubeType;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn to_js(err: TriodeError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Parse a comma-separated tube list such as `"ecc83, 12au7"`.
fn parse_tubes(list: &str) -> Result<Vec<TubeType>> {
    let tubes = list
        .split(',')
        .filter(|name| !name.trim().is_empty())
        .map(str::parse)
        .collect::<Result<Vec<TubeType>>>()?;
    if tubes.is_empty() {
        return Err(TriodeError::WasmError {
            message: format!("no tube names in '{list}'"),
        });
    }
    Ok(tubes)
}

/// WASM-compatible triode stage cascade.
///
/// Wraps a single precision [`StageChain`] for processing audio blocks in a
/// Web Audio AudioWorklet.
#[wasm_bindgen]
pub struct WasmTriodeChain {
    chain: StageChain<f32>,
    sample_rate: f32,
}

#[wasm_bindgen]
impl WasmTriodeChain {
    /// Create a cascade from a comma-separated list of tube names.
    ///
    /// # Arguments
    /// * `tubes` - Tube of each stage in signal order, e.g. `"ecc83,ecc82"`
    /// * `sample_rate` - Audio sample rate in Hz (typically 44100 or 48000)
    #[wasm_bindgen(constructor)]
    pub fn new(tubes: &str, sample_rate: f32) -> std::result::Result<WasmTriodeChain, JsValue> {
        let tubes = parse_tubes(tubes).map_err(to_js)?;
        let chain = StageChain::with_tubes(&tubes, f64::from(sample_rate)).map_err(to_js)?;
        Ok(WasmTriodeChain { chain, sample_rate })
    }

    /// Process a block of audio samples.
    ///
    /// Designed to be called from an AudioWorkletProcessor's `process()`
    /// method. Processes as many samples as the shorter buffer holds.
    #[wasm_bindgen]
    pub fn process_block(&mut self, input: &[f32], output: &mut [f32]) {
        self.chain.process_buffer(input, output);
    }

    /// Process a block of audio samples, returning the result.
    #[wasm_bindgen]
    pub fn process_block_alloc(&mut self, input: &[f32]) -> Vec<f32> {
        let mut output = vec![0.0; input.len()];
        self.process_block(input, &mut output);
        output
    }

    /// Get the sample rate this chain was configured with.
    #[wasm_bindgen(getter)]
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Number of stages in the cascade.
    #[wasm_bindgen]
    pub fn stage_count(&self) -> usize {
        self.chain.len()
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Get the default sample rate.
#[wasm_bindgen]
pub fn default_sample_rate() -> f32 {
    crate::DEFAULT_SAMPLE_RATE as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tubes() {
        let tubes = parse_tubes("ecc83, 12AU7 ,").unwrap();
        assert_eq!(tubes, [TubeType::Ecc83, TubeType::Ecc82]);
        assert!(matches!(parse_tubes(" , "), Err(TriodeError::WasmError { .. })));
        assert!(matches!(parse_tubes("el34"), Err(TriodeError::UnknownTubeType { .. })));
    }
}
