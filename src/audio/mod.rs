//! Audio I/O for the CLI frontend.
//!
//! Reads raw little-endian `f32` mono PCM from stdin and writes the same
//! format to stdout.

use std::io::{self, Read, Write};

use log::debug;

use crate::chain::StageChain;
use crate::error::{Result, TriodeError};
use crate::sample::Sample;

/// Default buffer size for audio processing (in samples).
pub const BUFFER_SIZE: usize = 256;

const BYTES_PER_SAMPLE: usize = 4;

/// Audio input reader.
pub struct AudioInput<R> {
    reader: R,
    buffer: Vec<u8>,
    // Bytes of a sample split across two reads
    pending: usize,
}

impl AudioInput<io::Stdin> {
    /// Create a reader on stdin.
    pub fn stdin(buffer_size: usize) -> Self {
        Self::new(io::stdin(), buffer_size)
    }
}

impl<R: Read> AudioInput<R> {
    pub fn new(reader: R, buffer_size: usize) -> Self {
        Self {
            reader,
            buffer: vec![0u8; buffer_size.max(1) * BYTES_PER_SAMPLE],
            pending: 0,
        }
    }

    /// Read a block of samples.
    /// Returns the number of samples read, or 0 on EOF.
    pub fn read_block<T: Sample>(&mut self, samples: &mut [T]) -> Result<usize> {
        if samples.is_empty() {
            return Ok(0);
        }
        let bytes_wanted = (samples.len() * BYTES_PER_SAMPLE).min(self.buffer.len());

        loop {
            let bytes_read = self
                .reader
                .read(&mut self.buffer[self.pending..bytes_wanted])
                .map_err(|e| TriodeError::AudioInputError {
                    message: e.to_string(),
                })?;

            if bytes_read == 0 {
                if self.pending > 0 {
                    debug!("Dropping {} trailing bytes of a partial sample", self.pending);
                    self.pending = 0;
                }
                return Ok(0);
            }

            let available = self.pending + bytes_read;
            let samples_read = available / BYTES_PER_SAMPLE;
            if samples_read == 0 {
                self.pending = available;
                continue;
            }

            let whole = samples_read * BYTES_PER_SAMPLE;
            for (sample, bytes) in samples
                .iter_mut()
                .zip(self.buffer[..whole].chunks_exact(BYTES_PER_SAMPLE))
            {
                *sample = T::from_f32(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]));
            }

            // Keep the partial sample for the next call
            self.buffer.copy_within(whole..available, 0);
            self.pending = available - whole;

            return Ok(samples_read);
        }
    }
}

/// Audio output writer.
pub struct AudioOutput<W> {
    writer: W,
    buffer: Vec<u8>,
}

impl AudioOutput<io::Stdout> {
    /// Create a writer on stdout.
    pub fn stdout(buffer_size: usize) -> Self {
        Self::new(io::stdout(), buffer_size)
    }
}

impl<W: Write> AudioOutput<W> {
    pub fn new(writer: W, buffer_size: usize) -> Self {
        Self {
            writer,
            buffer: vec![0u8; buffer_size * BYTES_PER_SAMPLE],
        }
    }

    /// Write a block of samples.
    pub fn write_block<T: Sample>(&mut self, samples: &[T]) -> Result<()> {
        let bytes_needed = samples.len() * BYTES_PER_SAMPLE;
        if self.buffer.len() < bytes_needed {
            self.buffer.resize(bytes_needed, 0);
        }

        for (bytes, &sample) in self.buffer.chunks_exact_mut(BYTES_PER_SAMPLE).zip(samples) {
            bytes.copy_from_slice(&sample.into_f32().to_le_bytes());
        }

        self.writer
            .write_all(&self.buffer[..bytes_needed])
            .map_err(|e| TriodeError::AudioOutputError {
                message: e.to_string(),
            })
    }

    /// Flush the output stream.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(|e| TriodeError::AudioOutputError {
            message: e.to_string(),
        })
    }
}

/// Run a stream through the chain until the input ends.
///
/// Returns the number of samples processed.
pub fn process_stream<T, R, W>(
    chain: &mut StageChain<T>,
    input: &mut AudioInput<R>,
    output: &mut AudioOutput<W>,
    buffer_size: usize,
) -> Result<u64>
where
    T: Sample,
    R: Read,
    W: Write,
{
    let buffer_size = buffer_size.max(1);
    let mut in_samples = vec![T::zero(); buffer_size];
    let mut out_samples = vec![T::zero(); buffer_size];
    let mut total = 0u64;

    loop {
        let samples_read = input.read_block(&mut in_samples)?;

        if samples_read == 0 {
            break;
        }

        chain.process_buffer(&in_samples[..samples_read], &mut out_samples[..samples_read]);
        output.write_block(&out_samples[..samples_read])?;
        total += samples_read as u64;
    }

    output.flush()?;
    Ok(total)
}

/// Process audio from stdin to stdout using the given chain.
pub fn process_audio<T: Sample>(chain: &mut StageChain<T>, buffer_size: usize) -> Result<u64> {
    let mut input = AudioInput::stdin(buffer_size);
    let mut output = AudioOutput::stdout(buffer_size);
    process_stream(chain, &mut input, &mut output, buffer_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tube::TubeType;
    use std::io::Cursor;

    fn encode(samples: &[f32]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    fn decode(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect()
    }

    /// Hands out at most `step` bytes per read.
    struct Trickle {
        data: Vec<u8>,
        pos: usize,
        step: usize,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.step.min(buf.len()).min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    #[test]
    fn test_read_handles_split_samples() {
        let samples = [0.25f32, -0.5, 1.0, 3.5, -7.0];
        let mut input = AudioInput::new(
            Trickle {
                data: encode(&samples),
                pos: 0,
                step: 3,
            },
            8,
        );

        let mut got = Vec::new();
        let mut block = [0.0f64; 8];
        loop {
            let n = input.read_block(&mut block).unwrap();
            if n == 0 {
                break;
            }
            got.extend(block[..n].iter().map(|&v| v as f32));
        }
        assert_eq!(got, samples);
    }

    #[test]
    fn test_stream_matches_chain() {
        let samples: Vec<f32> = (0..1000).map(|i| (i as f32 * 0.05).sin() * 0.5).collect();

        let mut chain = StageChain::<f32>::with_tubes(&[TubeType::Ecc83, TubeType::Ecc82], 48000.0).unwrap();
        let mut input = AudioInput::new(Cursor::new(encode(&samples)), 64);
        let mut output = AudioOutput::new(Vec::new(), 64);
        let total = process_stream(&mut chain, &mut input, &mut output, 64).unwrap();
        assert_eq!(total, 1000);

        let mut reference = StageChain::<f32>::with_tubes(&[TubeType::Ecc83, TubeType::Ecc82], 48000.0).unwrap();
        let mut expected = vec![0.0f32; samples.len()];
        reference.process_buffer(&samples, &mut expected);

        assert_eq!(decode(&output.writer), expected);
    }
}
