use crate::config::RttyConfig;
use crate::error::{Result, RttyError};
use crate::framing::{BitFrame, Framer, Warning};
use crate::fsk::{Ramp, SampleBuffer, ToneSynthesizer, MAX_RESERVED_SAMPLES};
use std::sync::atomic::{AtomicBool, Ordering};

/// Samples plus everything the caller may want to report
#[derive(Debug, Clone, PartialEq)]
pub struct Encoded {
    pub buffer: SampleBuffer,
    /// Characters dropped in skip mode
    pub warnings: Vec<Warning>,
    /// Frames transmitted, shift frames included
    pub frame_count: usize,
}

/// Text-to-RTTY encoder
///
/// Holds only the validated configuration, so one encoder can serve any
/// number of concurrent calls.
#[derive(Debug, Clone)]
pub struct Encoder {
    config: RttyConfig,
    framer: Framer,
}

impl Encoder {
    pub fn new(config: RttyConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            framer: Framer::from_config(&config),
            config,
        })
    }

    pub fn config(&self) -> &RttyConfig {
        &self.config
    }

    pub fn framer(&self) -> &Framer {
        &self.framer
    }

    /// Encode `text` into a complete sample buffer
    pub fn encode(&self, text: &str) -> Result<Encoded> {
        self.encode_inner(text, None)
    }

    /// Like [`encode`](Self::encode), checking `cancel` between frames
    pub fn encode_cancellable(&self, text: &str, cancel: &AtomicBool) -> Result<Encoded> {
        self.encode_inner(text, Some(cancel))
    }

    /// Frame `text` now and synthesize lazily, one chunk per frame.
    ///
    /// Framing errors are reported here, before any audio is produced.
    pub fn chunks(&self, text: &str) -> Result<SampleChunks> {
        let (frames, warnings) = self.frame(text)?;
        SampleChunks::new(&self.config, frames, warnings)
    }

    fn frame(&self, text: &str) -> Result<(Vec<BitFrame>, Vec<Warning>)> {
        if text.is_empty() {
            return Ok((Vec::new(), Vec::new()));
        }

        let framed = self.framer.frame(text)?;
        for warning in &framed.warnings {
            log::warn!("{}", warning);
        }
        log::debug!(
            "framed {} chars into {} frames ({} shifts, {} skipped)",
            text.chars().count(),
            framed.frames.len(),
            framed.shift_count(),
            framed.warnings.len()
        );
        Ok((framed.frames, framed.warnings))
    }

    fn encode_inner(&self, text: &str, cancel: Option<&AtomicBool>) -> Result<Encoded> {
        let (frames, warnings) = self.frame(text)?;
        let frame_count = frames.len();
        let mut chunks = SampleChunks::new(&self.config, frames, warnings)?;

        let mut samples = Vec::with_capacity(chunks.total_samples().min(MAX_RESERVED_SAMPLES));
        loop {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                log::debug!("encode cancelled after {} samples", samples.len());
                return Err(RttyError::Cancelled);
            }
            if !chunks.next_into(&mut samples) {
                break;
            }
        }

        log::debug!(
            "synthesized {} samples ({:.2} s at {} Hz)",
            samples.len(),
            samples.len() as f64 / self.config.sample_rate as f64,
            self.config.sample_rate
        );

        Ok(Encoded {
            buffer: SampleBuffer::from_samples(samples, self.config.sample_rate),
            warnings: chunks.warnings,
            frame_count,
        })
    }
}

/// Encode with a one-off encoder
pub fn encode(text: &str, config: &RttyConfig) -> Result<Encoded> {
    Encoder::new(config.clone())?.encode(text)
}

/// Lazily synthesized transmission: the idle lead-in (if any) followed by one
/// chunk per frame.
///
/// Cloning before iteration gives an independent replay of the same stream.
#[derive(Debug, Clone)]
pub struct SampleChunks {
    synth: ToneSynthesizer,
    frames: Vec<BitFrame>,
    warnings: Vec<Warning>,
    next_frame: usize,
    idle_bits: usize,
    ramp: Ramp,
    total: usize,
}

impl SampleChunks {
    fn new(config: &RttyConfig, frames: Vec<BitFrame>, warnings: Vec<Warning>) -> Result<Self> {
        let synth = ToneSynthesizer::new(config)?;
        // Idle lead-in only makes sense ahead of something to send
        let idle_bits = if frames.is_empty() { 0 } else { config.idle_bits };
        let bit_times = idle_bits as f64 + frames.len() as f64 * config.frame_bit_times();
        let total = synth.checked_boundary(bit_times)?;

        Ok(Self {
            synth,
            frames,
            warnings,
            next_frame: 0,
            idle_bits,
            ramp: Ramp::new(config.ramp_samples, total),
            total,
        })
    }

    /// Sample count of the whole stream
    pub fn total_samples(&self) -> usize {
        self.total
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Append the next chunk to `out`; false once the stream is exhausted
    pub fn next_into(&mut self, out: &mut Vec<f32>) -> bool {
        let offset = self.synth.samples_emitted();
        let start = out.len();

        if self.idle_bits > 0 {
            self.synth.push_idle(self.idle_bits, out);
            self.idle_bits = 0;
        } else if let Some(frame) = self.frames.get(self.next_frame) {
            self.synth.push_frame(frame, out);
            self.next_frame += 1;
        } else {
            return false;
        }

        self.ramp.apply(&mut out[start..], offset);
        true
    }
}

impl Iterator for SampleChunks {
    type Item = Vec<f32>;

    fn next(&mut self) -> Option<Vec<f32>> {
        let mut chunk = Vec::new();
        self.next_into(&mut chunk).then_some(chunk)
    }
}
