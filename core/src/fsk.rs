use crate::config::RttyConfig;
use crate::error::{Result, RttyError};
use crate::framing::{BitFrame, Level};
use crate::MAX_STREAM_SAMPLES;
use std::f64::consts::{FRAC_PI_2, TAU};

// Two-tone FSK synthesis
//
// Timing: bit boundaries are placed at round(elapsed_bit_times * samples_per_bit)
// measured from the start of the stream, so fractional samples per bit and
// fractional stop elements never accumulate drift.
//
// Phase: a single accumulator advances by 2*pi*f/sample_rate per sample for
// the whole stream. A bit boundary only changes the increment.

/// Upfront allocation cap; longer streams grow as they are synthesized
pub(crate) const MAX_RESERVED_SAMPLES: usize = 1 << 22;

/// Mono PCM buffer
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl SampleBuffer {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            samples: Vec::new(),
            sample_rate,
        }
    }

    pub fn from_samples(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// 16-bit PCM, clamped to [-1.0, 1.0] then scaled by 32767
    pub fn to_i16(&self) -> Vec<i16> {
        self.samples
            .iter()
            .map(|&s| (s.clamp(-1.0, 1.0) * 32767.0) as i16)
            .collect()
    }
}

/// Raised-cosine fade applied to the first and last `len` samples of a
/// stream of known total length
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ramp {
    taper: usize,
    total: usize,
}

impl Ramp {
    pub fn new(len: usize, total: usize) -> Self {
        Self {
            taper: len.min(total / 2),
            total,
        }
    }

    /// Gain for the sample at absolute index `index`
    pub fn gain(&self, index: usize) -> f32 {
        if self.taper == 0 {
            return 1.0;
        }

        let distance = if index < self.taper {
            index
        } else if index + self.taper >= self.total {
            self.total.saturating_sub(index + 1)
        } else {
            return 1.0;
        };

        // sine-squared profile from 0 to 1
        let progress = distance as f64 / self.taper as f64;
        (FRAC_PI_2 * progress).sin().powi(2) as f32
    }

    /// Apply to `samples`, which start at absolute index `offset`
    pub fn apply(&self, samples: &mut [f32], offset: usize) {
        if self.taper == 0 {
            return;
        }
        for (i, sample) in samples.iter_mut().enumerate() {
            *sample *= self.gain(offset + i);
        }
    }
}

/// Continuous-phase FSK oscillator
#[derive(Debug, Clone)]
pub struct ToneSynthesizer {
    samples_per_bit: f64,
    mark_step: f64,
    space_step: f64,
    amplitude: f64,
    stop_bits: f64,
    phase: f64,
    elapsed_bit_times: f64,
    emitted: usize,
}

impl ToneSynthesizer {
    pub fn new(config: &RttyConfig) -> Result<Self> {
        config.validate()?;

        let sample_rate = config.sample_rate as f64;
        Ok(Self {
            samples_per_bit: config.samples_per_bit(),
            mark_step: TAU * config.mark_freq / sample_rate,
            space_step: TAU * config.space_freq / sample_rate,
            amplitude: config.amplitude,
            stop_bits: config.stop_bits,
            phase: 0.0,
            elapsed_bit_times: 0.0,
            emitted: 0,
        })
    }

    /// Oscillator phase in radians, in [0, 2*pi)
    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn samples_emitted(&self) -> usize {
        self.emitted
    }

    pub fn elapsed_bit_times(&self) -> f64 {
        self.elapsed_bit_times
    }

    /// Sample index at which a stream of `bit_times` ends
    pub fn boundary(&self, bit_times: f64) -> usize {
        (bit_times * self.samples_per_bit).round() as usize
    }

    /// Like [`boundary`](Self::boundary), failing when the stream would
    /// exceed [`MAX_STREAM_SAMPLES`]
    pub fn checked_boundary(&self, bit_times: f64) -> Result<usize> {
        let end = (bit_times * self.samples_per_bit).round();
        if end.is_finite() && end <= MAX_STREAM_SAMPLES as f64 {
            Ok(end as usize)
        } else {
            Err(RttyError::invalid_config(format!(
                "{:.1} bit-times at {:.1} samples per bit exceeds {} samples",
                bit_times, self.samples_per_bit, MAX_STREAM_SAMPLES
            )))
        }
    }

    /// Back to phase 0 at the start of a new stream
    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.elapsed_bit_times = 0.0;
        self.emitted = 0;
    }

    /// Hold `level` for `bit_times` bit durations
    pub fn push_tone(&mut self, level: Level, bit_times: f64, out: &mut Vec<f32>) {
        self.elapsed_bit_times += bit_times;
        let end = self.boundary(self.elapsed_bit_times);
        let count = end.saturating_sub(self.emitted);

        let step = match level {
            Level::Mark => self.mark_step,
            Level::Space => self.space_step,
        };

        out.reserve(count);
        for _ in 0..count {
            out.push((self.amplitude * self.phase.sin()) as f32);
            self.phase = (self.phase + step) % TAU;
        }
        self.emitted += count;
    }

    pub fn push_frame(&mut self, frame: &BitFrame, out: &mut Vec<f32>) {
        let start = out.len();
        for bit in frame.bits() {
            self.push_tone(bit.level, bit.bit_times(self.stop_bits), out);
        }
        log::trace!(
            "frame 0x{:02X} -> {} samples, phase {:.4}",
            frame.symbol().value(),
            out.len() - start,
            self.phase
        );
    }

    /// Steady mark tone, the idle state of an RTTY line
    pub fn push_idle(&mut self, bits: usize, out: &mut Vec<f32>) {
        if bits > 0 {
            self.push_tone(Level::Mark, bits as f64, out);
        }
    }
}

/// Synthesize a complete buffer for `frames`
pub fn synthesize(frames: &[BitFrame], config: &RttyConfig) -> Result<SampleBuffer> {
    let mut synth = ToneSynthesizer::new(config)?;
    let total = synth.checked_boundary(frames.len() as f64 * config.frame_bit_times())?;

    let mut samples = Vec::with_capacity(total.min(MAX_RESERVED_SAMPLES));
    for frame in frames {
        synth.push_frame(frame, &mut samples);
    }
    Ramp::new(config.ramp_samples, samples.len()).apply(&mut samples, 0);

    Ok(SampleBuffer::from_samples(samples, config.sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baudot::CodeSymbol;

    fn config() -> RttyConfig {
        RttyConfig::default().with_sample_rate(8000)
    }

    #[test]
    fn test_samples_within_amplitude() {
        let config = config().with_amplitude(0.8);
        let frames = vec![BitFrame::new(CodeSymbol::LTRS); 4];
        let buffer = synthesize(&frames, &config).unwrap();
        assert!(!buffer.is_empty());
        assert!(buffer.samples().iter().all(|s| s.abs() <= 0.8 + 1e-6));
        let peak = buffer.samples().iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(peak > 0.79, "peak {} should reach the amplitude", peak);
    }

    #[test]
    fn test_no_truncation_drift() {
        // 8000 / 45.45 = 176.0176 samples per bit; truncating per bit would lose
        // about 0.0176 * 7000 = 123 samples over 1000 frames
        let config = config().with_stop_bits(1.0);
        let frames = vec![BitFrame::new(CodeSymbol::FIGS); 1000];
        let buffer = synthesize(&frames, &config).unwrap();
        let expected = 7000.0 * 8000.0 / 45.45;
        assert!((buffer.len() as f64 - expected).abs() <= 0.5);
    }

    #[test]
    fn test_fractional_stop_bits() {
        let config = config().with_baud_rate(50.0).with_stop_bits(1.5);
        let frames = vec![BitFrame::new(CodeSymbol::LTRS)];
        // 160 samples per bit, 7.5 bit-times
        assert_eq!(synthesize(&frames, &config).unwrap().len(), 1200);
    }

    #[test]
    fn test_phase_carries_across_bits() {
        let config = config();
        let mut synth = ToneSynthesizer::new(&config).unwrap();
        let mut first = Vec::new();
        synth.push_tone(Level::Mark, 1.0, &mut first);
        let phase = synth.phase();
        assert!(phase > 0.0 && phase < TAU);

        let mut second = Vec::new();
        synth.push_tone(Level::Space, 1.0, &mut second);
        let expected = (config.amplitude * phase.sin()) as f32;
        assert!((second[0] - expected).abs() < 1e-6);
    }

    #[test]
    fn test_boundaries_follow_accumulated_time() {
        let config = config();
        let mut synth = ToneSynthesizer::new(&config).unwrap();
        let mut out = Vec::new();
        for _ in 0..3 {
            synth.push_tone(Level::Mark, 1.0, &mut out);
        }
        // round(3 * 176.0176) = 528
        assert_eq!(out.len(), 528);
        assert_eq!(synth.samples_emitted(), 528);
        assert_eq!(synth.elapsed_bit_times(), 3.0);
    }

    #[test]
    fn test_reset() {
        let mut synth = ToneSynthesizer::new(&config()).unwrap();
        let mut a = Vec::new();
        synth.push_idle(5, &mut a);
        synth.reset();
        let mut b = Vec::new();
        synth.push_idle(5, &mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn test_ramp_shape() {
        let ramp = Ramp::new(10, 100);
        assert_eq!(ramp.gain(0), 0.0);
        assert_eq!(ramp.gain(99), 0.0);
        assert_eq!(ramp.gain(50), 1.0);
        assert!(ramp.gain(5) > 0.0 && ramp.gain(5) < 1.0);
        assert!((ramp.gain(5) - ramp.gain(94)).abs() < 1e-6);
    }

    #[test]
    fn test_ramp_only_touches_edges() {
        let config = config().with_ramp_samples(50);
        let frames = vec![BitFrame::new(CodeSymbol::FIGS); 2];
        let plain = synthesize(&frames, &RttyConfig { ramp_samples: 0, ..config.clone() }).unwrap();
        let ramped = synthesize(&frames, &config).unwrap();
        let n = plain.len();
        assert_eq!(ramped.samples()[0], 0.0);
        assert_eq!(&plain.samples()[50..n - 50], &ramped.samples()[50..n - 50]);
    }

    #[test]
    fn test_ramp_longer_than_buffer() {
        let ramp = Ramp::new(1000, 10);
        for i in 0..10 {
            assert!(ramp.gain(i) <= 1.0);
        }
        assert_eq!(ramp.gain(0), 0.0);
    }

    #[test]
    fn test_to_i16() {
        let buffer = SampleBuffer::from_samples(vec![0.0, 1.0, -1.0, 0.5, 2.0], 8000);
        assert_eq!(buffer.to_i16(), vec![0, 32767, -32767, 16383, 32767]);
        assert_eq!(buffer.duration_secs(), 5.0 / 8000.0);
    }

    #[test]
    fn test_empty_frames() {
        let buffer = synthesize(&[], &config()).unwrap();
        assert!(buffer.is_empty());
        assert_eq!(buffer.sample_rate(), 8000);
    }
}
