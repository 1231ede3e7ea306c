use crate::baudot::CodeVariant;
use crate::error::{Result, RttyError};
use crate::{
    CLASSIC_IDLE_BITS, CLASSIC_LINE_WIDTH, DEFAULT_AMPLITUDE, DEFAULT_BAUD_RATE,
    DEFAULT_MARK_FREQ, DEFAULT_SAMPLE_RATE, DEFAULT_SPACE_FREQ, DEFAULT_STOP_BITS,
    MAX_IDLE_BITS, MAX_RAMP_SAMPLES,
};

/// Transmit parameters for one RTTY stream
#[derive(Debug, Clone, PartialEq)]
pub struct RttyConfig {
    /// Symbol rate in baud (bit duration = 1 / baud_rate)
    pub baud_rate: f64,
    /// Output sample rate in Hz
    pub sample_rate: u32,
    /// Tone for logical 1 (Hz)
    pub mark_freq: f64,
    /// Tone for logical 0 (Hz)
    pub space_freq: f64,
    /// Length of the stop element in bit-times, >= 1 (1.5 and 2 are common)
    pub stop_bits: f64,
    /// Peak amplitude, 0 < amplitude <= 1
    pub amplitude: f64,
    /// Drop unmappable characters with a warning instead of failing
    pub skip_unknown: bool,
    /// Figure-set variant
    pub variant: CodeVariant,
    /// Raised-cosine ramp length at the start and end of the buffer
    /// (0 = off, at most [`MAX_RAMP_SAMPLES`])
    pub ramp_samples: usize,
    /// Mark-tone bits sent before the first frame, at most [`MAX_IDLE_BITS`]
    pub idle_bits: usize,
    /// Send LTRS before the first character
    pub leading_letters_shift: bool,
    /// Insert CR LF after this many printable characters
    pub line_width: Option<usize>,
}

impl Default for RttyConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            sample_rate: DEFAULT_SAMPLE_RATE,
            mark_freq: DEFAULT_MARK_FREQ,
            space_freq: DEFAULT_SPACE_FREQ,
            stop_bits: DEFAULT_STOP_BITS,
            amplitude: DEFAULT_AMPLITUDE,
            skip_unknown: false,
            variant: CodeVariant::UsTty,
            ramp_samples: 0,
            idle_bits: 0,
            leading_letters_shift: false,
            line_width: None,
        }
    }
}

impl RttyConfig {
    /// Defaults plus the on-air conventions of a typical teleprinter station:
    /// 20 idle mark bits, an opening LTRS and wrapping at 70 columns.
    pub fn classic() -> Self {
        Self {
            idle_bits: CLASSIC_IDLE_BITS,
            leading_letters_shift: true,
            line_width: Some(CLASSIC_LINE_WIDTH),
            ..Self::default()
        }
    }

    pub fn with_baud_rate(mut self, baud_rate: f64) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_tones(mut self, mark_freq: f64, space_freq: f64) -> Self {
        self.mark_freq = mark_freq;
        self.space_freq = space_freq;
        self
    }

    pub fn with_stop_bits(mut self, stop_bits: f64) -> Self {
        self.stop_bits = stop_bits;
        self
    }

    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }

    pub fn with_skip_unknown(mut self, skip: bool) -> Self {
        self.skip_unknown = skip;
        self
    }

    pub fn with_variant(mut self, variant: CodeVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_ramp_samples(mut self, ramp_samples: usize) -> Self {
        self.ramp_samples = ramp_samples;
        self
    }

    pub fn with_idle_bits(mut self, idle_bits: usize) -> Self {
        self.idle_bits = idle_bits;
        self
    }

    pub fn with_leading_letters_shift(mut self, enabled: bool) -> Self {
        self.leading_letters_shift = enabled;
        self
    }

    pub fn with_line_width(mut self, line_width: Option<usize>) -> Self {
        self.line_width = line_width;
        self
    }

    /// Samples per nominal bit (fractional)
    pub fn samples_per_bit(&self) -> f64 {
        self.sample_rate as f64 / self.baud_rate
    }

    /// Duration of one frame in bit-times: start + 5 data + stop element
    pub fn frame_bit_times(&self) -> f64 {
        1.0 + crate::framing::DATA_BITS as f64 + self.stop_bits
    }

    /// Check every parameter before any text is processed
    pub fn validate(&self) -> Result<()> {
        if !self.baud_rate.is_finite() || self.baud_rate <= 0.0 {
            return Err(RttyError::invalid_config(format!(
                "baud rate must be positive, got {}",
                self.baud_rate
            )));
        }

        if self.sample_rate == 0 {
            return Err(RttyError::invalid_config("sample rate must be positive"));
        }

        for (name, freq) in [("mark", self.mark_freq), ("space", self.space_freq)] {
            if !freq.is_finite() || freq <= 0.0 {
                return Err(RttyError::invalid_config(format!(
                    "{} frequency must be positive, got {}",
                    name, freq
                )));
            }

            let nyquist = self.sample_rate as f64 / 2.0;
            if freq >= nyquist {
                return Err(RttyError::invalid_config(format!(
                    "{} frequency {} Hz is not below the Nyquist limit {} Hz",
                    name, freq, nyquist
                )));
            }
        }

        if self.mark_freq == self.space_freq {
            return Err(RttyError::invalid_config(format!(
                "mark and space frequencies must differ, both are {} Hz",
                self.mark_freq
            )));
        }

        if !self.amplitude.is_finite() || self.amplitude <= 0.0 || self.amplitude > 1.0 {
            return Err(RttyError::invalid_config(format!(
                "amplitude must be in (0, 1], got {}",
                self.amplitude
            )));
        }

        if !self.stop_bits.is_finite() || self.stop_bits < 1.0 {
            return Err(RttyError::invalid_config(format!(
                "stop bits must be at least 1, got {}",
                self.stop_bits
            )));
        }

        if self.samples_per_bit() < 1.0 {
            return Err(RttyError::invalid_config(format!(
                "baud rate {} exceeds sample rate {}",
                self.baud_rate, self.sample_rate
            )));
        }

        if self.line_width == Some(0) {
            return Err(RttyError::invalid_config("line width must be at least 1"));
        }

        if self.idle_bits > MAX_IDLE_BITS {
            return Err(RttyError::invalid_config(format!(
                "idle bits must be at most {}, got {}",
                MAX_IDLE_BITS, self.idle_bits
            )));
        }

        if self.ramp_samples > MAX_RAMP_SAMPLES {
            return Err(RttyError::invalid_config(format!(
                "ramp must be at most {} samples, got {}",
                MAX_RAMP_SAMPLES, self.ramp_samples
            )));
        }

        Ok(())
    }
}
