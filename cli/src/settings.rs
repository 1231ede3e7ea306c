use rttywave_core::{CodeVariant, RttyConfig};
use serde::Deserialize;
use std::path::Path;

use crate::CliError;

/// JSON configuration file; every field is optional and overrides the preset
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub baud_rate: Option<f64>,
    pub sample_rate: Option<u32>,
    pub mark_freq: Option<f64>,
    pub space_freq: Option<f64>,
    pub stop_bits: Option<f64>,
    pub amplitude: Option<f64>,
    pub skip_unknown: Option<bool>,
    pub variant: Option<String>,
    pub ramp_samples: Option<usize>,
    pub idle_bits: Option<usize>,
    pub leading_letters_shift: Option<bool>,
    pub line_width: Option<usize>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self, CliError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn apply(&self, config: &mut RttyConfig) -> Result<(), CliError> {
        overlay(&mut config.baud_rate, self.baud_rate);
        overlay(&mut config.sample_rate, self.sample_rate);
        overlay(&mut config.mark_freq, self.mark_freq);
        overlay(&mut config.space_freq, self.space_freq);
        overlay(&mut config.stop_bits, self.stop_bits);
        overlay(&mut config.amplitude, self.amplitude);
        overlay(&mut config.skip_unknown, self.skip_unknown);
        overlay(&mut config.ramp_samples, self.ramp_samples);
        overlay(&mut config.idle_bits, self.idle_bits);
        overlay(&mut config.leading_letters_shift, self.leading_letters_shift);
        if let Some(width) = self.line_width {
            config.line_width = Some(width);
        }
        if let Some(variant) = &self.variant {
            config.variant = variant.parse::<CodeVariant>()?;
        }
        Ok(())
    }
}

/// Command-line overrides, applied after the file
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub baud_rate: Option<f64>,
    pub sample_rate: Option<u32>,
    pub mark_freq: Option<f64>,
    pub space_freq: Option<f64>,
    pub stop_bits: Option<f64>,
    pub amplitude: Option<f64>,
    pub skip_unknown: bool,
    pub variant: Option<CodeVariant>,
    pub ramp_samples: Option<usize>,
    pub idle_bits: Option<usize>,
    pub leading_letters_shift: bool,
    pub line_width: Option<usize>,
    pub no_wrap: bool,
}

impl Overrides {
    pub fn apply(&self, config: &mut RttyConfig) {
        overlay(&mut config.baud_rate, self.baud_rate);
        overlay(&mut config.sample_rate, self.sample_rate);
        overlay(&mut config.mark_freq, self.mark_freq);
        overlay(&mut config.space_freq, self.space_freq);
        overlay(&mut config.stop_bits, self.stop_bits);
        overlay(&mut config.amplitude, self.amplitude);
        overlay(&mut config.variant, self.variant);
        overlay(&mut config.ramp_samples, self.ramp_samples);
        overlay(&mut config.idle_bits, self.idle_bits);
        if self.skip_unknown {
            config.skip_unknown = true;
        }
        if self.leading_letters_shift {
            config.leading_letters_shift = true;
        }
        if let Some(width) = self.line_width {
            config.line_width = Some(width);
        }
        if self.no_wrap {
            config.line_width = None;
        }
    }
}

fn overlay<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

/// preset <- file <- flags
pub fn resolve(
    classic: bool,
    file: Option<&Path>,
    overrides: &Overrides,
) -> Result<RttyConfig, CliError> {
    let mut config = if classic {
        RttyConfig::classic()
    } else {
        RttyConfig::default()
    };

    if let Some(path) = file {
        log::debug!("loading configuration from {}", path.display());
        FileConfig::load(path)?.apply(&mut config)?;
    }
    overrides.apply(&mut config);

    config.validate()?;
    Ok(config)
}
