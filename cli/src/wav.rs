use clap::ValueEnum;
use hound::{SampleFormat, WavSpec, WavWriter};
use rttywave_core::SampleBuffer;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::CliError;

/// PCM encoding of the output file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PcmFormat {
    /// 16-bit signed integer
    #[default]
    I16,
    /// 32-bit IEEE float
    F32,
}

impl PcmFormat {
    fn spec(self, sample_rate: u32) -> WavSpec {
        let (bits_per_sample, sample_format) = match self {
            PcmFormat::I16 => (16, SampleFormat::Int),
            PcmFormat::F32 => (32, SampleFormat::Float),
        };
        WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample,
            sample_format,
        }
    }
}

/// Write a mono WAV file
pub fn write_wav(path: &Path, buffer: &SampleBuffer, format: PcmFormat) -> Result<(), CliError> {
    let file = File::create(path).map_err(|source| CliError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    let spec = format.spec(buffer.sample_rate());
    let mut writer = WavWriter::new(BufWriter::new(file), spec)?;

    match format {
        PcmFormat::I16 => {
            for sample in buffer.to_i16() {
                writer.write_sample(sample)?;
            }
        }
        PcmFormat::F32 => {
            for &sample in buffer.samples() {
                writer.write_sample(sample)?;
            }
        }
    }
    writer.finalize()?;

    log::debug!(
        "wrote {} samples ({} Hz, {} bits) to {}",
        buffer.len(),
        spec.sample_rate,
        spec.bits_per_sample,
        path.display()
    );
    Ok(())
}
