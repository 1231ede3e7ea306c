//! Text to RTTY audio encoder
//!
//! Converts text into 5-bit Baudot code with start/stop framing and
//! synthesizes it as continuous-phase two-tone FSK.

pub mod baudot;
pub mod config;
pub mod encoder;
pub mod error;
pub mod framing;
pub mod fsk;

pub use baudot::{CodeSymbol, CodeTable, CodeVariant, Lookup, Shift, SymbolKind};
pub use config::RttyConfig;
pub use encoder::{encode, Encoded, Encoder, SampleChunks};
pub use error::{Result, RttyError};
pub use framing::{Bit, BitFrame, BitKind, Framed, Framer, Level, Warning};
pub use fsk::{synthesize, SampleBuffer, ToneSynthesizer};

// Amateur RTTY defaults
pub const DEFAULT_BAUD_RATE: f64 = 45.45;
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;
pub const DEFAULT_MARK_FREQ: f64 = 2125.0; // Hz
pub const DEFAULT_SPACE_FREQ: f64 = 2295.0; // Hz, 170 Hz shift
pub const DEFAULT_STOP_BITS: f64 = 1.5;
pub const DEFAULT_AMPLITUDE: f64 = 1.0;

// Station conventions used by RttyConfig::classic()
pub const CLASSIC_IDLE_BITS: usize = 20;
pub const CLASSIC_LINE_WIDTH: usize = 70;

// Limits enforced by RttyConfig::validate()
pub const MAX_IDLE_BITS: usize = 10_000;
pub const MAX_RAMP_SAMPLES: usize = 1 << 20;

/// Longest stream, in samples, an encoder will synthesize
pub const MAX_STREAM_SAMPLES: usize = u32::MAX as usize;
