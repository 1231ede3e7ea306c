use clap::{ArgAction, Args, Parser, Subcommand};
use rttywave_core::baudot::{FIGS_VALUE, LTRS_VALUE};
use rttywave_core::{CodeVariant, Encoder, RttyError};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

mod settings;
mod wav;

use settings::Overrides;
use wav::PcmFormat;

/// Sent when no text is given
const DEMO_MESSAGE: &str = "Hello World! This is rttywave\r\n(This is the example message)\r\n12345 Text 67890\r\nRYRYRYRYRYRYRYRYRYRY\r\nAMAMAMAMAMAMAMAMAMA";

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read standard input: {0}")]
    Stdin(#[source] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("Invalid configuration file: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Rtty(#[from] RttyError),
}

#[derive(Parser)]
#[command(name = "rttywave", version)]
#[command(about = "Encode text as RTTY (Baudot / two-tone FSK) audio")]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode text to a WAV audio file
    Encode(EncodeArgs),

    /// Print the Baudot code table
    Table {
        /// Figure-set variant (us-tty or ita2)
        #[arg(long, default_value = "us-tty")]
        variant: CodeVariant,
    },
}

#[derive(Args)]
struct EncodeArgs {
    /// Text to send (words are joined with spaces); "-" reads standard input
    #[arg(value_name = "TEXT")]
    text: Vec<String>,

    /// Read the text from a file
    #[arg(short, long, value_name = "INPUT.TXT", conflicts_with = "text")]
    input: Option<PathBuf>,

    /// Output WAV file
    #[arg(short, long, value_name = "OUTPUT.WAV")]
    output: PathBuf,

    /// Sample encoding of the WAV file
    #[arg(long, value_enum, default_value = "i16")]
    format: PcmFormat,

    /// JSON configuration file
    #[arg(long, value_name = "CONFIG.JSON")]
    config: Option<PathBuf>,

    /// Start from the classic station preset (20 idle bits, LTRS, 70 columns)
    #[arg(long)]
    classic: bool,

    /// Mark tone in Hz (default: 2125)
    #[arg(long)]
    mark_freq: Option<f64>,

    /// Space tone in Hz (default: 2295)
    #[arg(long)]
    space_freq: Option<f64>,

    /// Baud rate (default: 45.45)
    #[arg(long)]
    baud_rate: Option<f64>,

    /// Sample rate in Hz (default: 44100)
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Stop element length in bits (default: 1.5)
    #[arg(long)]
    stop_bits: Option<f64>,

    /// Peak amplitude, 0 to 1 (default: 1.0)
    #[arg(long)]
    amplitude: Option<f64>,

    /// Figure-set variant (us-tty or ita2)
    #[arg(long)]
    variant: Option<CodeVariant>,

    /// Drop unsupported characters instead of failing
    #[arg(long)]
    skip_unknown: bool,

    /// Fade-in/out length in samples
    #[arg(long)]
    ramp_samples: Option<usize>,

    /// Mark-tone bits sent before the text
    #[arg(long)]
    idle_bits: Option<usize>,

    /// Send LTRS before the text
    #[arg(long)]
    leading_ltrs: bool,

    /// Insert CR LF after this many characters
    #[arg(long, conflicts_with = "no_wrap")]
    line_width: Option<usize>,

    /// Never insert line breaks
    #[arg(long)]
    no_wrap: bool,
}

impl EncodeArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            baud_rate: self.baud_rate,
            sample_rate: self.sample_rate,
            mark_freq: self.mark_freq,
            space_freq: self.space_freq,
            stop_bits: self.stop_bits,
            amplitude: self.amplitude,
            skip_unknown: self.skip_unknown,
            variant: self.variant,
            ramp_samples: self.ramp_samples,
            idle_bits: self.idle_bits,
            leading_letters_shift: self.leading_ltrs,
            line_width: self.line_width,
            no_wrap: self.no_wrap,
        }
    }

    fn read_text(&self) -> Result<String, CliError> {
        if let Some(path) = &self.input {
            return std::fs::read_to_string(path).map_err(|source| CliError::Read {
                path: path.clone(),
                source,
            });
        }

        match self.text.as_slice() {
            [] => Ok(DEMO_MESSAGE.to_string()),
            [dash] if dash == "-" => {
                let mut text = String::new();
                std::io::stdin()
                    .read_to_string(&mut text)
                    .map_err(CliError::Stdin)?;
                Ok(text)
            }
            words => Ok(words.join(" ")),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Encode(args) => encode_command(&args),
        Commands::Table { variant } => {
            table_command(variant);
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn encode_command(args: &EncodeArgs) -> Result<(), CliError> {
    let config = settings::resolve(args.classic, args.config.as_deref(), &args.overrides())?;
    let text = args.read_text()?;
    println!("Read {} characters", text.chars().count());

    let encoder = Encoder::new(config)?;
    let encoded = encoder.encode(&text)?;
    println!(
        "Encoded {} frames to {} audio samples ({:.2} s at {} baud)",
        encoded.frame_count,
        encoded.buffer.len(),
        encoded.buffer.duration_secs(),
        encoder.config().baud_rate
    );
    if !encoded.warnings.is_empty() {
        println!(
            "Skipped {} unsupported character(s)",
            encoded.warnings.len()
        );
    }

    wav::write_wav(&args.output, &encoded.buffer, args.format)?;
    println!("Wrote {}", args.output.display());
    Ok(())
}

fn table_command(variant: CodeVariant) {
    println!("Baudot code table ({})", variant);
    println!("{:<6}{:<8}{:<6}{}", "CODE", "BITS", "LTRS", "FIGS");

    for (value, letter, figure) in variant.table().rows() {
        // Transmission order: first data bit on the left
        let bits: String = (0..5)
            .map(|i| if (value >> i) & 1 == 1 { '1' } else { '0' })
            .collect();

        let (letter, figure) = match value {
            LTRS_VALUE => ("LTRS".to_string(), "LTRS".to_string()),
            FIGS_VALUE => ("FIGS".to_string(), "FIGS".to_string()),
            _ => (name_or_blank(letter), name_or_blank(figure)),
        };
        println!("0x{:02X}  {:<8}{:<6}{}", value, bits, letter, figure);
    }
}

fn name_or_blank(c: Option<char>) -> String {
    c.map(display_name).unwrap_or_default()
}

/// Table label for a character; controls get mnemonics
fn display_name(c: char) -> String {
    match c {
        '\0' => "NUL".to_string(),
        '\n' => "LF".to_string(),
        '\r' => "CR".to_string(),
        ' ' => "SP".to_string(),
        '\x05' => "ENQ".to_string(),
        '\x07' => "BEL".to_string(),
        c => c.to_string(),
    }
}
