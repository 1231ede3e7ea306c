use crate::baudot::{CodeSymbol, CodeTable, Shift};
use crate::config::RttyConfig;
use crate::error::Result;
use std::fmt;

/// Data bits per character
pub const DATA_BITS: usize = 5;

/// Logical bits per frame: start + data + one stop element
pub const FRAME_BITS: usize = DATA_BITS + 2;

/// Line level of one bit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    /// Logical 1, idle line
    Mark,
    /// Logical 0
    Space,
}

impl Level {
    pub fn from_bit(bit: bool) -> Self {
        if bit {
            Level::Mark
        } else {
            Level::Space
        }
    }

    pub fn is_mark(self) -> bool {
        self == Level::Mark
    }
}

/// Role of a bit inside its frame; stop elements are stretched by the
/// configured stop-bit length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitKind {
    Start,
    Data,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bit {
    pub level: Level,
    pub kind: BitKind,
}

impl Bit {
    /// Duration of this bit in bit-times
    pub fn bit_times(&self, stop_bits: f64) -> f64 {
        match self.kind {
            BitKind::Stop => stop_bits,
            BitKind::Start | BitKind::Data => 1.0,
        }
    }
}

/// One character on the wire: start (space), 5 data bits LSB first, stop (mark)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitFrame {
    symbol: CodeSymbol,
}

impl BitFrame {
    pub fn new(symbol: CodeSymbol) -> Self {
        Self { symbol }
    }

    pub fn symbol(&self) -> CodeSymbol {
        self.symbol
    }

    /// Bits in transmission order
    pub fn bits(&self) -> [Bit; FRAME_BITS] {
        let value = self.symbol.value();
        let mut bits = [Bit {
            level: Level::Mark,
            kind: BitKind::Stop,
        }; FRAME_BITS];

        bits[0] = Bit {
            level: Level::Space,
            kind: BitKind::Start,
        };
        for i in 0..DATA_BITS {
            bits[1 + i] = Bit {
                level: Level::from_bit((value >> i) & 1 == 1),
                kind: BitKind::Data,
            };
        }

        bits
    }
}

/// Non-fatal problem recorded while framing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// Character had no code and was dropped (`position` counts chars)
    SkippedCharacter { character: char, position: usize },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::SkippedCharacter {
                character,
                position,
            } => write!(
                f,
                "skipped unsupported character {:?} at position {}",
                character, position
            ),
        }
    }
}

/// Output of [`Framer::frame`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Framed {
    pub frames: Vec<BitFrame>,
    pub warnings: Vec<Warning>,
}

impl Framed {
    /// Number of LTRS/FIGS frames inserted
    pub fn shift_count(&self) -> usize {
        self.frames.iter().filter(|f| f.symbol().is_shift()).count()
    }

    pub fn symbols(&self) -> impl Iterator<Item = CodeSymbol> + '_ {
        self.frames.iter().map(BitFrame::symbol)
    }

    /// Total duration in bit-times for the given stop-bit length
    pub fn bit_times(&self, stop_bits: f64) -> f64 {
        self.frames.len() as f64 * (1.0 + DATA_BITS as f64 + stop_bits)
    }
}

/// Turns text into bit frames, inserting shift symbols as needed.
///
/// The framer itself holds no shift state; every call starts in LETTERS.
#[derive(Debug, Clone, Copy)]
pub struct Framer {
    table: &'static CodeTable,
    skip_unknown: bool,
    leading_letters_shift: bool,
    line_width: Option<usize>,
}

impl Framer {
    pub fn new(table: &'static CodeTable) -> Self {
        Self {
            table,
            skip_unknown: false,
            leading_letters_shift: false,
            line_width: None,
        }
    }

    pub fn from_config(config: &RttyConfig) -> Self {
        Self::new(config.variant.table())
            .with_skip_unknown(config.skip_unknown)
            .with_leading_letters_shift(config.leading_letters_shift)
            .with_line_width(config.line_width)
    }

    pub fn with_skip_unknown(mut self, skip: bool) -> Self {
        self.skip_unknown = skip;
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

    pub fn table(&self) -> &'static CodeTable {
        self.table
    }

    /// Frame a message.
    ///
    /// Fails on the first unsupported character unless skipping is enabled.
    pub fn frame(&self, text: &str) -> Result<Framed> {
        let mut framed = Framed {
            frames: Vec::with_capacity(text.len() + text.len() / 4),
            warnings: Vec::new(),
        };
        let mut shift = Shift::Letters;
        let mut column = 0usize;

        if self.leading_letters_shift {
            framed.frames.push(BitFrame::new(CodeSymbol::LTRS));
        }

        for (position, c) in text.chars().enumerate() {
            let lookup = if self.skip_unknown {
                match self.table.lookup(c) {
                    Some(lookup) => lookup,
                    None => {
                        framed.warnings.push(Warning::SkippedCharacter {
                            character: c,
                            position,
                        });
                        continue;
                    }
                }
            } else {
                self.table.symbol_for(c, position)?
            };

            if let Some(required) = lookup.shift {
                if required != shift {
                    framed.frames.push(BitFrame::new(required.control_symbol()));
                    shift = required;
                }
            }
            framed.frames.push(BitFrame::new(lookup.symbol));

            match c {
                '\r' | '\n' => column = 0,
                _ => column += 1,
            }

            if let Some(width) = self.line_width {
                if column >= width {
                    self.push_newline(&mut framed.frames);
                    column = 0;
                }
            }
        }

        Ok(framed)
    }

    // CR and LF are neutral, so wrapping never disturbs the shift state
    fn push_newline(&self, frames: &mut Vec<BitFrame>) {
        for c in ['\r', '\n'] {
            if let Some(lookup) = self.table.lookup(c) {
                frames.push(BitFrame::new(lookup.symbol));
            }
        }
    }
}
