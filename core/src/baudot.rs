use crate::error::{Result, RttyError};
use std::fmt;
use std::str::FromStr;

// 5-bit Baudot / ITA2 code tables
//
// Symbol values are stored with bit 0 as the first data bit on the wire, so
// 'A' (ITA2 "11000" in transmission order) is 0x03. Each value has up to two
// meanings, one per shift set. The four neutral controls and the two shift
// symbols are identical in every variant.

/// Letters shift (LTRS)
pub const LTRS_VALUE: u8 = 0x1F;

/// Figures shift (FIGS)
pub const FIGS_VALUE: u8 = 0x1B;

/// Number of distinct 5-bit symbol values
pub const SYMBOL_COUNT: usize = 32;

/// Controls valid under both shifts: blank, line feed, space, carriage return
static NEUTRAL: [(u8, char); 4] = [(0x00, '\0'), (0x02, '\n'), (0x04, ' '), (0x08, '\r')];

#[rustfmt::skip]
const LETTERS: [Option<char>; SYMBOL_COUNT] = [
    None,      Some('E'), None,      Some('A'), None,      Some('S'), Some('I'), Some('U'),
    None,      Some('D'), Some('R'), Some('J'), Some('N'), Some('F'), Some('C'), Some('K'),
    Some('T'), Some('Z'), Some('L'), Some('W'), Some('H'), Some('Y'), Some('P'), Some('Q'),
    Some('O'), Some('B'), Some('G'), None,      Some('M'), Some('X'), Some('V'), None,
];

// US TTY figures (S = BEL, D = '$', F = '!', G = '&', H = '#', J = '\'')
#[rustfmt::skip]
const US_TTY_FIGURES: [Option<char>; SYMBOL_COUNT] = [
    None,      Some('3'), None,      Some('-'), None,      Some('\x07'), Some('8'), Some('7'),
    None,      Some('$'), Some('4'), Some('\''), Some(','), Some('!'), Some(':'), Some('('),
    Some('5'), Some('"'), Some(')'), Some('2'), Some('#'), Some('6'),  Some('0'), Some('1'),
    Some('9'), Some('?'), Some('&'), None,       Some('.'), Some('/'), Some(';'), None,
];

// CCITT ITA2 figures (D = ENQ, J = BEL, S = '\'', V = '=', Z = '+'; F, G, H unassigned)
#[rustfmt::skip]
const ITA2_FIGURES: [Option<char>; SYMBOL_COUNT] = [
    None,      Some('3'), None,      Some('-'), None,      Some('\''), Some('8'), Some('7'),
    None,      Some('\x05'), Some('4'), Some('\x07'), Some(','), None, Some(':'), Some('('),
    Some('5'), Some('+'), Some(')'), Some('2'), None,      Some('6'),  Some('0'), Some('1'),
    Some('9'), Some('?'), None,      None,      Some('.'), Some('/'),  Some('='), None,
];

static US_TTY_TABLE: CodeTable = CodeTable {
    variant: CodeVariant::UsTty,
    letters: LETTERS,
    figures: US_TTY_FIGURES,
};

static ITA2_TABLE: CodeTable = CodeTable {
    variant: CodeVariant::Ita2,
    letters: LETTERS,
    figures: ITA2_FIGURES,
};

/// Shift state of a Baudot link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shift {
    Letters,
    Figures,
}

impl Shift {
    /// The shift-control symbol that switches a receiver into this state
    pub fn control_symbol(self) -> CodeSymbol {
        match self {
            Shift::Letters => CodeSymbol::LTRS,
            Shift::Figures => CodeSymbol::FIGS,
        }
    }
}

/// Which set a symbol belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// Meaningful under LETTERS only
    Letter,
    /// Meaningful under FIGURES only
    Figure,
    /// CR, LF, space and blank: identical under both shifts
    Neutral,
    /// LTRS shift control
    LetterShift,
    /// FIGS shift control
    FigureShift,
}

/// A 5-bit code value tagged with the set it was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CodeSymbol {
    value: u8,
    kind: SymbolKind,
}

impl CodeSymbol {
    pub const LTRS: CodeSymbol = CodeSymbol::new(LTRS_VALUE, SymbolKind::LetterShift);
    pub const FIGS: CodeSymbol = CodeSymbol::new(FIGS_VALUE, SymbolKind::FigureShift);

    /// Build a symbol; the value is masked to 5 bits.
    pub const fn new(value: u8, kind: SymbolKind) -> Self {
        Self {
            value: value & 0x1F,
            kind,
        }
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn kind(&self) -> SymbolKind {
        self.kind
    }

    /// True for LTRS and FIGS
    pub fn is_shift(&self) -> bool {
        matches!(self.kind, SymbolKind::LetterShift | SymbolKind::FigureShift)
    }
}

/// Result of looking a character up in a [`CodeTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lookup {
    pub symbol: CodeSymbol,
    /// Shift the receiver must be in, `None` for neutral controls
    pub shift: Option<Shift>,
}

/// Figure-set variant
///
/// The letters and controls are common to every variant; only the
/// punctuation carried under FIGURES differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CodeVariant {
    /// US teleprinter set, as used by amateur RTTY
    #[default]
    UsTty,
    /// CCITT International Telegraph Alphabet No. 2
    Ita2,
}

impl CodeVariant {
    pub fn table(self) -> &'static CodeTable {
        match self {
            CodeVariant::UsTty => &US_TTY_TABLE,
            CodeVariant::Ita2 => &ITA2_TABLE,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CodeVariant::UsTty => "us-tty",
            CodeVariant::Ita2 => "ita2",
        }
    }
}

impl fmt::Display for CodeVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CodeVariant {
    type Err = RttyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "us-tty" | "us" | "ustty" => Ok(CodeVariant::UsTty),
            "ita2" | "ccitt" => Ok(CodeVariant::Ita2),
            other => Err(RttyError::invalid_config(format!(
                "unknown code variant '{}' (expected us-tty or ita2)",
                other
            ))),
        }
    }
}

/// Immutable character <-> symbol mapping for one variant
#[derive(Debug)]
pub struct CodeTable {
    variant: CodeVariant,
    letters: [Option<char>; SYMBOL_COUNT],
    figures: [Option<char>; SYMBOL_COUNT],
}

impl CodeTable {
    pub fn us_tty() -> &'static CodeTable {
        &US_TTY_TABLE
    }

    pub fn ita2() -> &'static CodeTable {
        &ITA2_TABLE
    }

    pub fn variant(&self) -> CodeVariant {
        self.variant
    }

    /// Find the symbol for a character, folding letters to uppercase.
    pub fn lookup(&self, c: char) -> Option<Lookup> {
        let c = c.to_ascii_uppercase();

        if let Some(&(value, _)) = NEUTRAL.iter().find(|&&(_, n)| n == c) {
            return Some(Lookup {
                symbol: CodeSymbol::new(value, SymbolKind::Neutral),
                shift: None,
            });
        }

        if let Some(value) = position_of(&self.letters, c) {
            return Some(Lookup {
                symbol: CodeSymbol::new(value, SymbolKind::Letter),
                shift: Some(Shift::Letters),
            });
        }

        position_of(&self.figures, c).map(|value| Lookup {
            symbol: CodeSymbol::new(value, SymbolKind::Figure),
            shift: Some(Shift::Figures),
        })
    }

    /// Like [`lookup`](Self::lookup) but fails with `UnsupportedCharacter`,
    /// reporting `c` at `position` (a char index into the message).
    pub fn symbol_for(&self, c: char, position: usize) -> Result<Lookup> {
        self.lookup(c)
            .ok_or(RttyError::UnsupportedCharacter { character: c, position })
    }

    /// Inverse mapping: what a receiver in `shift` prints for `symbol`.
    ///
    /// Shift controls print nothing and return `None`, as do values that are
    /// unassigned in the current set.
    pub fn character_for(&self, symbol: CodeSymbol, shift: Shift) -> Option<char> {
        if symbol.is_shift() {
            return None;
        }

        if let Some(&(_, c)) = NEUTRAL.iter().find(|&&(v, _)| v == symbol.value()) {
            return Some(c);
        }

        let set = match shift {
            Shift::Letters => &self.letters,
            Shift::Figures => &self.figures,
        };
        set[symbol.value() as usize]
    }

    /// Every character this table can encode, controls first
    pub fn supported_chars(&self) -> impl Iterator<Item = char> + '_ {
        NEUTRAL
            .iter()
            .map(|&(_, c)| c)
            .chain(self.letters.iter().flatten().copied())
            .chain(self.figures.iter().flatten().copied())
    }

    /// One row per symbol value: (value, letters meaning, figures meaning)
    pub fn rows(&self) -> impl Iterator<Item = (u8, Option<char>, Option<char>)> + '_ {
        (0..SYMBOL_COUNT as u8).map(move |value| {
            match NEUTRAL.iter().find(|&&(v, _)| v == value) {
                Some(&(_, c)) => (value, Some(c), Some(c)),
                None => (
                    value,
                    self.letters[value as usize],
                    self.figures[value as usize],
                ),
            }
        })
    }
}

fn position_of(set: &[Option<char>; SYMBOL_COUNT], c: char) -> Option<u8> {
    set.iter().position(|&s| s == Some(c)).map(|i| i as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_values_match_ita2() {
        let table = CodeTable::us_tty();
        assert_eq!(table.lookup('A').unwrap().symbol.value(), 0x03);
        assert_eq!(table.lookup('E').unwrap().symbol.value(), 0x01);
        assert_eq!(table.lookup('T').unwrap().symbol.value(), 0x10);
        assert_eq!(table.lookup('Y').unwrap().symbol.value(), 0x15);
        assert_eq!(table.lookup('R').unwrap().symbol.value(), 0x0A);
    }

    #[test]
    fn test_lowercase_folds_to_uppercase() {
        let table = CodeTable::us_tty();
        assert_eq!(table.lookup('q'), table.lookup('Q'));
        assert_eq!(table.lookup('q').unwrap().shift, Some(Shift::Letters));
    }

    #[test]
    fn test_controls_are_neutral() {
        for variant in [CodeVariant::UsTty, CodeVariant::Ita2] {
            let table = variant.table();
            for (c, value) in [('\r', 0x08), ('\n', 0x02), (' ', 0x04), ('\0', 0x00)] {
                let lookup = table.lookup(c).unwrap();
                assert_eq!(lookup.shift, None, "{:?} should not need a shift", c);
                assert_eq!(lookup.symbol.value(), value);
                assert_eq!(lookup.symbol.kind(), SymbolKind::Neutral);
                assert_eq!(table.character_for(lookup.symbol, Shift::Letters), Some(c));
                assert_eq!(table.character_for(lookup.symbol, Shift::Figures), Some(c));
            }
        }
    }

    #[test]
    fn test_digits_require_figures() {
        let table = CodeTable::us_tty();
        for c in '0'..='9' {
            assert_eq!(table.lookup(c).unwrap().shift, Some(Shift::Figures));
        }
        // '1' shares its code with 'Q'
        assert_eq!(
            table.lookup('1').unwrap().symbol.value(),
            table.lookup('Q').unwrap().symbol.value()
        );
    }

    #[test]
    fn test_same_value_reads_differently_per_shift() {
        let table = CodeTable::us_tty();
        let a = table.lookup('A').unwrap().symbol;
        assert_eq!(table.character_for(a, Shift::Letters), Some('A'));
        assert_eq!(table.character_for(a, Shift::Figures), Some('-'));
    }

    #[test]
    fn test_shift_symbols_print_nothing() {
        let table = CodeTable::us_tty();
        assert_eq!(table.character_for(CodeSymbol::LTRS, Shift::Letters), None);
        assert_eq!(table.character_for(CodeSymbol::FIGS, Shift::Figures), None);
        assert_eq!(Shift::Figures.control_symbol().value(), FIGS_VALUE);
        assert_eq!(Shift::Letters.control_symbol().value(), LTRS_VALUE);
    }

    #[test]
    fn test_round_trip_every_supported_char() {
        for variant in [CodeVariant::UsTty, CodeVariant::Ita2] {
            let table = variant.table();
            for c in table.supported_chars() {
                let lookup = table.lookup(c).unwrap();
                let shift = lookup.shift.unwrap_or(Shift::Letters);
                assert_eq!(
                    table.character_for(lookup.symbol, shift),
                    Some(c.to_ascii_uppercase()),
                    "{} round trip failed for {:?}",
                    variant,
                    c
                );
            }
        }
    }

    #[test]
    fn test_unsupported_character() {
        let table = CodeTable::us_tty();
        assert_eq!(
            table.symbol_for('é', 7),
            Err(RttyError::UnsupportedCharacter {
                character: 'é',
                position: 7
            })
        );
        assert!(table.symbol_for('e', 7).is_ok());
        assert!(table.lookup('%').is_none());
        assert!(table.lookup('\t').is_none());
    }

    #[test]
    fn test_variants_differ_in_figures() {
        assert!(CodeTable::us_tty().lookup('$').is_some());
        assert!(CodeTable::ita2().lookup('$').is_none());
        assert!(CodeTable::ita2().lookup('+').is_some());
        assert!(CodeTable::us_tty().lookup('+').is_none());
        assert_eq!(
            CodeTable::us_tty().lookup('\'').unwrap().symbol.value(),
            0x0B
        );
        assert_eq!(
            CodeTable::ita2().lookup('\'').unwrap().symbol.value(),
            0x05
        );
    }

    #[test]
    fn test_supported_sets_have_no_duplicates() {
        for variant in [CodeVariant::UsTty, CodeVariant::Ita2] {
            let mut chars: Vec<char> = variant.table().supported_chars().collect();
            let len = chars.len();
            chars.sort_unstable();
            chars.dedup();
            assert_eq!(chars.len(), len, "{} has duplicate entries", variant);
        }
        assert_eq!(CodeTable::us_tty().supported_chars().count(), 4 + 26 + 26);
        assert_eq!(CodeTable::ita2().supported_chars().count(), 4 + 26 + 23);
    }

    #[test]
    fn test_variant_from_str() {
        assert_eq!("ITA2".parse::<CodeVariant>().unwrap(), CodeVariant::Ita2);
        assert_eq!("us-tty".parse::<CodeVariant>().unwrap(), CodeVariant::UsTty);
        assert!(matches!(
            "murray".parse::<CodeVariant>(),
            Err(RttyError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rows_cover_all_values() {
        let rows: Vec<_> = CodeTable::us_tty().rows().collect();
        assert_eq!(rows.len(), SYMBOL_COUNT);
        assert_eq!(rows[0x03], (0x03, Some('A'), Some('-')));
        assert_eq!(rows[0x04], (0x04, Some(' '), Some(' ')));
        assert_eq!(rows[LTRS_VALUE as usize], (LTRS_VALUE, None, None));
    }
}
