// Recovers the transmitted text from synthesized audio with a simple
// Goertzel bit slicer, to check that what we send is what a receiver sees.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use rttywave_core::{
    encode, CodeSymbol, CodeTable, CodeVariant, Level, RttyConfig, Shift, SymbolKind,
};
use std::f64::consts::TAU;

/// Goertzel power of `samples` at `freq`
fn tone_power(samples: &[f32], freq: f64, sample_rate: f64) -> f64 {
    let omega = TAU * freq / sample_rate;
    let coeff = 2.0 * omega.cos();
    let mut q1 = 0.0;
    let mut q2 = 0.0;
    for &sample in samples {
        let q0 = coeff * q1 - q2 + sample as f64;
        q2 = q1;
        q1 = q0;
    }
    q1 * q1 + q2 * q2 - coeff * q1 * q2
}

/// Slice `samples` into frames at the nominal bit boundaries and decide
/// mark/space from the centre of each bit
fn slice_frames(samples: &[f32], config: &RttyConfig) -> Vec<[Level; 7]> {
    let spb = config.samples_per_bit();
    let sr = config.sample_rate as f64;
    let frame_times = config.frame_bit_times();
    let frame_count = (samples.len() as f64 / (frame_times * spb)).round() as usize;

    let mut frames = Vec::with_capacity(frame_count);
    for f in 0..frame_count {
        let mut levels = [Level::Mark; 7];
        let mut start_time = f as f64 * frame_times;
        for (i, level) in levels.iter_mut().enumerate() {
            let duration = if i == 6 { config.stop_bits } else { 1.0 };
            let start = (start_time * spb).round() as usize;
            let end = ((start_time + duration) * spb).round() as usize;
            let guard = (end - start) / 5;
            let window = &samples[start + guard..end - guard];

            let mark = tone_power(window, config.mark_freq, sr);
            let space = tone_power(window, config.space_freq, sr);
            *level = if mark > space { Level::Mark } else { Level::Space };
            start_time += duration;
        }
        frames.push(levels);
    }
    frames
}

/// Minimal teleprinter: follows LTRS/FIGS and prints the rest
fn print_frames(frames: &[[Level; 7]], table: &CodeTable) -> String {
    let mut shift = Shift::Letters;
    let mut text = String::new();
    for levels in frames {
        assert_eq!(levels[0], Level::Space, "missing start bit");
        assert_eq!(levels[6], Level::Mark, "missing stop bit");

        let value = levels[1..6]
            .iter()
            .enumerate()
            .fold(0u8, |acc, (i, l)| acc | ((l.is_mark() as u8) << i));

        match value {
            v if v == CodeSymbol::LTRS.value() => shift = Shift::Letters,
            v if v == CodeSymbol::FIGS.value() => shift = Shift::Figures,
            v => {
                let kind = match shift {
                    Shift::Letters => SymbolKind::Letter,
                    Shift::Figures => SymbolKind::Figure,
                };
                if let Some(c) = table.character_for(CodeSymbol::new(v, kind), shift) {
                    text.push(c);
                }
            }
        }
    }
    text
}

fn config() -> RttyConfig {
    RttyConfig::default().with_sample_rate(8000).with_amplitude(0.8)
}

#[test]
fn test_clean_signal_prints_original_text() {
    let config = config();
    let text = "CQ CQ DE W1AW 599 73?";
    let encoded = encode(text, &config).expect("encode");

    let frames = slice_frames(encoded.buffer.samples(), &config);
    assert_eq!(frames.len(), encoded.frame_count);
    assert_eq!(print_frames(&frames, CodeTable::us_tty()), text);
}

#[test]
fn test_lowercase_prints_as_uppercase() {
    let config = config();
    let encoded = encode("ryry 1234", &config).expect("encode");
    let frames = slice_frames(encoded.buffer.samples(), &config);
    assert_eq!(print_frames(&frames, CodeTable::us_tty()), "RYRY 1234");
}

#[test]
fn test_noisy_signal_prints_original_text() {
    let config = config();
    let text = "THE QUICK BROWN FOX 0123456789";
    let encoded = encode(text, &config).expect("encode");

    let mut rng = StdRng::seed_from_u64(42);
    let noise = Normal::new(0.0, 0.3).expect("valid distribution");
    let noisy: Vec<f32> = encoded
        .buffer
        .samples()
        .iter()
        .map(|&s| s + noise.sample(&mut rng) as f32)
        .collect();

    let frames = slice_frames(&noisy, &config);
    assert_eq!(print_frames(&frames, CodeTable::us_tty()), text);
}

#[test]
fn test_two_stop_bits_and_wide_shift() {
    let config = config()
        .with_baud_rate(50.0)
        .with_stop_bits(2.0)
        .with_tones(1275.0, 2125.0)
        .with_variant(CodeVariant::Ita2);
    let text = "ZCZC 1+1=2";
    let encoded = encode(text, &config).expect("encode");

    let frames = slice_frames(encoded.buffer.samples(), &config);
    assert_eq!(print_frames(&frames, CodeTable::ita2()), text);
}
