use js_sys::Array;
use rttywave_core::{CodeVariant, Encoder, RttyConfig, Warning};
use wasm_bindgen::prelude::*;

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
pub struct WasmEncoder {
    inner: Encoder,
    skipped: Vec<Warning>,
}

#[wasm_bindgen]
impl WasmEncoder {
    /// Encoder with the default 45.45 baud, 2125/2295 Hz settings
    #[wasm_bindgen(constructor)]
    pub fn new(sample_rate: u32) -> Result<WasmEncoder, JsValue> {
        Self::with_settings(
            sample_rate,
            rttywave_core::DEFAULT_BAUD_RATE,
            rttywave_core::DEFAULT_MARK_FREQ,
            rttywave_core::DEFAULT_SPACE_FREQ,
            rttywave_core::DEFAULT_STOP_BITS,
            rttywave_core::DEFAULT_AMPLITUDE,
        )
    }

    /// Encoder with explicit FSK parameters; unsupported characters are skipped
    #[wasm_bindgen(js_name = withSettings)]
    pub fn with_settings(
        sample_rate: u32,
        baud_rate: f64,
        mark_freq: f64,
        space_freq: f64,
        stop_bits: f64,
        amplitude: f64,
    ) -> Result<WasmEncoder, JsValue> {
        let config = RttyConfig::default()
            .with_sample_rate(sample_rate)
            .with_baud_rate(baud_rate)
            .with_tones(mark_freq, space_freq)
            .with_stop_bits(stop_bits)
            .with_amplitude(amplitude)
            .with_skip_unknown(true);
        Encoder::new(config)
            .map(|inner| WasmEncoder {
                inner,
                skipped: Vec::new(),
            })
            .map_err(to_js_error)
    }

    /// Switch between the "us-tty" and "ita2" figure sets
    #[wasm_bindgen(js_name = setVariant)]
    pub fn set_variant(&mut self, variant: &str) -> Result<(), JsValue> {
        let variant = variant.parse::<CodeVariant>().map_err(to_js_error)?;
        let config = self.inner.config().clone().with_variant(variant);
        self.inner = Encoder::new(config).map_err(to_js_error)?;
        Ok(())
    }

    /// Encode text into audio samples
    /// Returns Float32Array of samples at the configured rate
    #[wasm_bindgen]
    pub fn encode(&mut self, text: &str) -> Result<Vec<f32>, JsValue> {
        let encoded = self.inner.encode(text).map_err(to_js_error)?;
        self.skipped = encoded.warnings;
        Ok(encoded.buffer.into_samples())
    }

    /// Characters dropped by the last `encode` call
    #[wasm_bindgen(js_name = skippedCharacters)]
    pub fn skipped_characters(&self) -> Array {
        self.skipped
            .iter()
            .map(|w| match w {
                Warning::SkippedCharacter { character, .. } => {
                    JsValue::from_str(&character.to_string())
                }
            })
            .collect()
    }

    #[wasm_bindgen(getter, js_name = sampleRate)]
    pub fn sample_rate(&self) -> u32 {
        self.inner.config().sample_rate
    }
}
