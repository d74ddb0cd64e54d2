use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use smartdiff_core::{
    AlignerSettings, ComparisonProgress, DocumentComparer, JsonComparer, LineDiffSettings,
    SequenceAligner, SimilarityOptions, TextUnit, XmlComparer,
};

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(e: impl std::fmt::Display) -> JsError {
    JsError::new(&e.to_string())
}

fn parse_settings<T: DeserializeOwned>(settings_json: Option<String>) -> Result<Option<T>, JsError> {
    settings_json
        .map(|s| serde_json::from_str(&s))
        .transpose()
        .map_err(js_error)
}

fn aligner_settings(settings_json: Option<String>, verbose: bool) -> Result<AlignerSettings, JsError> {
    let settings: AlignerSettings = parse_settings(settings_json)?.unwrap_or_default();
    if verbose {
        Ok(settings.with_log_callback(|message| {
            web_sys::console::log_1(&JsValue::from_str(message));
        }))
    } else {
        Ok(settings)
    }
}

fn units_from_js(value: JsValue) -> Result<Vec<TextUnit>, JsError> {
    let raw: serde_json::Value = serde_wasm_bindgen::from_value(value).map_err(js_error)?;
    TextUnit::sequence_from_value(&raw).map_err(js_error)
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsError> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(js_error)
}

/// Align two arrays of strings or `{ text, metadata }` objects.
#[wasm_bindgen]
pub fn align_sequences(
    seq_a: JsValue,
    seq_b: JsValue,
    settings_json: Option<String>,
    verbose: Option<bool>,
) -> Result<JsValue, JsError> {
    let settings = aligner_settings(settings_json, verbose.unwrap_or(false))?;
    let units_a = units_from_js(seq_a)?;
    let units_b = units_from_js(seq_b)?;

    let result = SequenceAligner::align(&units_a, &units_b, Some(&settings)).map_err(js_error)?;
    to_js(&result)
}

/// Align page by page, calling `on_progress({ completed, total, page })` after each page.
#[wasm_bindgen]
pub fn align_pages(
    seq_a: JsValue,
    seq_b: JsValue,
    settings_json: Option<String>,
    on_progress: Option<js_sys::Function>,
) -> Result<JsValue, JsError> {
    let settings = aligner_settings(settings_json, false)?;
    let units_a = units_from_js(seq_a)?;
    let units_b = units_from_js(seq_b)?;

    let report = |progress: ComparisonProgress| {
        if let Some(callback) = &on_progress {
            if let Ok(arg) = to_js(&progress) {
                // Observer errors are ignored.
                let _ = callback.call1(&JsValue::NULL, &arg);
            }
        }
    };

    let result =
        DocumentComparer::align_paged(&units_a, &units_b, Some(&settings), report).map_err(js_error)?;
    to_js(&result)
}

#[wasm_bindgen]
pub fn diff_json_text(old_json: &str, new_json: &str) -> Result<JsValue, JsError> {
    let result = JsonComparer::compare_text(old_json, new_json).map_err(js_error)?;
    to_js(&result)
}

#[wasm_bindgen]
pub fn diff_xml_text(old_xml: &str, new_xml: &str) -> Result<JsValue, JsError> {
    let result = XmlComparer::compare_text(old_xml, new_xml).map_err(js_error)?;
    to_js(&result)
}

#[wasm_bindgen]
pub fn diff_text_lines(
    old_text: &str,
    new_text: &str,
    settings_json: Option<String>,
) -> Result<JsValue, JsError> {
    let settings: Option<LineDiffSettings> = parse_settings(settings_json)?;
    let result = smartdiff_core::diff_lines(old_text, new_text, settings.as_ref());
    to_js(&result)
}

#[wasm_bindgen]
pub fn text_similarity(a: &str, b: &str, options_json: Option<String>) -> Result<f64, JsError> {
    let options: SimilarityOptions = parse_settings(options_json)?.unwrap_or_default();
    Ok(smartdiff_core::similarity(a, b, &options))
}

/// Content label for one line of text, e.g. `financial_total`.
#[wasm_bindgen]
pub fn classify_content(text: &str) -> String {
    smartdiff_core::classify(text).as_str().to_string()
}
