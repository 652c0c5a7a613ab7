//! WASM bindings for the semtag code generator.
//!
//! Exposes `generate()`, `generate_html()` and `generate_css()` to
//! JavaScript via wasm-bindgen. Each takes an export forest object
//! (`{ metadata, tree }`), an array of nodes, or a single node.

use semtag_codegen::GeneratorNode;
use wasm_bindgen::prelude::*;

fn nodes_from_js(input: JsValue) -> Result<Vec<GeneratorNode>, JsError> {
    let value: serde_json::Value =
        serde_wasm_bindgen::from_value(input).map_err(|e| JsError::new(&e.to_string()))?;
    semtag_codegen::decode_nodes(value).map_err(|e| JsError::new(&e.to_string()))
}

/// Generate HTML + CSS from a forest.
///
/// Returns a JS object with `{ html: string, css: string }`.
/// Throws a JS error if the input is not a forest or node list.
#[wasm_bindgen]
pub fn generate(forest: JsValue) -> Result<JsValue, JsError> {
    let output = semtag_codegen::generate(&nodes_from_js(forest)?);

    let js_obj = js_sys::Object::new();
    js_sys::Reflect::set(&js_obj, &"html".into(), &output.html.into())
        .map_err(|_| JsError::new("Failed to set html property"))?;
    js_sys::Reflect::set(&js_obj, &"css".into(), &output.css.into())
        .map_err(|_| JsError::new("Failed to set css property"))?;

    Ok(js_obj.into())
}

#[wasm_bindgen]
pub fn generate_html(forest: JsValue) -> Result<String, JsError> {
    Ok(semtag_codegen::generate_html(&nodes_from_js(forest)?))
}

#[wasm_bindgen]
pub fn generate_css(forest: JsValue) -> Result<String, JsError> {
    Ok(semtag_codegen::generate_css(&nodes_from_js(forest)?))
}

/// Same as [`generate`], from a JSON string. Returns `{ html, css }`
/// serialized as JSON.
#[wasm_bindgen]
pub fn generate_from_json(source: &str) -> Result<String, JsError> {
    let output =
        semtag_codegen::generate_from_json(source).map_err(|e| JsError::new(&e.to_string()))?;
    serde_json::to_string(&output).map_err(|e| JsError::new(&e.to_string()))
}

/// Get the generator version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
