//! Browser client for the chat page
//!
//! Binds the headless `chatpane-session` model to the server-rendered
//! document: reads the seed state out of the page, wires the DOM events
//! into the model and renders every change back.

use chatpane_types::{ClientConfig, ClientError, Result};
use wasm_bindgen::prelude::*;
use web_sys::{Document, Window};

mod app;
mod dom;
mod http;
mod markdown;
mod nav;
mod platform;
mod view;

pub use markdown::{render_bubble, render_markdown};

const CONFIG_ELEMENT_ID: &str = "client-config";

/// Initialize the WASM application
/// This sets up panic hooks and logging, then boots the page
#[wasm_bindgen(start)]
pub fn init() -> std::result::Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let (config, config_error) = match document().and_then(|d| load_config(&d)) {
        Ok(config) => (config, None),
        Err(e) => (ClientConfig::default(), Some(e)),
    };
    wasm_logger::init(wasm_logger::Config::new(config.log_level()));
    if let Some(e) = config_error {
        log::warn!("Using default client configuration: {}", e);
    }
    log::info!("Chat client WASM initialized");

    boot(config).map_err(to_js)
}

fn boot(config: ClientConfig) -> Result<()> {
    let document = document()?;

    if let Err(e) = nav::NavApp::new(document.clone()).start() {
        log::error!("[nav] {}", e);
    }
    app::ChatApp::new(document, config)?.start()
}

/// Read the optional embedded configuration object
fn load_config(document: &Document) -> Result<ClientConfig> {
    match document.get_element_by_id(CONFIG_ELEMENT_ID).and_then(|e| e.text_content()) {
        Some(json) => ClientConfig::from_json(&json),
        None => Ok(ClientConfig::default()),
    }
}

/// Convert a client error for the JS boundary
fn to_js(err: ClientError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Get the window object
fn window() -> Result<Window> {
    web_sys::window().ok_or_else(|| ClientError::Dom("No window object".to_string()))
}

/// Get the document object
fn document() -> Result<Document> {
    window()?
        .document()
        .ok_or_else(|| ClientError::Dom("No document object".to_string()))
}
