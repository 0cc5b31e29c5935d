//! Browser smoke tests: `wasm-pack test --headless --firefox crates/chatpane-wasm`

#![cfg(target_arch = "wasm32")]

use chatpane_session::{Bubble, BubbleKind};
use chatpane_types::Role;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn mount(html: &str) -> web_sys::Element {
    let document = web_sys::window().unwrap().document().unwrap();
    let div = document.create_element("div").unwrap();
    div.set_inner_html(html);
    document.body().unwrap().append_child(&div).unwrap();
    div
}

#[wasm_bindgen_test]
fn bot_reply_markup_has_no_live_script() {
    let html = chatpane_wasm::render_markdown("**hi** <script>window.pwned = 1</script>");
    let div = mount(&html);
    assert!(div.query_selector("strong").unwrap().is_some());
    assert!(div.query_selector("script").unwrap().is_none());
}

#[wasm_bindgen_test]
fn user_text_keeps_line_breaks() {
    let bubble = Bubble {
        id: 1,
        role: Role::User,
        content: "one\ntwo <img src=x>".to_string(),
        kind: BubbleKind::Message,
    };
    let div = mount(&chatpane_wasm::render_bubble(&bubble, true));
    assert_eq!(div.query_selector_all("br").unwrap().length(), 1);
    assert!(div.query_selector("img").unwrap().is_none());
    assert_eq!(div.text_content().unwrap(), "onetwo <img src=x>");
}
