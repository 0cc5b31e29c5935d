use chatpane_types::{ClientError, Result};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    AddEventListenerOptions, Document, Element, Event, EventTarget, HtmlDocument, HtmlElement,
    HtmlTextAreaElement,
};

/// Map a raw JS exception into the client error type
pub fn dom_err(err: JsValue) -> ClientError {
    ClientError::Dom(err.as_string().unwrap_or_else(|| format!("{:?}", err)))
}

/// Get element by ID
pub fn get_element_by_id(document: &Document, id: &str) -> Result<Element> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| ClientError::MissingElement(format!("#{}", id)))
}

/// Get textarea element by ID
pub fn get_textarea_by_id(document: &Document, id: &str) -> Result<HtmlTextAreaElement> {
    get_element_by_id(document, id)?
        .dyn_into::<HtmlTextAreaElement>()
        .map_err(|_| ClientError::Dom(format!("Element is not HtmlTextAreaElement: {}", id)))
}

/// First element matching `selector`
pub fn query(document: &Document, selector: &str) -> Result<Element> {
    document
        .query_selector(selector)
        .map_err(dom_err)?
        .ok_or_else(|| ClientError::MissingElement(selector.to_string()))
}

/// Optional lookup: a missing element is logged, not fatal
pub fn find(document: &Document, selector: &str) -> Option<Element> {
    match query(document, selector) {
        Ok(element) => Some(element),
        Err(e) => {
            log::warn!("{}", e);
            None
        }
    }
}

pub fn find_html(document: &Document, selector: &str) -> Option<HtmlElement> {
    find(document, selector).and_then(|e| e.dyn_into::<HtmlElement>().ok())
}

/// Create element with class
pub fn create_element_with_class(document: &Document, tag: &str, class: &str) -> Result<Element> {
    let element = document.create_element(tag).map_err(dom_err)?;
    element.set_class_name(class);
    Ok(element)
}

/// Nearest ancestor (or self) of the event target matching `selector`
pub fn closest(event: &Event, selector: &str) -> Option<Element> {
    event
        .target()
        .and_then(|target| target.dyn_into::<Element>().ok())
        .and_then(|element| element.closest(selector).ok().flatten())
}

pub fn target_is(event: &Event, element: &Element) -> bool {
    event
        .target()
        .and_then(|target| target.dyn_into::<Element>().ok())
        .is_some_and(|target| &target == element)
}

/// Add a class when `on`, remove it otherwise
pub fn set_class(element: &Element, class: &str, on: bool) {
    let list = element.class_list();
    let result = if on { list.add_1(class) } else { list.remove_1(class) };
    if let Err(e) = result {
        log::warn!("Could not toggle class {}: {:?}", class, e);
    }
}

pub fn has_class(element: &Element, class: &str) -> bool {
    element.class_list().contains(class)
}

pub fn set_style(element: &HtmlElement, property: &str, value: &str) {
    let _ = element.style().set_property(property, value);
}

/// Attach a listener for the lifetime of the page
pub fn listen<F>(target: &EventTarget, event: &str, callback: F) -> Result<()>
where
    F: FnMut(Event) + 'static,
{
    let closure = Closure::wrap(Box::new(callback) as Box<dyn FnMut(Event)>);
    target
        .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        .map_err(dom_err)?;
    closure.forget(); // Keep the closure alive
    Ok(())
}

/// Like [`listen`], but in the capture phase so it sees the event before
/// any handler further down the tree.
pub fn listen_capture<F>(target: &EventTarget, event: &str, callback: F) -> Result<()>
where
    F: FnMut(Event) + 'static,
{
    let closure = Closure::wrap(Box::new(callback) as Box<dyn FnMut(Event)>);
    let options = AddEventListenerOptions::new();
    options.set_capture(true);
    target
        .add_event_listener_with_callback_and_add_event_listener_options(
            event,
            closure.as_ref().unchecked_ref(),
            &options,
        )
        .map_err(dom_err)?;
    closure.forget();
    Ok(())
}

/// Raw `document.cookie`
pub fn cookies(document: &Document) -> String {
    document
        .clone()
        .dyn_into::<HtmlDocument>()
        .ok()
        .and_then(|doc| doc.cookie().ok())
        .unwrap_or_default()
}

/// Clear element content
pub fn clear_element(element: &Element) {
    element.set_inner_html("");
}

/// Scroll element to bottom
pub fn scroll_to_bottom(element: &Element) {
    element.set_scroll_top(element.scroll_height());
}

/// Remove an element from its parent, if it still has one
pub fn detach(element: &Element) -> bool {
    if element.parent_node().is_some() {
        element.remove();
        true
    } else {
        false
    }
}
