//! Renderer: keeps the document in line with the `ChatPage` model.
//!
//! Rows are keyed by chat id and updated in place, so a focused title input
//! survives re-renders. Transcript bubbles are append-only and rendered once.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use chatpane_session::{BubbleKind, ChatPage, ChatRow, Effects, Focus, Navigation, PageSeed, ToastId};
use chatpane_types::text::escape_html;
use chatpane_types::{AppEvent, ChatId, ClientConfig, Result, Role};
use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::JsCast;
use web_sys::{
    CustomEvent, CustomEventInit, Document, Element, HtmlButtonElement, HtmlElement,
    HtmlInputElement, HtmlTextAreaElement, Node,
};

use crate::dom::{self, dom_err};
use crate::markdown;

const LOADING_ID: &str = "loading-indicator";
const SEND_ICON: &str = "bx bxs-send";
const SPINNER_ICON: &str = "bx bx-loader-alt bx-spin";

pub const ROW_SELECTOR: &str = "li.submenu-content[data-chat-id]";
pub const PROMPT_ID: &str = "prompt";

struct ModalElements {
    modal: Element,
    message: Element,
    yes: HtmlElement,
}

type ToastHook = Rc<dyn Fn(ToastId, u32)>;

pub struct View {
    document: Document,
    config: ClientConfig,
    submenu: Option<Element>,
    chatbox: Option<Element>,
    prompt: Option<HtmlTextAreaElement>,
    submit: Option<HtmlButtonElement>,
    main_title: Option<Element>,
    modal: Option<ModalElements>,
    notifications: Option<Element>,
    rows: RefCell<HashMap<ChatId, Element>>,
    next_bubble: Cell<u64>,
    toasts: RefCell<HashMap<ToastId, Element>>,
    modal_open: Cell<bool>,
    on_toast: RefCell<Option<ToastHook>>,
}

impl View {
    pub fn new(document: Document, config: ClientConfig) -> Self {
        let modal = match (
            dom::find(&document, "#confirmation-modal"),
            dom::find(&document, "#confirmation-message"),
            dom::find_html(&document, "#confirm-yes-btn"),
        ) {
            (Some(modal), Some(message), Some(yes)) => Some(ModalElements { modal, message, yes }),
            _ => {
                log::error!("Confirmation modal elements could not be found");
                None
            }
        };

        Self {
            submenu: dom::find(&document, ".chatlist .submenu"),
            chatbox: dom::find(&document, ".chat-area-wrapper .chatbox"),
            prompt: dom::get_textarea_by_id(&document, PROMPT_ID).ok(),
            submit: dom::find(&document, "#submit-btn").and_then(|e| e.dyn_into().ok()),
            main_title: dom::find(&document, ".main-title"),
            notifications: dom::find(&document, "#notification-container"),
            modal,
            rows: RefCell::new(HashMap::new()),
            next_bubble: Cell::new(0),
            toasts: RefCell::new(HashMap::new()),
            modal_open: Cell::new(false),
            on_toast: RefCell::new(None),
            document,
            config,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn submenu(&self) -> Option<&Element> {
        self.submenu.as_ref()
    }

    pub fn prompt(&self) -> Option<&HtmlTextAreaElement> {
        self.prompt.as_ref()
    }

    pub fn submit(&self) -> Option<&HtmlButtonElement> {
        self.submit.as_ref()
    }

    /// Called with every toast that appears, to arm its dismiss timer
    pub fn on_toast_shown(&self, hook: impl Fn(ToastId, u32) + 'static) {
        *self.on_toast.borrow_mut() = Some(Rc::new(hook));
    }

    /// Read what the server rendered into the page, and clear the transcript
    /// area so the model owns it from here on.
    pub fn seed(&self, search: String) -> PageSeed {
        let mut rows = Vec::new();
        if let Some(submenu) = &self.submenu {
            if let Ok(items) = submenu.query_selector_all(ROW_SELECTOR) {
                let mut elements = self.rows.borrow_mut();
                for i in 0..items.length() {
                    let Some(li) = items.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                        continue;
                    };
                    let Some(chat_id) = li.get_attribute("data-chat-id").filter(|id| !id.is_empty())
                    else {
                        continue;
                    };
                    rows.push(ChatRow::new(chat_id.clone(), server_title(&li)));
                    elements.insert(chat_id, li);
                }
            }
        }
        log::info!("Found {} chats in the sidebar", rows.len());

        let history = self
            .document
            .get_element_by_id(&self.config.history_element_id)
            .and_then(|element| element.text_content());
        if let Some(chatbox) = &self.chatbox {
            dom::clear_element(chatbox);
        }

        PageSeed {
            search,
            rows,
            history,
            composer_available: self.prompt.is_some() && self.submit.is_some(),
        }
    }

    pub fn render(&self, page: &ChatPage, effects: Effects) {
        let parts = [
            ("sidebar", self.render_sidebar(page)),
            ("transcript", self.render_transcript(page)),
            ("toasts", self.render_toasts(page)),
        ];
        for (part, result) in parts {
            if let Err(e) = result {
                log::error!("Failed to render {}: {}", part, e);
            }
        }
        self.render_composer(page);
        self.render_title(page);
        self.render_confirmation(page);
        self.apply(effects);
    }

    // ========================================================================
    // Sidebar
    // ========================================================================

    fn render_sidebar(&self, page: &ChatPage) -> Result<()> {
        let Some(submenu) = &self.submenu else {
            return Ok(());
        };
        let rows = page.sidebar().rows();
        let mut elements = self.rows.borrow_mut();

        let live: HashSet<&str> = rows.iter().map(|row| row.id.as_str()).collect();
        elements.retain(|chat_id, li| {
            let keep = live.contains(chat_id.as_str());
            if !keep {
                dom::detach(li);
            }
            keep
        });

        if !rows.is_empty() {
            if let Ok(Some(placeholder)) = submenu.query_selector(".no-chats-placeholder") {
                dom::detach(&placeholder);
            }
        }

        let mut previous: Option<Element> = None;
        for row in rows {
            let li = match elements.get(&row.id) {
                Some(li) => li.clone(),
                None => {
                    let li = self.build_row(&row.id)?;
                    elements.insert(row.id.clone(), li.clone());
                    li
                }
            };

            let expected = match &previous {
                Some(previous) => previous.next_element_sibling(),
                None => submenu.first_element_child(),
            };
            if expected.as_ref() != Some(&li) {
                let reference: Option<&Node> = expected.as_deref();
                submenu.insert_before(&li, reference).map_err(dom_err)?;
            }

            self.update_row(&li, row, page.state().open_menu() == Some(row.id.as_str()));
            previous = Some(li);
        }

        if rows.is_empty() && submenu.query_selector(".no-chats-placeholder").ok().flatten().is_none() {
            let placeholder =
                dom::create_element_with_class(&self.document, "li", "no-chats-placeholder")?;
            placeholder.set_inner_html(&format!(
                "<span>{}</span>",
                escape_html(&self.config.strings.no_chats)
            ));
            submenu.append_child(&placeholder).map_err(dom_err)?;
        }
        Ok(())
    }

    fn build_row(&self, chat_id: &str) -> Result<Element> {
        let strings = &self.config.strings;
        let li = dom::create_element_with_class(&self.document, "li", "submenu-content")?;
        li.set_attribute("data-chat-id", chat_id).map_err(dom_err)?;
        li.set_inner_html(&format!(
            r#"<div class="chat-list-item">
    <a href="{href}" class="chat-link"><span class="chat-title-text"></span></a>
    <button class="chat-settings-btn" title="{settings}"><i class="bx bx-dots-horizontal-rounded"></i></button>
</div>
<div class="edit-title-container">
    <input type="text" class="edit-title-input">
    <div class="edit-title-actions">
        <button class="save-title-btn" title="{save}"><i class="bx bx-check"></i></button>
        <button class="cancel-title-btn" title="{cancel}"><i class="bx bx-x"></i></button>
    </div>
</div>
<div class="chat-options-menu">
    <button class="rename-chat-btn"><i class="bx bx-pencil"></i> {rename}</button>
    <button class="delete-chat-btn"><i class="bx bx-trash"></i> {delete}</button>
</div>"#,
            href = escape_html(&self.config.chat_url(chat_id)),
            settings = escape_html(&strings.settings_label),
            save = escape_html(&strings.save_label),
            cancel = escape_html(&strings.cancel_label),
            rename = escape_html(&strings.rename_label),
            delete = escape_html(&strings.delete_label),
        ));
        log::debug!("Built sidebar row for {}", chat_id);
        Ok(li)
    }

    fn update_row(&self, li: &Element, row: &ChatRow, menu_open: bool) {
        dom::set_class(li, "active", row.active);
        dom::set_class(li, "editing", row.is_editing());

        if let Ok(Some(link)) = li.query_selector(".chat-link") {
            if link.get_attribute("title").as_deref() != Some(row.title.as_str()) {
                let _ = link.set_attribute("title", &row.title);
            }
        }
        if let Ok(Some(span)) = li.query_selector(".chat-title-text") {
            let display = row.display_title(self.config.sidebar_title_max_chars);
            if span.text_content().as_deref() != Some(display.as_str()) {
                span.set_text_content(Some(&display));
            }
        }

        if let Some(input) = li
            .query_selector(".edit-title-input")
            .ok()
            .flatten()
            .and_then(|e| e.dyn_into::<HtmlInputElement>().ok())
        {
            let value = row.draft().unwrap_or(&row.title);
            if input.value() != value {
                input.set_value(value);
            }
            input.set_disabled(row.is_saving());
        }
        for selector in [".save-title-btn", ".cancel-title-btn"] {
            if let Some(button) = li
                .query_selector(selector)
                .ok()
                .flatten()
                .and_then(|e| e.dyn_into::<HtmlButtonElement>().ok())
            {
                button.set_disabled(row.is_saving());
            }
        }

        if let Some(menu) = li
            .query_selector(".chat-options-menu")
            .ok()
            .flatten()
            .and_then(|e| e.dyn_into::<HtmlElement>().ok())
        {
            self.update_menu(menu, menu_open);
        }

        if row.is_removing() && !dom::has_class(li, "removing") {
            dom::set_class(li, "removing", true);
            if let Some(li) = li.dyn_ref::<HtmlElement>() {
                let seconds = f64::from(self.config.row_removal_ms) / 1000.0;
                dom::set_style(
                    li,
                    "transition",
                    &format!(
                        "opacity {s}s ease, transform {s}s ease, height {s}s ease, margin {s}s ease, padding {s}s ease",
                        s = seconds
                    ),
                );
                for (property, value) in [
                    ("transform", "translateX(-100%)"),
                    ("opacity", "0"),
                    ("height", "0"),
                    ("margin", "0"),
                    ("padding", "0"),
                    ("border", "none"),
                ] {
                    dom::set_style(li, property, value);
                }
            }
        }
    }

    /// Opening shows the menu at once; closing drops `visible` now and hides
    /// it after a short delay unless it was reopened meanwhile.
    fn update_menu(&self, menu: HtmlElement, open: bool) {
        let visible = dom::has_class(&menu, "visible");
        if open && !visible {
            dom::set_style(&menu, "display", "block");
            dom::set_class(&menu, "visible", true);
        } else if !open && visible {
            dom::set_class(&menu, "visible", false);
            let delay = self.config.menu_hide_ms;
            wasm_bindgen_futures::spawn_local(async move {
                TimeoutFuture::new(delay).await;
                if !dom::has_class(&menu, "visible") {
                    dom::set_style(&menu, "display", "none");
                }
            });
        }
    }

    // ========================================================================
    // Transcript and composer
    // ========================================================================

    fn render_transcript(&self, page: &ChatPage) -> Result<()> {
        let Some(chatbox) = &self.chatbox else {
            return Ok(());
        };
        let transcript = page.transcript();
        let loading = self.document.get_element_by_id(LOADING_ID);
        let mut changed = false;

        if !transcript.is_loading() {
            if let Some(indicator) = &loading {
                changed |= dom::detach(indicator);
            }
        }

        let next = self.next_bubble.get();
        for bubble in transcript.bubbles().iter().filter(|b| b.id >= next) {
            let class = match bubble.role {
                Role::User => "message user-message",
                Role::Bot => "message bot-message",
            };
            let div = dom::create_element_with_class(&self.document, "div", class)?;
            if bubble.kind == BubbleKind::Notice {
                dom::set_class(&div, "notice", true);
            }
            div.set_inner_html(&markdown::render_bubble(bubble, self.config.markdown_replies));
            chatbox.append_child(&div).map_err(dom_err)?;
            self.next_bubble.set(bubble.id + 1);
            changed = true;
        }

        if transcript.is_loading() && loading.is_none() {
            let div = dom::create_element_with_class(&self.document, "div", "message bot-message")?;
            div.set_id(LOADING_ID);
            div.set_inner_html(
                r#"<span class="loading-dots-container"><span class="dot-flashing"></span><span class="dot-flashing"></span><span class="dot-flashing"></span></span>"#,
            );
            chatbox.append_child(&div).map_err(dom_err)?;
            changed = true;
        }

        if changed {
            dom::scroll_to_bottom(chatbox);
        }
        Ok(())
    }

    fn render_composer(&self, page: &ChatPage) {
        let composer = page.composer();
        let strings = &self.config.strings;
        let enabled = composer.is_enabled();

        if let Some(prompt) = &self.prompt {
            prompt.set_disabled(!enabled);
            prompt.set_placeholder(if enabled {
                &strings.input_placeholder
            } else {
                &strings.waiting_placeholder
            });
            dom::set_class(prompt, "disabled", !enabled);
            if prompt.value() != composer.draft() {
                prompt.set_value(composer.draft());
                if composer.draft().is_empty() {
                    dom::set_style(prompt, "height", "auto");
                }
            }
        }

        if let Some(submit) = &self.submit {
            submit.set_disabled(!enabled);
            dom::set_class(submit, "disabled", !enabled);
            if let Ok(Some(icon)) = submit.query_selector("i") {
                icon.set_class_name(if enabled { SEND_ICON } else { SPINNER_ICON });
            }
        }
    }

    fn render_title(&self, page: &ChatPage) {
        if let Some(title) = &self.main_title {
            if title.text_content().as_deref() != Some(page.title()) {
                title.set_text_content(Some(page.title()));
            }
        }
        self.document.set_title(&page.document_title());
    }

    // ========================================================================
    // Overlays
    // ========================================================================

    fn render_confirmation(&self, page: &ChatPage) {
        let Some(elements) = &self.modal else {
            return;
        };
        let dialog = page.confirmation();
        match dialog.message() {
            Some(message) => {
                if elements.message.text_content().as_deref() != Some(message) {
                    elements.message.set_text_content(Some(message));
                }
                dom::set_class(&elements.modal, "visible", true);
                if !self.modal_open.replace(true) {
                    let _ = elements.yes.focus();
                }
            }
            None => {
                dom::set_class(&elements.modal, "visible", false);
                self.modal_open.set(false);
            }
        }
    }

    fn render_toasts(&self, page: &ChatPage) -> Result<()> {
        let Some(container) = &self.notifications else {
            return Ok(());
        };
        let mut shown = self.toasts.borrow_mut();

        for toast in page.toasts().toasts() {
            if shown.contains_key(&toast.id) {
                continue;
            }
            let class = format!("notification {}", toast.kind.css_class());
            let element = dom::create_element_with_class(&self.document, "div", &class)?;
            element.set_attribute("data-toast-id", &toast.id.to_string()).map_err(dom_err)?;
            element.set_text_content(Some(&toast.message));

            let close = dom::create_element_with_class(&self.document, "button", "notification-close-btn")?;
            close.set_text_content(Some("\u{d7}"));
            close
                .set_attribute("aria-label", &self.config.strings.close_notification_label)
                .map_err(dom_err)?;
            element.append_child(&close).map_err(dom_err)?;

            container.append_child(&element).map_err(dom_err)?;
            dom::set_class(&element, "show", true);
            shown.insert(toast.id, element);

            if let Some(hook) = self.on_toast.borrow().as_ref() {
                hook(toast.id, toast.duration_ms);
            }
        }

        let live: HashSet<ToastId> = page.toasts().toasts().iter().map(|t| t.id).collect();
        let fade = self.config.toast_fade_ms;
        shown.retain(|id, element| {
            let keep = live.contains(id);
            if !keep {
                dom::set_class(element, "show", false);
                let element = element.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    TimeoutFuture::new(fade).await;
                    dom::detach(&element);
                });
            }
            keep
        });
        Ok(())
    }

    // ========================================================================
    // Effects
    // ========================================================================

    fn apply(&self, effects: Effects) {
        for event in &effects.events {
            if let Err(e) = self.dispatch(event) {
                log::error!("Failed to dispatch {}: {}", event.name(), e);
            }
        }

        if let Some(navigation) = effects.navigation {
            if let Err(e) = navigate(&navigation) {
                log::error!("Navigation failed: {}", e);
            }
        }

        match effects.focus {
            Some(Focus::Composer) => {
                if let Some(prompt) = &self.prompt {
                    let _ = prompt.focus();
                }
            }
            Some(Focus::TitleInput(chat_id)) => {
                let input = self
                    .rows
                    .borrow()
                    .get(&chat_id)
                    .and_then(|li| li.query_selector(".edit-title-input").ok().flatten())
                    .and_then(|e| e.dyn_into::<HtmlInputElement>().ok());
                if let Some(input) = input {
                    let _ = input.focus();
                    input.select();
                }
            }
            None => {}
        }
    }

    fn dispatch(&self, event: &AppEvent) -> Result<()> {
        let detail = js_sys::JSON::parse(&event.detail().to_string()).map_err(dom_err)?;
        let init = CustomEventInit::new();
        init.set_detail(&detail);
        let dom_event = CustomEvent::new_with_event_init_dict(event.name(), &init).map_err(dom_err)?;
        self.document.dispatch_event(&dom_event).map_err(dom_err)?;
        log::debug!("Dispatched {} for {}", event.name(), event.chat_id());
        Ok(())
    }
}

/// Full title of a server-rendered row: the link's `title`, else the text
fn server_title(li: &Element) -> String {
    let from_link = li
        .query_selector(".chat-link")
        .ok()
        .flatten()
        .and_then(|link| link.get_attribute("title"));
    let from_text = || {
        li.query_selector(".chat-title-text")
            .ok()
            .flatten()
            .and_then(|span| span.text_content())
    };
    from_link
        .filter(|t| !t.trim().is_empty())
        .or_else(from_text)
        .map(|t| t.trim().to_string())
        .unwrap_or_default()
}

fn navigate(navigation: &Navigation) -> Result<()> {
    let window = crate::window()?;
    match navigation {
        Navigation::Push(url) => {
            log::info!("Updating URL to {}", url);
            window
                .history()
                .map_err(dom_err)?
                .push_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(url.as_str()))
                .map_err(dom_err)
        }
        Navigation::Assign(url) => {
            log::info!("Navigating to {}", url);
            window.location().set_href(url).map_err(dom_err)
        }
    }
}
