use std::rc::Rc;

use chatpane_session::{ChatController, ChatPage, ClickTarget, Dismissal, LinkAction, RowPart};
use chatpane_types::{ClientConfig, Result};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Event, HtmlElement, HtmlInputElement, HtmlTextAreaElement, KeyboardEvent};

use crate::dom;
use crate::http::HttpChatApi;
use crate::platform::BrowserPlatform;
use crate::view::{View, ROW_SELECTOR};

type Controller = ChatController<HttpChatApi, BrowserPlatform>;

pub struct ChatApp {
    document: Document,
    view: Rc<View>,
    controller: Rc<Controller>,
}

impl ChatApp {
    pub fn new(document: Document, config: ClientConfig) -> Result<Self> {
        let search = crate::window()?.location().search().unwrap_or_default();
        let view = Rc::new(View::new(document.clone(), config.clone()));
        let page = ChatPage::load(config.clone(), view.seed(search));
        let controller = ChatController::new(
            page,
            HttpChatApi::new(document.clone(), config),
            BrowserPlatform::new(view.clone()),
        );

        Ok(Self { document, view, controller: Rc::new(controller) })
    }

    pub fn start(self) -> Result<()> {
        self.arm_toast_timers();
        self.setup_outside_click()?;
        self.setup_chat_list()?;
        self.setup_composer()?;
        self.setup_new_chat_button()?;
        self.setup_confirmation()?;
        self.setup_notifications()?;

        self.controller.refresh();
        log::info!(
            "Chat page ready, current chat: {}",
            self.controller.current_chat_id().as_deref().unwrap_or("None")
        );
        Ok(())
    }

    fn arm_toast_timers(&self) {
        let controller = Rc::downgrade(&self.controller);
        self.view.on_toast_shown(move |id, duration_ms| {
            if let Some(controller) = controller.upgrade() {
                spawn_local(async move {
                    controller.expire_toast(id, duration_ms).await;
                });
            }
        });
    }

    /// Closes menus and cancels edits when a click lands elsewhere. Runs in
    /// the capture phase, before the row handlers.
    fn setup_outside_click(&self) -> Result<()> {
        let controller = self.controller.clone();
        dom::listen_capture(&self.document, "click", move |event: Event| {
            let target = click_target(&event);
            controller.update(|page| page.handle_click(&target));
        })
    }

    fn setup_chat_list(&self) -> Result<()> {
        let Some(submenu) = self.view.submenu() else {
            log::warn!("Chat list submenu element (.chatlist .submenu) not found");
            return Ok(());
        };

        let controller = self.controller.clone();
        dom::listen(submenu, "click", move |event: Event| {
            let Some(chat_id) = row_id(&event) else {
                return;
            };

            if dom::closest(&event, ".chat-settings-btn").is_some() {
                stop(&event);
                log::debug!("Settings button clicked for {}", chat_id);
                controller.update(|page| page.toggle_menu(&chat_id));
            } else if dom::closest(&event, ".rename-chat-btn").is_some() {
                stop(&event);
                controller.update(|page| page.begin_rename(&chat_id));
            } else if dom::closest(&event, ".delete-chat-btn").is_some() {
                stop(&event);
                let controller = controller.clone();
                spawn_local(async move {
                    controller.delete_chat(&chat_id).await;
                });
            } else if dom::closest(&event, ".save-title-btn").is_some() {
                stop(&event);
                let controller = controller.clone();
                spawn_local(async move {
                    controller.save_title(&chat_id).await;
                });
            } else if dom::closest(&event, ".cancel-title-btn").is_some() {
                stop(&event);
                controller.update(|page| page.cancel_edit(&chat_id));
            } else if dom::closest(&event, ".chat-link").is_some() {
                log::debug!("Chat link clicked for {}", chat_id);
                if controller.update(|page| page.select_chat(&chat_id)) == LinkAction::Stay {
                    event.prevent_default();
                }
            }
        })?;

        let controller = self.controller.clone();
        dom::listen(submenu, "keydown", move |event: Event| {
            let Some(input) = title_input(&event) else {
                return;
            };
            let Some(chat_id) = row_id(&event) else {
                return;
            };
            let Some(key) = event.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key) else {
                return;
            };

            match key.as_str() {
                "Enter" => {
                    event.prevent_default();
                    let value = input.value();
                    controller.update(|page| page.set_title_draft(&chat_id, &value));
                    let controller = controller.clone();
                    spawn_local(async move {
                        controller.save_title(&chat_id).await;
                    });
                }
                "Escape" => {
                    event.prevent_default();
                    controller.update(|page| page.cancel_edit(&chat_id));
                }
                _ => {}
            }
        })?;

        let controller = self.controller.clone();
        dom::listen(submenu, "input", move |event: Event| {
            if let (Some(input), Some(chat_id)) = (title_input(&event), row_id(&event)) {
                let value = input.value();
                controller.update(|page| page.set_title_draft(&chat_id, &value));
            }
        })
    }

    fn setup_composer(&self) -> Result<()> {
        let (Some(prompt), Some(submit)) = (self.view.prompt(), self.view.submit()) else {
            log::error!("Submit button or input field element not found");
            return Ok(());
        };

        let controller = self.controller.clone();
        let input = prompt.clone();
        dom::listen(submit, "click", move |event: Event| {
            event.prevent_default();
            send(&controller, &input);
        })?;

        let controller = self.controller.clone();
        let input = prompt.clone();
        dom::listen(prompt, "keypress", move |event: Event| {
            let Some(key) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            if key.key() == "Enter" && !key.shift_key() {
                event.prevent_default();
                send(&controller, &input);
            }
        })?;

        let controller = self.controller.clone();
        let input = prompt.clone();
        dom::listen(prompt, "input", move |_event: Event| {
            let value = input.value();
            controller.update(|page| page.set_composer_draft(&value));
            resize_prompt(&input);
        })?;

        resize_prompt(prompt);
        Ok(())
    }

    fn setup_new_chat_button(&self) -> Result<()> {
        let Some(button) = dom::find(&self.document, "#new-chat-btn") else {
            return Ok(());
        };
        let controller = self.controller.clone();
        dom::listen(&button, "click", move |event: Event| {
            event.prevent_default();
            controller.update(ChatPage::new_chat);
        })
    }

    fn setup_confirmation(&self) -> Result<()> {
        let (Some(modal), Some(yes), Some(no)) = (
            dom::find(&self.document, "#confirmation-modal"),
            dom::find(&self.document, "#confirm-yes-btn"),
            dom::find(&self.document, "#confirm-no-btn"),
        ) else {
            log::warn!("Confirmation modal elements not found on initial load");
            return Ok(());
        };

        let controller = self.controller.clone();
        dom::listen(&yes, "click", move |_event: Event| {
            controller.update(ChatPage::confirm_yes);
        })?;

        let controller = self.controller.clone();
        dom::listen(&no, "click", move |_event: Event| {
            controller.update(|page| page.dismiss_confirmation(Dismissal::NoButton));
        })?;

        let controller = self.controller.clone();
        let backdrop = modal.clone();
        dom::listen(&modal, "click", move |event: Event| {
            if dom::target_is(&event, &backdrop) {
                controller.update(|page| page.dismiss_confirmation(Dismissal::Backdrop));
            }
        })?;

        let controller = self.controller.clone();
        dom::listen(&self.document, "keydown", move |event: Event| {
            let escape = event.dyn_ref::<KeyboardEvent>().is_some_and(|k| k.key() == "Escape");
            if escape && controller.page().borrow().confirmation().is_visible() {
                controller.update(|page| page.dismiss_confirmation(Dismissal::Escape));
            }
        })
    }

    fn setup_notifications(&self) -> Result<()> {
        let Some(container) = dom::find(&self.document, "#notification-container") else {
            return Ok(());
        };
        let controller = self.controller.clone();
        dom::listen(&container, "click", move |event: Event| {
            if dom::closest(&event, ".notification-close-btn").is_none() {
                return;
            }
            event.stop_propagation();
            let id = dom::closest(&event, ".notification")
                .and_then(|toast| toast.get_attribute("data-toast-id"))
                .and_then(|id| id.parse().ok());
            if let Some(id) = id {
                controller.update(|page| page.close_toast(id));
            }
        })
    }
}

fn stop(event: &Event) {
    event.prevent_default();
    event.stop_propagation();
}

fn row_id(event: &Event) -> Option<String> {
    dom::closest(event, ROW_SELECTOR)
        .and_then(|li| li.get_attribute("data-chat-id"))
        .filter(|id| !id.is_empty())
}

fn title_input(event: &Event) -> Option<HtmlInputElement> {
    dom::closest(event, ".edit-title-input").and_then(|e| e.dyn_into().ok())
}

/// Locate a click relative to the sidebar rows
fn click_target(event: &Event) -> ClickTarget {
    let Some(chat_id) = row_id(event) else {
        return ClickTarget::Outside;
    };
    let part = if dom::closest(event, ".chat-settings-btn").is_some() {
        RowPart::SettingsButton
    } else if dom::closest(event, ".chat-options-menu").is_some() {
        RowPart::Menu
    } else if dom::closest(event, ".edit-title-container").is_some() {
        RowPart::EditArea
    } else if dom::closest(event, ".chat-link").is_some() {
        RowPart::Link
    } else {
        RowPart::Body
    };
    ClickTarget::Row { chat_id, part }
}

fn send(controller: &Rc<Controller>, prompt: &HtmlTextAreaElement) {
    let text = prompt.value();
    controller.update(|page| page.set_composer_draft(&text));
    let controller = controller.clone();
    spawn_local(async move {
        controller.send().await;
    });
}

/// Grow the textarea with its content, up to a quarter of the viewport
fn resize_prompt(prompt: &HtmlTextAreaElement) {
    let element: &HtmlElement = prompt;
    dom::set_style(element, "height", "auto");
    let max_height = crate::window()
        .ok()
        .and_then(|w| w.inner_height().ok())
        .and_then(|h| h.as_f64())
        .map_or(f64::MAX, |h| h * 0.25);
    let height = f64::from(prompt.scroll_height()).min(max_height);
    dom::set_style(element, "height", &format!("{}px", height));
}
