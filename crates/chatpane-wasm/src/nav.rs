use std::cell::RefCell;
use std::rc::Rc;

use chatpane_session::NavState;
use chatpane_types::Result;
use web_sys::{Document, Element, Event};

use crate::dom::{self, dom_err};

struct NavElements {
    sidebar: Element,
    submenu: Option<Element>,
    toggle_icon: Option<Element>,
    dropdown_icon: Option<Element>,
}

/// Collapsible navigation sidebar, independent of the chat page
pub struct NavApp {
    document: Document,
    state: Rc<RefCell<NavState>>,
}

impl NavApp {
    pub fn new(document: Document) -> Self {
        Self { document, state: Rc::new(RefCell::new(NavState::default())) }
    }

    pub fn start(self) -> Result<()> {
        let sidebar = dom::get_element_by_id(&self.document, "sidebar")?;
        let elements = Rc::new(NavElements {
            submenu: sidebar.query_selector(".submenu").ok().flatten(),
            toggle_icon: dom::find(&self.document, "#toggle-navigation-icon"),
            dropdown_icon: dom::find(&self.document, "#dropdown-icon"),
            sidebar,
        });

        *self.state.borrow_mut() = NavState::new(
            dom::has_class(&elements.sidebar, "close"),
            elements.submenu.as_ref().map_or(true, |s| dom::has_class(s, "hidden")),
        );

        match dom::get_element_by_id(&self.document, "toggle-navigation") {
            Ok(button) => {
                let state = self.state.clone();
                let elements = elements.clone();
                dom::listen(&button, "click", move |event: Event| {
                    event.prevent_default();
                    state.borrow_mut().toggle_sidebar();
                    render(&elements, &state.borrow());
                })?;
            }
            Err(e) => log::error!("[nav] {}", e),
        }

        match dom::get_element_by_id(&self.document, "dropdown-btn") {
            Ok(button) => {
                let state = self.state.clone();
                let elements = elements.clone();
                dom::listen(&button, "click", move |event: Event| {
                    event.prevent_default();
                    state.borrow_mut().toggle_submenu();
                    render(&elements, &state.borrow());
                })?;
            }
            Err(e) => log::error!("[nav] {}", e),
        }

        let links = self
            .document
            .query_selector_all(".navigation li a")
            .map_err(dom_err)?;
        for i in 0..links.length() {
            let Some(link) = links.item(i) else {
                continue;
            };
            let state = self.state.clone();
            let elements = elements.clone();
            dom::listen(&link, "click", move |event: Event| {
                if dom::closest(&event, "#toggle-navigation").is_some() {
                    return;
                }
                if state.borrow().sidebar_closed() {
                    state.borrow_mut().link_clicked();
                    render(&elements, &state.borrow());
                }
            })?;
        }

        log::info!("[nav] Loaded and listeners attached");
        Ok(())
    }
}

fn render(elements: &NavElements, state: &NavState) {
    let closed = state.sidebar_closed();
    dom::set_class(&elements.sidebar, "close", closed);
    if let Some(icon) = &elements.toggle_icon {
        dom::set_class(icon, "bxs-chevrons-left", !closed);
        dom::set_class(icon, "bxs-chevrons-right", closed);
    }

    let hidden = state.submenu_hidden();
    if let Some(submenu) = &elements.submenu {
        dom::set_class(submenu, "hidden", hidden);
    }
    if let Some(icon) = &elements.dropdown_icon {
        dom::set_class(icon, "bxs-chevron-down", hidden);
        dom::set_class(icon, "bxs-chevron-up", !hidden);
    }
}
