use std::rc::Rc;

use async_trait::async_trait;
use chatpane_session::{ChatPage, Effects, Platform};
use gloo_timers::future::TimeoutFuture;

use crate::view::View;

/// Browser timers plus the DOM renderer
pub struct BrowserPlatform {
    view: Rc<View>,
}

impl BrowserPlatform {
    pub fn new(view: Rc<View>) -> Self {
        Self { view }
    }
}

#[async_trait(?Send)]
impl Platform for BrowserPlatform {
    async fn sleep(&self, ms: u32) {
        TimeoutFuture::new(ms).await;
    }

    fn render(&self, page: &ChatPage, effects: Effects) {
        self.view.render(page, effects);
    }
}
