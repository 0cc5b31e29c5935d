/// Collapse state of the navigation sidebar and its chat-list submenu.
///
/// Purely presentational; independent of the chat session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavState {
    sidebar_closed: bool,
    submenu_hidden: bool,
}

impl NavState {
    pub fn new(sidebar_closed: bool, submenu_hidden: bool) -> Self {
        Self { sidebar_closed, submenu_hidden }
    }

    pub fn sidebar_closed(&self) -> bool {
        self.sidebar_closed
    }

    pub fn submenu_hidden(&self) -> bool {
        self.submenu_hidden
    }

    /// Collapsing the sidebar also folds the submenu.
    pub fn toggle_sidebar(&mut self) {
        self.sidebar_closed = !self.sidebar_closed;
        if self.sidebar_closed {
            self.submenu_hidden = true;
        }
    }

    /// Unfolding the submenu of a collapsed sidebar expands the sidebar.
    pub fn toggle_submenu(&mut self) {
        self.submenu_hidden = !self.submenu_hidden;
        if self.sidebar_closed && !self.submenu_hidden {
            self.sidebar_closed = false;
        }
    }

    pub fn link_clicked(&mut self) {
        if self.sidebar_closed {
            self.toggle_sidebar();
        }
    }
}
