use chatpane_session::{Bubble, BubbleKind};
use chatpane_types::text::render_plain;
use chatpane_types::Role;
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};

/// Schemes a link or image in a bot reply may point at
const ALLOWED_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

/// Render markdown to HTML. Raw HTML in the source is shown as text and
/// link or image destinations with other schemes are emptied.
pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link { link_type, dest_url, title, id }) => {
            Event::Start(Tag::Link { link_type, dest_url: safe_url(dest_url), title, id })
        }
        Event::Start(Tag::Image { link_type, dest_url, title, id }) => {
            Event::Start(Tag::Image { link_type, dest_url: safe_url(dest_url), title, id })
        }
        other => other,
    });
    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);

    add_code_highlighting_classes(&html_output)
}

fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    if is_safe_url(&url) {
        url
    } else {
        log::warn!("Dropped link destination with a disallowed scheme");
        CowStr::Borrowed("")
    }
}

/// Relative and fragment URLs pass, absolute ones only with an allowed scheme.
/// Browsers ignore whitespace and control characters inside a scheme, so
/// those are stripped before looking for one.
fn is_safe_url(url: &str) -> bool {
    let compact: String = url.chars().filter(|c| !c.is_whitespace() && !c.is_control()).collect();
    let Some(colon) = compact.find(':') else {
        return true;
    };
    let scheme = &compact[..colon];
    if scheme.contains(['/', '?', '#']) {
        return true;
    }
    ALLOWED_SCHEMES.iter().any(|allowed| scheme.eq_ignore_ascii_case(allowed))
}

/// Add hljs classes to code blocks
fn add_code_highlighting_classes(html: &str) -> String {
    html.replace("<pre><code>", "<pre><code class=\"hljs\">")
        .replace("<pre><code class=\"language-", "<pre><code class=\"hljs language-")
}

/// HTML for a transcript bubble. Only real bot replies go through markdown.
pub fn render_bubble(bubble: &Bubble, markdown_replies: bool) -> String {
    match (bubble.kind, bubble.role) {
        (BubbleKind::Message, Role::Bot) if markdown_replies => render_markdown(&bubble.content),
        _ => render_plain(&bubble.content),
    }
}
