//! Message bodies sent to the chat, in Telegram's HTML parse mode.
//!
//! Everything interpolated from users or the store goes through
//! [`escape_html`], so a title like `a < b & c` renders literally.

use chrono::{DateTime, TimeZone};

use crate::notion::TitleEntry;

pub const LOADING: &str = "Loading...";
pub const PONG: &str = "pong";
pub const CANCELLED: &str = "Cancelled";
pub const UNAUTHORIZED: &str = "Unauthorized";
pub const MENU: &str = "Choose";
pub const NEW_ENTRY_PROMPT: &str = "Send me the text of the new entry.";

const UNTITLED: &str = "Untitled";

/// Escape `&`, `<`, `>` and `"` for HTML text and attribute values.
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    result
}

fn link(url: &str, text: &str) -> String {
    format!("<a href=\"{}\">{}</a>", escape_html(url), escape_html(text))
}

/// Bold heading followed by one link per entry, separated by blank lines.
pub fn entries(heading: &str, entries: &[TitleEntry]) -> String {
    let lines: Vec<String> = entries
        .iter()
        .map(|e| format!("{}\n", link(&e.url, e.title.as_deref().unwrap_or(UNTITLED))))
        .collect();
    format!("<b>{}</b>\n\n{}", escape_html(heading), lines.join("\n"))
}

/// Greeting line for the daily digest, dated in `now`'s timezone.
pub fn digest<Tz: TimeZone>(now: &DateTime<Tz>, body: &str) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "Hey! Today is <b>{}</b>, <b>{}</b>\n\n<b>Here are your tasks for today:</b>\n\n{}",
        now.format("%A"),
        now.format("%-m/%-d/%Y"),
        body
    )
}

pub fn welcome(first_name: &str) -> String {
    format!(
        "Hey {}! This is your Notion bot. Start with <code>/menu</code>",
        escape_html(first_name)
    )
}

pub fn proposal(text: &str) -> String {
    format!("<b>Add this to your Notion: {}</b>", escape_html(text))
}

pub fn added(url: &str, text: &str) -> String {
    format!("Added: {}", link(url, text))
}

/// One `/name - description` line per command.
pub fn commands<'a, I>(commands: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    commands
        .into_iter()
        .map(|(name, description)| format!("/{} - {}", name.trim_start_matches('/'), description))
        .collect::<Vec<_>>()
        .join("\n")
}
