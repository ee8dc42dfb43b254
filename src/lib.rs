//! Telegram bot over a Notion task database: named views, quick entry
//! creation and a scheduled daily digest.

pub mod bot;
pub mod config;
pub mod digest;
pub mod format;
pub mod notion;
pub mod tasks;
pub mod telegram_log;

#[cfg(test)]
mod testing;
