//! Daily digest of live actions, pushed on a cron schedule.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::bot::{Messenger, Reply};
use crate::format;
use crate::notion::TaskStore;
use crate::tasks::{self, View};

pub const DEFAULT_CRON: &str = "30 9 * * *";
pub const DEFAULT_TIMEZONE: &str = "Europe/Bucharest";

/// A cron schedule evaluated in a fixed timezone.
#[derive(Debug, Clone)]
pub struct DigestSchedule {
    expr: String,
    schedule: Schedule,
    tz: Tz,
}

impl DigestSchedule {
    /// Parse a cron expression and an IANA timezone name.
    ///
    /// Five-field expressions (`min hour dom month dow`) get a zero seconds
    /// field; six and seven field ones are used as given.
    pub fn parse(expr: &str, tz: &str) -> Result<Self, String> {
        let fields = expr.split_whitespace().count();
        let full = match fields {
            5 => format!("0 {expr}"),
            6 | 7 => expr.to_string(),
            _ => return Err(format!("Invalid cron '{expr}': expected 5 to 7 fields, got {fields}")),
        };
        let schedule =
            Schedule::from_str(&full).map_err(|e| format!("Invalid cron '{expr}': {e}"))?;
        let tz = Tz::from_str(tz).map_err(|e| format!("Invalid timezone '{tz}': {e}"))?;
        Ok(Self { expr: expr.to_string(), schedule, tz })
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// First fire time strictly after `after`, in the schedule's timezone.
    pub fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Tz>> {
        self.schedule.after(&after.with_timezone(&self.tz)).next()
    }
}

impl std::fmt::Display for DigestSchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.expr, self.tz)
    }
}

/// Build the digest text for `now`.
pub async fn build(store: &dyn TaskStore, now: DateTime<Tz>) -> String {
    let entries = tasks::fetch_view(store, View::Actions).await;
    format::digest(&now, &format::entries(View::Actions.heading(), &entries))
}

/// Build and send one digest. Delivery is not retried.
pub async fn send(
    store: &dyn TaskStore,
    messenger: &dyn Messenger,
    chat_id: i64,
    now: DateTime<Tz>,
) {
    let text = build(store, now).await;
    match messenger.send(chat_id, Reply::html(text)).await {
        Ok(msg_id) => info!("Sent digest to chat {} (msg {})", chat_id, msg_id),
        Err(e) => warn!("Failed to send digest to chat {}: {}", chat_id, e),
    }
}

/// Run the digest loop in the background.
pub fn spawn(
    schedule: DigestSchedule,
    store: Arc<dyn TaskStore>,
    messenger: Arc<dyn Messenger>,
    chat_id: i64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut after = Utc::now();
        loop {
            let Some(next) = schedule.next_after(after) else {
                warn!("Digest schedule {} has no future occurrence, stopping", schedule);
                return;
            };
            info!("Next digest at {}", next);

            let next_utc = next.with_timezone(&Utc);
            let wait = (next_utc - Utc::now()).to_std().unwrap_or(Duration::ZERO);
            tokio::time::sleep(wait).await;

            let now = Utc::now().with_timezone(&schedule.timezone());
            send(store.as_ref(), messenger.as_ref(), chat_id, now).await;
            after = next_utc.max(Utc::now());
        }
    })
}
