//! Per-sender access control.

use std::collections::HashSet;

use tokio::sync::Mutex;

/// Allow-list check run on `/start`. A sender who fails it is remembered and
/// ignored from then on; nobody else is affected.
pub struct AuthGate {
    allowed: HashSet<u64>,
    /// Grows for the lifetime of the process. Held in memory only, so a
    /// restart gives rejected senders another `/start`.
    rejected: Mutex<HashSet<u64>>,
}

impl AuthGate {
    pub fn new(allowed: impl IntoIterator<Item = u64>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
            rejected: Mutex::new(HashSet::new()),
        }
    }

    pub fn is_authorized(&self, user_id: u64) -> bool {
        self.allowed.contains(&user_id)
    }

    pub async fn reject(&self, user_id: u64) {
        self.rejected.lock().await.insert(user_id);
    }

    pub async fn is_rejected(&self, user_id: u64) -> bool {
        self.rejected.lock().await.contains(&user_id)
    }
}
