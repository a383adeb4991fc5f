use std::collections::HashMap;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::quiz::session::QuizState;

/// Per-user quiz state. Each user owns exactly one slot; transitions run
/// synchronously under the lock and never across an await point.
#[derive(Default)]
pub struct SessionStore {
    slots: Mutex<HashMap<Uuid, QuizState>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` against the user's state, creating an idle slot on first use.
    pub fn with_state<R>(&self, user_id: Uuid, f: impl FnOnce(&mut QuizState) -> R) -> R {
        let mut slots = self.slots.lock();
        f(slots.entry(user_id).or_default())
    }

    pub fn clear(&self, user_id: Uuid) {
        self.slots.lock().remove(&user_id);
    }
}
