use super::message::Message;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared "request in flight" flag. Clones observe the same state, so a UI can
/// hold one while the orchestrator works.
#[derive(Debug, Clone, Default)]
pub struct BusyFlag(Arc<AtomicBool>);

impl BusyFlag {
    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Mark busy; `None` if a request is already in flight.
    pub fn try_acquire(&self) -> Option<BusyGuard> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(self.0.clone()))
    }
}

/// Clears the busy flag when dropped, on every exit path.
#[derive(Debug)]
pub struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// One user's conversation. Messages are only ever appended.
#[derive(Debug, Default)]
pub struct Session {
    messages: Vec<Message>,
    disabled: bool,
    busy: BusyFlag,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    pub fn busy_flag(&self) -> &BusyFlag {
        &self.busy
    }

    /// Input is accepted only when idle and not disabled.
    pub fn accepts_input(&self) -> bool {
        !self.disabled && !self.is_busy()
    }

    pub(crate) fn push(&mut self, message: Message) -> &Message {
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    pub(crate) fn disable(&mut self) {
        self.disabled = true;
    }
}
