//! Identifiers and simple allocators for attachments and event listeners.

use serde::{Deserialize, Serialize};

/// Generation token of one attach/detach cycle. Listeners carry the id of the
/// attachment that registered them; a mismatch marks the callback as stale.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct AttachId(pub u32);

/// Subscription token handed out by an engine instance.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ListenerId(pub u32);

/// Monotonic allocator for AttachId and ListenerId.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_attach: u32,
    next_listener: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_attach(&mut self) -> AttachId {
        let id = AttachId(self.next_attach);
        self.next_attach = self.next_attach.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_listener(&mut self) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener = self.next_listener.wrapping_add(1);
        id
    }
}
