use crate::shadow::{
    ShadowError,
    channel::{NotifierMemory, WaitEvents},
};

/// Size of one notifier block in bytes.
pub const NOTIFIER_BYTES: usize = 16;

/// A notifier block that is released when dropped.
pub struct ScopedNotifier<M: NotifierMemory> {
    memory: M,
    block: Option<M::Block>,
}

impl<M: NotifierMemory> core::fmt::Debug for ScopedNotifier<M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScopedNotifier").finish_non_exhaustive()
    }
}

impl<M: NotifierMemory> ScopedNotifier<M> {
    pub fn allocate(mut memory: M) -> Result<Self, ShadowError> {
        let block = memory
            .allocate(NOTIFIER_BYTES)
            .map_err(|code| ShadowError::NotifierAlloc { code: code.0 })?;
        Ok(Self {
            memory,
            block: Some(block),
        })
    }

    pub fn fill(&mut self, pattern: u8) {
        if let Some(block) = &self.block {
            self.memory.fill(block, pattern);
        }
    }

    pub fn gpu_address(&self) -> u64 {
        self.block
            .as_ref()
            .map_or(0, |block| self.memory.gpu_address(block))
    }

    /// True once any byte of the block differs from `sentinel`.
    pub fn is_overwritten(&mut self, sentinel: u8) -> bool {
        let Some(block) = &self.block else {
            return false;
        };
        let mut buf = [sentinel; NOTIFIER_BYTES];
        self.memory.read(block, &mut buf);
        buf.iter().any(|b| *b != sentinel)
    }
}

impl<M: NotifierMemory> Drop for ScopedNotifier<M> {
    fn drop(&mut self) {
        if let Some(block) = self.block.take() {
            self.memory.release(block);
        }
    }
}

/// A wait event that is destroyed when dropped.
pub struct ScopedEvent<E: WaitEvents> {
    events: E,
    event: Option<E::Event>,
}

impl<E: WaitEvents> core::fmt::Debug for ScopedEvent<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScopedEvent").finish_non_exhaustive()
    }
}

impl<E: WaitEvents> ScopedEvent<E> {
    pub fn create(mut events: E) -> Result<Self, ShadowError> {
        let event = events
            .create_event()
            .map_err(|code| ShadowError::EventCreate { code: code.0 })?;
        Ok(Self {
            events,
            event: Some(event),
        })
    }

    pub fn block(&mut self, timeout_ms: u32) -> Result<(), crate::shadow::EventWaitError> {
        match &self.event {
            Some(event) => self.events.block_on_event(event, timeout_ms),
            None => Err(crate::shadow::EventWaitError::TimedOut),
        }
    }
}

impl<E: WaitEvents> Drop for ScopedEvent<E> {
    fn drop(&mut self) {
        if let Some(event) = self.event.take() {
            self.events.destroy_event(event);
        }
    }
}
