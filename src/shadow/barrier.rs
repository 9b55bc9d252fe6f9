//! Wait-for-idle strategies.
//!
//! Every mode is its own variant and carries only what it needs: the notifier
//! modes own their notifier block, the interrupt mode also owns its event, and
//! the remaining modes own nothing.

use crate::shadow::{
    ShadowError,
    channel::{NoEvents, NoNotifier, NotifierMemory, TimeSource, WaitEvents},
    resource::{ScopedEvent, ScopedNotifier},
};

/// Bounds for polling the channel's idle signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub timeout_us: u64,
    pub interval_us: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            timeout_us: 5_000_000,
            interval_us: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SleepConfig {
    pub duration_us: u32,
}

impl Default for SleepConfig {
    fn default() -> Self {
        Self {
            duration_us: 100_000,
        }
    }
}

/// Method addresses that program and arm a notifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotifierMethods {
    /// Receives bits `[63:32]` of the notifier GPU address.
    pub offset_upper: u32,
    /// Receives bits `[31:0]` of the notifier GPU address.
    pub offset_lower: u32,
    /// Arms the notify condition.
    pub notify: u32,
    /// Value written to `notify`.
    pub notify_value: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotifierConfig {
    pub methods: NotifierMethods,
    /// Byte pattern the block is filled with before arming.
    pub sentinel: u8,
    pub timeout_us: u64,
    pub interval_us: u32,
}

impl NotifierConfig {
    pub fn new(methods: NotifierMethods) -> Self {
        Self {
            methods,
            sentinel: 0xFF,
            timeout_us: 5_000_000,
            interval_us: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterruptConfig {
    pub notifier: NotifierConfig,
    pub event_timeout_ms: u32,
}

impl InterruptConfig {
    pub fn new(methods: NotifierMethods) -> Self {
        Self {
            notifier: NotifierConfig::new(methods),
            event_timeout_ms: 5_000,
        }
    }
}

/// Notifier block plus the settings to arm and poll it.
#[derive(Debug)]
pub struct NotifierWait<M: NotifierMemory> {
    block: ScopedNotifier<M>,
    config: NotifierConfig,
}

impl<M: NotifierMemory> NotifierWait<M> {
    pub fn new(memory: M, config: NotifierConfig) -> Result<Self, ShadowError> {
        Ok(Self {
            block: ScopedNotifier::allocate(memory)?,
            config,
        })
    }

    /// Fills the block with the sentinel and returns the three method writes
    /// that point hardware at it and arm the notify, in issue order.
    pub fn arm(&mut self) -> [(u32, u32); 3] {
        self.block.fill(self.config.sentinel);
        let gpu = self.block.gpu_address();
        let m = &self.config.methods;
        [
            (m.offset_upper, (gpu >> 32) as u32),
            (m.offset_lower, gpu as u32),
            (m.notify, m.notify_value),
        ]
    }

    /// Polls until hardware overwrites the sentinel or the bound elapses.
    pub fn poll<T: TimeSource>(&mut self, clock: &mut T) -> Result<(), ShadowError> {
        let sentinel = self.config.sentinel;
        let block = &mut self.block;
        poll_until(
            clock,
            self.config.timeout_us,
            self.config.interval_us,
            || block.is_overwritten(sentinel),
        )
    }
}

/// The configured wait-for-idle strategy of one engine.
#[derive(Debug)]
pub enum IdleBarrier<M: NotifierMemory = NoNotifier, E: WaitEvents = NoEvents> {
    /// Poll the channel's idle signal.
    Poll(PollConfig),
    /// Sleep for a fixed time and assume idle.
    Sleep(SleepConfig),
    /// Delegate to the channel's own idle wait.
    HostAssisted,
    /// Arm a notifier and poll its memory.
    Notifier(NotifierWait<M>),
    /// Arm a notifier, block on the event, then confirm through the notifier.
    Interrupt {
        event: ScopedEvent<E>,
        event_timeout_ms: u32,
        notifier: NotifierWait<M>,
    },
}

/// Barrier for modes that need neither a notifier nor an event.
pub type SimpleBarrier = IdleBarrier<NoNotifier, NoEvents>;

impl<M: NotifierMemory, E: WaitEvents> IdleBarrier<M, E> {
    pub fn poll(config: PollConfig) -> Self {
        IdleBarrier::Poll(config)
    }

    pub fn sleep(config: SleepConfig) -> Self {
        IdleBarrier::Sleep(config)
    }

    pub fn host_assisted() -> Self {
        IdleBarrier::HostAssisted
    }

    /// Allocates the notifier block; nothing is held on failure.
    pub fn notifier(memory: M, config: NotifierConfig) -> Result<Self, ShadowError> {
        Ok(IdleBarrier::Notifier(NotifierWait::new(memory, config)?))
    }

    /// Allocates the notifier block and creates the event. If event creation
    /// fails the notifier is released before returning.
    pub fn interrupt(memory: M, events: E, config: InterruptConfig) -> Result<Self, ShadowError> {
        let notifier = NotifierWait::new(memory, config.notifier)?;
        let event = ScopedEvent::create(events)?;
        Ok(IdleBarrier::Interrupt {
            event,
            event_timeout_ms: config.event_timeout_ms,
            notifier,
        })
    }

    pub fn mode_name(&self) -> &'static str {
        match self {
            IdleBarrier::Poll(_) => "poll",
            IdleBarrier::Sleep(_) => "sleep",
            IdleBarrier::HostAssisted => "host",
            IdleBarrier::Notifier(_) => "notifier",
            IdleBarrier::Interrupt { .. } => "interrupt",
        }
    }
}

/// Evaluates `done` until it returns true, sleeping `interval_us` between
/// samples. `done` is always sampled at least once, and once more after the
/// deadline passes.
pub fn poll_until<T: TimeSource>(
    clock: &mut T,
    timeout_us: u64,
    interval_us: u32,
    mut done: impl FnMut() -> bool,
) -> Result<(), ShadowError> {
    let deadline = clock.now_us().saturating_add(timeout_us);
    loop {
        if done() {
            return Ok(());
        }
        if clock.now_us() >= deadline {
            return Err(ShadowError::IdleTimeout);
        }
        clock.delay_us(interval_us.max(1));
    }
}
