//! Capabilities the engine consumes from the command channel and platform.
//!
//! None of these are implemented here; a resource-manager binding or a
//! simulator provides them.

/// Status code returned by a collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelCode(pub u32);

impl ChannelCode {
    /// The collaborator does not provide the capability.
    pub const UNSUPPORTED: ChannelCode = ChannelCode(u32::MAX);
}

/// Outcome of blocking on a wait event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventWaitError {
    TimedOut,
    Failed(ChannelCode),
}

/// GPU command-submission channel bound to one hardware object.
pub trait MethodChannel {
    /// Single synchronous method write. `false` means the channel is unusable.
    fn write_method(&mut self, address: u32, value: u32) -> bool;

    /// Samples the hardware idle signal.
    fn query_idle(&mut self) -> bool;

    /// The channel's own wait-for-idle primitive.
    fn block_until_idle(&mut self) -> Result<(), ChannelCode>;
}

/// Allocator for GPU-visible notifier blocks.
pub trait NotifierMemory {
    type Block;

    fn allocate(&mut self, size: usize) -> Result<Self::Block, ChannelCode>;
    fn fill(&mut self, block: &Self::Block, pattern: u8);
    /// Copies the start of the block into `out`.
    fn read(&mut self, block: &Self::Block, out: &mut [u8]);
    fn gpu_address(&self, block: &Self::Block) -> u64;
    fn release(&mut self, block: Self::Block);
}

/// OS-level event used for interrupt-driven waits.
pub trait WaitEvents {
    type Event;

    fn create_event(&mut self) -> Result<Self::Event, ChannelCode>;
    fn block_on_event(&mut self, event: &Self::Event, timeout_ms: u32)
    -> Result<(), EventWaitError>;
    fn destroy_event(&mut self, event: Self::Event);
}

/// Monotonic time and blocking delay.
pub trait TimeSource {
    fn now_us(&mut self) -> u64;
    fn delay_us(&mut self, us: u32);
}

impl<T: MethodChannel + ?Sized> MethodChannel for &mut T {
    fn write_method(&mut self, address: u32, value: u32) -> bool {
        (**self).write_method(address, value)
    }

    fn query_idle(&mut self) -> bool {
        (**self).query_idle()
    }

    fn block_until_idle(&mut self) -> Result<(), ChannelCode> {
        (**self).block_until_idle()
    }
}

impl<T: NotifierMemory> NotifierMemory for &mut T {
    type Block = T::Block;

    fn allocate(&mut self, size: usize) -> Result<Self::Block, ChannelCode> {
        (**self).allocate(size)
    }

    fn fill(&mut self, block: &Self::Block, pattern: u8) {
        (**self).fill(block, pattern)
    }

    fn read(&mut self, block: &Self::Block, out: &mut [u8]) {
        (**self).read(block, out)
    }

    fn gpu_address(&self, block: &Self::Block) -> u64 {
        (**self).gpu_address(block)
    }

    fn release(&mut self, block: Self::Block) {
        (**self).release(block)
    }
}

impl<T: WaitEvents> WaitEvents for &mut T {
    type Event = T::Event;

    fn create_event(&mut self) -> Result<Self::Event, ChannelCode> {
        (**self).create_event()
    }

    fn block_on_event(
        &mut self,
        event: &Self::Event,
        timeout_ms: u32,
    ) -> Result<(), EventWaitError> {
        (**self).block_on_event(event, timeout_ms)
    }

    fn destroy_event(&mut self, event: Self::Event) {
        (**self).destroy_event(event)
    }
}

/// Marker for engines whose barrier never uses a notifier.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoNotifier;

impl NotifierMemory for NoNotifier {
    type Block = core::convert::Infallible;

    fn allocate(&mut self, _size: usize) -> Result<Self::Block, ChannelCode> {
        Err(ChannelCode::UNSUPPORTED)
    }

    fn fill(&mut self, block: &Self::Block, _pattern: u8) {
        match *block {}
    }

    fn read(&mut self, block: &Self::Block, _out: &mut [u8]) {
        match *block {}
    }

    fn gpu_address(&self, block: &Self::Block) -> u64 {
        match *block {}
    }

    fn release(&mut self, block: Self::Block) {
        match block {}
    }
}

/// Marker for engines whose barrier never waits on an event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoEvents;

impl WaitEvents for NoEvents {
    type Event = core::convert::Infallible;

    fn create_event(&mut self) -> Result<Self::Event, ChannelCode> {
        Err(ChannelCode::UNSUPPORTED)
    }

    fn block_on_event(
        &mut self,
        event: &Self::Event,
        _timeout_ms: u32,
    ) -> Result<(), EventWaitError> {
        match *event {}
    }

    fn destroy_event(&mut self, event: Self::Event) {
        match event {}
    }
}

#[cfg(feature = "std")]
mod std_time {
    extern crate std;

    use super::TimeSource;
    use std::time::{Duration, Instant};

    /// Wall-clock time source backed by `std`.
    #[derive(Debug, Clone, Copy)]
    pub struct StdTimeSource {
        origin: Instant,
    }

    impl StdTimeSource {
        pub fn new() -> Self {
            Self {
                origin: Instant::now(),
            }
        }
    }

    impl Default for StdTimeSource {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TimeSource for StdTimeSource {
        fn now_us(&mut self) -> u64 {
            self.origin.elapsed().as_micros() as u64
        }

        fn delay_us(&mut self, us: u32) {
            std::thread::sleep(Duration::from_micros(us as u64));
        }
    }
}

#[cfg(feature = "std")]
pub use std_time::StdTimeSource;
