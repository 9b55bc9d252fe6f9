use crate::shadow::{
    ShadowError,
    barrier::{IdleBarrier, NotifierWait, poll_until},
    channel::{
        EventWaitError, MethodChannel, NoEvents, NoNotifier, NotifierMemory, TimeSource,
        WaitEvents,
    },
    handle::HostShadow,
    storage::MethodStorage,
};

/// Lifetime counters of one engine.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FlushStats {
    /// Completed `flush` calls, including empty ones.
    pub flushes: u64,
    /// Registers written to the channel, including notifier arm writes.
    pub registers: u64,
    /// Value of `registers` at the last successful barrier.
    pub synced_at: u64,
}

/// Drives one hardware object: flushes the shared shadow storage to its
/// channel and waits for idle with the configured barrier.
///
/// A channel write failure or any barrier failure latches a fault; from then
/// on `flush` and `wait_for_idle` return [`ShadowError::Faulted`] without
/// touching hardware.
pub struct MethodEngine<'s, const RC: usize, const FC: usize, C, T, M = NoNotifier, E = NoEvents>
where
    bitmaps::BitsImpl<RC>: bitmaps::Bits,
    C: MethodChannel,
    T: TimeSource,
    M: NotifierMemory,
    E: WaitEvents,
{
    storage: &'s MethodStorage<RC, FC>,
    channel: C,
    clock: T,
    barrier: IdleBarrier<M, E>,
    stats: FlushStats,
    fault: Option<ShadowError>,
}

impl<'s, const RC: usize, const FC: usize, C, T, M, E> core::fmt::Debug
    for MethodEngine<'s, RC, FC, C, T, M, E>
where
    bitmaps::BitsImpl<RC>: bitmaps::Bits,
    C: MethodChannel,
    T: TimeSource,
    M: NotifierMemory,
    E: WaitEvents,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MethodEngine")
            .field("barrier", &self.barrier.mode_name())
            .field("stats", &self.stats)
            .field("fault", &self.fault)
            .finish_non_exhaustive()
    }
}

impl<'s, const RC: usize, const FC: usize, C, T, M, E> MethodEngine<'s, RC, FC, C, T, M, E>
where
    bitmaps::BitsImpl<RC>: bitmaps::Bits,
    C: MethodChannel,
    T: TimeSource,
    M: NotifierMemory,
    E: WaitEvents,
{
    pub fn new(
        storage: &'s MethodStorage<RC, FC>,
        channel: C,
        clock: T,
        barrier: IdleBarrier<M, E>,
    ) -> Self {
        Self {
            storage,
            channel,
            clock,
            barrier,
            stats: FlushStats::default(),
            fault: None,
        }
    }

    /// Field access for the script side. Borrows the engine so no flush or
    /// barrier can run while the view is open.
    pub fn host_shadow(&mut self) -> HostShadow<'_, RC, FC> {
        self.storage.host_shadow()
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    pub fn clock(&self) -> &T {
        &self.clock
    }

    pub fn barrier(&self) -> &IdleBarrier<M, E> {
        &self.barrier
    }

    pub fn stats(&self) -> FlushStats {
        self.stats
    }

    /// True if any register reached the channel since the last successful barrier.
    pub fn needs_idle(&self) -> bool {
        self.stats.registers != self.stats.synced_at
    }

    pub fn fault(&self) -> Option<ShadowError> {
        self.fault
    }

    fn check_fault(&self) -> Result<(), ShadowError> {
        match self.fault {
            Some(_) => Err(ShadowError::Faulted),
            None => Ok(()),
        }
    }

    fn latch<R>(&mut self, result: Result<R, ShadowError>) -> Result<R, ShadowError> {
        if let Err(e) = &result {
            self.fault = Some(*e);
        }
        result
    }

    /// Writes every dirty register to the channel. Returns how many were written.
    ///
    /// Registers that reached the channel before a rejected write still count
    /// in [`FlushStats::registers`].
    pub fn flush(&mut self) -> Result<usize, ShadowError> {
        self.check_fault()?;
        let channel = &mut self.channel;
        let (written, result) = self
            .storage
            .kernel_shadow()
            .with_view(|view| view.flush_counted(channel));
        self.stats.registers += written as u64;
        match &result {
            Ok(()) => self.stats.flushes += 1,
            Err(e) => log::error!("engine: flush aborted after {} writes: {}", written, e),
        }
        self.latch(result.map(|()| written))
    }

    /// Blocks until the hardware reports idle using the configured barrier.
    ///
    /// Pending field writes stay in the shadow; call [`Self::launch`] to flush
    /// them first. The notifier modes write only their three arm methods.
    pub fn wait_for_idle(&mut self) -> Result<(), ShadowError> {
        self.check_fault()?;
        log::debug!("engine: wait for idle ({})", self.barrier.mode_name());

        let result = self.run_barrier();
        match &result {
            Ok(()) => self.stats.synced_at = self.stats.registers,
            Err(e) => log::error!("engine: {} barrier failed: {}", self.barrier.mode_name(), e),
        }
        self.latch(result)
    }

    /// Flushes, then waits for idle.
    pub fn launch(&mut self) -> Result<usize, ShadowError> {
        let count = self.flush()?;
        self.wait_for_idle()?;
        Ok(count)
    }

    fn run_barrier(&mut self) -> Result<(), ShadowError> {
        match &mut self.barrier {
            IdleBarrier::Poll(config) => {
                let channel = &mut self.channel;
                poll_until(&mut self.clock, config.timeout_us, config.interval_us, || {
                    channel.query_idle()
                })
            }
            IdleBarrier::Sleep(config) => {
                self.clock.delay_us(config.duration_us);
                Ok(())
            }
            IdleBarrier::HostAssisted => self
                .channel
                .block_until_idle()
                .map_err(|code| ShadowError::HostWait { code: code.0 }),
            IdleBarrier::Notifier(notifier) => {
                arm_notifier(&mut self.channel, &mut self.stats, notifier)?;
                notifier.poll(&mut self.clock)
            }
            IdleBarrier::Interrupt {
                event,
                event_timeout_ms,
                notifier,
            } => {
                arm_notifier(&mut self.channel, &mut self.stats, notifier)?;
                event.block(*event_timeout_ms).map_err(|e| match e {
                    EventWaitError::TimedOut => ShadowError::IdleTimeout,
                    EventWaitError::Failed(code) => ShadowError::EventWait { code: code.0 },
                })?;
                notifier.poll(&mut self.clock)
            }
        }
    }
}

/// Fills the notifier and writes the three arm methods straight to the
/// channel. They take no shadow slots.
fn arm_notifier<C, M>(
    channel: &mut C,
    stats: &mut FlushStats,
    notifier: &mut NotifierWait<M>,
) -> Result<(), ShadowError>
where
    C: MethodChannel,
    M: NotifierMemory,
{
    for (address, value) in notifier.arm() {
        log::trace!("notifier: method[{:#06x}] <- {:#010x}", address, value);
        if !channel.write_method(address, value) {
            log::error!("notifier: channel rejected method[{:#06x}]", address);
            return Err(ShadowError::ChannelWriteFailed { address });
        }
        stats.registers += 1;
    }
    Ok(())
}
