use crate::shadow::{ShadowError, channel::MethodChannel, table::ShadowTable};

/// Flush-side view of the shadow registers.
///
/// Drains dirty registers to a channel in flush order and answers dirty
/// queries. Writes through this view update the shadow without marking
/// dirty, for values read back from hardware.
pub struct KernelView<'a, const RC: usize>
where
    bitmaps::BitsImpl<RC>: bitmaps::Bits,
{
    table: &'a mut ShadowTable<RC>,
}

impl<'a, const RC: usize> core::fmt::Debug for KernelView<'a, RC>
where
    bitmaps::BitsImpl<RC>: bitmaps::Bits,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("KernelView").finish_non_exhaustive()
    }
}

impl<'a, const RC: usize> KernelView<'a, RC>
where
    bitmaps::BitsImpl<RC>: bitmaps::Bits,
{
    pub(crate) fn new(table: &'a mut ShadowTable<RC>) -> Self {
        Self { table }
    }

    /// Writes every dirty register to `channel`, one write per address, in
    /// flush order, then clears the dirty sequence. Shadow values are kept.
    ///
    /// On a rejected write the registers already written are clean and the
    /// rejected one and all later ones stay dirty.
    ///
    /// Returns the number of registers written.
    pub fn flush<C: MethodChannel>(&mut self, channel: &mut C) -> Result<usize, ShadowError> {
        let (written, result) = self.flush_counted(channel);
        result.map(|()| written)
    }

    /// Like [`Self::flush`], but also reports how many registers reached the
    /// channel before a rejected write.
    pub fn flush_counted<C: MethodChannel>(
        &mut self,
        channel: &mut C,
    ) -> (usize, Result<(), ShadowError>) {
        let pending = self.table.dirty_count();
        let (written, result) = self.table.drain_dirty(|address, value| {
            log::trace!("flush: method[{:#06x}] <- {:#010x}", address, value);
            if channel.write_method(address, value) {
                Ok(())
            } else {
                log::error!("flush: channel rejected method[{:#06x}]", address);
                Err(ShadowError::ChannelWriteFailed { address })
            }
        });
        log::debug!("flush: wrote {} of {} dirty methods", written, pending);
        (written, result)
    }

    /// Visits each dirty register in flush order.
    pub fn iter_dirty<F>(&self, f: F) -> Result<(), ShadowError>
    where
        F: FnMut(u32, u32) -> Result<(), ShadowError>,
    {
        self.table.iter_dirty(f)
    }

    /// Updates the shadow value of `address` without marking it dirty.
    pub fn write_clean(&mut self, address: u32, value: u32) -> Result<(), ShadowError> {
        self.table.write(address, value)
    }

    pub fn read_method(&self, address: u32) -> u32 {
        self.table.read(address)
    }

    /// Removes `address` from the dirty sequence.
    pub fn mark_clean(&mut self, address: u32) {
        self.table.mark_clean(address)
    }

    pub fn is_dirty(&self, address: u32) -> bool {
        self.table.is_dirty(address)
    }

    pub fn any_dirty(&self) -> bool {
        self.table.any_dirty()
    }

    pub fn dirty_count(&self) -> usize {
        self.table.dirty_count()
    }

    /// Clears the dirty sequence without writing anything.
    pub fn clear_dirty(&mut self) {
        self.table.clear_all_dirty()
    }
}
