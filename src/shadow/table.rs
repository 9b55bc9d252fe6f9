use heapless::Vec;

use crate::shadow::error::ShadowError;

/// Shadow values keyed by method address plus the ordered dirty sequence.
///
/// Each distinct address occupies one slot for the life of the table. The
/// dirty bitmap answers membership; `order` holds dirty slots in flush order.
pub(crate) struct ShadowTable<const RC: usize>
where
    bitmaps::BitsImpl<RC>: bitmaps::Bits,
{
    addresses: Vec<u32, RC>,
    values: [u32; RC],
    dirty: bitmaps::Bitmap<RC>,
    order: Vec<u16, RC>,
}

impl<const RC: usize> ShadowTable<RC>
where
    bitmaps::BitsImpl<RC>: bitmaps::Bits,
{
    pub(crate) fn new() -> Self {
        debug_assert!(RC <= u16::MAX as usize, "Register capacity must fit a u16 slot");

        Self {
            addresses: Vec::new(),
            values: [0; RC],
            dirty: bitmaps::Bitmap::new(),
            order: Vec::new(),
        }
    }

    fn slot(&self, address: u32) -> Option<usize> {
        self.addresses.iter().position(|a| *a == address)
    }

    fn slot_or_insert(&mut self, address: u32) -> Result<usize, ShadowError> {
        if let Some(slot) = self.slot(address) {
            return Ok(slot);
        }
        let slot = self.addresses.len();
        self.addresses
            .push(address)
            .map_err(|_| ShadowError::TableFull)?;
        Ok(slot)
    }

    /// Last value written to `address`; untouched addresses read as zero.
    pub(crate) fn read(&self, address: u32) -> u32 {
        self.slot(address).map_or(0, |slot| self.values[slot])
    }

    /// Stores `value` without touching dirty state.
    pub(crate) fn write(&mut self, address: u32, value: u32) -> Result<(), ShadowError> {
        let slot = self.slot_or_insert(address)?;
        self.values[slot] = value;
        Ok(())
    }

    /// Read/modify/write of the masked bits, then marks the address dirty.
    ///
    /// Returns the new register value.
    pub(crate) fn modify(
        &mut self,
        address: u32,
        f: impl FnOnce(u32) -> u32,
    ) -> Result<u32, ShadowError> {
        let slot = self.slot_or_insert(address)?;
        let value = f(self.values[slot]);
        self.values[slot] = value;
        self.mark_slot_dirty(slot)?;
        Ok(value)
    }

    /// Re-marking moves the address to the tail of the flush order.
    fn mark_slot_dirty(&mut self, slot: usize) -> Result<(), ShadowError> {
        if self.dirty.get(slot) {
            if let Some(pos) = self.order.iter().position(|s| *s as usize == slot) {
                self.order.remove(pos);
            }
        }
        self.order
            .push(slot as u16)
            .map_err(|_| ShadowError::TableFull)?;
        self.dirty.set(slot, true);
        Ok(())
    }

    pub(crate) fn is_dirty(&self, address: u32) -> bool {
        self.slot(address).is_some_and(|slot| self.dirty.get(slot))
    }

    pub(crate) fn any_dirty(&self) -> bool {
        !self.order.is_empty()
    }

    pub(crate) fn dirty_count(&self) -> usize {
        self.order.len()
    }

    pub(crate) fn iter_dirty<F>(&self, mut f: F) -> Result<(), ShadowError>
    where
        F: FnMut(u32, u32) -> Result<(), ShadowError>,
    {
        for slot in self.order.iter() {
            let slot = *slot as usize;
            f(self.addresses[slot], self.values[slot])?;
        }
        Ok(())
    }

    /// Hands each dirty register to `f` in order and marks it clean once `f`
    /// accepts it. Stops at the first error, leaving that register and every
    /// later one dirty.
    ///
    /// Returns the number of registers accepted, also when `f` failed.
    pub(crate) fn drain_dirty<F>(&mut self, mut f: F) -> (usize, Result<(), ShadowError>)
    where
        F: FnMut(u32, u32) -> Result<(), ShadowError>,
    {
        let mut done = 0;
        let mut failure = None;
        for slot in self.order.iter() {
            let slot = *slot as usize;
            if let Err(e) = f(self.addresses[slot], self.values[slot]) {
                failure = Some(e);
                break;
            }
            done += 1;
        }

        for slot in self.order[..done].iter() {
            self.dirty.set(*slot as usize, false);
        }
        let remaining = self.order.len() - done;
        self.order.rotate_left(done);
        self.order.truncate(remaining);

        match failure {
            Some(e) => (done, Err(e)),
            None => (done, Ok(())),
        }
    }

    pub(crate) fn mark_clean(&mut self, address: u32) {
        let Some(slot) = self.slot(address) else {
            return;
        };
        if self.dirty.get(slot) {
            self.dirty.set(slot, false);
            self.order.retain(|s| *s as usize != slot);
        }
    }

    pub(crate) fn clear_all_dirty(&mut self) {
        self.dirty = bitmaps::Bitmap::new();
        self.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestTable = ShadowTable<4>;

    fn dirty_addrs(table: &TestTable) -> heapless::Vec<u32, 4> {
        let mut out = heapless::Vec::new();
        table
            .iter_dirty(|addr, _| {
                out.push(addr).unwrap();
                Ok(())
            })
            .unwrap();
        out
    }

    #[test]
    fn new_table_reads_zero_and_is_clean() {
        let table = TestTable::new();
        assert_eq!(table.read(0x100), 0);
        assert!(!table.any_dirty());
        assert!(!table.is_dirty(0x100));
    }

    #[test]
    fn dirty_order_scenarios() {
        // Distinct addresses keep write order
        {
            let mut table = TestTable::new();
            table.modify(0xA, |_| 1).unwrap();
            table.modify(0xB, |_| 2).unwrap();
            assert_eq!(dirty_addrs(&table), [0xA, 0xB]);
        }

        // A, B, A moves A to the tail
        {
            let mut table = TestTable::new();
            table.modify(0xA, |_| 1).unwrap();
            table.modify(0xB, |_| 2).unwrap();
            table.modify(0xA, |v| v | 4).unwrap();
            assert_eq!(dirty_addrs(&table), [0xB, 0xA]);
            assert_eq!(table.dirty_count(), 2);
            assert_eq!(table.read(0xA), 5);
        }

        // Re-marking the tail is a no-op on order
        {
            let mut table = TestTable::new();
            table.modify(0xA, |_| 1).unwrap();
            table.modify(0xA, |_| 2).unwrap();
            assert_eq!(dirty_addrs(&table), [0xA]);
        }
    }

    #[test]
    fn write_does_not_mark_dirty() {
        let mut table = TestTable::new();
        table.write(0x10, 0xFFFF).unwrap();
        assert_eq!(table.read(0x10), 0xFFFF);
        assert!(!table.any_dirty());
    }

    #[test]
    fn capacity_exceeded_returns_table_full() {
        let mut table = TestTable::new();
        for addr in 0..4 {
            table.modify(addr, |_| addr).unwrap();
        }
        assert_eq!(table.modify(99, |_| 1), Err(ShadowError::TableFull));
        assert_eq!(table.write(99, 1), Err(ShadowError::TableFull));

        // Known addresses still work at capacity
        assert_eq!(table.modify(2, |v| v + 1), Ok(3));
    }

    #[test]
    fn drain_dirty_clears_order_and_keeps_values() {
        let mut table = TestTable::new();
        table.modify(0xA, |_| 1).unwrap();
        table.modify(0xB, |_| 2).unwrap();

        let mut seen: heapless::Vec<(u32, u32), 4> = heapless::Vec::new();
        let (count, result) = table.drain_dirty(|addr, value| {
            seen.push((addr, value)).unwrap();
            Ok(())
        });

        assert_eq!(result, Ok(()));
        assert_eq!(count, 2);
        assert_eq!(seen, [(0xA, 1), (0xB, 2)]);
        assert!(!table.any_dirty());
        assert!(!table.is_dirty(0xA));
        assert_eq!(table.read(0xB), 2);
    }

    #[test]
    fn drain_dirty_stops_on_first_error() {
        let mut table = TestTable::new();
        table.modify(0xA, |_| 1).unwrap();
        table.modify(0xB, |_| 2).unwrap();
        table.modify(0xC, |_| 3).unwrap();

        let (count, result) = table.drain_dirty(|addr, _| {
            if addr == 0xB {
                Err(ShadowError::ChannelWriteFailed { address: addr })
            } else {
                Ok(())
            }
        });

        assert_eq!(result, Err(ShadowError::ChannelWriteFailed { address: 0xB }));
        assert_eq!(count, 1);
        // A was written; B and C remain in order
        assert!(!table.is_dirty(0xA));
        assert_eq!(dirty_addrs(&table), [0xB, 0xC]);
    }

    #[test]
    fn mark_clean_removes_single_address() {
        let mut table = TestTable::new();
        table.modify(0xA, |_| 1).unwrap();
        table.modify(0xB, |_| 2).unwrap();

        table.mark_clean(0xA);
        table.mark_clean(0xFF); // unknown address is ignored

        assert_eq!(dirty_addrs(&table), [0xB]);

        table.clear_all_dirty();
        assert!(!table.any_dirty());
        assert_eq!(table.read(0xA), 1);
    }
}
