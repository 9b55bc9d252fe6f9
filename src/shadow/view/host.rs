use crate::shadow::{
    Method, ShadowError,
    catalog::MethodCatalog,
    helpers::{extract_field, insert_field},
    table::ShadowTable,
};

/// Interpreter-side view of the shadow registers.
///
/// Field writes perform read/modify/write on the shadow value and mark the
/// register dirty. Nothing here touches hardware.
pub struct HostView<'a, const RC: usize, const FC: usize>
where
    bitmaps::BitsImpl<RC>: bitmaps::Bits,
{
    table: &'a mut ShadowTable<RC>,
    catalog: &'a MethodCatalog<FC>,
}

impl<'a, const RC: usize, const FC: usize> core::fmt::Debug for HostView<'a, RC, FC>
where
    bitmaps::BitsImpl<RC>: bitmaps::Bits,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HostView").finish_non_exhaustive()
    }
}

impl<'a, const RC: usize, const FC: usize> HostView<'a, RC, FC>
where
    bitmaps::BitsImpl<RC>: bitmaps::Bits,
{
    pub(crate) fn new(table: &'a mut ShadowTable<RC>, catalog: &'a MethodCatalog<FC>) -> Self {
        Self { table, catalog }
    }

    fn field(&self, name: &str) -> Result<&'a Method, ShadowError> {
        let catalog: &'a MethodCatalog<FC> = self.catalog;
        catalog.get(name).inspect_err(|_| {
            log::warn!("shadow: unknown field {}", name);
        })
    }

    /// Current value of field `name`, shifted down to bit 0.
    ///
    /// Registers never written read as zero.
    pub fn read_field(&self, name: &str) -> Result<u32, ShadowError> {
        let span = self.field(name)?.span()?;
        Ok(extract_field(self.table.read(span.address), span.mask, span.shift))
    }

    /// Sets field `name` to `value` and marks its register dirty.
    ///
    /// Bits of `value` wider than the field are dropped.
    pub fn write_field(&mut self, name: &str, value: u32) -> Result<(), ShadowError> {
        let span = self.field(name)?.span()?;
        let register = self
            .table
            .modify(span.address, |current| {
                insert_field(current, span.mask, span.shift, value)
            })?;
        log::trace!(
            "shadow: {} = {:#x} -> method[{:#06x}] = {:#010x}",
            name,
            value,
            span.address,
            register
        );
        Ok(())
    }

    /// Sets field `name` to the value named `symbol` in its enumerant table.
    pub fn write_symbol(&mut self, name: &str, symbol: &str) -> Result<(), ShadowError> {
        let value = self.field(name)?.enumerant(symbol).inspect_err(|_| {
            log::warn!("shadow: {} is not a legal value for {}", symbol, name);
        })?;
        self.write_field(name, value)
    }

    /// Replaces the whole register at `address` and marks it dirty.
    pub fn write_method(&mut self, address: u32, value: u32) -> Result<(), ShadowError> {
        self.table.modify(address, |_| value)?;
        log::trace!("shadow: method[{:#06x}] = {:#010x}", address, value);
        Ok(())
    }

    pub fn read_method(&self, address: u32) -> u32 {
        self.table.read(address)
    }

    pub fn is_dirty(&self, address: u32) -> bool {
        self.table.is_dirty(address)
    }

    pub fn any_dirty(&self) -> bool {
        self.table.any_dirty()
    }

    pub fn catalog(&self) -> &MethodCatalog<FC> {
        self.catalog
    }
}
