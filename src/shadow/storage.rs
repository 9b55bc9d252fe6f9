#![allow(unsafe_code)]

use core::cell::{Cell, UnsafeCell};

use crate::shadow::{
    ShadowError,
    catalog::MethodCatalog,
    handle::{HostShadow, KernelShadow},
    table::ShadowTable,
};

/// Method catalog plus shadow register table.
///
/// # Const Generics
/// - `RC`: Register capacity, distinct method addresses the table can hold
/// - `FC`: Field capacity, distinct names the catalog can hold
///
/// The catalog is fixed once the storage is built. The table is reached
/// through [`HostShadow`] (field writes, marks dirty) and [`KernelShadow`]
/// (flush, dirty queries). At most one safe view of a storage is open at a
/// time; opening a second one from inside the first panics.
pub struct MethodStorage<const RC: usize, const FC: usize>
where
    bitmaps::BitsImpl<RC>: bitmaps::Bits,
{
    pub(crate) table: UnsafeCell<ShadowTable<RC>>,
    pub(crate) catalog: MethodCatalog<FC>,
    busy: Cell<bool>,
}

/// Clears the busy flag when a view closes, including on unwind.
struct Release<'a>(&'a Cell<bool>);

impl Drop for Release<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl<const RC: usize, const FC: usize> MethodStorage<RC, FC>
where
    bitmaps::BitsImpl<RC>: bitmaps::Bits,
{
    pub fn new(catalog: MethodCatalog<FC>) -> Self {
        Self {
            table: UnsafeCell::new(ShadowTable::new()),
            catalog,
            busy: Cell::new(false),
        }
    }

    /// Runs `f` on the table.
    ///
    /// # Panics
    /// Panics if another view of this storage is already open.
    pub(crate) fn enter<R>(&self, f: impl FnOnce(&mut ShadowTable<RC>) -> R) -> R {
        assert!(
            !self.busy.replace(true),
            "MethodStorage: nested view of the same storage"
        );
        let _release = Release(&self.busy);
        // Only one safe view holds the table at a time
        let table = unsafe { &mut *self.table.get() };
        f(table)
    }

    pub fn catalog(&self) -> &MethodCatalog<FC> {
        &self.catalog
    }

    pub fn host_shadow(&self) -> HostShadow<'_, RC, FC> {
        HostShadow::new(self)
    }

    pub fn kernel_shadow(&self) -> KernelShadow<'_, RC, FC> {
        KernelShadow::new(self)
    }
}

/// Write function type for [`MethodStorage::load_defaults`].
pub type WriteFn<'a> = dyn FnMut(u32, u32) -> Result<(), ShadowError> + 'a;

impl<const RC: usize, const FC: usize> MethodStorage<RC, FC>
where
    bitmaps::BitsImpl<RC>: bitmaps::Bits,
{
    /// Load register values into the shadow without marking dirty.
    ///
    /// Use this to seed the shadow with reset values so the first field
    /// write to a register keeps the bits it does not touch.
    ///
    /// # Safety
    ///
    /// Caller must ensure exclusive access to the storage.
    pub unsafe fn load_defaults_unchecked(
        &self,
        f: impl FnOnce(&mut WriteFn<'_>) -> Result<(), ShadowError>,
    ) -> Result<(), ShadowError> {
        let table = unsafe { &mut *self.table.get() };
        let mut write = |address: u32, value: u32| table.write(address, value);
        f(&mut write)
    }

    /// Load register values into the shadow without marking dirty.
    ///
    /// Runs inside a critical section.
    ///
    /// # Panics
    /// Panics if called while a view of this storage is open.
    pub fn load_defaults(
        &self,
        f: impl FnOnce(&mut WriteFn<'_>) -> Result<(), ShadowError>,
    ) -> Result<(), ShadowError> {
        critical_section::with(|_| {
            self.enter(|table| {
                let mut write = |address: u32, value: u32| table.write(address, value);
                f(&mut write)
            })
        })
    }
}
