#![allow(unsafe_code)]

use crate::shadow::{storage::MethodStorage, view::KernelView};

/// Flush-side handle: drains dirty registers to a channel.
pub struct KernelShadow<'a, const RC: usize, const FC: usize>
where
    bitmaps::BitsImpl<RC>: bitmaps::Bits,
{
    storage: &'a MethodStorage<RC, FC>,
}

impl<'a, const RC: usize, const FC: usize> core::fmt::Debug for KernelShadow<'a, RC, FC>
where
    bitmaps::BitsImpl<RC>: bitmaps::Bits,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("KernelShadow").finish_non_exhaustive()
    }
}

impl<'a, const RC: usize, const FC: usize> KernelShadow<'a, RC, FC>
where
    bitmaps::BitsImpl<RC>: bitmaps::Bits,
{
    pub(crate) fn new(storage: &'a MethodStorage<RC, FC>) -> Self {
        Self { storage }
    }

    /// Runs `f` on a kernel view inside a critical section.
    ///
    /// # Panics
    /// Panics if a view of the same storage is already open.
    pub fn with_view<R>(&self, f: impl FnOnce(&mut KernelView<RC>) -> R) -> R {
        critical_section::with(|_| {
            self.storage.enter(|table| {
                let mut view = KernelView::new(table);
                f(&mut view)
            })
        })
    }

    /// # Safety
    /// Requires exclusive access to the MethodStorage. No other view of the
    /// same storage may be alive while `f` runs.
    pub unsafe fn with_view_unchecked<R>(&self, f: impl FnOnce(&mut KernelView<RC>) -> R) -> R {
        let table = unsafe { &mut *self.storage.table.get() };
        let mut view = KernelView::new(table);
        f(&mut view)
    }
}
