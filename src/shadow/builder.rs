use core::marker::PhantomData;

use crate::shadow::{
    Method, ShadowError,
    catalog::{Declared, MethodCatalog},
    policy::{DeclarePolicy, OverridePolicy, RejectPolicy},
    storage::MethodStorage,
};

// Builder states
pub struct NeedRegisterCapacity;
pub struct NeedFieldCapacity;
pub struct NeedDeclarePolicy;
pub struct Ready;

/// Typestate builder for [`MethodStorage`].
///
/// Capacities come first, then the re-declaration policy, then any number of
/// field declarations.
pub struct MethodStorageBuilder<const RC: usize, const FC: usize, DP, State> {
    catalog: MethodCatalog<FC>,
    policy: DP,
    _phantom: PhantomData<State>,
}

// Start the builder
impl MethodStorageBuilder<0, 0, (), NeedRegisterCapacity> {
    pub fn new() -> Self {
        MethodStorageBuilder {
            catalog: MethodCatalog::new(),
            policy: (),
            _phantom: PhantomData,
        }
    }
}

impl Default for MethodStorageBuilder<0, 0, (), NeedRegisterCapacity> {
    fn default() -> Self {
        Self::new()
    }
}

// Set register capacity
impl MethodStorageBuilder<0, 0, (), NeedRegisterCapacity> {
    /// Number of distinct method addresses the shadow table can hold.
    ///
    /// # Panics
    /// Panics if `RC` is zero.
    pub fn register_capacity<const RC: usize>(
        self,
    ) -> MethodStorageBuilder<RC, 0, (), NeedFieldCapacity> {
        assert!(RC > 0, "Register capacity must be non-zero");

        MethodStorageBuilder {
            catalog: MethodCatalog::new(),
            policy: (),
            _phantom: PhantomData,
        }
    }
}

// Set field capacity
impl<const RC: usize> MethodStorageBuilder<RC, 0, (), NeedFieldCapacity> {
    /// Number of distinct field names the catalog can hold.
    pub fn field_capacity<const FC: usize>(
        self,
    ) -> MethodStorageBuilder<RC, FC, (), NeedDeclarePolicy> {
        MethodStorageBuilder {
            catalog: MethodCatalog::new(),
            policy: (),
            _phantom: PhantomData,
        }
    }
}

// Set declare policy
impl<const RC: usize, const FC: usize> MethodStorageBuilder<RC, FC, (), NeedDeclarePolicy> {
    pub fn declare_policy<DP: DeclarePolicy>(
        self,
        policy: DP,
    ) -> MethodStorageBuilder<RC, FC, DP, Ready> {
        MethodStorageBuilder {
            catalog: self.catalog,
            policy,
            _phantom: PhantomData,
        }
    }

    /// Later declarations replace earlier ones with the same name.
    pub fn override_redeclare(self) -> MethodStorageBuilder<RC, FC, OverridePolicy, Ready> {
        self.declare_policy(OverridePolicy::default())
    }

    /// Declaring a name twice fails with [`ShadowError::Redeclared`].
    pub fn reject_redeclare(self) -> MethodStorageBuilder<RC, FC, RejectPolicy, Ready> {
        self.declare_policy(RejectPolicy::default())
    }
}

// Declare fields and build
impl<const RC: usize, const FC: usize, DP: DeclarePolicy>
    MethodStorageBuilder<RC, FC, DP, Ready>
{
    pub fn field(mut self, name: &'static str, method: Method) -> Result<Self, ShadowError> {
        self.catalog.declare(name, method, &self.policy)?;
        Ok(self)
    }

    /// Like [`Self::field`] but reports whether an earlier declaration was replaced.
    pub fn declare(&mut self, name: &'static str, method: Method) -> Result<Declared, ShadowError> {
        self.catalog.declare(name, method, &self.policy)
    }

    /// Declares every `(name, method)` pair of a static table in order.
    pub fn fields(mut self, table: &[(&'static str, Method)]) -> Result<Self, ShadowError> {
        for (name, method) in table {
            self.catalog.declare(*name, *method, &self.policy)?;
        }
        Ok(self)
    }

    pub fn build(self) -> MethodStorage<RC, FC>
    where
        bitmaps::BitsImpl<RC>: bitmaps::Bits,
    {
        MethodStorage::new(self.catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &[(&str, Method)] = &[
        ("Width", Method::new(0x200)),
        ("Height", Method::new(0x204)),
    ];

    #[test]
    fn builds_storage_with_declared_fields() {
        let storage = MethodStorageBuilder::new()
            .register_capacity::<8>()
            .field_capacity::<4>()
            .override_redeclare()
            .fields(BASE)
            .unwrap()
            .field("Enable", Method::new(0x208).bits(0, 0))
            .unwrap()
            .build();

        assert_eq!(storage.catalog().len(), 3);
        assert_eq!(storage.catalog().get("Enable").unwrap().address(), 0x208);
    }

    #[test]
    fn chip_variant_override_replaces_base_entry() {
        let mut builder = MethodStorageBuilder::new()
            .register_capacity::<8>()
            .field_capacity::<4>()
            .override_redeclare()
            .fields(BASE)
            .unwrap();

        let declared = builder.declare("Height", Method::new(0x20C)).unwrap();
        assert_eq!(declared, Declared::Replaced(Method::new(0x204)));

        let storage = builder.build();
        assert_eq!(storage.catalog().get("Height").unwrap().address(), 0x20C);
    }

    #[test]
    fn reject_policy_surfaces_duplicates() {
        let result = MethodStorageBuilder::new()
            .register_capacity::<8>()
            .field_capacity::<4>()
            .reject_redeclare()
            .fields(BASE)
            .unwrap()
            .field("Width", Method::new(0x210));

        assert_eq!(result.err(), Some(ShadowError::Redeclared));
    }

    #[test]
    #[should_panic(expected = "Register capacity must be non-zero")]
    fn zero_register_capacity_panics() {
        let _ = MethodStorageBuilder::new().register_capacity::<0>();
    }
}
