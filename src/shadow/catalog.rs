use heapless::Vec;

use crate::shadow::{DeclarePolicy, FieldSpan, Method, ShadowError};

/// Outcome of a successful declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declared {
    /// The name was not known before.
    New,
    /// The name existed; the previous method is returned.
    Replaced(Method),
}

/// Fixed-capacity map from field name to [`Method`].
///
/// `FC` is the maximum number of distinct field names.
#[derive(Debug)]
pub struct MethodCatalog<const FC: usize> {
    entries: Vec<(&'static str, Method), FC>,
}

impl<const FC: usize> MethodCatalog<FC> {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Registers `method` under `name`, consulting `policy` on re-declaration.
    pub fn declare<DP: DeclarePolicy>(
        &mut self,
        name: &'static str,
        method: Method,
        policy: &DP,
    ) -> Result<Declared, ShadowError> {
        method.validate()?;

        if let Some(slot) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            let previous = slot.1;
            if !policy.allow_redeclare(name, &previous, &method) {
                log::warn!("method catalog: rejected re-declaration of {}", name);
                return Err(ShadowError::Redeclared);
            }
            log::warn!(
                "method catalog: {} re-declared ({:#06x} -> {:#06x})",
                name,
                previous.address(),
                method.address()
            );
            slot.1 = method;
            return Ok(Declared::Replaced(previous));
        }

        self.entries
            .push((name, method))
            .map_err(|_| ShadowError::CatalogFull)?;
        Ok(Declared::New)
    }

    pub fn get(&self, name: &str) -> Result<&Method, ShadowError> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, m)| m)
            .ok_or(ShadowError::UnknownField)
    }

    /// Address, mask and shift for `name`.
    pub fn resolve_numeric(&self, name: &str) -> Result<FieldSpan, ShadowError> {
        self.get(name).and_then(Method::span)
    }

    /// Value of `symbol` in the enumerant table of `name`.
    pub fn resolve_enumerant(&self, name: &str, symbol: &str) -> Result<u32, ShadowError> {
        self.get(name)?.enumerant(symbol)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Method)> {
        self.entries.iter().map(|(n, m)| (*n, m))
    }
}

impl<const FC: usize> Default for MethodCatalog<FC> {
    fn default() -> Self {
        Self::new()
    }
}
