use crate::shadow::helpers::{check_range, field_mask};
use crate::shadow::ShadowError;

/// A symbolic name for one legal value of an enumerated field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enumerant {
    pub name: &'static str,
    pub value: u32,
}

impl Enumerant {
    pub const fn new(name: &'static str, value: u32) -> Self {
        Self { name, value }
    }
}

/// One hardware method register, or a `[high:low]` field inside it.
///
/// Methods are plain values; build them with the `const` constructors so
/// whole field tables can live in `static` data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Method {
    address: u32,
    high: u8,
    low: u8,
    enumerants: Option<&'static [Enumerant]>,
}

impl Method {
    /// Full-register method at `address` (`[31:0]`, numeric).
    pub const fn new(address: u32) -> Self {
        Self {
            address,
            high: 31,
            low: 0,
            enumerants: None,
        }
    }

    /// Restricts the method to bits `[high:low]`.
    ///
    /// The range is validated when the method is declared.
    pub const fn bits(mut self, high: u8, low: u8) -> Self {
        self.high = high;
        self.low = low;
        self
    }

    /// Attaches a symbolic value table.
    pub const fn enumerants(mut self, table: &'static [Enumerant]) -> Self {
        self.enumerants = Some(table);
        self
    }

    pub fn address(&self) -> u32 {
        self.address
    }

    pub fn high(&self) -> u8 {
        self.high
    }

    pub fn low(&self) -> u8 {
        self.low
    }

    pub fn enumerant_table(&self) -> Option<&'static [Enumerant]> {
        self.enumerants
    }

    pub(crate) fn validate(&self) -> Result<(), ShadowError> {
        check_range(self.high, self.low)
    }

    /// Address, in-place mask and shift for read/modify/write.
    ///
    /// Fails with [`ShadowError::InvalidBitRange`] for an undeclarable range.
    pub fn span(&self) -> Result<FieldSpan, ShadowError> {
        self.validate()?;
        Ok(FieldSpan {
            address: self.address,
            mask: field_mask(self.high, self.low),
            shift: self.low,
        })
    }

    /// Looks up `symbol` (case-sensitive) in the enumerant table.
    ///
    /// A method without a table has no legal symbols.
    pub fn enumerant(&self, symbol: &str) -> Result<u32, ShadowError> {
        let legal = self.enumerants.unwrap_or(&[]);
        legal
            .iter()
            .find(|e| e.name == symbol)
            .map(|e| e.value)
            .ok_or(ShadowError::UnknownEnumerant { legal })
    }
}

/// Resolved read/modify/write recipe for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpan {
    pub address: u32,
    pub mask: u32,
    pub shift: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORMATS: &[Enumerant] = &[
        Enumerant::new("Y8", 0xF3),
        Enumerant::new("A8R8G8B8", 0xCF),
    ];

    #[test]
    fn default_method_spans_whole_register() {
        let span = Method::new(0x300).span().unwrap();
        assert_eq!(
            span,
            FieldSpan {
                address: 0x300,
                mask: u32::MAX,
                shift: 0
            }
        );
    }

    #[test]
    fn sub_field_span() {
        let span = Method::new(0x100).bits(7, 4).span().unwrap();
        assert_eq!(span.mask, 0xF0);
        assert_eq!(span.shift, 4);
    }

    #[test]
    fn inverted_range_has_no_span() {
        assert_eq!(
            Method::new(0).bits(2, 5).span(),
            Err(ShadowError::InvalidBitRange { high: 2, low: 5 })
        );
        assert_eq!(
            Method::new(0).bits(32, 0).span(),
            Err(ShadowError::InvalidBitRange { high: 32, low: 0 })
        );
    }

    #[test]
    fn enumerant_lookup_is_case_sensitive() {
        let m = Method::new(0x204).enumerants(FORMATS);
        assert_eq!(m.enumerant("Y8"), Ok(0xF3));
        assert_eq!(
            m.enumerant("y8"),
            Err(ShadowError::UnknownEnumerant { legal: FORMATS })
        );
    }

    #[test]
    fn numeric_method_has_no_symbols() {
        let m = Method::new(0x204);
        assert_eq!(
            m.enumerant("Y8"),
            Err(ShadowError::UnknownEnumerant { legal: &[] })
        );
    }

    #[test]
    fn validate_rejects_inverted_range() {
        assert!(Method::new(0).bits(2, 5).validate().is_err());
        assert!(Method::new(0).bits(5, 2).validate().is_ok());
    }
}
