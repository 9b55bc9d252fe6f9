use crate::shadow::method::Enumerant;

/// Errors that can occur while declaring, writing, flushing or waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ShadowError {
    /// A field name was referenced that was never declared.
    #[error("unknown field")]
    UnknownField,
    /// A symbolic value is not legal for the referenced field.
    #[error("unknown enumerant, legal values: {}", LegalSymbols(.legal))]
    UnknownEnumerant { legal: &'static [Enumerant] },
    /// The channel rejected a register write during flush.
    #[error("channel write to method {address:#06x} failed")]
    ChannelWriteFailed { address: u32 },
    /// The configured barrier did not observe completion within its bound.
    #[error("timed out waiting for idle")]
    IdleTimeout,
    /// The channel's own idle wait returned a failure code.
    #[error("host idle wait failed with code {code:#x}")]
    HostWait { code: u32 },
    /// Blocking on the wait event failed for a reason other than a timeout.
    #[error("event wait failed with code {code:#x}")]
    EventWait { code: u32 },
    /// The notifier block could not be allocated.
    #[error("notifier allocation failed with code {code:#x}")]
    NotifierAlloc { code: u32 },
    /// The wait event could not be created.
    #[error("event creation failed with code {code:#x}")]
    EventCreate { code: u32 },
    /// Bit range violates `low <= high <= 31`.
    #[error("invalid bit range [{high}:{low}]")]
    InvalidBitRange { high: u8, low: u8 },
    /// Field re-declaration rejected by the declare policy.
    #[error("field already declared")]
    Redeclared,
    /// Register capacity exceeded.
    #[error("shadow table capacity exceeded")]
    TableFull,
    /// Field capacity exceeded.
    #[error("method catalog capacity exceeded")]
    CatalogFull,
    /// The engine latched an earlier failure and refuses to touch hardware.
    #[error("engine faulted by an earlier failure")]
    Faulted,
}

impl ShadowError {
    /// Returns true for failures that leave the channel unusable.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ShadowError::ChannelWriteFailed { .. })
    }
}

struct LegalSymbols<'a>(&'a [Enumerant]);

impl core::fmt::Display for LegalSymbols<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(e.name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;

    const MODES: &[Enumerant] = &[Enumerant::new("A", 1), Enumerant::new("B", 2)];

    #[test]
    fn unknown_enumerant_lists_legal_symbols() {
        let mut out = heapless::String::<64>::new();
        write!(out, "{}", ShadowError::UnknownEnumerant { legal: MODES }).unwrap();
        assert_eq!(out.as_str(), "unknown enumerant, legal values: A, B");
    }

    #[test]
    fn only_channel_failures_are_fatal() {
        assert!(ShadowError::ChannelWriteFailed { address: 4 }.is_fatal());
        assert!(!ShadowError::IdleTimeout.is_fatal());
        assert!(!ShadowError::UnknownField.is_fatal());
    }
}
