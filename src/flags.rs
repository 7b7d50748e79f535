//! Named bit-flag sets and their decomposition into audit-log text.
//!
//! A flag set is a closed list of named bit values declared in a fixed order.
//! Composite values are carried as [`Flags<T>`], which may hold bits that no
//! declared flag covers; [`decompose`] reports those as a trailing
//! [`Flag::Unrecognized`] entry instead of dropping them.

use std::fmt;
use std::marker::PhantomData;
use std::ops::BitOr;

use crate::error::FlagError;

/// A declared set of named bit values.
pub trait FlagEnum: Copy + 'static {
    /// Whether values of this type may be OR-ed together.
    const COMBINABLE: bool;

    /// Human-readable type name used in error messages.
    const TYPE_NAME: &'static str;

    /// Every declared flag, in declaration order.
    fn declared() -> &'static [Self];

    /// Numeric bit value of this flag.
    fn bits(self) -> u64;

    /// Declared name of this flag.
    fn name(self) -> &'static str;
}

/// Composite value of a flag set.
pub struct Flags<T> {
    bits: u64,
    _set: PhantomData<T>,
}

impl<T: FlagEnum> Flags<T> {
    /// Wrap a raw composite value. Bits outside the declared set are kept.
    pub fn from_bits(bits: u64) -> Self {
        Self {
            bits,
            _set: PhantomData,
        }
    }

    pub fn bits(&self) -> u64 {
        self.bits
    }
}

// Written by hand so no bounds are placed on `T`.
impl<T> Clone for Flags<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Flags<T> {}

impl<T> PartialEq for Flags<T> {
    fn eq(&self, other: &Self) -> bool {
        self.bits == other.bits
    }
}

impl<T> Eq for Flags<T> {}

impl<T: FlagEnum> fmt::Debug for Flags<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:#x})", T::TYPE_NAME, self.bits)
    }
}

impl<T: FlagEnum> From<T> for Flags<T> {
    fn from(flag: T) -> Self {
        Self::from_bits(flag.bits())
    }
}

impl<T: FlagEnum> BitOr for Flags<T> {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self::from_bits(self.bits | rhs.bits)
    }
}

impl<T: FlagEnum> BitOr<T> for Flags<T> {
    type Output = Self;

    fn bitor(self, rhs: T) -> Self {
        Self::from_bits(self.bits | rhs.bits())
    }
}

/// One entry of a decomposed composite value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag<T> {
    /// A declared flag.
    Named(T),
    /// Leftover bits not covered by any declared flag.
    Unrecognized(u64),
}

impl<T: FlagEnum> fmt::Display for Flag<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(flag) => f.write_str(flag.name()),
            Self::Unrecognized(bits) => write!(f, "{bits}"),
        }
    }
}

/// Split a composite value into the declared flags it contains.
///
/// Flags are visited in declaration order against a running residual:
/// a flag equal to the residual ends the scan, a flag overlapping it is
/// appended and XOR-ed out. Bits left at the end become one
/// [`Flag::Unrecognized`] entry.
pub fn decompose<T: FlagEnum>(value: Flags<T>) -> Result<Vec<Flag<T>>, FlagError> {
    if !T::COMBINABLE {
        return Err(FlagError::NotCombinable(T::TYPE_NAME));
    }

    let mut residual = value.bits();
    let mut out = Vec::new();
    for &flag in T::declared() {
        let bits = flag.bits();
        if residual == bits {
            out.push(Flag::Named(flag));
            return Ok(out);
        }
        if residual & bits != 0 {
            residual ^= bits;
            out.push(Flag::Named(flag));
        }
    }
    if residual != 0 {
        out.push(Flag::Unrecognized(residual));
    }
    Ok(out)
}

/// Join decomposed flags with `|` for a log line.
pub fn join_flags<T: FlagEnum>(flags: &[Flag<T>]) -> String {
    flags
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("|")
}

/// Decompose and join in one step.
pub fn describe<T: FlagEnum>(value: Flags<T>) -> Result<String, FlagError> {
    decompose(value).map(|flags| join_flags(&flags))
}

// ---------------------------------------------------------------------------
// Session-termination flag sets
// ---------------------------------------------------------------------------

/// What the termination request asks the system to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitFlags {
    /// End the interactive session. Cannot be combined with other flags.
    Logoff,
    Shutdown,
    Reboot,
    /// Skip asking applications whether they agree to close.
    Force,
    /// Cut power after shutdown.
    Poweroff,
    /// Terminate applications that stop responding during the request.
    ForceIfHung,
    RestartApps,
    HybridShutdown,
}

impl FlagEnum for ExitFlags {
    const COMBINABLE: bool = true;
    const TYPE_NAME: &'static str = "ExitFlags";

    fn declared() -> &'static [Self] {
        &[
            Self::Logoff,
            Self::Shutdown,
            Self::Reboot,
            Self::Force,
            Self::Poweroff,
            Self::ForceIfHung,
            Self::RestartApps,
            Self::HybridShutdown,
        ]
    }

    fn bits(self) -> u64 {
        match self {
            Self::Logoff => 0x0,
            Self::Shutdown => 0x1,
            Self::Reboot => 0x2,
            Self::Force => 0x4,
            Self::Poweroff => 0x8,
            Self::ForceIfHung => 0x10,
            Self::RestartApps => 0x40,
            Self::HybridShutdown => 0x40_0000,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Logoff => "LOGOFF",
            Self::Shutdown => "SHUTDOWN",
            Self::Reboot => "REBOOT",
            Self::Force => "FORCE",
            Self::Poweroff => "POWEROFF",
            Self::ForceIfHung => "FORCEIFHUNG",
            Self::RestartApps => "RESTART_APPS",
            Self::HybridShutdown => "HYBRID_SHUTDOWN",
        }
    }
}

/// Reason recorded with the termination request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasonCodes {
    /// The only reason accepted for a plain logoff.
    NoReason,
}

impl FlagEnum for ReasonCodes {
    const COMBINABLE: bool = true;
    const TYPE_NAME: &'static str = "ReasonCodes";

    fn declared() -> &'static [Self] {
        &[Self::NoReason]
    }

    fn bits(self) -> u64 {
        match self {
            Self::NoReason => 0,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::NoReason => "NO_REASON",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Mode {
        Read,
        Write,
    }

    impl FlagEnum for Mode {
        const COMBINABLE: bool = false;
        const TYPE_NAME: &'static str = "Mode";

        fn declared() -> &'static [Self] {
            &[Self::Read, Self::Write]
        }

        fn bits(self) -> u64 {
            match self {
                Self::Read => 1,
                Self::Write => 2,
            }
        }

        fn name(self) -> &'static str {
            match self {
                Self::Read => "Read",
                Self::Write => "Write",
            }
        }
    }

    #[test]
    fn single_flag_yields_only_that_flag() {
        let flags = decompose(Flags::from(ExitFlags::Reboot)).expect("combinable");
        assert_eq!(flags, vec![Flag::Named(ExitFlags::Reboot)]);
    }

    #[test]
    fn zero_value_matches_zero_flag() {
        // LOGOFF is declared as 0, so a zero composite stops on the first entry.
        let flags = decompose(Flags::from(ExitFlags::Logoff)).expect("combinable");
        assert_eq!(flags, vec![Flag::Named(ExitFlags::Logoff)]);
        assert_eq!(describe(Flags::from(ReasonCodes::NoReason)).unwrap(), "NO_REASON");
    }

    #[test]
    fn combined_flags_come_back_in_declaration_order() {
        // OR order does not matter; output follows declaration order.
        let value = Flags::from(ExitFlags::Poweroff) | ExitFlags::Shutdown;
        let flags = decompose(value).expect("combinable");
        assert_eq!(
            flags,
            vec![
                Flag::Named(ExitFlags::Shutdown),
                Flag::Named(ExitFlags::Poweroff)
            ]
        );
        assert_eq!(join_flags(&flags), "SHUTDOWN|POWEROFF");
    }

    #[test]
    fn leftover_bits_become_trailing_numeric_entry() {
        let value = Flags::<ExitFlags>::from_bits(0x1 | 0x4 | 0x20 | 0x100);
        let flags = decompose(value).expect("combinable");
        assert_eq!(
            flags,
            vec![
                Flag::Named(ExitFlags::Shutdown),
                Flag::Named(ExitFlags::Force),
                Flag::Unrecognized(0x120),
            ]
        );
        assert_eq!(join_flags(&flags), "SHUTDOWN|FORCE|288");
    }

    #[test]
    fn only_unknown_bits_yield_single_numeric_entry() {
        let flags = decompose(Flags::<ReasonCodes>::from_bits(7)).expect("combinable");
        assert_eq!(flags, vec![Flag::Unrecognized(7)]);
    }

    #[test]
    fn non_combinable_type_is_rejected() {
        let err = decompose(Flags::from(Mode::Write)).unwrap_err();
        assert_eq!(err, FlagError::NotCombinable("Mode"));
        // Names are still available for non-combinable sets.
        assert_eq!(Mode::declared()[0].name(), "Read");
    }

    #[test]
    fn debug_shows_type_and_hex_bits() {
        let value = Flags::from(ExitFlags::Force) | ExitFlags::Reboot;
        assert_eq!(format!("{value:?}"), "ExitFlags(0x6)");
    }

    #[cfg(feature = "fuzz-tests")]
    mod prop_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn decomposition_accounts_for_every_bit(bits in any::<u32>()) {
                let value = Flags::<ExitFlags>::from_bits(u64::from(bits));
                let flags = decompose(value).expect("combinable");
                let mut rebuilt = 0u64;
                for flag in &flags {
                    rebuilt |= match flag {
                        Flag::Named(f) => f.bits(),
                        Flag::Unrecognized(rest) => *rest,
                    };
                }
                prop_assert_eq!(rebuilt, u64::from(bits));
            }

            #[test]
            fn unrecognized_entry_is_always_last(bits in any::<u32>()) {
                let flags = decompose(Flags::<ExitFlags>::from_bits(u64::from(bits)))
                    .expect("combinable");
                if let Some(pos) = flags.iter().position(|f| matches!(f, Flag::Unrecognized(_))) {
                    prop_assert_eq!(pos, flags.len() - 1);
                }
            }
        }
    }
}
