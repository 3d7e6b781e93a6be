//! Reputation types shared by the resolver pool and its consumers.

use std::fmt;
use std::net::Ipv4Addr;
use std::ops::BitOr;
use std::str::FromStr;

use crate::error::{CodecError, LookupError};

/// http:BL visitor type, the fourth octet of a listed response.
///
/// Each bit is independent; every combination of the three, including none,
/// is valid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ClassFlags(u8);

impl ClassFlags {
    /// No classification bits set.
    pub const NONE: Self = Self(0);
    /// Suspicious behaviour seen, nothing confirmed.
    pub const SUSPICIOUS: Self = Self(1);
    /// Email address harvester.
    pub const HARVESTER: Self = Self(2);
    /// Comment spammer.
    pub const COMMENT_SPAMMER: Self = Self(4);

    /// Label slots in rendering order.
    const SLOTS: [(Self, &'static str); 3] = [
        (Self::SUSPICIOUS, "suspicious"),
        (Self::HARVESTER, "harvester"),
        (Self::COMMENT_SPAMMER, "comment spammer"),
    ];

    /// All three bits set.
    #[must_use]
    pub const fn all() -> Self {
        Self(0b111)
    }

    /// Build from a raw octet, discarding bits outside the known three.
    #[must_use]
    pub const fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & Self::all().0)
    }

    /// The raw bit value (0-7).
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// True if every bit of `other` is set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for ClassFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Renders the three label slots joined by commas.
///
/// Unset flags leave their slot empty, so the output always holds exactly
/// two commas: `suspicious,,comment spammer`, `,,`.
impl fmt::Display for ClassFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (flag, label)) in Self::SLOTS.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            if self.contains(*flag) {
                f.write_str(label)?;
            }
        }
        Ok(())
    }
}

impl FromStr for ClassFlags {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let slots: Vec<&str> = s.split(',').collect();
        if slots.len() != Self::SLOTS.len() {
            return Err(CodecError::SlotCount(slots.len()));
        }

        let mut flags = Self::NONE;
        for (slot, (text, (flag, label))) in slots.iter().zip(Self::SLOTS).enumerate() {
            match *text {
                "" => {}
                t if t == label => flags = flags | flag,
                t => {
                    return Err(CodecError::UnknownLabel {
                        slot,
                        label: t.to_string(),
                    })
                }
            }
        }
        Ok(flags)
    }
}

/// Decoded http:BL listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reputation {
    /// Days since the address was last seen doing something bad
    pub age_days: u8,
    /// Threat score, 0 (none) to 255 (extreme)
    pub score: u8,
    /// Visitor classification
    pub class: ClassFlags,
}

/// Outcome of looking up one address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The address is listed
    Listed(Reputation),
    /// The query succeeded with no records
    NotListed,
    /// The lookup failed; see [`LookupError`]
    Failed(LookupError),
}

impl Verdict {
    /// Returns true if the address is listed
    #[must_use]
    pub const fn is_listed(&self) -> bool {
        matches!(self, Self::Listed(_))
    }

    /// The listing, if there is one
    #[must_use]
    pub const fn reputation(&self) -> Option<&Reputation> {
        match self {
            Self::Listed(rep) => Some(rep),
            _ => None,
        }
    }

    /// The failure reason, if the lookup failed
    #[must_use]
    pub const fn error(&self) -> Option<&LookupError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// One classified address, produced exactly once per submitted address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupResult {
    /// Position of the address in the submitted list
    pub index: usize,
    /// The address that was looked up
    pub address: Ipv4Addr,
    /// What the lookup found
    pub verdict: Verdict,
}

impl LookupResult {
    #[must_use]
    pub const fn new(index: usize, address: Ipv4Addr, verdict: Verdict) -> Self {
        Self {
            index,
            address,
            verdict,
        }
    }
}

/// Renders the output record: `address,age,score,class-triplet`, or the
/// address followed by three empty fields when not listed or failed.
impl fmt::Display for LookupResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.verdict {
            Verdict::Listed(rep) => write!(
                f,
                "{},{},{},{}",
                self.address, rep.age_days, rep.score, rep.class
            ),
            Verdict::NotListed | Verdict::Failed(_) => write!(f, "{},,,", self.address),
        }
    }
}
