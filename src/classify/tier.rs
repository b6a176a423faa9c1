//! Contributor tier classification.
//!
//! A contributor's tier is recomputed from the platform's historical record
//! on every event; nothing is cached locally, and the tier is not required
//! to be monotonic over time (a platform-side change can move an account
//! back down on a later query).

use std::fmt;

/// The classification bucket derived from a contributor's historical patch
/// count.
///
/// The four buckets are mutually exclusive and cover every non-negative
/// count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// No patches on record. The count query found nothing, which means the
    /// event and the query disagree about this account; take no action.
    None,

    /// Exactly one patch on record: the patch that triggered this event.
    FirstTime,

    /// Between two and five patches on record.
    New,

    /// More than five patches on record.
    Rising,
}

impl Tier {
    /// Classifies a contributor by historical patch count.
    pub fn from_patch_count(count: u64) -> Self {
        match count {
            0 => Tier::None,
            1 => Tier::FirstTime,
            2..=5 => Tier::New,
            _ => Tier::Rising,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Tier::None => "none",
            Tier::FirstTime => "first-time",
            Tier::New => "new",
            Tier::Rising => "rising",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn boundary_counts() {
        assert_eq!(Tier::from_patch_count(0), Tier::None);
        assert_eq!(Tier::from_patch_count(1), Tier::FirstTime);
        assert_eq!(Tier::from_patch_count(2), Tier::New);
        assert_eq!(Tier::from_patch_count(5), Tier::New);
        assert_eq!(Tier::from_patch_count(6), Tier::Rising);
    }

    proptest! {
        #[test]
        fn every_count_maps_to_exactly_one_tier(count: u64) {
            let tier = Tier::from_patch_count(count);
            let expected = if count == 0 {
                Tier::None
            } else if count == 1 {
                Tier::FirstTime
            } else if count <= 5 {
                Tier::New
            } else {
                Tier::Rising
            };
            prop_assert_eq!(tier, expected);
        }

        #[test]
        fn rising_is_stable_above_threshold(count in 6u64..) {
            prop_assert_eq!(Tier::from_patch_count(count), Tier::Rising);
        }
    }
}
