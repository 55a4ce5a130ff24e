//! Savant ability domains.
//!
//! The six domains reported in the literature, with their share of the
//! savant population and the Field channel each is taken to represent.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A savant ability domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SavantDomain {
    Music,
    Art,
    Calendar,
    Mathematics,
    Mechanical,
    Language,
}

impl fmt::Display for SavantDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl SavantDomain {
    /// All domains in table order (descending prevalence).
    pub const ALL: [SavantDomain; 6] = [
        SavantDomain::Music,
        SavantDomain::Art,
        SavantDomain::Calendar,
        SavantDomain::Mathematics,
        SavantDomain::Mechanical,
        SavantDomain::Language,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SavantDomain::Music => "Music",
            SavantDomain::Art => "Art",
            SavantDomain::Calendar => "Calendar",
            SavantDomain::Mathematics => "Mathematics",
            SavantDomain::Mechanical => "Mechanical",
            SavantDomain::Language => "Language",
        }
    }

    /// Look a domain up by name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|d| d.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Proportion of savants whose primary skill falls in this domain.
    pub fn prevalence(&self) -> f64 {
        match self {
            SavantDomain::Music => 0.32,
            SavantDomain::Art => 0.29,
            SavantDomain::Calendar => 0.18,
            SavantDomain::Mathematics => 0.12,
            SavantDomain::Mechanical => 0.06,
            SavantDomain::Language => 0.03,
        }
    }

    /// The Field information channel associated with the domain.
    pub fn field_channel(&self) -> &'static str {
        match self {
            SavantDomain::Music => "Harmonic ratios, temporal patterns",
            SavantDomain::Art => "Geometric invariants, spatial relations",
            SavantDomain::Calendar => "Cyclic temporal structures",
            SavantDomain::Mathematics => "Prime relationships, numerical patterns",
            SavantDomain::Mechanical => "Spatial-mechanical invariants",
            SavantDomain::Language => "Linguistic structure patterns",
        }
    }

    /// First clause of the Field channel, used for chart annotations.
    pub fn field_channel_short(&self) -> &'static str {
        let channel = self.field_channel();
        channel.split(',').next().unwrap_or(channel)
    }

    pub fn typical_features(&self) -> [&'static str; 3] {
        match self {
            SavantDomain::Music => ["Perfect pitch", "Instant recall", "Improvisation"],
            SavantDomain::Art => [
                "Photorealistic detail",
                "Perspective accuracy",
                "Color memory",
            ],
            SavantDomain::Calendar => [
                "Day-date calculation",
                "Pattern recognition",
                "Infinite range",
            ],
            SavantDomain::Mathematics => [
                "Prime detection",
                "Mental calculation",
                "Number sense",
            ],
            SavantDomain::Mechanical => [
                "3D visualization",
                "Assembly intuition",
                "Engineering sense",
            ],
            SavantDomain::Language => [
                "Polyglot ability",
                "Grammar intuition",
                "Etymology sense",
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prevalence_sums_to_one() {
        let total: f64 = SavantDomain::ALL.iter().map(|d| d.prevalence()).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(SavantDomain::from_name("music"), Some(SavantDomain::Music));
        assert_eq!(
            SavantDomain::from_name(" Mathematics "),
            Some(SavantDomain::Mathematics)
        );
        assert_eq!(SavantDomain::from_name("Memory"), None);
    }

    #[test]
    fn test_field_channel_short() {
        assert_eq!(SavantDomain::Music.field_channel_short(), "Harmonic ratios");
        assert_eq!(
            SavantDomain::Calendar.field_channel_short(),
            "Cyclic temporal structures"
        );
    }
}
