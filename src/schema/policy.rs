//! Runtime-selectable genetic operator policies.
//!
//! Every policy is a closed enum. Policies serialize as their variant name and parse back
//! from it; an unknown name is rejected with [`ConfigError::UnsupportedPolicy`] instead of
//! falling back to a default.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ConfigError;

macro_rules! policy_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                $variant,
            )+
        }

        impl $name {
            /// All supported variants.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Name used in configuration documents.
            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant),)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $name {
            type Err = ConfigError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $(stringify!($variant) => Ok($name::$variant),)+
                    other => Err(ConfigError::UnsupportedPolicy {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = ConfigError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.name().to_string()
            }
        }
    };
}

policy_enum! {
    /// How raw performance values become selection fitness.
    FitnessAssignmentMethod, "fitness assignment" {
        /// Fitness proportional to the ascending rank (best individual ranks highest).
        LinearRanking,
    }
}

impl Default for FitnessAssignmentMethod {
    fn default() -> Self {
        Self::LinearRanking
    }
}

policy_enum! {
    /// How parents are chosen from the ranked population.
    SelectionMethod, "selection" {
        /// Elitism followed by fitness-proportionate draws without duplicates.
        RouletteWheel,
    }
}

impl Default for SelectionMethod {
    fn default() -> Self {
        Self::RouletteWheel
    }
}

policy_enum! {
    /// How two parents are blended into an offspring.
    RecombinationMethod, "recombination" {
        /// One scaling factor per offspring, shared by every gene.
        Line,
        /// A fresh scaling factor for every gene.
        Intermediate,
    }
}

impl Default for RecombinationMethod {
    fn default() -> Self {
        Self::Intermediate
    }
}

policy_enum! {
    /// Distribution of per-gene mutation perturbations.
    MutationMethod, "mutation" {
        /// Gaussian noise with standard deviation `mutation_range`.
        Normal,
        /// Uniform noise in `[-mutation_range, mutation_range]`.
        Uniform,
    }
}

impl Default for MutationMethod {
    fn default() -> Self {
        Self::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_names() {
        assert_eq!(
            "LinearRanking".parse::<FitnessAssignmentMethod>().unwrap(),
            FitnessAssignmentMethod::LinearRanking
        );
        assert_eq!(
            "RouletteWheel".parse::<SelectionMethod>().unwrap(),
            SelectionMethod::RouletteWheel
        );
        assert_eq!("Line".parse::<RecombinationMethod>().unwrap(), RecombinationMethod::Line);
        assert_eq!("Uniform".parse::<MutationMethod>().unwrap(), MutationMethod::Uniform);
    }

    #[test]
    fn test_unknown_name_is_unsupported() {
        let err = "Tournament".parse::<SelectionMethod>().unwrap_err();
        match err {
            ConfigError::UnsupportedPolicy { kind, value } => {
                assert_eq!(kind, "selection");
                assert_eq!(value, "Tournament");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_name_rejected_by_serde() {
        let err = serde_json::from_str::<MutationMethod>("\"Cauchy\"").unwrap_err();
        assert!(err.to_string().contains("Unsupported mutation method"));
    }

    #[test]
    fn test_serializes_as_name() {
        for method in RecombinationMethod::ALL {
            let json = serde_json::to_string(method).unwrap();
            assert_eq!(json, format!("\"{}\"", method.name()));
            let parsed: RecombinationMethod = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, *method);
        }
    }
}
