//! Macro for implementing Display and FromStr for selector enums
//!
//! Store kinds and workloads are named on the command line and in config
//! files. This macro gives them one canonical spelling for `Display` and a
//! case-insensitive `FromStr` that also accepts aliases.
//!
//! # Example
//!
//! ```rust
//! use cadence_domain::impl_domain_enum_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Phase {
//!     Warmup,
//!     Measure,
//! }
//!
//! impl_domain_enum_conversions!(Phase {
//!     Warmup => "warmup" | "warm-up",
//!     Measure => "measure",
//! });
//!
//! assert_eq!(Phase::Warmup.to_string(), "warmup");
//! assert_eq!("Warm-Up".parse::<Phase>().unwrap(), Phase::Warmup);
//! ```

/// Implements Display and FromStr traits for selector enums
///
/// This macro generates:
/// - Display trait: writes the canonical (first) string of each variant
/// - FromStr trait: parses case-insensitive strings, including aliases
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str | $alias...` - Canonical string and optional aliases
#[macro_export]
macro_rules! impl_domain_enum_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal $(| $alias:literal)*),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str $(| $alias)* => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum TestSelector {
        Alpha,
        BetaGamma,
    }

    impl_domain_enum_conversions!(TestSelector {
        Alpha => "alpha",
        BetaGamma => "beta-gamma" | "beta_gamma" | "betagamma",
    });

    #[test]
    fn display_uses_canonical_spelling() {
        assert_eq!(TestSelector::Alpha.to_string(), "alpha");
        assert_eq!(TestSelector::BetaGamma.to_string(), "beta-gamma");
    }

    #[test]
    fn fromstr_accepts_aliases_and_case() {
        assert_eq!(TestSelector::from_str("ALPHA").unwrap(), TestSelector::Alpha);
        assert_eq!(TestSelector::from_str("beta_gamma").unwrap(), TestSelector::BetaGamma);
        assert_eq!(TestSelector::from_str(" BetaGamma ").unwrap(), TestSelector::BetaGamma);
    }

    #[test]
    fn fromstr_rejects_unknown() {
        let result = TestSelector::from_str("delta");
        assert!(result.unwrap_err().contains("Invalid TestSelector: delta"));
        assert!(TestSelector::from_str("").is_err());
    }

    #[test]
    fn display_output_parses_back() {
        for selector in [TestSelector::Alpha, TestSelector::BetaGamma] {
            assert_eq!(TestSelector::from_str(&selector.to_string()).unwrap(), selector);
        }
    }
}
