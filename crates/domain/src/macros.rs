//! Macro for implementing Display and FromStr for wire enums
//!
//! ARS reports enumerated values (message types, for one) with inconsistent
//! casing depending on server version. This macro gives an enum a single
//! canonical string form and a case-insensitive parser.
//!
//! # Example
//!
//! ```rust
//! use arsrest_domain::impl_wire_enum_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Severity {
//!     Low,
//!     High,
//! }
//!
//! impl_wire_enum_conversions!(Severity {
//!     Low => "low",
//!     High => "high",
//! });
//!
//! assert_eq!("HIGH".parse::<Severity>().unwrap(), Severity::High);
//! ```

/// Implements Display and FromStr traits for wire enums
///
/// This macro generates:
/// - Display trait: writes the canonical (lowercase) string
/// - FromStr trait: parses case-insensitive strings to enum variants
///
/// The canonical strings must be lowercase for parsing to round-trip.
#[macro_export]
macro_rules! impl_wire_enum_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
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
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
