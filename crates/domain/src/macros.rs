//! Macro for implementing Display and FromStr for status enums
//!
//! Phase and reason enums are logged as structured fields and parsed back
//! from config or metrics labels, so they share one case-insensitive
//! string mapping.
//!
//! # Example
//!
//! ```rust
//! use chatcal_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum DeliveryState {
//!     Queued,
//!     Sent,
//! }
//!
//! impl_domain_status_conversions!(DeliveryState {
//!     Queued => "queued",
//!     Sent => "sent",
//! });
//!
//! assert_eq!(DeliveryState::Sent.to_string(), "sent");
//! assert_eq!("QUEUED".parse::<DeliveryState>(), Ok(DeliveryState::Queued));
//! ```

/// Implements Display and FromStr traits for status enums
///
/// - Display writes the mapped lowercase label
/// - FromStr parses case-insensitively and names the enum in its error
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
