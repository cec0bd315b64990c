//! Conference model, derived-list filtering, and the types shared between the
//! API server and its clients.

/// Implements `as_str`, `Display` and case-insensitive `FromStr` for a
/// fieldless enum whose variants map one-to-one onto lowercase keywords.
macro_rules! keyword_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::error::ParseKeywordError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    _ => Err($crate::error::ParseKeywordError::new(stringify!($name), s)),
                }
            }
        }
    };
}

pub mod dates;
pub mod domain;
pub mod error;
pub mod filter;
pub mod preferences;
pub mod protocol;
pub mod query;

pub use filter::{filter_and_sort, FilterCriteria, SortKey, SortOrder};
