//! Typed ID wrappers for bridge entities.
//!
//! Each ID is a `Uuid` behind a newtype, rendered with a short kind prefix
//! (`ctr-…`, `call-…`) so ids stay distinguishable in interleaved log lines.
//! A container id can never be passed where a call id is expected, and a
//! string with the wrong prefix never parses.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error parsing a prefixed id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdParseError {
    #[error("expected an id starting with `{expected}-`")]
    WrongPrefix { expected: &'static str },
    #[error("malformed id: {0}")]
    Malformed(#[from] uuid::Error),
}

/// Generate a prefixed id newtype over `Uuid`.
///
/// `Display`, `FromStr` and serde all use the same `prefix-<simple uuid>`
/// text form.
macro_rules! bridge_id {
    ($($(#[doc = $doc:expr])* $name:ident => $prefix:literal),+ $(,)?) => {
        $(
            $(#[doc = $doc])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
            #[serde(into = "String", try_from = "String")]
            pub struct $name(Uuid);

            impl $name {
                pub const PREFIX: &'static str = $prefix;

                #[must_use]
                pub fn new() -> Self {
                    Self(Uuid::new_v4())
                }

                #[must_use]
                pub fn as_uuid(&self) -> &Uuid {
                    &self.0
                }
            }

            impl Default for $name {
                fn default() -> Self {
                    Self::new()
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}-{}", Self::PREFIX, self.0.simple())
                }
            }

            impl FromStr for $name {
                type Err = IdParseError;

                fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                    let body = s
                        .strip_prefix(Self::PREFIX)
                        .and_then(|rest| rest.strip_prefix('-'))
                        .ok_or(IdParseError::WrongPrefix { expected: Self::PREFIX })?;
                    Ok(Self(Uuid::parse_str(body)?))
                }
            }

            impl TryFrom<String> for $name {
                type Error = IdParseError;

                fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
                    s.parse()
                }
            }

            impl From<$name> for String {
                fn from(id: $name) -> Self {
                    id.to_string()
                }
            }
        )+
    };
}

bridge_id! {
    /// Identifies a pending in-memory container queued for processing.
    ContainerId => "ctr",
    /// Identifies one driver call; carried on its tracing span.
    CallId => "call",
}
