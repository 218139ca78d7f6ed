//! One step of global name resolution.
//!
//! The global resolver asks its sources in order; the first one that
//! answers `Found` wins and later sources are not consulted.

use crate::runner::ds::error::ErrorType;
use crate::runner::ds::value::Value;
use crate::runner::global::GlobalEnvironment;

/// Outcome of a single resolution step.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Found(Value),
    /// This source has nothing for the name; ask the next one.
    Next,
}

impl Resolution {
    pub fn into_option(self) -> Option<Value> {
        match self {
            Resolution::Found(v) => Some(v),
            Resolution::Next => None,
        }
    }
}

/// A source of global names.
///
/// Sources are consulted on every lookup. A source may cache what it
/// materializes, but must not cache whether an earlier source answered.
pub trait MemberSource {
    fn try_resolve(&self, name: &str, env: &GlobalEnvironment) -> Result<Resolution, ErrorType>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}
