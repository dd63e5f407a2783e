//! Matcher trait: evaluates selector terms against a single resource.

use crate::error::MatchError;
use crate::resource::Resource;
use crate::selector::SelectTerm;

/// Decides whether a resource is selected by any of the given terms.
///
/// Implementations must be deterministic and free of side effects.
pub trait Matcher: Send + Sync {
    fn matches(&self, terms: &[SelectTerm], resource: &Resource) -> Result<bool, MatchError>;
}

impl<F> Matcher for F
where
    F: Fn(&[SelectTerm], &Resource) -> Result<bool, MatchError> + Send + Sync,
{
    fn matches(&self, terms: &[SelectTerm], resource: &Resource) -> Result<bool, MatchError> {
        self(terms, resource)
    }
}
