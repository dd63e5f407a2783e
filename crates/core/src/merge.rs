//! Merger trait for the three-way merge primitive.

use crate::error::MergeError;
use crate::resource::Document;

/// Computes the document obtained by applying `desired` onto `observed`,
/// with `last_applied` as the baseline.
///
/// Fields absent from both `last_applied` and `desired` are left untouched
/// on `observed`. Incompatible field types must surface as an error.
pub trait Merger: Send + Sync {
    fn merge(
        &self,
        observed: &Document,
        last_applied: &Document,
        desired: &Document,
    ) -> Result<Document, MergeError>;
}

impl<F> Merger for F
where
    F: Fn(&Document, &Document, &Document) -> Result<Document, MergeError> + Send + Sync,
{
    fn merge(
        &self,
        observed: &Document,
        last_applied: &Document,
        desired: &Document,
    ) -> Result<Document, MergeError> {
        self(observed, last_applied, desired)
    }
}
