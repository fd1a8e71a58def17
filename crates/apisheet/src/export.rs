//! The seam between the batch and whatever writes result tables.

use std::path::Path;

use crate::types::NormalizedRecord;

/// Writes one job's rows to a tabular file.
///
/// Implementations must refuse an empty record list: log a warning, write
/// nothing, and return `false`.
pub trait Exporter {
    /// File extension of produced tables, without the dot.
    fn extension(&self) -> &str;

    /// Write `records` to `target`. Returns whether a file was written.
    fn export(&self, records: &[NormalizedRecord], target: &Path, label: &str) -> bool;
}

impl<E: Exporter + ?Sized> Exporter for &E {
    fn extension(&self) -> &str {
        (**self).extension()
    }

    fn export(&self, records: &[NormalizedRecord], target: &Path, label: &str) -> bool {
        (**self).export(records, target, label)
    }
}
