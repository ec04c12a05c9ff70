use crate::stat::StatEntry;

/// Canonical display order: the `".."` parent link first, then directories,
/// then everything else, case-insensitively by name within each class.
/// Entries with absent metadata count as files. The sort is stable, so full
/// ties keep their original order, and sorting twice is a no-op.
pub fn sort(entries: &mut [StatEntry]) {
    entries.sort_by_cached_key(|entry| {
        (
            entry.name != "..",
            !entry.is_dir(),
            entry.name.to_lowercase(),
        )
    });
}
