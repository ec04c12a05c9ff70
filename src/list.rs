use crate::error::IndexError;
use crate::options::Filter;
use std::path::Path;
use tracing::warn;

/// Reads the raw entry names of `dir`, applying hidden filtering and the
/// optional user predicate, then lexically pre-sorts them so stat gathering
/// iterates in a deterministic order. The final directories-first ordering
/// happens later, after metadata is known.
pub async fn list(
    dir: &Path,
    show_hidden: bool,
    filter: Option<&Filter>,
) -> Result<Vec<String>, IndexError> {
    let mut reader = tokio::fs::read_dir(dir).await?;

    let mut names = Vec::new();
    while let Some(entry) = reader.next_entry().await? {
        match entry.file_name().into_string() {
            Ok(name) => {
                if show_hidden || !name.starts_with('.') {
                    names.push(name);
                }
            }
            Err(_) => {
                warn!("skipping entry with non-UTF-8 filename in {}", dir.display());
            }
        }
    }

    if let Some(filter) = filter {
        let all = std::mem::take(&mut names);
        let mut kept = Vec::with_capacity(all.len());
        for (index, name) in all.iter().enumerate() {
            match filter(name, index, &all, dir) {
                Ok(true) => kept.push(name.clone()),
                Ok(false) => {}
                Err(e) => return Err(IndexError::Predicate(e)),
            }
        }
        names = kept;
    }

    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn populate(dir: &Path) {
        std::fs::write(dir.join("b.txt"), b"b").unwrap();
        std::fs::write(dir.join(".hidden"), b"h").unwrap();
        std::fs::create_dir(dir.join("A")).unwrap();
    }

    #[tokio::test]
    async fn hidden_entries_are_dropped_by_default() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path());
        let names = list(dir.path(), false, None).await.unwrap();
        assert_eq!(names, vec!["A".to_owned(), "b.txt".to_owned()]);
    }

    #[tokio::test]
    async fn hidden_entries_survive_when_enabled() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path());
        let names = list(dir.path(), true, None).await.unwrap();
        assert_eq!(
            names,
            vec![".hidden".to_owned(), "A".to_owned(), "b.txt".to_owned()]
        );
    }

    #[tokio::test]
    async fn predicate_sees_index_and_full_listing() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path());
        let filter: Filter = Arc::new(|name, index, all, _dir| {
            assert_eq!(all[index], name);
            Ok(!name.ends_with(".txt"))
        });
        let names = list(dir.path(), false, Some(&filter)).await.unwrap();
        assert_eq!(names, vec!["A".to_owned()]);
    }

    #[tokio::test]
    async fn predicate_error_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path());
        let filter: Filter = Arc::new(|_, _, _, _| Err("boom".into()));
        match list(dir.path(), false, Some(&filter)).await {
            Err(IndexError::Predicate(_)) => {}
            other => panic!("expected Predicate error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_directory_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone");
        assert!(matches!(
            list(&missing, false, None).await,
            Err(IndexError::Io(_))
        ));
    }
}
