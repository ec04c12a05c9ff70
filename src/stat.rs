use crate::error::IndexError;
use std::future::Future;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Default upper bound on metadata lookups in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// The metadata the renderers care about, lifted out of `std::fs::Metadata`
/// so the gatherer can be driven by an injectable stat function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct EntryStat {
    pub is_dir: bool,
    pub len: u64,
    pub modified: Option<SystemTime>,
}

impl From<&std::fs::Metadata> for EntryStat {
    fn from(meta: &std::fs::Metadata) -> Self {
        Self {
            is_dir: meta.is_dir(),
            len: meta.len(),
            modified: meta.modified().ok(),
        }
    }
}

/// A listed entry with its metadata, or `None` when the entry vanished
/// between listing and stat (or is the synthetic `".."` parent link, which
/// is never stat-ed at all).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StatEntry {
    pub name: String,
    pub stat: Option<EntryStat>,
}

impl StatEntry {
    pub fn is_dir(&self) -> bool {
        self.stat.map(|s| s.is_dir).unwrap_or(false)
    }
}

/// Stats every entry of `names` under `dir` with at most `limit` lookups in
/// flight, returning results in the input order regardless of completion
/// order. A lookup hitting NotFound records the entry with absent metadata;
/// any other lookup failure aborts the whole gather.
pub async fn gather(
    dir: &Path,
    names: Vec<String>,
    limit: usize,
) -> Result<Vec<StatEntry>, IndexError> {
    let dir = dir.to_path_buf();
    gather_with(names, limit, move |name| {
        let path = dir.join(name);
        async move {
            tokio::fs::metadata(&path)
                .await
                .map(|meta| EntryStat::from(&meta))
        }
    })
    .await
}

/// Gather over an arbitrary async stat function; `gather` wires in
/// `tokio::fs::metadata`, tests inject their own.
pub(crate) async fn gather_with<F, Fut>(
    names: Vec<String>,
    limit: usize,
    stat_fn: F,
) -> Result<Vec<StatEntry>, IndexError>
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = io::Result<EntryStat>> + Send + 'static,
{
    // Pre-sized, position-indexed buffer keeps the caller's order intact.
    // The ".." pseudo-entry is filled in up front and never spawns a lookup.
    let mut out: Vec<Option<StatEntry>> = names
        .iter()
        .map(|name| {
            (name == "..").then(|| StatEntry {
                name: name.clone(),
                stat: None,
            })
        })
        .collect();

    let semaphore = Arc::new(Semaphore::new(limit.max(1)));
    let stat_fn = Arc::new(stat_fn);
    let mut tasks = JoinSet::new();
    for (index, name) in names.into_iter().enumerate() {
        if name == ".." {
            continue;
        }
        let semaphore = Arc::clone(&semaphore);
        let stat_fn = Arc::clone(&stat_fn);
        tasks.spawn(async move {
            // The semaphore is never closed while tasks hold a clone.
            let _permit = semaphore.acquire_owned().await.expect("semaphore closed");
            let result = stat_fn(name.clone()).await;
            (index, name, result)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        let (index, name, result) = joined.map_err(|e| IndexError::Io(io::Error::other(e)))?;
        match result {
            Ok(stat) => {
                out[index] = Some(StatEntry {
                    name,
                    stat: Some(stat),
                });
            }
            // Entry vanished between listing and stat; keep it, metadata-less.
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                out[index] = Some(StatEntry { name, stat: None });
            }
            Err(e) => {
                tasks.abort_all();
                return Err(IndexError::Io(e));
            }
        }
    }

    Ok(out
        .into_iter()
        .map(|entry| entry.expect("every entry resolved"))
        .collect())
}
