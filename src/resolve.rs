use crate::error::IndexError;
use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR};

/// Outcome of resolving an untrusted request path against the served root.
/// Derived once per request, purely lexically; no filesystem access happens
/// here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Absolute filesystem path, always at or below the root.
    pub fs_path: PathBuf,
    /// Decoded, normalized request path (`/`-prefixed), used for the
    /// breadcrumb and for re-encoding link hrefs per segment.
    pub display_path: String,
    /// True iff the resolved path is not the root itself.
    pub show_parent_link: bool,
}

/// Decodes and validates a raw URL path, confining it under `root`.
///
/// The containment check is the lexical trailing-separator string-prefix
/// compare on the normalized join. It defeats `..` traversal at the string
/// level but does not resolve symlinks; a symlink inside the root pointing
/// outside it is a known limitation of this policy.
pub fn resolve(root: &Path, raw_path: &str) -> Result<ResolvedPath, IndexError> {
    let decoded = urlencoding::decode(raw_path).map_err(|_| IndexError::BadRequest)?;

    // Embedded NUL never names a real path; reject before any path math.
    if decoded.contains('\0') {
        return Err(IndexError::BadRequest);
    }

    // Resolve `.`/`..` segments lexically. A `..` that pops past the root
    // marks the path as escaped, which the prefix check below turns into 403.
    let mut segments: Vec<&str> = Vec::new();
    let mut escaped = false;
    for component in Path::new(decoded.as_ref()).components() {
        match component {
            Component::Normal(segment) => match segment.to_str() {
                Some(s) => segments.push(s),
                None => return Err(IndexError::BadRequest),
            },
            Component::ParentDir => {
                if segments.pop().is_none() {
                    escaped = true;
                }
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }

    let mut fs_path = root.to_path_buf();
    for segment in &segments {
        fs_path.push(segment);
    }

    let root_prefix = with_trailing_separator(root);
    let joined = with_trailing_separator(&fs_path);
    if escaped || !joined.starts_with(&root_prefix) {
        return Err(IndexError::Forbidden);
    }

    let mut display_path = String::from("/");
    display_path.push_str(&segments.join("/"));

    Ok(ResolvedPath {
        fs_path,
        display_path,
        show_parent_link: joined != root_prefix,
    })
}

fn with_trailing_separator(path: &Path) -> String {
    let mut s = path.to_string_lossy().into_owned();
    if !s.ends_with(MAIN_SEPARATOR) {
        s.push(MAIN_SEPARATOR);
    }
    s
}
