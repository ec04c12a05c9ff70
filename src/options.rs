use crate::error::BoxError;
use crate::stat::DEFAULT_CONCURRENCY;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// User-supplied entry predicate, invoked per entry with the entry name, its
/// index in the (hidden-filtered) listing, the full listing, and the directory
/// being listed. Returning an error aborts the whole request.
pub type Filter =
    Arc<dyn Fn(&str, usize, &[String], &Path) -> Result<bool, BoxError> + Send + Sync>;

/// The values substituted into an HTML template, one per token.
#[derive(Debug, Clone)]
pub struct TemplateLocals {
    /// HTML-escaped display path, for `{directory}`.
    pub directory: String,
    /// Rendered entry list markup, for `{files}`.
    pub files: String,
    /// Rendered breadcrumb markup, for `{linked-path}`.
    pub linked_path: String,
    /// Stylesheet text (including icon rules), for `{style}`.
    pub style: String,
}

/// User-supplied template callback, receiving the same locals the token
/// substitution would use and returning the full page body.
pub type TemplateFn = Arc<dyn Fn(&TemplateLocals) -> Result<String, BoxError> + Send + Sync>;

/// How the HTML page shell is produced.
#[derive(Clone, Default)]
pub enum Template {
    /// The embedded `assets/directory.html` token template.
    #[default]
    Default,
    /// A caller-supplied token template, read from disk on every render.
    File(PathBuf),
    /// A caller-supplied render function.
    Callback(TemplateFn),
}

/// Listing layout: plain name tiles, or rows with size/modified columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Tiles,
    Details,
}

impl View {
    pub(crate) fn css_class(self) -> &'static str {
        match self {
            View::Tiles => "view-tiles",
            View::Details => "view-details",
        }
    }
}

impl FromStr for View {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tiles" => Ok(View::Tiles),
            "details" => Ok(View::Details),
            other => Err(format!("unknown view '{other}' (expected 'tiles' or 'details')")),
        }
    }
}

/// Everything the listing pipeline needs to know, shared per request behind
/// an `Arc`.
#[derive(Clone)]
pub struct IndexOptions {
    /// Absolutized root directory all requests are confined to.
    pub root: PathBuf,
    /// Keep dotfile entries in listings.
    pub show_hidden: bool,
    /// Optional per-entry predicate applied after hidden filtering.
    pub filter: Option<Filter>,
    /// Emit per-entry icon classes and the inlined icon stylesheet.
    pub icons: bool,
    /// Stylesheet file overriding the embedded default.
    pub stylesheet: Option<PathBuf>,
    /// HTML page shell.
    pub template: Template,
    /// Listing layout.
    pub view: View,
    /// Upper bound on metadata lookups in flight at once.
    pub stat_concurrency: usize,
}

impl IndexOptions {
    pub(crate) fn new(root: PathBuf) -> Self {
        Self {
            root,
            show_hidden: false,
            filter: None,
            icons: false,
            stylesheet: None,
            template: Template::Default,
            view: View::Tiles,
            stat_concurrency: DEFAULT_CONCURRENCY,
        }
    }
}
