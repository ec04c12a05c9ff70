//! Directory-listing middleware for axum/tower.
//!
//! [`ServeIndex`] serves an HTML/JSON/plain-text listing for any request path
//! that resolves to a directory under its root, and defers everything else
//! (files, missing paths) to a fallback service — typically
//! `tower_http::services::ServeDir` over the same root:
//!
//! ```no_run
//! use dirindex::ServeIndex;
//! use tower_http::services::ServeDir;
//!
//! let root = "/srv/files";
//! let service = ServeIndex::new(root)
//!     .icons(true)
//!     .fallback(ServeDir::new(root));
//! # let _ = service;
//! ```
//!
//! Untrusted request paths are percent-decoded, lexically normalized, and
//! confined under the root before any filesystem read; entry metadata is
//! gathered with bounded concurrency; the representation is negotiated from
//! the `Accept` header.

pub mod error;
mod icons;
mod list;
mod negotiate;
mod options;
mod probe;
mod render;
mod resolve;
mod sort;
mod stat;

pub use error::{BoxError, IndexError};
pub use negotiate::MediaType;
pub use options::{Filter, Template, TemplateFn, TemplateLocals, View};
pub use stat::{EntryStat, StatEntry, DEFAULT_CONCURRENCY};

use axum::body::Body;
use axum::response::{IntoResponse, Response};
use http::{header, HeaderValue, Method, Request, StatusCode};
use options::IndexOptions;
use probe::Probe;
use std::convert::Infallible;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::Service;
use tracing::debug;

/// The directory-listing service. Construct with [`ServeIndex::new`], adjust
/// with the builder methods, and mount it anywhere a
/// `tower::Service<Request<Body>>` fits (e.g. `Router::fallback_service`).
pub struct ServeIndex<F = DefaultFallback> {
    options: Arc<IndexOptions>,
    fallback: F,
}

impl ServeIndex<DefaultFallback> {
    /// Serves listings for directories under `root`. The root is absolutized
    /// lexically here; it is not canonicalized, per the lexical confinement
    /// policy.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let root = std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf());
        Self {
            options: Arc::new(IndexOptions::new(root)),
            fallback: DefaultFallback,
        }
    }
}

impl<F> ServeIndex<F> {
    fn options_mut(&mut self) -> &mut IndexOptions {
        Arc::make_mut(&mut self.options)
    }

    /// Keep dotfile entries in listings (off by default).
    pub fn show_hidden(mut self, yes: bool) -> Self {
        self.options_mut().show_hidden = yes;
        self
    }

    /// Per-entry predicate applied after hidden filtering; entries it rejects
    /// are dropped, and an error from it fails the whole request.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.options_mut().filter = Some(filter);
        self
    }

    /// Emit per-entry icon classes and the inlined icon stylesheet.
    pub fn icons(mut self, yes: bool) -> Self {
        self.options_mut().icons = yes;
        self
    }

    /// Replace the embedded stylesheet with a file, read per render.
    pub fn stylesheet(mut self, path: impl Into<PathBuf>) -> Self {
        self.options_mut().stylesheet = Some(path.into());
        self
    }

    /// Replace the embedded page template with a token-template file
    /// (`{style}`, `{files}`, `{directory}`, `{linked-path}`), read per
    /// render.
    pub fn template(mut self, path: impl Into<PathBuf>) -> Self {
        self.options_mut().template = Template::File(path.into());
        self
    }

    /// Replace the page template with a render callback receiving the same
    /// locals the tokens would.
    pub fn template_fn(mut self, render_fn: TemplateFn) -> Self {
        self.options_mut().template = Template::Callback(render_fn);
        self
    }

    /// Listing layout (tiles by default).
    pub fn view(mut self, view: View) -> Self {
        self.options_mut().view = view;
        self
    }

    /// Upper bound on metadata lookups in flight at once (default 10).
    pub fn stat_concurrency(mut self, limit: usize) -> Self {
        self.options_mut().stat_concurrency = limit;
        self
    }

    /// Service invoked for paths this middleware is not authoritative over:
    /// files and paths that do not exist. Replaces the default 404 responder.
    pub fn fallback<F2>(self, fallback: F2) -> ServeIndex<F2> {
        ServeIndex {
            options: self.options,
            fallback,
        }
    }
}

impl<F: Clone> Clone for ServeIndex<F> {
    fn clone(&self) -> Self {
        Self {
            options: Arc::clone(&self.options),
            fallback: self.fallback.clone(),
        }
    }
}

impl<F> Service<Request<Body>> for ServeIndex<F>
where
    F: Service<Request<Body>, Error = Infallible> + Clone + Send + 'static,
    F::Response: IntoResponse,
    F::Future: Send,
{
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Infallible>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Infallible>> {
        self.fallback.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let options = Arc::clone(&self.options);
        // Take the polled-ready fallback, leave a fresh clone behind.
        let clone = self.fallback.clone();
        let mut fallback = std::mem::replace(&mut self.fallback, clone);

        let method = req.method().clone();
        // Path component only; the query never participates in resolution.
        let raw_path = req.uri().path().to_owned();
        let accept = req
            .headers()
            .get(header::ACCEPT)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        Box::pin(async move {
            match serve_listing(&options, &method, &raw_path, accept.as_deref()).await {
                Ok(Served::Response(response)) => Ok(response),
                Ok(Served::Fallthrough) => {
                    fallback.call(req).await.map(IntoResponse::into_response)
                }
                Err(err) => Ok(err.into_response()),
            }
        })
    }
}

/// Fallback used until [`ServeIndex::fallback`] installs a real one: plain
/// empty 404 for everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFallback;

impl Service<Request<Body>> for DefaultFallback {
    type Response = Response;
    type Error = Infallible;
    type Future = std::future::Ready<Result<Response, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Infallible>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _req: Request<Body>) -> Self::Future {
        std::future::ready(Ok(StatusCode::NOT_FOUND.into_response()))
    }
}

enum Served {
    Response(Response),
    Fallthrough,
}

const ALLOW: &str = "GET, HEAD, OPTIONS";

/// The listing pipeline: resolve, probe, list, gather, sort, negotiate,
/// render. Each stage runs exactly once; fallthrough and errors exit early.
async fn serve_listing(
    options: &IndexOptions,
    method: &Method,
    raw_path: &str,
    accept: Option<&str>,
) -> Result<Served, IndexError> {
    // Method gate comes before any path work.
    if method != Method::GET && method != Method::HEAD {
        let status = if method == Method::OPTIONS {
            StatusCode::OK
        } else {
            StatusCode::METHOD_NOT_ALLOWED
        };
        return Ok(Served::Response(method_gate_response(status)));
    }

    let resolved = resolve::resolve(&options.root, raw_path)?;

    match probe::probe(&resolved.fs_path).await? {
        Probe::Directory => {}
        outcome @ (Probe::NotFound | Probe::NotADirectory) => {
            debug!(path = %resolved.fs_path.display(), ?outcome, "deferring to fallback");
            return Ok(Served::Fallthrough);
        }
    }

    let mut names = list::list(
        &resolved.fs_path,
        options.show_hidden,
        options.filter.as_ref(),
    )
    .await?;
    if resolved.show_parent_link {
        names.insert(0, "..".to_owned());
    }

    let mut entries = stat::gather(&resolved.fs_path, names, options.stat_concurrency).await?;
    sort::sort(&mut entries);

    let media = negotiate::negotiate(accept)?;
    let body = match media {
        MediaType::Html => render::html::render(options, &resolved, &entries).await?,
        MediaType::Json => render::json::render(&entries)?,
        MediaType::Plain => render::plain::render(&entries),
    };

    let length = body.len();
    let mut response = Response::new(if method == Method::HEAD {
        // HEAD keeps the headers (Content-Length included) without the body.
        Body::empty()
    } else {
        Body::from(body)
    });
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(media.content_type()),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    Ok(Served::Response(response))
}

fn method_gate_response(status: StatusCode) -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(header::ALLOW, HeaderValue::from_static(ALLOW));
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(0usize));
    response
}
