use crate::error::IndexError;
use crate::icons::{self, IconDescriptor};
use crate::options::{IndexOptions, Template, TemplateLocals, View};
use crate::resolve::ResolvedPath;
use crate::stat::StatEntry;
use chrono::{DateTime, Local};
use humansize::{format_size, BINARY};
use maud::{html, Markup};

const DEFAULT_TEMPLATE: &str = include_str!("../../assets/directory.html");
const DEFAULT_STYLESHEET: &str = include_str!("../../assets/style.css");

/// Renders the full HTML page: breadcrumb, entry list, stylesheet (plus icon
/// rules when icons are enabled), substituted into the configured template.
pub async fn render(
    options: &IndexOptions,
    resolved: &ResolvedPath,
    entries: &[StatEntry],
) -> Result<String, IndexError> {
    let mut style = match &options.stylesheet {
        Some(path) => tokio::fs::read_to_string(path).await?,
        None => DEFAULT_STYLESHEET.to_owned(),
    };

    let descriptors: Vec<Option<IconDescriptor>> = entries
        .iter()
        .map(|entry| {
            options
                .icons
                .then(|| icons::lookup(&entry.name, entry.is_dir() || entry.name == ".."))
        })
        .collect();
    if options.icons {
        let used: Vec<IconDescriptor> = descriptors.iter().flatten().cloned().collect();
        style.push('\n');
        style.push_str(&icons::stylesheet_rules(&used));
    }

    let locals = TemplateLocals {
        directory: escape(&resolved.display_path),
        files: file_list(options, resolved, entries, &descriptors).into_string(),
        linked_path: linked_path(&resolved.display_path).into_string(),
        style,
    };

    match &options.template {
        Template::Default => Ok(substitute(DEFAULT_TEMPLATE, &locals)),
        Template::File(path) => {
            let text = tokio::fs::read_to_string(path).await?;
            Ok(substitute(&text, &locals))
        }
        Template::Callback(render_fn) => render_fn(&locals).map_err(IndexError::Template),
    }
}

/// Literal global token replacement, one pass per token.
fn substitute(template: &str, locals: &TemplateLocals) -> String {
    template
        .replace("{style}", &locals.style)
        .replace("{files}", &locals.files)
        .replace("{directory}", &locals.directory)
        .replace("{linked-path}", &locals.linked_path)
}

fn escape(text: &str) -> String {
    html! { (text) }.into_string()
}

/// Breadcrumb trail: a root link, then one link per path segment with the
/// accumulated (per-segment percent-encoded) prefix as href.
fn linked_path(display_path: &str) -> Markup {
    let mut crumbs: Vec<(String, &str)> = Vec::new();
    let mut href = String::new();
    for segment in display_path.split('/').filter(|s| !s.is_empty()) {
        href.push('/');
        href.push_str(&urlencoding::encode(segment));
        crumbs.push((href.clone(), segment));
    }
    html! {
        a href="/" { "~" }
        @for (href, segment) in &crumbs {
            " / "
            a href=(href) { (segment) }
        }
    }
}

fn file_list(
    options: &IndexOptions,
    resolved: &ResolvedPath,
    entries: &[StatEntry],
    descriptors: &[Option<IconDescriptor>],
) -> Markup {
    html! {
        ul id="files" class=(options.view.css_class()) {
            @for (entry, icon) in entries.iter().zip(descriptors) {
                li {
                    a href=(entry_href(&resolved.display_path, entry))
                        class=[icon.as_ref().map(|d| format!("icon {}", d.class_name))]
                        title=(entry.name)
                    {
                        span class="name" { (entry.name) }
                        @if options.view == View::Details {
                            span class="size" { (size_column(entry)) }
                            span class="date" { (date_column(entry)) }
                        }
                    }
                }
            }
        }
    }
}

/// Entry href: the current directory path plus the entry name, every segment
/// percent-encoded so separators or metacharacters in names cannot change the
/// link's shape. Directories get a trailing slash; the `".."` pseudo-entry
/// links one level up and is re-normalized by the resolver on the next
/// request.
fn entry_href(display_path: &str, entry: &StatEntry) -> String {
    let mut href = String::new();
    for segment in display_path.split('/').filter(|s| !s.is_empty()) {
        href.push('/');
        href.push_str(&urlencoding::encode(segment));
    }
    href.push('/');
    href.push_str(&urlencoding::encode(&entry.name));
    if entry.is_dir() {
        href.push('/');
    }
    href
}

fn size_column(entry: &StatEntry) -> String {
    match entry.stat {
        Some(stat) if !stat.is_dir => format_size(stat.len, BINARY),
        _ => String::new(),
    }
}

fn date_column(entry: &StatEntry) -> String {
    entry
        .stat
        .and_then(|stat| stat.modified)
        .map(|modified| {
            let datetime: DateTime<Local> = modified.into();
            datetime.format("%Y-%m-%d %H:%M").to_string()
        })
        .unwrap_or_default()
}
