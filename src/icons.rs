use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

/// CSS class and backing image for one listing entry. Recomputed per render,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconDescriptor {
    pub class_name: String,
    pub asset: &'static str,
}

const DEFAULT_ASSET: &str = "file.png";

// Extension table takes precedence over everything MIME-derived.
static BY_EXT: &[(&str, &str)] = &[
    ("bmp", "image.png"),
    ("gif", "image.png"),
    ("jpeg", "image.png"),
    ("jpg", "image.png"),
    ("png", "image.png"),
    ("svg", "image.png"),
    ("flac", "audio.png"),
    ("mp3", "audio.png"),
    ("ogg", "audio.png"),
    ("wav", "audio.png"),
    ("avi", "video.png"),
    ("mkv", "video.png"),
    ("mov", "video.png"),
    ("mp4", "video.png"),
    ("webm", "video.png"),
    ("7z", "archive.png"),
    ("bz2", "archive.png"),
    ("gz", "archive.png"),
    ("rar", "archive.png"),
    ("tar", "archive.png"),
    ("zip", "archive.png"),
    ("log", "text.png"),
    ("md", "text.png"),
    ("txt", "text.png"),
    ("c", "code.png"),
    ("css", "code.png"),
    ("h", "code.png"),
    ("htm", "code.png"),
    ("html", "code.png"),
    ("js", "code.png"),
    ("json", "code.png"),
    ("py", "code.png"),
    ("rs", "code.png"),
    ("toml", "code.png"),
    ("yaml", "code.png"),
    ("yml", "code.png"),
    ("doc", "document.png"),
    ("docx", "document.png"),
    ("odt", "document.png"),
    ("pdf", "document.png"),
];

static BY_MIME: &[(&str, &str)] = &[
    ("application/json", "code.png"),
    ("application/pdf", "document.png"),
    ("application/zip", "archive.png"),
    ("text/html", "code.png"),
];

// MIME "+suffix" fallbacks, e.g. image/svg+xml or application/epub+zip.
static BY_SUFFIX: &[(&str, &str)] = &[
    ("json", "code.png"),
    ("xml", "code.png"),
    ("zip", "archive.png"),
];

static BY_TYPE: &[(&str, &str)] = &[
    ("audio", "audio.png"),
    ("image", "image.png"),
    ("text", "text.png"),
    ("video", "video.png"),
];

fn table_get(table: &[(&str, &'static str)], key: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, asset)| *asset)
}

/// Resolves the icon for an entry: exact extension, then full MIME type,
/// then MIME "+suffix", then MIME top-level type, else the default.
pub fn lookup(name: &str, is_dir: bool) -> IconDescriptor {
    if is_dir {
        return IconDescriptor {
            class_name: "icon-directory".to_owned(),
            asset: "folder.png",
        };
    }

    let ext = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => ext.to_ascii_lowercase(),
        _ => {
            return IconDescriptor {
                class_name: "icon-default".to_owned(),
                asset: DEFAULT_ASSET,
            }
        }
    };

    if let Some(asset) = table_get(BY_EXT, &ext) {
        return IconDescriptor {
            class_name: format!("icon-{ext}"),
            asset,
        };
    }

    let Some(mime) = mime_guess::from_ext(&ext).first() else {
        return IconDescriptor {
            class_name: "icon-default".to_owned(),
            asset: DEFAULT_ASSET,
        };
    };

    let essence = mime.essence_str();
    if let Some(asset) = table_get(BY_MIME, essence) {
        return IconDescriptor {
            class_name: format!("icon-{}", essence.replace(['/', '+'], "-")),
            asset,
        };
    }

    if let Some(suffix) = mime.suffix() {
        if let Some(asset) = table_get(BY_SUFFIX, suffix.as_str()) {
            return IconDescriptor {
                class_name: format!("icon-{}", suffix.as_str()),
                asset,
            };
        }
    }

    if let Some(asset) = table_get(BY_TYPE, mime.type_().as_str()) {
        return IconDescriptor {
            class_name: format!("icon-{}", mime.type_().as_str()),
            asset,
        };
    }

    IconDescriptor {
        class_name: "icon-default".to_owned(),
        asset: DEFAULT_ASSET,
    }
}

fn asset_bytes(asset: &str) -> &'static [u8] {
    match asset {
        "folder.png" => include_bytes!("../assets/icons/folder.png"),
        "image.png" => include_bytes!("../assets/icons/image.png"),
        "audio.png" => include_bytes!("../assets/icons/audio.png"),
        "video.png" => include_bytes!("../assets/icons/video.png"),
        "archive.png" => include_bytes!("../assets/icons/archive.png"),
        "text.png" => include_bytes!("../assets/icons/text.png"),
        "code.png" => include_bytes!("../assets/icons/code.png"),
        "document.png" => include_bytes!("../assets/icons/document.png"),
        _ => include_bytes!("../assets/icons/file.png"),
    }
}

// Process-wide base64 cache, populated lazily and never invalidated. The
// backing assets are compiled in, so stale entries cannot exist.
static INLINE_CACHE: LazyLock<DashMap<&'static str, String>> = LazyLock::new(DashMap::new);

fn inline_data(asset: &'static str) -> String {
    if let Some(cached) = INLINE_CACHE.get(asset) {
        return cached.value().clone();
    }
    let encoded = BASE64.encode(asset_bytes(asset));
    INLINE_CACHE.entry(asset).or_insert(encoded).value().clone()
}

/// Builds the embedded stylesheet rules for a listing: one rule per distinct
/// icon image, with every class backed by that image grouped into the
/// selector.
pub fn stylesheet_rules(descriptors: &[IconDescriptor]) -> String {
    let mut by_asset: BTreeMap<&'static str, Vec<&str>> = BTreeMap::new();
    for descriptor in descriptors {
        let classes = by_asset.entry(descriptor.asset).or_default();
        if !classes.contains(&descriptor.class_name.as_str()) {
            classes.push(&descriptor.class_name);
        }
    }

    let mut css = String::new();
    for (asset, mut classes) in by_asset {
        classes.sort_unstable();
        let selectors: Vec<String> = classes
            .iter()
            .map(|class| format!("#files .{class}"))
            .collect();
        css.push_str(&format!(
            "{} {{ background-image: url(data:image/png;base64,{}); }}\n",
            selectors.join(", "),
            inline_data(asset)
        ));
    }
    css
}
