use crate::error::IndexError;

/// The three representations a listing can be rendered as, in preference
/// order on quality ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Html,
    Plain,
    Json,
}

const OFFERED: [MediaType; 3] = [MediaType::Html, MediaType::Plain, MediaType::Json];

impl MediaType {
    pub fn content_type(self) -> &'static str {
        match self {
            MediaType::Html => "text/html; charset=utf-8",
            MediaType::Plain => "text/plain; charset=utf-8",
            MediaType::Json => "application/json; charset=utf-8",
        }
    }

    fn mime(self) -> (&'static str, &'static str) {
        match self {
            MediaType::Html => ("text", "html"),
            MediaType::Plain => ("text", "plain"),
            MediaType::Json => ("application", "json"),
        }
    }
}

/// Picks one of the offered types from the client's `Accept` header.
/// A missing (or empty) header counts as `*/*`; no match with q > 0 is 406.
pub fn negotiate(accept: Option<&str>) -> Result<MediaType, IndexError> {
    let accept = match accept {
        Some(value) if !value.trim().is_empty() => value,
        _ => "*/*",
    };
    let ranges = parse_accept(accept);

    let mut best: Option<(u16, MediaType)> = None;
    for offered in OFFERED {
        let Some(quality) = match_quality(&ranges, offered) else {
            continue;
        };
        if quality == 0 {
            continue;
        }
        // Strictly-greater keeps the offered-order preference on ties.
        if best.map(|(q, _)| quality > q).unwrap_or(true) {
            best = Some((quality, offered));
        }
    }

    best.map(|(_, media)| media).ok_or(IndexError::NotAcceptable)
}

/// One parsed media range: type, subtype, quality in thousandths.
struct MediaRange {
    kind: String,
    subtype: String,
    quality: u16,
}

fn parse_accept(accept: &str) -> Vec<MediaRange> {
    let mut ranges = Vec::new();
    for part in accept.split(',') {
        let mut pieces = part.split(';');
        let Some(range) = pieces.next() else { continue };
        let Some((kind, subtype)) = range.trim().split_once('/') else {
            continue;
        };
        let mut quality = 1000u16;
        for param in pieces {
            let Some((key, value)) = param.split_once('=') else {
                continue;
            };
            if key.trim().eq_ignore_ascii_case("q") {
                if let Ok(q) = value.trim().parse::<f32>() {
                    quality = (q.clamp(0.0, 1.0) * 1000.0) as u16;
                }
            }
        }
        ranges.push(MediaRange {
            kind: kind.trim().to_ascii_lowercase(),
            subtype: subtype.trim().to_ascii_lowercase(),
            quality,
        });
    }
    ranges
}

/// Quality of the most specific range matching `offered`, if any; exact
/// matches beat `type/*`, which beats `*/*`.
fn match_quality(ranges: &[MediaRange], offered: MediaType) -> Option<u16> {
    let (kind, subtype) = offered.mime();
    let mut best: Option<(u8, u16)> = None;
    for range in ranges {
        let specificity = if range.kind == kind && range.subtype == subtype {
            2
        } else if range.kind == kind && range.subtype == "*" {
            1
        } else if range.kind == "*" && range.subtype == "*" {
            0
        } else {
            continue;
        };
        if best.map(|(s, _)| specificity > s).unwrap_or(true) {
            best = Some((specificity, range.quality));
        }
    }
    best.map(|(_, quality)| quality)
}
