//! Reference extraction: pulls image filenames out of arbitrary text.
//!
//! Scene descriptors come in many shapes (Babylon `.babylon` JSON, hand-written
//! JS, plain text lists), so no schema is assumed. Three pattern families run
//! over the whole text, in order, into one accumulating set:
//!
//! | # | Pattern | Example match |
//! |---|---------|---------------|
//! | 1 | double-quoted string ending in an image extension | `"textures/Hero.PNG"` |
//! | 2 | single-quoted string ending in an image extension | `'sword.png'` |
//! | 3 | bare path-like token (`A-Za-z0-9_-/\.`) ending in an image extension | `maps\armor.png` |
//!
//! Every match is reduced to its basename and lower-cased, so `"a/B.png"` and
//! `b.PNG` collapse into the same key `b.png`. A later pattern may add names
//! an earlier one did not (a quoted `"my file.png"` also yields the bare token
//! `file.png`); duplicates simply fold through set semantics.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Image extensions recognized both in text references and on disk.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp", "tiff", "tif"];

// `tiff` must precede `tif`: the bare-token family has no closing delimiter.
const EXT_ALTERNATION: &str = "jpg|jpeg|png|gif|bmp|webp|tiff|tif";

static PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    let build = |body: String| Regex::new(&body).expect("reference pattern must compile");
    [
        build(format!(r#"(?i)"([^"]*\.(?:{EXT_ALTERNATION}))""#)),
        build(format!(r#"(?i)'([^']*\.(?:{EXT_ALTERNATION}))'"#)),
        build(format!(r#"(?i)([a-zA-Z0-9_\-/\\.]+\.(?:{EXT_ALTERNATION}))"#)),
    ]
});

/// Extract the set of referenced image basenames (lower-cased) from `text`.
///
/// Never fails: unterminated quotes just don't match their pattern.
///
/// ```
/// # use texture_sweep::extract::extract;
/// let refs = extract(r#"{"albedo": "tex/Hero.PNG"} 'sword.png' armor.png"#);
/// assert_eq!(
///     refs.into_iter().collect::<Vec<_>>(),
///     vec!["armor.png", "hero.png", "sword.png"]
/// );
/// ```
pub fn extract(text: &str) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    for pattern in PATTERNS.iter() {
        for caps in pattern.captures_iter(text) {
            let matched = caps.get(1).map_or("", |m| m.as_str());
            if let Some(name) = reference_key(matched) {
                names.insert(name);
            }
        }
    }
    names
}

/// Normalize a path-ish string to its reference key: basename, lower-cased.
///
/// Both `/` and `\` separate directories; descriptors authored on Windows
/// are as common as POSIX ones. Returns `None` for an empty basename.
pub fn reference_key(raw: &str) -> Option<String> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    if base.is_empty() {
        None
    } else {
        Some(base.to_lowercase())
    }
}

/// Whether a filename carries one of the [`IMAGE_EXTENSIONS`] (case-insensitive).
///
/// A dotfile such as `.png` has no stem and therefore no extension.
pub fn has_image_extension(name: &str) -> bool {
    name.rsplit_once('.').is_some_and(|(stem, ext)| {
        !stem.trim_start_matches('.').is_empty()
            && IMAGE_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext))
    })
}
