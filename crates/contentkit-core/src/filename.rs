//! GUID tagging for content file names.
//!
//! Content files carry their identity in the name:
//! `{dir}{basename}_{GUID}{.ext}[#fragment]`. The GUID is the canonical
//! 36-character hyphenated form, optionally wrapped in braces. Everything
//! after the last `#` is a locator fragment (`topic.xml#/1234`) and passes
//! through every operation untouched, as does the directory prefix.
//!
//! Detection is conservative: a tail that is the wrong length or not valid
//! hex is "no GUID", never an error.

use uuid::Uuid;

/// Length of a hyphenated GUID string.
pub const GUID_LEN: usize = 36;

/// Extension used by [`add_guid`] when the name has no file-name component.
pub const DEFAULT_EXTENSION: &str = ".xml";

/// A file locator split into the pieces the GUID operations rearrange.
#[derive(Debug, Clone, Copy)]
struct Parts<'a> {
    dir: &'a str,
    stem: &'a str,
    ext: &'a str,
    fragment: &'a str,
}

impl<'a> Parts<'a> {
    fn of(name: &'a str) -> Self {
        let (rest, fragment) = split_fragment(name);
        let (dir, file) = split_dir(rest);
        let (stem, ext) = split_extension(file);
        Self {
            dir,
            stem,
            ext,
            fragment,
        }
    }

    fn has_file_name(&self) -> bool {
        !self.stem.trim().is_empty() || !self.ext.trim().is_empty()
    }
}

fn split_fragment(name: &str) -> (&str, &str) {
    name.rfind('#').map_or((name, ""), |i| name.split_at(i))
}

/// Directory prefix (separator included) and file-name component.
fn split_dir(path: &str) -> (&str, &str) {
    path.rfind(['/', '\\'])
        .map_or(("", path), |i| path.split_at(i + 1))
}

/// The extension runs from the last `.` on; a trailing dot is an extension of `"."`.
fn split_extension(file: &str) -> (&str, &str) {
    file.rfind('.').map_or((file, ""), |i| file.split_at(i))
}

/// Extension of the file-name component of `name` (dot included), ignoring
/// the directory and fragment.
pub(crate) fn extension(name: &str) -> &str {
    Parts::of(name).ext
}

/// Parse a hyphenated GUID, with or without surrounding braces.
fn parse_canonical(text: &str) -> Option<Uuid> {
    let inner = text
        .strip_prefix('{')
        .and_then(|t| t.strip_suffix('}'))
        .unwrap_or(text);

    if inner.len() != GUID_LEN {
        return None;
    }

    Uuid::try_parse(inner).ok()
}

/// GUID at the end of a basename: the text after the last `_`, or the whole
/// basename when it has no `_`.
fn guid_tail(stem: &str) -> Option<Uuid> {
    if stem.len() < GUID_LEN {
        return None;
    }

    let tail = stem.rfind('_').map_or(stem, |i| &stem[i + 1..]);
    parse_canonical(tail)
}

fn extract_guid(name: &str) -> Option<Uuid> {
    if name.trim().is_empty() {
        return None;
    }
    guid_tail(Parts::of(name).stem)
}

/// Whether the basename of `name` ends in a GUID.
///
/// ```
/// use contentkit_core::filename::contains_guid;
///
/// assert!(contains_guid("topic_44935658-48B8-4F73-BC4C-8971570EE160.xml#/12"));
/// assert!(!contains_guid("topic_1234.xml"));
/// ```
#[must_use]
pub fn contains_guid(name: &str) -> bool {
    extract_guid(name).is_some()
}

/// The GUID embedded in `name`, or the nil GUID when there is none.
#[must_use]
pub fn parse_guid(name: &str) -> Uuid {
    extract_guid(name).unwrap_or_else(Uuid::nil)
}

/// Tag `name` with `guid`, using [`DEFAULT_EXTENSION`] for blank names.
#[must_use]
pub fn add_guid(name: &str, guid: Uuid) -> String {
    add_guid_with_extension(name, guid, DEFAULT_EXTENSION)
}

/// Tag `name` with `guid`.
///
/// - A name that already carries a GUID is returned unchanged.
/// - A name with no file-name component becomes `{dir}{guid}{default_ext}`.
/// - Anything else becomes `{dir}{basename}_{guid}{ext}{fragment}`.
#[must_use]
pub fn add_guid_with_extension(name: &str, guid: Uuid, default_ext: &str) -> String {
    if contains_guid(name) {
        return name.to_string();
    }

    let parts = Parts::of(name);

    if !parts.has_file_name() {
        let ext = if default_ext.is_empty() || default_ext.starts_with('.') {
            default_ext.to_string()
        } else {
            format!(".{default_ext}")
        };
        return format!("{}{guid}{ext}{}", parts.dir, parts.fragment);
    }

    format!("{}{}_{guid}{}{}", parts.dir, parts.stem, parts.ext, parts.fragment)
}

/// Drop the `_{GUID}` tail from the basename of `name`.
///
/// The directory, extension and fragment are kept. Names without a GUID,
/// and names whose basename is nothing but a GUID, are returned unchanged.
///
/// ```
/// use contentkit_core::filename::remove_guid;
///
/// assert_eq!(
///     remove_guid("filename_{44935658-48B8-4F73-BC4C-8971570EE160}.xml#_abcd/1234"),
///     "filename.xml#_abcd/1234"
/// );
/// ```
#[must_use]
pub fn remove_guid(name: &str) -> String {
    if !contains_guid(name) {
        return name.to_string();
    }

    let parts = Parts::of(name);
    if parts.stem.len() <= GUID_LEN {
        return name.to_string();
    }

    let stem = parts.stem.rfind('_').map_or(parts.stem, |i| &parts.stem[..i]);
    format!("{}{stem}{}{}", parts.dir, parts.ext, parts.fragment)
}

/// File-name component of `name` with any GUID removed.
///
/// Unlike [`remove_guid`], the directory and fragment are dropped; this is
/// the name shown to people.
#[must_use]
pub fn strip_guid(name: &str) -> String {
    let parts = Parts::of(name);
    remove_guid(&format!("{}{}", parts.stem, parts.ext))
}

/// Insert `suffix` into a file name just before its last `_` segment.
///
/// `dir/topic_{GUID}.xml#a` with `v2` becomes `dir/topic_v2_{GUID}.xml#a`.
/// A file name without `_` gets the suffix in front: `v2_topic.xml`.
#[must_use]
pub fn append_file_name_suffix(name: &str, suffix: &str) -> String {
    if name.trim().is_empty() {
        return name.to_string();
    }

    let (rest, fragment) = split_fragment(name);
    let (dir, file) = split_dir(rest);
    let file = match file.rfind('_') {
        Some(i) => format!("{}_{suffix}{}", &file[..i], &file[i..]),
        None => format!("{suffix}_{file}"),
    };

    format!("{dir}{file}{fragment}")
}

/// Insert `suffix` into `text` just before its last `_` segment, or append
/// `_{suffix}` when there is none.
#[must_use]
pub fn append_suffix(text: &str, suffix: &str) -> String {
    if text.trim().is_empty() {
        return text.to_string();
    }

    match text.rfind('_') {
        Some(i) => format!("{}_{suffix}{}", &text[..i], &text[i..]),
        None => format!("{text}_{suffix}"),
    }
}
