//! File-name cleanup, MIME lookup by extension and path-separator helpers.
//!
//! Everything here is string work on names; nothing touches the filesystem.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::filename;

/// MIME type returned by [`find_mime_type`] for unknown extensions.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Characters [`clean_file_name`] always removes, on top of the caller's list.
const RESERVED_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Characters [`clean_file_name`] removes when the caller gives no list.
pub const UNSAFE_CHARS: &[char] = &['\'', '#', '&', ';', '%', '!', '"', ':', '@', '{', '}', '$'];

const XML_EXTENSIONS: &[&str] = &["xml", "dita", "ditamap", "ditaval"];

const BROWSER_IMAGE_EXTENSIONS: &[&str] =
    &["apng", "bmp", "gif", "ico", "jfif", "jpeg", "jpe", "jpg", "png", "svg"];

const THUMBNAIL_EXTENSIONS: &[&str] =
    &["apng", "bmp", "gif", "ico", "jfif", "jpeg", "jpe", "jpg", "png", "tif", "tiff"];

const IMAGE_TYPES: &[(&str, &str)] = &[
    ("apng", "image/png"),
    ("bmp", "image/bmp"),
    ("cgm", "image/cgm"),
    ("djv", "image/vnd.djvu"),
    ("djvu", "image/vnd.djvu"),
    ("gif", "image/gif"),
    ("ico", "image/x-icon"),
    ("ief", "image/ief"),
    ("jfif", "image/jpeg"),
    ("jp2", "image/jp2"),
    ("jpe", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("jpg", "image/jpeg"),
    ("mac", "image/x-macpaint"),
    ("pbm", "image/x-portable-bitmap"),
    ("pct", "image/pict"),
    ("pgm", "image/x-portable-graymap"),
    ("pic", "image/pict"),
    ("pict", "image/pict"),
    ("png", "image/png"),
    ("pnm", "image/x-portable-anymap"),
    ("pnt", "image/x-macpaint"),
    ("pntg", "image/x-macpaint"),
    ("ppm", "image/x-portable-pixmap"),
    ("qti", "image/x-quicktime"),
    ("qtif", "image/x-quicktime"),
    ("ras", "image/x-cmu-raster"),
    ("rgb", "image/x-rgb"),
    ("svg", "image/svg+xml"),
    ("svgz", "image/svg+xml"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("wbmp", "image/vnd.wap.wbmp"),
    ("xbm", "image/x-xbitmap"),
    ("xpm", "image/x-xpixmap"),
    ("xwd", "image/x-xwindowdump"),
];

const DOCUMENT_TYPES: &[(&str, &str)] = &[
    ("ai", "application/postscript"),
    ("asc", "text/plain"),
    ("atom", "application/atom+xml"),
    ("avi", "video/x-msvideo"),
    ("bin", "application/octet-stream"),
    ("css", "text/css"),
    ("csv", "application/csv"),
    ("ditamap", "text/xml"),
    ("doc", "application/msword"),
    ("docx", "application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
    ("dotx", "application/vnd.openxmlformats-officedocument.wordprocessingml.template"),
    ("dtd", "application/xml-dtd"),
    ("eps", "application/postscript"),
    ("exe", "application/octet-stream"),
    ("gtar", "application/x-gtar"),
    ("htm", "text/html"),
    ("html", "text/html"),
    ("ics", "text/calendar"),
    ("js", "application/x-javascript"),
    ("latex", "application/x-latex"),
    ("m4a", "audio/mp4a-latm"),
    ("m4v", "video/x-m4v"),
    ("mathml", "application/mathml+xml"),
    ("mid", "audio/midi"),
    ("midi", "audio/midi"),
    ("mov", "video/quicktime"),
    ("mp3", "audio/mpeg"),
    ("mp4", "video/mp4"),
    ("mpeg", "video/mpeg"),
    ("mpg", "video/mpeg"),
    ("ogg", "application/ogg"),
    ("pdf", "application/pdf"),
    ("ppt", "application/vnd.ms-powerpoint"),
    ("pptx", "application/vnd.openxmlformats-officedocument.presentationml.presentation"),
    ("ps", "application/postscript"),
    ("qt", "video/quicktime"),
    ("rdf", "application/rdf+xml"),
    ("rtf", "text/rtf"),
    ("sgm", "text/sgml"),
    ("sgml", "text/sgml"),
    ("sh", "application/x-sh"),
    ("swf", "application/x-shockwave-flash"),
    ("tar", "application/x-tar"),
    ("tex", "application/x-tex"),
    ("tsv", "text/tab-separated-values"),
    ("txt", "text/plain"),
    ("wav", "audio/x-wav"),
    ("xht", "application/xhtml+xml"),
    ("xhtml", "application/xhtml+xml"),
    ("xls", "application/vnd.ms-excel"),
    ("xlsx", "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
    ("xml", "application/xml"),
    ("xsl", "application/xml"),
    ("xslt", "application/xslt+xml"),
    ("zip", "application/zip"),
];

/// Content types that parse as XML or HTML.
const XML_CONTENT_TYPES: &[&str] = &["application/xml", "text/html", "text/xml"];

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("BUG: invalid WHITESPACE_RE regex literal"));

/// Remove unsafe characters from a file name.
///
/// Whitespace runs become `_` and [`UNSAFE_CHARS`] are dropped, along with
/// characters no common filesystem accepts (`<>:"/\|?*` and control codes).
///
/// ```
/// use contentkit_core::files::clean_file_name;
///
/// assert_eq!(clean_file_name("Q3 report: draft #2.xml"), "Q3_report_draft_2.xml");
/// ```
#[must_use]
pub fn clean_file_name(name: &str) -> String {
    clean_file_name_with(name, Some("_"), UNSAFE_CHARS)
}

/// [`clean_file_name`] with a caller-chosen space replacement and removal list.
///
/// `space_to: None` leaves whitespace alone. The reserved filesystem
/// characters are removed whatever `invalid` holds.
#[must_use]
pub fn clean_file_name_with(name: &str, space_to: Option<&str>, invalid: &[char]) -> String {
    let spaced = match space_to {
        Some(replacement) => WHITESPACE_RE.replace_all(name, replacement),
        None => name.into(),
    };

    spaced
        .chars()
        .filter(|c| !c.is_control() && !RESERVED_CHARS.contains(c) && !invalid.contains(c))
        .collect()
}

/// Replace each reserved filesystem character (`<>:"/\|?*`) with `-`.
#[must_use]
pub fn format_file_name(name: &str) -> String {
    name.chars()
        .map(|c| if RESERVED_CHARS.contains(&c) { '-' } else { c })
        .collect()
}

/// Lowercased extension of the file-name component, without its dot.
fn extension_key(name: &str) -> String {
    filename::extension(name)
        .trim_start_matches('.')
        .to_ascii_lowercase()
}

fn lookup(table: &[(&str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(ext, _)| *ext == key).map(|(_, mime)| *mime)
}

/// MIME type for the extension of `name`, if it is a known one.
#[must_use]
pub fn mime_type(name: &str) -> Option<&'static str> {
    let key = extension_key(name);
    if key.is_empty() {
        return None;
    }
    lookup(IMAGE_TYPES, &key).or_else(|| lookup(DOCUMENT_TYPES, &key))
}

/// MIME type for the extension of `name`, or [`DEFAULT_MIME_TYPE`].
///
/// ```
/// use contentkit_core::files::find_mime_type;
///
/// assert_eq!(find_mime_type("maps/root.ditamap#top"), "text/xml");
/// assert_eq!(find_mime_type("blob.unknown"), "application/octet-stream");
/// ```
#[must_use]
pub fn find_mime_type(name: &str) -> &'static str {
    mime_type(name).unwrap_or(DEFAULT_MIME_TYPE)
}

/// Whether `content_type` is XML, HTML or a DITA map.
#[must_use]
pub fn is_xml_content(content_type: &str) -> bool {
    let content_type = content_type.trim().to_ascii_lowercase();
    XML_CONTENT_TYPES.contains(&content_type.as_str())
}

/// Whether the extension of `name` marks an XML document (`.xml`, `.dita`,
/// `.ditamap` or `.ditaval`).
#[must_use]
pub fn file_is_xml(name: &str) -> bool {
    XML_EXTENSIONS.contains(&extension_key(name).as_str())
}

/// Whether `content_type` is one of the known image types.
#[must_use]
pub fn is_image_content(content_type: &str) -> bool {
    let content_type = content_type.trim().to_ascii_lowercase();
    IMAGE_TYPES.iter().any(|(_, mime)| *mime == content_type)
}

/// Whether `name` has an image extension.
#[must_use]
pub fn is_image_file(name: &str) -> bool {
    is_image_content(find_mime_type(name))
}

/// Whether a browser can display `name` directly.
#[must_use]
pub fn is_browser_image(name: &str) -> bool {
    BROWSER_IMAGE_EXTENSIONS.contains(&extension_key(name).as_str())
}

/// Whether a thumbnail can be rendered for `name`.
#[must_use]
pub fn can_create_thumbnail(name: &str) -> bool {
    THUMBNAIL_EXTENSIONS.contains(&extension_key(name).as_str())
}

/// Last path component of a local path or URL.
///
/// URLs lose their query and fragment; their segments are returned as they
/// appear, still percent-encoded. Anything that does not parse as a URL with
/// a scheme longer than one letter (so `C:\docs\a.xml` stays a path) is split
/// on `/` and `\`.
///
/// ```
/// use contentkit_core::files::file_name;
///
/// assert_eq!(file_name("https://cdn.example.com/img/logo.png?v=2"), "logo.png");
/// assert_eq!(file_name(r"C:\docs\guide.xml"), "guide.xml");
/// ```
#[must_use]
pub fn file_name(path_or_url: &str) -> String {
    if let Ok(url) = Url::parse(path_or_url)
        && url.scheme().len() > 1
    {
        let path = url.path();
        return path.rsplit('/').next().unwrap_or(path).to_string();
    }

    path_or_url
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(path_or_url)
        .to_string()
}

/// Append `separator` to a non-blank directory path that does not already end with it.
#[must_use]
pub fn add_path_separator(path: &str, separator: &str) -> String {
    if path.trim().is_empty() || path.ends_with(separator) {
        path.to_string()
    } else {
        format!("{path}{separator}")
    }
}

/// Drop trailing `separator`s and spaces from a directory path.
///
/// A path that would be left with no separator at all (`C:\` or `docs\`) is
/// returned unchanged, so a root never collapses into a bare name.
#[must_use]
pub fn remove_path_separator(path: &str, separator: char) -> String {
    let trimmed = path.trim_end_matches([' ', separator]);
    if trimmed.contains(separator) {
        trimmed.to_string()
    } else {
        path.to_string()
    }
}
