use std::sync::LazyLock;

use regex::Regex;
use url::Url;

static BOOK_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(/(?:en/)?book/)(?:show|details)/(\d+)").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookLink {
    pub link: String,
    pub id: String,
}

/// Resolve `href` against `base` and normalize it to the canonical
/// `/book/show/<id>` form: query and fragment stripped, `/details/` spellings
/// rewritten to `/show/`, slug suffixes dropped. An optional leading `/en/`
/// segment is preserved.
///
/// Returns `None` when the reference does not carry a numeric book id;
/// callers skip such candidates.
pub fn canonicalize_book_link(href: &str, base: &Url) -> Option<BookLink> {
    let resolved = base.join(href.trim()).ok()?;
    let caps = BOOK_PATH_RE.captures(resolved.path())?;
    let id = caps[2].to_owned();

    let host = resolved.host_str()?;
    let port = match resolved.port() {
        Some(port) => format!(":{port}"),
        None => String::new(),
    };
    let link = format!("{}://{host}{port}{}show/{id}", resolved.scheme(), &caps[1]);

    Some(BookLink { link, id })
}
