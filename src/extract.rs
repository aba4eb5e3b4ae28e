use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::formats::BookRecord;
use crate::links::canonicalize_book_link;

/// Containers tried in order when narrowing the document to the post body.
const SCOPE_SELECTORS: &[&str] = &[
    ".articleBody",
    ".postBody",
    ".entry-content",
    ".content",
    "article",
    "#content",
    "#main",
    "body",
];

/// Card strategies tried in order; the first one that yields any record wins.
const CARD_STRATEGIES: &[(&str, &str)] = &[
    ("tooltip", ".js-tooltipTrigger.book"),
    (
        "generic",
        ".gr-list li, ol li, .listCard, .bookCard, article, figure, .bookBox",
    ),
];

const AUTHOR_SELECTORS: &str =
    "a[href*='/author/show/'], .authorName, a.authorName, .author, .byline, [itemprop='author']";

static COVER_SRC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/assets/nocover|/books/|/covers/").unwrap());

/// Extract book cards from a challenge page.
///
/// Returns records in document order of first occurrence, unique by book id.
/// Never fails: markup with no recognizable cards yields an empty vec.
pub fn extract_cards(html: &str, base_url: &Url) -> Vec<BookRecord> {
    let document = Html::parse_document(html);
    let scope = choose_scope(&document);

    for (strategy, card_selector) in CARD_STRATEGIES.iter().copied() {
        let records = collect_cards(scope, card_selector, base_url);
        if !records.is_empty() {
            tracing::debug!(strategy, count = records.len(), "extracted book cards");
            return records;
        }
        tracing::debug!(strategy, "card strategy matched nothing");
    }

    Vec::new()
}

fn choose_scope(document: &Html) -> ElementRef<'_> {
    for scope in SCOPE_SELECTORS {
        let selector = Selector::parse(scope).unwrap();
        if let Some(node) = document.select(&selector).next() {
            return node;
        }
    }
    document.root_element()
}

fn collect_cards(scope: ElementRef<'_>, card_selector: &str, base_url: &Url) -> Vec<BookRecord> {
    let cards = Selector::parse(card_selector).unwrap();
    let anchor = Selector::parse("a[href*='/book/']").unwrap();

    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for card in scope.select(&cards) {
        let Some(a) = card.select(&anchor).next() else {
            continue;
        };
        let Some(href) = a.value().attr("href") else {
            continue;
        };
        let Some(book_link) = canonicalize_book_link(href, base_url) else {
            continue;
        };
        let Some(title) = card_title(card, a) else {
            continue;
        };

        // First occurrence of an id wins, field values included.
        if !seen.insert(book_link.id.clone()) {
            continue;
        }

        records.push(BookRecord {
            title,
            author: card_author(card),
            link: book_link.link,
            cover: card_cover(card),
            id: Some(book_link.id),
        });
    }

    records
}

/// Title lookups in preference order: image alt text, the anchor's `title`
/// attribute, the anchor's visible text.
fn card_title(card: ElementRef<'_>, anchor: ElementRef<'_>) -> Option<String> {
    [
        image_alt(card),
        anchor.value().attr("title").map(collapse_whitespace),
        Some(element_text(anchor)),
    ]
    .into_iter()
    .flatten()
    .find(|title| !title.is_empty())
}

fn card_author(card: ElementRef<'_>) -> String {
    let selector = Selector::parse(AUTHOR_SELECTORS).unwrap();
    card.select(&selector)
        .next()
        .map(element_text)
        .unwrap_or_default()
}

/// Cover URL, kept only when it looks like an actual cover asset.
fn card_cover(card: ElementRef<'_>) -> String {
    let selector = Selector::parse("img").unwrap();
    card.select(&selector)
        .next()
        .and_then(|img| img.value().attr("src"))
        .filter(|src| COVER_SRC_RE.is_match(src))
        .map(str::to_owned)
        .unwrap_or_default()
}

fn image_alt(card: ElementRef<'_>) -> Option<String> {
    let selector = Selector::parse("img").unwrap();
    card.select(&selector)
        .next()
        .and_then(|img| img.value().attr("alt"))
        .map(collapse_whitespace)
}

fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://www.goodreads.com/blog/show/summer-challenge").unwrap()
    }

    #[test]
    fn tooltip_cards_extract_in_document_order() {
        let html = r#"
            <html><body><article>
              <div class="js-tooltipTrigger book">
                <a href="/book/show/42-alpha?from=blog#top">
                  <img src="https://img.example/books/42.jpg" alt="Alpha" />
                </a>
              </div>
              <div class="js-tooltipTrigger book">
                <a href="/book/details/7-beta">
                  <img src="https://img.example/covers/7.jpg" alt="Beta" />
                </a>
                <span class="authorName">B. Author</span>
              </div>
            </article></body></html>
        "#;

        let records = extract_cards(html, &base());
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].title, "Alpha");
        assert_eq!(records[0].id.as_deref(), Some("42"));
        assert_eq!(records[0].link, "https://www.goodreads.com/book/show/42");
        assert_eq!(records[0].author, "");
        assert_eq!(records[0].cover, "https://img.example/books/42.jpg");

        assert_eq!(records[1].title, "Beta");
        assert_eq!(records[1].id.as_deref(), Some("7"));
        assert_eq!(records[1].link, "https://www.goodreads.com/book/show/7");
        assert_eq!(records[1].author, "B. Author");
    }

    #[test]
    fn repeated_id_keeps_first_occurrence() {
        let html = r#"
            <html><body><article>
              <div class="js-tooltipTrigger book">
                <a href="/book/show/42"><img src="/books/42.jpg" alt="Alpha" /></a>
              </div>
              <div class="js-tooltipTrigger book">
                <a href="/book/show/42"><img src="/books/42b.jpg" alt="Alpha v2" /></a>
              </div>
            </article></body></html>
        "#;

        let records = extract_cards(html, &base());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Alpha");
    }

    #[test]
    fn rerun_on_identical_markup_is_identical() {
        let html = r#"
            <html><body><article>
              <div class="js-tooltipTrigger book">
                <a href="/book/show/1"><img src="/books/1.jpg" alt="One" /></a>
              </div>
              <div class="js-tooltipTrigger book">
                <a href="/book/show/2"><img src="/books/2.jpg" alt="Two" /></a>
              </div>
            </article></body></html>
        "#;

        assert_eq!(extract_cards(html, &base()), extract_cards(html, &base()));
    }

    #[test]
    fn generic_fallback_engages_when_tooltip_matches_nothing() {
        let html = r#"
            <html><body><div class="entry-content">
              <ol>
                <li><a href="/book/show/9-gamma" title="Gamma">Gamma (link)</a></li>
                <li><a href="/book/show/10-delta" title="Delta">Delta (link)</a></li>
              </ol>
            </div></body></html>
        "#;

        let records = extract_cards(html, &base());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "Gamma");
        assert_eq!(records[1].title, "Delta");
    }

    #[test]
    fn card_without_numeric_id_is_skipped() {
        let html = r#"
            <html><body><article>
              <div class="js-tooltipTrigger book">
                <a href="/book/show/upcoming"><img src="/books/x.jpg" alt="No Id" /></a>
              </div>
              <div class="js-tooltipTrigger book">
                <a href="/book/show/3"><img src="/books/3.jpg" alt="Kept" /></a>
              </div>
            </article></body></html>
        "#;

        let records = extract_cards(html, &base());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Kept");
    }

    #[test]
    fn card_without_any_title_is_skipped() {
        let html = r#"
            <html><body><article>
              <div class="js-tooltipTrigger book">
                <a href="/book/show/5"><img src="/books/5.jpg" /></a>
              </div>
            </article></body></html>
        "#;

        assert!(extract_cards(html, &base()).is_empty());
    }

    #[test]
    fn title_prefers_image_alt_over_anchor_attributes() {
        let html = r#"
            <html><body><article>
              <div class="js-tooltipTrigger book">
                <a href="/book/show/5" title="Anchor Title">Visible text
                  <img src="/books/5.jpg" alt="Alt Title" />
                </a>
              </div>
            </article></body></html>
        "#;

        let records = extract_cards(html, &base());
        assert_eq!(records[0].title, "Alt Title");
    }

    #[test]
    fn title_falls_back_to_anchor_title_then_text() {
        let from_attr = r#"
            <html><body><article>
              <div class="js-tooltipTrigger book">
                <a href="/book/show/5" title="Anchor Title">ignored</a>
              </div>
            </article></body></html>
        "#;
        let from_text = r#"
            <html><body><article>
              <div class="js-tooltipTrigger book">
                <a href="/book/show/5">  Visible   Title </a>
              </div>
            </article></body></html>
        "#;

        assert_eq!(extract_cards(from_attr, &base())[0].title, "Anchor Title");
        assert_eq!(extract_cards(from_text, &base())[0].title, "Visible Title");
    }

    #[test]
    fn cover_outside_recognized_paths_is_dropped() {
        let html = r#"
            <html><body><article>
              <div class="js-tooltipTrigger book">
                <a href="/book/show/5"><img src="https://img.example/banners/5.jpg" alt="Five" /></a>
              </div>
            </article></body></html>
        "#;

        let records = extract_cards(html, &base());
        assert_eq!(records[0].cover, "");
    }

    #[test]
    fn extraction_is_scoped_to_the_first_matching_container() {
        let html = r#"
            <html><body>
              <div class="entry-content">
                <div class="js-tooltipTrigger book">
                  <a href="/book/show/1"><img src="/books/1.jpg" alt="Inside" /></a>
                </div>
              </div>
              <div class="js-tooltipTrigger book">
                <a href="/book/show/2"><img src="/books/2.jpg" alt="Outside" /></a>
              </div>
            </body></html>
        "#;

        let records = extract_cards(html, &base());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Inside");
    }

    #[test]
    fn markup_without_cards_yields_empty() {
        assert!(extract_cards("", &base()).is_empty());
        assert!(extract_cards("<html><body><p>nothing here</p></body></html>", &base()).is_empty());
    }
}
