use std::time::Duration;

use scraper::{Html, Selector};

use crate::fetch::PageFetcher;
use crate::formats::BookRecord;

/// Fields recovered from a book's own detail page. Empty strings mean the
/// page did not yield that field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookPageDetails {
    pub title: String,
    pub author: String,
    pub cover: String,
}

/// Visit detail pages for records still missing an author and fill in what
/// the pages yield, up to `cap` visits. Existing non-empty fields are never
/// overwritten with empty values. Returns how many authors were filled.
///
/// The inter-fetch `delay` is part of the contract with the source site,
/// not an optimization; it is applied after every visit, failed ones
/// included.
pub async fn enrich_missing_authors(
    fetcher: &dyn PageFetcher,
    books: &mut [BookRecord],
    cap: usize,
    delay: Duration,
) -> usize {
    let mut visited = 0_usize;
    let mut filled = 0_usize;

    for book in books.iter_mut() {
        if visited >= cap {
            break;
        }
        if !book.author.is_empty() {
            continue;
        }

        let details = match fetcher.fetch(&book.link).await {
            Ok(html) => parse_book_page(&html),
            Err(err) => {
                tracing::debug!(
                    link = %book.link,
                    error = %format!("{err:#}"),
                    "detail page fetch failed; keeping card-level fields"
                );
                BookPageDetails::default()
            }
        };

        if !details.title.is_empty() {
            book.title = details.title;
        }
        if !details.author.is_empty() {
            book.author = details.author;
            filled += 1;
        }
        if !details.cover.is_empty() {
            book.cover = details.cover;
        }

        visited += 1;
        tokio::time::sleep(delay).await;
    }

    tracing::debug!(visited, filled, "author enrichment pass finished");
    filled
}

/// Parse a book detail page. Prefers the `og:title` composite ("Title by
/// Author | Site"), falling back to heading and author-link selectors.
pub fn parse_book_page(html: &str) -> BookPageDetails {
    let document = Html::parse_document(html);

    let og_title = meta_content(&document, "og:title");
    let og_image = meta_content(&document, "og:image");

    let mut title = String::new();
    let mut author = String::new();
    if !og_title.is_empty() {
        match og_title.split_once(" by ") {
            Some((before, after)) => {
                title = before.trim().to_owned();
                author = after
                    .split('|')
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_owned();
            }
            None => {
                title = og_title.replace("| Goodreads", "").trim().to_owned();
            }
        }
    }

    if title.is_empty()
        && let Some(heading) = select_text(&document, "h1#bookTitle, h1[data-testid='bookTitle']")
    {
        title = heading;
    }
    if author.is_empty()
        && let Some(name) = select_text(
            &document,
            "a.authorName, [data-testid='name'], .ContributorLinksList a, a[href*='/author/show/']",
        )
    {
        author = name;
    }

    let mut cover = og_image;
    if cover.is_empty() {
        let selector = Selector::parse("#coverImage, img.BookCover__image").unwrap();
        cover = document
            .select(&selector)
            .next()
            .and_then(|img| img.value().attr("src"))
            .unwrap_or_default()
            .trim()
            .to_owned();
    }

    BookPageDetails {
        title,
        author,
        cover,
    }
}

fn meta_content(document: &Html, name: &str) -> String {
    let selector =
        Selector::parse(&format!("meta[property='{name}'], meta[name='{name}']")).unwrap();
    document
        .select(&selector)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .unwrap_or_default()
        .trim()
        .to_owned()
}

fn select_text(document: &Html, selectors: &str) -> Option<String> {
    let selector = Selector::parse(selectors).unwrap();
    let element = document.select(&selector).next()?;
    let text = element.text().collect::<Vec<_>>().join(" ");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}
