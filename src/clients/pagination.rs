//! Cursor-based pagination over `Link` headers.
//!
//! Shopify list endpoints return a `Link` header of the form
//! `<url>; rel="next", <url>; rel="previous"`. [`PageCursor`] extracts the two
//! URLs and [`Paginator`] follows `next` until it runs out.
//!
//! See <https://shopify.dev/tutorials/make-paginated-requests-to-rest-admin-api>.

use tokio_util::sync::CancellationToken;

use crate::clients::errors::HttpError;
use crate::clients::headers::HeaderSet;
use crate::clients::http_client::HttpClient;
use crate::clients::http_request::{HttpMethod, HttpRequest};
use crate::clients::http_response::HttpResponse;

/// The next and previous page URLs of a paginated response.
///
/// # Example
///
/// ```rust
/// use httpshopify::PageCursor;
///
/// let cursor = PageCursor::parse(
///     r#"<https://shop.myshopify.com/admin/api/2021-04/orders.json?page_info=abc>; rel="next""#,
/// );
/// assert!(cursor.has_next());
/// assert!(!cursor.has_previous());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageCursor {
    /// URL of the next page.
    pub next: Option<String>,
    /// URL of the previous page.
    pub previous: Option<String>,
}

impl PageCursor {
    /// Parses a `Link` header value.
    ///
    /// Segments without a `<...>` URL or without a `next`/`previous`
    /// relation are skipped; an empty header yields an empty cursor.
    #[must_use]
    pub fn parse(link_header: &str) -> Self {
        let mut cursor = Self::default();

        for segment in link_header.split(',') {
            let Some((url, params)) = Self::split_segment(segment) else {
                continue;
            };

            match Self::relation(params) {
                Some(Relation::Next) => cursor.next = Some(url.to_string()),
                Some(Relation::Previous) => cursor.previous = Some(url.to_string()),
                None => {}
            }
        }

        cursor
    }

    /// Returns `true` if there is a next page.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.next.as_deref().is_some_and(|url| !url.is_empty())
    }

    /// Returns `true` if there is a previous page.
    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.previous.as_deref().is_some_and(|url| !url.is_empty())
    }

    /// Returns the `page_info` query value of the next page URL.
    #[must_use]
    pub fn next_page_info(&self) -> Option<&str> {
        self.next.as_deref().and_then(Self::page_info)
    }

    /// Returns the `page_info` query value of the previous page URL.
    #[must_use]
    pub fn previous_page_info(&self) -> Option<&str> {
        self.previous.as_deref().and_then(Self::page_info)
    }

    fn split_segment(segment: &str) -> Option<(&str, &str)> {
        let start = segment.find('<')?;
        let rest = &segment[start + 1..];
        let end = rest.find('>')?;
        let url = rest[..end].trim();
        if url.is_empty() {
            return None;
        }
        Some((url, &rest[end + 1..]))
    }

    fn relation(params: &str) -> Option<Relation> {
        params.split(';').find_map(|param| {
            let (key, value) = param.split_once('=')?;
            if !key.trim().eq_ignore_ascii_case("rel") {
                return None;
            }
            value
                .trim()
                .trim_matches(|c| c == '"' || c == '\'')
                .split_whitespace()
                .find_map(|rel| match rel.to_ascii_lowercase().as_str() {
                    "next" => Some(Relation::Next),
                    "previous" | "prev" => Some(Relation::Previous),
                    _ => None,
                })
        })
    }

    fn page_info(url: &str) -> Option<&str> {
        let (_, query) = url.split_once('?')?;
        query.split('&').find_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            (key == "page_info").then_some(value)
        })
    }
}

enum Relation {
    Next,
    Previous,
}

/// Walks a paginated listing by following `next` links.
///
/// The loop is unbounded by default; set [`max_pages`](Self::max_pages) to
/// guard against an endpoint that never stops returning a `next` link.
///
/// # Example
///
/// ```rust,ignore
/// let mut pages = client.paginate(config.endpoint_url("orders.json?status=any"));
/// while let Some(page) = pages.next_page().await {
///     let page = page?;
///     println!("{} bytes", page.body.len());
/// }
/// ```
#[derive(Debug)]
pub struct Paginator<'a> {
    client: &'a HttpClient,
    next_url: Option<String>,
    headers: HeaderSet,
    cancel: Option<CancellationToken>,
    max_pages: Option<usize>,
    pages_fetched: usize,
}

impl<'a> Paginator<'a> {
    pub(crate) fn new(client: &'a HttpClient, first_url: String) -> Self {
        Self {
            client,
            next_url: Some(first_url),
            headers: HeaderSet::new(),
            cancel: None,
            max_pages: None,
            pages_fetched: 0,
        }
    }

    /// Sends these per-call headers with every page request.
    #[must_use]
    pub fn headers(mut self, headers: HeaderSet) -> Self {
        self.headers = headers;
        self
    }

    /// Stops after at most `max_pages` pages.
    #[must_use]
    pub const fn max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    /// Makes every page request cancellable through `token`.
    #[must_use]
    pub fn cancel_on(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Number of pages fetched so far.
    #[must_use]
    pub const fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Returns `true` if the page guard stopped the walk while a `next` link
    /// was still outstanding.
    #[must_use]
    pub fn truncated(&self) -> bool {
        self.next_url.is_some() && self.max_pages.is_some_and(|max| self.pages_fetched >= max)
    }

    /// Fetches the next page, or returns `None` when the listing is exhausted.
    ///
    /// An error ends the walk: later calls return `None`.
    pub async fn next_page(&mut self) -> Option<Result<HttpResponse, HttpError>> {
        if self.max_pages.is_some_and(|max| self.pages_fetched >= max) {
            if self.next_url.is_some() {
                tracing::warn!(
                    pages = self.pages_fetched,
                    "pagination stopped at page limit with more pages available"
                );
            }
            return None;
        }
        let url = self.next_url.take()?;

        let request = match HttpRequest::builder(HttpMethod::Get, url)
            .headers(self.headers.clone())
            .build()
        {
            Ok(request) => request,
            Err(e) => return Some(Err(e.into())),
        };

        let result = match &self.cancel {
            Some(token) => self.client.execute_with_cancel(&request, token).await,
            None => self.client.execute(&request).await,
        };

        if let Ok(page) = &result {
            self.pages_fetched += 1;
            self.next_url = page.cursor().next.filter(|next| !next.is_empty());
        }
        Some(result)
    }

    /// Fetches every remaining page.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered; pages fetched before it are dropped.
    pub async fn collect_all(mut self) -> Result<Vec<HttpResponse>, HttpError> {
        let mut pages = Vec::new();
        while let Some(page) = self.next_page().await {
            pages.push(page?);
        }
        Ok(pages)
    }
}
