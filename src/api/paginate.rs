//! Generic cursor-following pagination.
//!
//! List endpoints return one page of items plus a link to the next page.
//! [`paginate`] follows those links until the API reports no further pages
//! and concatenates the items in arrival order. It is defined once and every
//! list operation supplies a page-fetch closure over its concrete element
//! type instead of re-implementing the loop.

use super::ApiResult;
use serde::Deserialize;
use std::future::Future;

/// One bounded slice of a remote list result.
#[derive(Debug)]
pub struct Page<T> {
    /// Items of this page, in API order
    pub items: Vec<T>,
    /// Continuation URL; `None` or empty on the terminal page
    pub next: Option<String>,
}

/// Pagination links as they appear in list envelopes.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Links {
    /// Page links, absent on single-page results
    #[serde(default)]
    pub pages: Option<PageLinks>,
}

/// The `pages` object inside [`Links`].
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PageLinks {
    /// URL of the next page, absent on the last one
    #[serde(default)]
    pub next: Option<String>,
}

impl Links {
    /// The continuation URL, if the envelope carries one.
    pub fn next_url(&self) -> Option<String> {
        self.pages
            .as_ref()
            .and_then(|p| p.next.clone())
            .filter(|u| !u.is_empty())
    }
}

/// Follow continuation cursors until the collection is complete.
///
/// `fetch` is called with `None` for the first page and with the previous
/// page's continuation URL afterwards. On any fetch error the partial
/// results are discarded and the error is returned; the caller never sees a
/// silently truncated collection. A zero-item first page without a
/// continuation URL yields an empty collection.
pub async fn paginate<T, F, Fut>(mut fetch: F) -> ApiResult<Vec<T>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = ApiResult<Page<T>>>,
{
    let mut all = Vec::new();
    let mut token: Option<String> = None;

    loop {
        let page = fetch(token.take()).await?;
        all.extend(page.items);

        match page.next {
            Some(next) if !next.is_empty() => token = Some(next),
            _ => return Ok(all),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use std::cell::Cell;

    #[tokio::test]
    async fn test_concatenates_pages_in_arrival_order() {
        let call = Cell::new(0usize);

        let result = paginate(|token| {
            let n = call.get();
            call.set(n + 1);
            async move {
                match n {
                    0 => {
                        assert_eq!(token, None);
                        Ok(Page { items: vec!["a", "b"], next: Some("p2".into()) })
                    }
                    1 => {
                        assert_eq!(token.as_deref(), Some("p2"));
                        Ok(Page { items: vec!["c"], next: Some("p3".into()) })
                    }
                    _ => {
                        assert_eq!(token.as_deref(), Some("p3"));
                        Ok(Page { items: vec![], next: None })
                    }
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(result, vec!["a", "b", "c"]);
        assert_eq!(call.get(), 3);
    }

    #[tokio::test]
    async fn test_error_discards_partial_results() {
        let call = Cell::new(0usize);

        let result: ApiResult<Vec<&str>> = paginate(|_| {
            let n = call.get();
            call.set(n + 1);
            async move {
                match n {
                    0 => Ok(Page { items: vec!["a", "b"], next: Some("p2".into()) }),
                    _ => Err(ApiError::Pagination("bad continuation token".into())),
                }
            }
        })
        .await;

        let err = result.unwrap_err();
        assert!(matches!(err, ApiError::Pagination(_)));
    }

    #[tokio::test]
    async fn test_empty_first_page_is_not_an_error() {
        let result: Vec<&str> = paginate(|_| async { Ok(Page { items: vec![], next: None }) })
            .await
            .unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_empty_string_cursor_terminates() {
        let call = Cell::new(0usize);
        let result = paginate(|_| {
            let n = call.get();
            call.set(n + 1);
            async move { Ok(Page { items: vec![n], next: Some(String::new()) }) }
        })
        .await
        .unwrap();

        assert_eq!(result, vec![0]);
        assert_eq!(call.get(), 1);
    }

    #[test]
    fn test_links_next_url() {
        let links: Links =
            serde_json::from_str(r#"{"pages":{"next":"https://x/v2/servers?page=2"}}"#).unwrap();
        assert_eq!(links.next_url().as_deref(), Some("https://x/v2/servers?page=2"));

        let links: Links = serde_json::from_str("{}").unwrap();
        assert!(links.next_url().is_none());

        let links: Links = serde_json::from_str(r#"{"pages":{"next":""}}"#).unwrap();
        assert!(links.next_url().is_none());
    }
}
