//! Continuation-token pagination as a lazy, single-pass page sequence.

use async_trait::async_trait;

use sns_audit_core::AppResult;

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Opaque token for the next page; absent on the last page.
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    /// Creates a page.
    #[must_use]
    pub fn new(items: Vec<T>, next_token: Option<String>) -> Self {
        Self { items, next_token }
    }

    /// Creates the final page of a listing.
    #[must_use]
    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, None)
    }
}

/// A listing call that can be resumed with a continuation token.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Item type of the listing.
    type Item: Send;

    /// Fetches the page that starts at `next_token`, or the first page.
    async fn fetch_page(&self, next_token: Option<String>) -> AppResult<Page<Self::Item>>;
}

#[derive(Debug)]
enum CursorState {
    Start,
    Continue(String),
    Exhausted,
}

/// Lazy sequence of pages over a [`PageSource`].
///
/// The cursor is finite: it ends once a page arrives without a continuation
/// token. It is not restartable; after an error it yields no further pages.
pub struct PageCursor<S> {
    source: S,
    state: CursorState,
}

impl<S: PageSource> PageCursor<S> {
    /// Creates a cursor positioned before the first page.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: CursorState::Start,
        }
    }

    /// Fetches the next page, or `None` once the listing is exhausted.
    pub async fn next_page(&mut self) -> AppResult<Option<Vec<S::Item>>> {
        let next_token = match std::mem::replace(&mut self.state, CursorState::Exhausted) {
            CursorState::Start => None,
            CursorState::Continue(token) => Some(token),
            CursorState::Exhausted => return Ok(None),
        };

        let page = self.source.fetch_page(next_token).await?;
        // An empty token ends the listing like a missing one.
        self.state = match page.next_token.filter(|token| !token.is_empty()) {
            Some(token) => CursorState::Continue(token),
            None => CursorState::Exhausted,
        };

        Ok(Some(page.items))
    }

    /// Drains every remaining page into one collection.
    pub async fn collect_all(mut self) -> AppResult<Vec<S::Item>> {
        let mut items = Vec::new();
        while let Some(page) = self.next_page().await? {
            items.extend(page);
        }

        Ok(items)
    }
}
