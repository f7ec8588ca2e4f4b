//! Cursor pagination.
//!
//! List endpoints take an optional opaque `cursor` and answer with an optional
//! `cursor` next to their items. A present cursor means more results may
//! exist; the client never inspects or builds one, it only hands back what
//! the server returned.

use futures::{Stream, StreamExt, stream};
use smol_str::SmolStr;

use super::{RespOutput, XrpcClient, XrpcRequest};
use crate::error::XrpcResult;

/// One page of a cursor-paginated listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Continuation token, absent on the last page
    pub cursor: Option<SmolStr>,
    /// Items on this page
    pub items: Vec<T>,
}

impl<T> Page<T> {
    /// Whether the server signalled that more results may follow.
    pub fn has_more(&self) -> bool {
        self.cursor.is_some() && !self.items.is_empty()
    }
}

/// A list request that accepts a continuation cursor.
pub trait CursorRequest: XrpcRequest + Clone {
    /// Element type of the listing
    type Item;

    /// Replace the request's cursor.
    fn set_cursor(&mut self, cursor: Option<SmolStr>);

    /// Split an output into its cursor and items.
    fn into_page(output: RespOutput<Self::Response>) -> Page<Self::Item>;
}

/// Lazily walk every page of a listing, yielding items in order.
///
/// Starts from whatever cursor `request` already carries. A page is only
/// fetched once the consumer has drained the previous one. The walk stops
/// after a page without a cursor or with no items; the first error is yielded
/// and ends the stream. To resume elsewhere, persist the last cursor and
/// start a new walk from it.
pub fn paginate<'c, C, R>(client: &'c C, request: R) -> impl Stream<Item = XrpcResult<R::Item>> + 'c
where
    C: XrpcClient + Sync,
    R: CursorRequest + Send + Sync + 'c,
    R::Response: Send + Sync,
    R::Item: 'c,
{
    stream::unfold(Some(request), move |next| async move {
        let request = next?;
        let page = match client.send(request.clone()).await {
            Ok(response) => match response.into_output() {
                Ok(output) => R::into_page(output),
                Err(e) => return Some((vec![Err(e)], None)),
            },
            Err(e) => return Some((vec![Err(e)], None)),
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            nsid = R::NSID,
            items = page.items.len(),
            more = page.has_more(),
            "fetched page"
        );

        let following = if page.has_more() {
            let mut request = request;
            request.set_cursor(page.cursor);
            Some(request)
        } else {
            None
        };
        Some((page.items.into_iter().map(Ok).collect(), following))
    })
    .flat_map(stream::iter)
}
