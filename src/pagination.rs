//! Bounded offset pagination.
//!
//! The [`Paginator`] turns untrusted `page`/`per_page` parameters into a
//! [`PageWindow`] and asks a [`CollectionHandle`] for that slice. It never
//! orders, filters or mutates anything itself.
//!
//! Parsing rules:
//! - `page`: absent or not an integer → 1; otherwise the parsed value, as is.
//! - `per_page`: absent or not an integer → the default; otherwise the parsed
//!   value, clamped down to the maximum.
//!
//! Zero and negative values are passed through unclamped. The resulting
//! limit/offset are handed to the data layer verbatim; see
//! [`MemoryStore`](crate::store::MemoryStore) for how the reference store
//! reads them.

use crate::error::ApiError;
use crate::sanitizer::{IntegerSanitizer, Sanitizer};
use crate::tainted::Tainted;

/// The field every paginated collection is ordered by.
pub const ORDER_KEY: &str = "created_at";

/// Raw, untrusted pagination parameters.
#[derive(Debug, Clone, Default)]
pub struct PageParams {
    page: Option<Tainted<String>>,
    per_page: Option<Tainted<String>>,
}

impl PageParams {
    /// Wraps the raw query values.
    pub fn new(page: Option<Tainted<String>>, per_page: Option<Tainted<String>>) -> Self {
        Self { page, per_page }
    }

    /// Convenience for tests and callers holding plain strings.
    pub fn from_raw(page: Option<&str>, per_page: Option<&str>) -> Self {
        Self::new(
            page.map(|p| Tainted::new(p.to_string())),
            per_page.map(|p| Tainted::new(p.to_string())),
        )
    }
}

/// Effective page and page size for one pagination call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    page: i64,
    per_page: i64,
}

impl PageWindow {
    /// Page number as resolved (1 unless the caller sent something else).
    pub fn page(&self) -> i64 {
        self.page
    }

    /// Page size after defaulting and clamping.
    pub fn per_page(&self) -> i64 {
        self.per_page
    }

    /// Row limit for the data layer.
    pub fn limit(&self) -> i64 {
        self.per_page
    }

    /// Row offset for the data layer: `per_page * (page - 1)`.
    ///
    /// Saturates instead of overflowing on extreme inputs.
    pub fn offset(&self) -> i64 {
        self.per_page.saturating_mul(self.page.saturating_sub(1))
    }
}

/// A data-layer collection that can produce creation-ordered slices.
///
/// Implementations must order by creation time ascending (ties broken by a
/// stable key) before applying `limit`/`offset`, so page boundaries are
/// deterministic across calls.
pub trait CollectionHandle {
    /// Entity type yielded by the collection.
    type Item;

    /// Returns up to `limit` entities starting at `offset`.
    ///
    /// # Errors
    ///
    /// Whatever the data layer reports; the paginator passes it through.
    fn ordered_slice(&self, limit: i64, offset: i64) -> Result<Vec<Self::Item>, ApiError>;
}

/// One page of a collection plus the window that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<E> {
    /// The entities in this page, in creation order
    pub items: Vec<E>,
    /// The effective page/per_page
    pub window: PageWindow,
    /// Field the source collection is ordered by
    pub order_key: &'static str,
}

/// Computes windows and fetches pages.
///
/// # Examples
///
/// ```
/// use client_projects::pagination::{PageParams, Paginator};
///
/// let paginator = Paginator::new(100, 1000);
///
/// let window = paginator.window(&PageParams::from_raw(Some("2"), Some("5000")));
/// assert_eq!(window.page(), 2);
/// assert_eq!(window.per_page(), 1000);
/// assert_eq!(window.offset(), 1000);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    default_per_page: i64,
    max_per_page: i64,
}

impl Paginator {
    /// Creates a paginator with the given default and maximum page size.
    pub fn new(default_per_page: i64, max_per_page: i64) -> Self {
        Self {
            default_per_page,
            max_per_page,
        }
    }

    /// Page size used when none is requested.
    pub fn default_per_page(&self) -> i64 {
        self.default_per_page
    }

    /// Largest page size ever returned.
    pub fn max_per_page(&self) -> i64 {
        self.max_per_page
    }

    /// Resolves raw parameters into an effective window.
    pub fn window(&self, params: &PageParams) -> PageWindow {
        let page = parse(params.page.clone(), "page").unwrap_or(1);
        let per_page = parse(params.per_page.clone(), "per_page")
            .unwrap_or(self.default_per_page)
            .min(self.max_per_page);

        PageWindow { page, per_page }
    }

    /// Fetches the page described by `params` from `handle`.
    ///
    /// # Errors
    ///
    /// Propagates errors from the collection handle unchanged.
    pub fn paginate<H>(&self, handle: &H, params: &PageParams) -> Result<Page<H::Item>, ApiError>
    where
        H: CollectionHandle,
    {
        let window = self.window(params);
        let items = handle.ordered_slice(window.limit(), window.offset())?;

        tracing::debug!(
            page = window.page(),
            per_page = window.per_page(),
            returned = items.len(),
            "paginated collection"
        );

        Ok(Page {
            items,
            window,
            order_key: ORDER_KEY,
        })
    }
}

fn parse(raw: Option<Tainted<String>>, label: &'static str) -> Option<i64> {
    let raw = raw?;
    match IntegerSanitizer::new(label).sanitize(raw) {
        Ok(value) => Some(value.into_inner()),
        Err(err) => {
            tracing::debug!(param = label, error = %err, "ignoring malformed pagination parameter");
            None
        }
    }
}
