//! Fixed-size pagination for the content and resource listings. Page numbers
//! are 1-based throughout.

use serde::Serialize;

/// The number of pages needed to hold `total_items` at `page_size` items per
/// page. There is always at least one page, even for an empty listing.
pub fn page_count(total_items: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    let pages = match total_items % page_size {
        0 => total_items / page_size,
        _ => total_items / page_size + 1,
    };
    pages.max(1)
}

/// Clamps a requested page number to `[1, page_count]`.
pub fn clamp_page(page_number: usize, total_items: usize, page_size: usize) -> usize {
    page_number.clamp(1, page_count(total_items, page_size))
}

/// Returns page `page_number` of `items`: the slice
/// `[(page_number - 1) * page_size, page_number * page_size)` clipped to the
/// bounds of `items`. Callers clamp `page_number` first (see [`clamp_page`]);
/// an unclamped out-of-range page yields an empty slice.
pub fn paginate<T>(items: &[T], page_size: usize, page_number: usize) -> &[T] {
    let page_size = page_size.max(1);
    let start = page_number.saturating_sub(1).saturating_mul(page_size);
    let stop = start.saturating_add(page_size);
    &items[start.min(items.len())..stop.min(items.len())]
}

/// Describes where a page sits in its listing, for rendering page links.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: usize,
    pub page_count: usize,

    /// The previous page number, if any.
    pub prev: Option<usize>,

    /// The next page number, if any.
    pub next: Option<usize>,
}

impl Pagination {
    /// Builds the [`Pagination`] for a requested page, clamping it to the
    /// listing's bounds.
    pub fn new(page_number: usize, total_items: usize, page_size: usize) -> Pagination {
        let page_count = page_count(total_items, page_size);
        let page = clamp_page(page_number, total_items, page_size);
        Pagination {
            page,
            page_count,
            prev: match page {
                1 => None,
                _ => Some(page - 1),
            },
            next: match page < page_count {
                false => None,
                true => Some(page + 1),
            },
        }
    }

    /// All page numbers in the listing.
    pub fn pages(&self) -> impl Iterator<Item = usize> {
        1..=self.page_count
    }
}

/// A paginated view over a borrowed listing that remembers the current page.
pub struct Paginator<'a, T> {
    items: &'a [T],
    page_size: usize,
    page: usize,
}

impl<'a, T> Paginator<'a, T> {
    pub fn new(items: &'a [T], page_size: usize) -> Paginator<'a, T> {
        Paginator {
            items,
            page_size,
            page: 1,
        }
    }

    /// Moves to `page_number`, clamped to the listing's bounds, and returns the
    /// page actually selected.
    pub fn select(&mut self, page_number: usize) -> usize {
        self.page = clamp_page(page_number, self.items.len(), self.page_size);
        self.page
    }

    pub fn current(&self) -> &'a [T] {
        paginate(self.items, self.page_size, self.page)
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.items.len(), self.page_size)
    }
}
