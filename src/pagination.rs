//! Template view model for paged lists.

use serde::Serialize;

use crate::domain::pageable::PageableResult;

fn get_pages(
    total_pages: usize,
    current_page: usize,
    left_edge: usize,
    left_current: usize,
    right_current: usize,
    right_edge: usize,
) -> Vec<Option<usize>> {
    let last_page = total_pages;

    if last_page == 0 {
        return vec![];
    }

    let mut pages = Vec::new();

    let left_end = (1 + left_edge).min(last_page + 1);
    pages.extend((1..left_end).map(Some));

    let mid_start = left_end.max(current_page.saturating_sub(left_current));
    let mid_end = (current_page + right_current + 1).min(last_page + 1);

    if mid_start > left_end {
        pages.push(None);
    }
    pages.extend((mid_start..mid_end).map(Some));

    let right_start = mid_end.max(last_page.saturating_sub(right_edge) + 1);

    if right_start > mid_end {
        pages.push(None);
    }
    pages.extend((right_start..=last_page).map(Some));

    pages
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    /// Condensed page links; `None` renders as an ellipsis.
    pub pages: Vec<Option<usize>>,
    pub page: usize,
    pub total_elements: u64,
    /// Previous page, `None` when navigation backwards is disabled.
    pub previous: Option<usize>,
    /// Next page, `None` when navigation forwards is disabled.
    pub next: Option<usize>,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, current_page: usize, total_pages: usize) -> Self {
        let current_page = if current_page == 0 { 1 } else { current_page };

        let pages = get_pages(total_pages, current_page, 2, 2, 4, 2);

        Self {
            total_elements: items.len() as u64,
            items,
            pages,
            page: current_page,
            previous: (current_page > 1).then(|| current_page - 1),
            next: (current_page < total_pages).then(|| current_page + 1),
        }
    }

    /// Builds the view model trusting the server's `total_pages`.
    pub fn from_result(result: PageableResult<T>, current_page: u32) -> Self {
        let page = current_page.max(1);
        let total_pages = result.total_pages;
        let total_elements = result.total_elements;

        // A page past the end links back to the last real page.
        let (previous, next) = if total_pages > 0 && page > total_pages {
            (Some(total_pages as usize), None)
        } else {
            (
                result.has_previous(page).then(|| page as usize - 1),
                result.has_next(page).then(|| page as usize + 1),
            )
        };

        let window_page = if total_pages > 0 { page.min(total_pages) } else { page };
        let mut paginated = Self::new(result.content, page as usize, total_pages as usize);
        paginated.pages = get_pages(total_pages as usize, window_page as usize, 2, 2, 4, 2);
        paginated.total_elements = total_elements;
        paginated.previous = previous;
        paginated.next = next;
        paginated
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), 1, 0)
    }
}
