//! Page selector math.
//!
//! The selector never shows more than [`MAX_VISIBLE_PAGES`] numbered entries
//! plus gap markers. Page numbers are 1-based throughout.

/// Items requested per list page.
pub const DEFAULT_PAGE_SIZE: u32 = 24;

/// Numbered entries shown before the selector starts eliding ranges.
pub const MAX_VISIBLE_PAGES: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(u32),
    /// Gap between two shown ranges.
    Ellipsis,
}

impl PageItem {
    #[must_use]
    pub fn page(self) -> Option<u32> {
        match self {
            PageItem::Page(page) => Some(page),
            PageItem::Ellipsis => None,
        }
    }
}

/// Build the selector entries for `current` out of `total` pages.
///
/// Up to five pages are listed outright. Beyond that the first and last page
/// are always present, the current page is shown with one neighbour on each
/// side (shifted inward near either end), and an ellipsis marks each gap.
#[must_use]
pub fn page_items(current: u32, total: u32) -> Vec<PageItem> {
    if total <= MAX_VISIBLE_PAGES {
        return (1..=total).map(PageItem::Page).collect();
    }

    let last_inner = total - 1;
    let mut start = current.saturating_sub(1).max(2);
    let mut end = current.saturating_add(1).min(last_inner);

    if current <= 2 {
        end = (MAX_VISIBLE_PAGES - 1).min(last_inner);
    }
    if current >= last_inner {
        start = (total + 2).saturating_sub(MAX_VISIBLE_PAGES).max(2);
    }

    let mut items = Vec::with_capacity(MAX_VISIBLE_PAGES as usize + 2);
    items.push(PageItem::Page(1));
    if start > 2 {
        items.push(PageItem::Ellipsis);
    }
    items.extend((start..=end).map(PageItem::Page));
    if end < last_inner {
        items.push(PageItem::Ellipsis);
    }
    items.push(PageItem::Page(total));
    items
}

/// Clamp a requested page into range.
///
/// With a known total the page lands in `[1, total]`; without one only the
/// lower bound applies. A total of zero is treated as a single empty page.
#[must_use]
pub fn clamp_page(page: u32, total_pages: Option<u32>) -> u32 {
    let page = page.max(1);
    match total_pages {
        Some(total) => page.min(total.max(1)),
        None => page,
    }
}

/// Number of pages needed for `total_items` at `page_size` items per page.
#[must_use]
pub fn total_pages(total_items: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    let pages = total_items.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX)
}
