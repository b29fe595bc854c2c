/// Listing page size. The original directory showed five employees per page
/// and nothing in the UI makes it configurable.
pub const PAGE_SIZE: u32 = 5;

/// One window over an ordered result set plus the metadata the pager needs.
///
/// Requesting a page past the last yields an empty window, not an error.
#[derive(Debug)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page_number: u32,
    pub total_pages: u32,
}

impl<T> Paginated<T> {
    /// Wraps an already-windowed slice for `page_number`. `total_count` is
    /// the unwindowed row count the slice was cut from.
    pub fn new(items: Vec<T>, total_count: u32, page_number: u32, page_size: u32) -> Self {
        Paginated {
            items,
            page_number,
            total_pages: total_count.div_ceil(page_size),
        }
    }

    /// Windows an in-memory ordered source.
    pub fn create(source: Vec<T>, page_number: u32, page_size: u32) -> Self {
        let total_count = source.len() as u32;
        let skip = page_number.saturating_sub(1).saturating_mul(page_size);
        let items: Vec<T> = source
            .into_iter()
            .skip(skip as usize)
            .take(page_size as usize)
            .collect();

        Self::new(items, total_count, page_number, page_size)
    }

    pub fn has_previous_page(&self) -> bool {
        self.page_number > 1
    }

    pub fn has_next_page(&self) -> bool {
        self.page_number < self.total_pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_of_twelve() {
        let page = Paginated::create((1..=12).collect(), 1, PAGE_SIZE);
        assert_eq!(page.items, vec![1, 2, 3, 4, 5]);
        assert!(!page.has_previous_page());
        assert!(page.has_next_page());
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn last_page_is_short() {
        let page = Paginated::create((1..=12).collect(), 3, PAGE_SIZE);
        assert_eq!(page.items, vec![11, 12]);
        assert!(page.has_previous_page());
        assert!(!page.has_next_page());
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let page = Paginated::create((1..=12).collect(), 4, PAGE_SIZE);
        assert!(page.items.is_empty());
        assert!(!page.has_next_page());
    }

    #[test]
    fn exact_multiple_has_no_trailing_page() {
        let page = Paginated::create((1..=10).collect(), 2, PAGE_SIZE);
        assert_eq!(page.items.len(), 5);
        assert!(!page.has_next_page());
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn empty_source_is_a_single_empty_window() {
        let page = Paginated::create(Vec::<u32>::new(), 1, PAGE_SIZE);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 0);
        assert!(!page.has_previous_page());
        assert!(!page.has_next_page());
    }

    #[test]
    fn has_next_iff_page_times_size_below_total() {
        for total in 0u32..23 {
            for page_number in 1u32..6 {
                let page = Paginated::create((0..total).collect(), page_number, PAGE_SIZE);
                assert_eq!(
                    page.has_next_page(),
                    page_number * PAGE_SIZE < total,
                    "total={} page={}",
                    total,
                    page_number
                );
                assert!(page.items.len() <= PAGE_SIZE as usize);
            }
        }
    }
}
