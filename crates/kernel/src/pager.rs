//! Pagination with a bounded window of visible page links.
//!
//! A [`Paginator`] splits a slice into fixed-size pages. [`paginate`] is the
//! lenient entry point used by listing views: it accepts the raw `page`
//! query value, falls back to a sensible page for anything out of range, and
//! limits the page links shown to `max_paging_links` around the current page.

use std::num::IntErrorKind;
use std::ops::RangeInclusive;

use serde::ser::{Serialize, SerializeStruct, Serializer};
use thiserror::Error;

/// Pagination errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("page size must be at least 1")]
    ZeroPerPage,

    #[error("page {0} contains no results")]
    EmptyPage(i64),
}

/// Splits a slice of objects into pages of `per_page` items.
#[derive(Debug, Clone, Copy)]
pub struct Paginator<'a, T> {
    objects: &'a [T],
    per_page: usize,
}

impl<'a, T> Paginator<'a, T> {
    /// Create a paginator. `per_page` must be non-zero.
    pub fn new(objects: &'a [T], per_page: usize) -> Result<Self, PageError> {
        if per_page == 0 {
            return Err(PageError::ZeroPerPage);
        }
        Ok(Self { objects, per_page })
    }

    /// Total number of objects.
    pub fn count(&self) -> usize {
        self.objects.len()
    }

    /// Number of pages. An empty sequence still has one (empty) page.
    pub fn num_pages(&self) -> usize {
        if self.objects.is_empty() {
            1
        } else {
            self.objects.len().div_ceil(self.per_page)
        }
    }

    /// All page numbers, 1-based.
    pub fn page_range(&self) -> RangeInclusive<usize> {
        1..=self.num_pages()
    }

    /// Check that `number` names an existing page.
    pub fn validate_number(&self, number: i64) -> Result<usize, PageError> {
        let n = usize::try_from(number).map_err(|_| PageError::EmptyPage(number))?;
        if n == 0 || n > self.num_pages() {
            return Err(PageError::EmptyPage(number));
        }
        Ok(n)
    }

    /// Return the given 1-based page.
    pub fn page(&self, number: i64) -> Result<Page<'a, T>, PageError> {
        let number = self.validate_number(number)?;
        Ok(self.page_at(number))
    }

    fn page_at(&self, number: usize) -> Page<'a, T> {
        let bottom = (number - 1) * self.per_page;
        let top = (bottom + self.per_page).min(self.objects.len());
        Page {
            object_list: &self.objects[bottom..top],
            number,
            count: self.count(),
            per_page: self.per_page,
            num_pages: self.num_pages(),
            visible_page_range: self.page_range().collect(),
        }
    }
}

/// One page of results plus the metadata templates need to draw a pager.
#[derive(Debug, Clone)]
pub struct Page<'a, T> {
    pub object_list: &'a [T],
    pub number: usize,
    pub count: usize,
    pub per_page: usize,
    pub num_pages: usize,
    /// Page numbers to render as links.
    pub visible_page_range: Vec<usize>,
}

impl<T> Page<'_, T> {
    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_other_pages(&self) -> bool {
        self.has_next() || self.has_previous()
    }

    pub fn next_page_number(&self) -> Option<usize> {
        self.has_next().then_some(self.number + 1)
    }

    pub fn previous_page_number(&self) -> Option<usize> {
        self.has_previous().then_some(self.number - 1)
    }

    /// 1-based index of the first object on this page (0 when there are none).
    pub fn start_index(&self) -> usize {
        if self.count == 0 {
            0
        } else {
            (self.number - 1) * self.per_page + 1
        }
    }

    /// 1-based index of the last object on this page.
    pub fn end_index(&self) -> usize {
        if self.count == 0 {
            0
        } else {
            self.start_index() + self.object_list.len() - 1
        }
    }
}

// Templates can't call methods, so the derived values are serialized too.
impl<T: Serialize> Serialize for Page<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Page", 13)?;
        s.serialize_field("object_list", self.object_list)?;
        s.serialize_field("number", &self.number)?;
        s.serialize_field("count", &self.count)?;
        s.serialize_field("per_page", &self.per_page)?;
        s.serialize_field("num_pages", &self.num_pages)?;
        s.serialize_field("visible_page_range", &self.visible_page_range)?;
        s.serialize_field("has_next", &self.has_next())?;
        s.serialize_field("has_previous", &self.has_previous())?;
        s.serialize_field("has_other_pages", &self.has_other_pages())?;
        s.serialize_field("next_page_number", &self.next_page_number())?;
        s.serialize_field("previous_page_number", &self.previous_page_number())?;
        s.serialize_field("start_index", &self.start_index())?;
        s.serialize_field("end_index", &self.end_index())?;
        s.end()
    }
}

/// Return a page of `objects` for a raw `page_num` request value.
///
/// - A value that isn't an integer selects page 1.
/// - A page that doesn't exist (zero, negative, past the end) selects the last page.
/// - When there are more pages than `max_paging_links`, `visible_page_range`
///   is narrowed to a window of that size around the current page.
pub fn paginate<'a, T>(
    objects: &'a [T],
    page_num: &str,
    per_page: usize,
    max_paging_links: usize,
) -> Result<Page<'a, T>, PageError> {
    let paginator = Paginator::new(objects, per_page)?;
    let number = parse_page_number(page_num);

    let mut page = match paginator.page(number) {
        Ok(page) => page,
        Err(PageError::EmptyPage(_)) => paginator.page_at(paginator.num_pages()),
        Err(e) => return Err(e),
    };

    page.visible_page_range = visible_page_range(page.number, page.num_pages, max_paging_links);
    Ok(page)
}

/// Integer value of a raw page parameter, or 1 if it isn't an integer.
///
/// Integers too large for `i64` saturate, so they still name a page past the
/// end (or before the start) rather than counting as garbage.
fn parse_page_number(page_num: &str) -> i64 {
    match page_num.trim().parse::<i64>() {
        Ok(n) => n,
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => i64::MAX,
            IntErrorKind::NegOverflow => i64::MIN,
            _ => 1,
        },
    }
}

/// Page numbers to show for page `number` of `num_pages`.
///
/// The window is `max_paging_links` wide, places the current page just past
/// its middle, and is pinned to the first or last pages near either end.
pub fn visible_page_range(number: usize, num_pages: usize, max_paging_links: usize) -> Vec<usize> {
    if num_pages <= max_paging_links {
        return (1..=num_pages).collect();
    }
    let start = (num_pages - max_paging_links).min(number.saturating_sub(max_paging_links / 2 + 1));
    (start + 1..=start + max_paging_links).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn items(n: usize) -> Vec<usize> {
        (1..=n).collect()
    }

    #[test]
    fn num_pages_rounds_up() {
        let objects = items(25);
        let paginator = Paginator::new(&objects, 10).unwrap();
        assert_eq!(paginator.count(), 25);
        assert_eq!(paginator.num_pages(), 3);
        assert_eq!(paginator.page_range(), 1..=3);
    }

    #[test]
    fn empty_sequence_has_one_page() {
        let objects: Vec<usize> = Vec::new();
        let paginator = Paginator::new(&objects, 10).unwrap();
        assert_eq!(paginator.num_pages(), 1);

        let page = paginator.page(1).unwrap();
        assert!(page.object_list.is_empty());
        assert_eq!(page.start_index(), 0);
        assert_eq!(page.end_index(), 0);
        assert!(!page.has_other_pages());
    }

    #[test]
    fn zero_per_page_is_rejected() {
        let objects = items(3);
        assert_eq!(
            Paginator::new(&objects, 0).unwrap_err(),
            PageError::ZeroPerPage
        );
        assert_eq!(
            paginate(&objects, "1", 0, 10).unwrap_err(),
            PageError::ZeroPerPage
        );
    }

    #[test]
    fn out_of_range_numbers_are_empty_pages() {
        let objects = items(25);
        let paginator = Paginator::new(&objects, 10).unwrap();
        assert_eq!(paginator.page(0).unwrap_err(), PageError::EmptyPage(0));
        assert_eq!(paginator.page(-2).unwrap_err(), PageError::EmptyPage(-2));
        assert_eq!(paginator.page(4).unwrap_err(), PageError::EmptyPage(4));
    }

    #[test]
    fn last_page_is_partial() {
        let objects = items(25);
        let page = Paginator::new(&objects, 10).unwrap().page(3).unwrap();
        assert_eq!(page.object_list, &[21, 22, 23, 24, 25]);
        assert_eq!(page.start_index(), 21);
        assert_eq!(page.end_index(), 25);
        assert!(!page.has_next());
        assert_eq!(page.previous_page_number(), Some(2));
        assert_eq!(page.next_page_number(), None);
    }

    #[test]
    fn paginate_non_numeric_selects_first_page() {
        let objects = items(25);
        assert_eq!(paginate(&objects, "abc", 10, 10).unwrap().number, 1);
        assert_eq!(paginate(&objects, "", 10, 10).unwrap().number, 1);
        assert_eq!(paginate(&objects, "2.5", 10, 10).unwrap().number, 1);
    }

    #[test]
    fn paginate_accepts_padded_numbers() {
        let objects = items(25);
        assert_eq!(paginate(&objects, " 2 ", 10, 10).unwrap().number, 2);
    }

    #[test]
    fn paginate_out_of_range_selects_last_page() {
        let objects = items(25);
        assert_eq!(paginate(&objects, "99", 10, 10).unwrap().number, 3);
        assert_eq!(paginate(&objects, "0", 10, 10).unwrap().number, 3);
        assert_eq!(paginate(&objects, "-1", 10, 10).unwrap().number, 3);
    }

    #[test]
    fn paginate_oversized_integers_select_last_page() {
        let objects = items(25);
        assert_eq!(paginate(&objects, "99999999999999999999", 10, 10).unwrap().number, 3);
        assert_eq!(paginate(&objects, "-99999999999999999999", 10, 10).unwrap().number, 3);
        assert_eq!(paginate(&objects, " +99999999999999999999 ", 10, 10).unwrap().number, 3);
        assert_eq!(paginate(&objects, "9999999999999999999x", 10, 10).unwrap().number, 1);
    }

    #[test]
    fn visible_range_is_whole_range_when_small() {
        let objects = items(25);
        let page = paginate(&objects, "2", 10, 10).unwrap();
        assert_eq!(page.visible_page_range, vec![1, 2, 3]);
    }

    #[test]
    fn visible_range_window_positions() {
        assert_eq!(visible_page_range(1, 10, 5), vec![1, 2, 3, 4, 5]);
        assert_eq!(visible_page_range(3, 10, 5), vec![1, 2, 3, 4, 5]);
        assert_eq!(visible_page_range(4, 10, 5), vec![2, 3, 4, 5, 6]);
        assert_eq!(visible_page_range(6, 10, 5), vec![4, 5, 6, 7, 8]);
        assert_eq!(visible_page_range(9, 10, 5), vec![6, 7, 8, 9, 10]);
        assert_eq!(visible_page_range(10, 10, 5), vec![6, 7, 8, 9, 10]);
    }

    #[test]
    fn visible_range_with_even_window() {
        assert_eq!(visible_page_range(5, 20, 4), vec![3, 4, 5, 6]);
        assert_eq!(visible_page_range(20, 20, 4), vec![17, 18, 19, 20]);
    }

    #[test]
    fn visible_range_always_contains_current_page() {
        for max in 1..8 {
            for number in 1..=30 {
                let range = visible_page_range(number, 30, max);
                assert_eq!(range.len(), max);
                assert!(range.contains(&number), "page {number} max {max}");
                assert!(range.windows(2).all(|w| w[1] == w[0] + 1));
            }
        }
    }

    #[test]
    fn zero_paging_links_shows_nothing() {
        assert!(visible_page_range(2, 3, 0).is_empty());
    }

    #[test]
    fn page_serializes_derived_fields() {
        let objects = items(25);
        let page = paginate(&objects, "2", 10, 10).unwrap();
        let value = serde_json::to_value(&page).unwrap();
        assert_eq!(value["number"], 2);
        assert_eq!(value["has_next"], true);
        assert_eq!(value["previous_page_number"], 1);
        assert_eq!(value["start_index"], 11);
        assert_eq!(value["object_list"][0], 11);
    }
}
