//! Client-side views over a fetched collection.
//!
//! The list view pages through the collection; the shelf view groups it by
//! storage location and shelf row the way bottles sit in a fridge or cellar.

use crate::types::{Wine, WineLocation};
use std::collections::BTreeMap;

/// Default number of wines per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// One page of a list.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a, T> {
    /// Items on this page.
    pub items: &'a [T],
    /// 1-based page number actually shown.
    pub page: usize,
    /// Number of pages (at least 1).
    pub total_pages: usize,
}

/// Slice out page `page` (1-based) of `items`.
///
/// Out-of-range pages are clamped to `1..=total_pages`; an empty list has
/// one empty page. A `page_size` of 0 is treated as 1.
#[must_use]
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> Page<'_, T> {
    let page_size = page_size.max(1);
    let total_pages = items.len().div_ceil(page_size).max(1);
    let page = page.clamp(1, total_pages);

    let start = ((page - 1) * page_size).min(items.len());
    let end = (start + page_size).min(items.len());

    Page {
        items: &items[start..end],
        page,
        total_pages,
    }
}

/// Bottles on one shelf row.
#[derive(Debug, Clone, PartialEq)]
pub struct Shelf<'a> {
    /// Row number; 0 collects wines without a row.
    pub row: u32,
    /// Wines on the row, in collection order.
    pub wines: Vec<&'a Wine>,
}

impl Shelf<'_> {
    /// Display label ("Unsorted" for row 0).
    #[must_use]
    pub fn label(&self) -> String {
        if self.row == 0 {
            "Unsorted".to_string()
        } else {
            format!("Row {}", self.row)
        }
    }

    /// Bottles on the row, counting quantities.
    #[must_use]
    pub fn bottle_count(&self) -> u32 {
        self.wines.iter().map(|w| w.quantity).sum()
    }
}

/// All shelves of one storage location.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationView<'a> {
    /// Fridge or cellar.
    pub location: WineLocation,
    /// Shelves ordered by row.
    pub shelves: Vec<Shelf<'a>>,
}

/// Group wines by location (fridge first) and row (ascending).
///
/// Wines without a location count as cellar; locations without wines are
/// omitted.
#[must_use]
pub fn shelf_view(wines: &[Wine]) -> Vec<LocationView<'_>> {
    let mut grouped: BTreeMap<WineLocation, BTreeMap<u32, Vec<&Wine>>> = BTreeMap::new();

    for wine in wines {
        grouped
            .entry(wine.location.unwrap_or_default())
            .or_default()
            .entry(wine.row_id.unwrap_or(0))
            .or_default()
            .push(wine);
    }

    grouped
        .into_iter()
        .map(|(location, rows)| LocationView {
            location,
            shelves: rows
                .into_iter()
                .map(|(row, wines)| Shelf { row, wines })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn wine(id: i64, location: Option<WineLocation>, row: Option<u32>) -> Wine {
        Wine {
            id,
            name: format!("wine-{id}"),
            wine_type: None,
            vintage: None,
            quantity: 2,
            winery: None,
            region: None,
            country: None,
            image_url: None,
            location,
            row_id: row,
        }
    }

    #[test]
    fn test_empty_list_has_one_page() {
        let page = paginate::<i32>(&[], 3, 10);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_last_page_is_partial() {
        let items: Vec<i32> = (0..23).collect();
        let page = paginate(&items, 3, 10);
        assert_eq!(page.items, &[20, 21, 22]);
        assert_eq!(page.total_pages, 3);

        let clamped = paginate(&items, 99, 10);
        assert_eq!(clamped.page, 3);
    }

    #[test]
    fn test_shelf_view_groups_and_orders() {
        let wines = vec![
            wine(1, None, Some(2)),
            wine(2, Some(WineLocation::Fridge), None),
            wine(3, Some(WineLocation::Cellar), Some(1)),
            wine(4, Some(WineLocation::Cellar), Some(2)),
        ];
        let view = shelf_view(&wines);

        assert_eq!(view.len(), 2);
        assert_eq!(view[0].location, WineLocation::Fridge);
        assert_eq!(view[0].shelves[0].label(), "Unsorted");

        let cellar = &view[1];
        assert_eq!(cellar.location, WineLocation::Cellar);
        let rows: Vec<u32> = cellar.shelves.iter().map(|s| s.row).collect();
        assert_eq!(rows, vec![1, 2]);
        let row_two: Vec<i64> = cellar.shelves[1].wines.iter().map(|w| w.id).collect();
        assert_eq!(row_two, vec![1, 4]);
        assert_eq!(cellar.shelves[1].bottle_count(), 4);
    }

    #[test]
    fn test_shelf_view_omits_empty_locations() {
        let wines = vec![wine(1, Some(WineLocation::Cellar), None)];
        let view = shelf_view(&wines);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].location, WineLocation::Cellar);
    }

    proptest! {
        #[test]
        fn prop_pages_cover_every_item_once(len in 0usize..200, size in 1usize..25) {
            let items: Vec<usize> = (0..len).collect();
            let total = paginate(&items, 1, size).total_pages;

            let mut seen = Vec::new();
            for page in 1..=total {
                let slice = paginate(&items, page, size);
                prop_assert!(slice.items.len() <= size);
                seen.extend_from_slice(slice.items);
            }
            prop_assert_eq!(seen, items);
        }
    }
}
