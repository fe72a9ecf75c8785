//! Exclude-then-page listings.
//!
//! Both shapes pull caller-relative elements out of the backing sequence before
//! paging, so a pinned element shows up once, on page 1, and never again in `items`.

use crate::{
    errors::AppError,
    models::page::{FavoritesPage, PageRequest, PinnedPage, Slot},
};

/// Page 1 carries the element matching `is_pinned` in `pinned`; every page draws
/// `items` from the remaining elements only. At most one element may match.
pub fn paginate_pinned<T>(
    backing: Vec<T>,
    is_pinned: impl Fn(&T) -> bool,
    request: PageRequest,
) -> Result<PinnedPage<T>, AppError> {
    let mut pinned = None;
    let mut rest = Vec::with_capacity(backing.len());
    for item in backing {
        if is_pinned(&item) {
            if pinned.is_some() {
                return Err(AppError::InternalError(
                    "More than one element matched the pinned slot".into(),
                ));
            }
            pinned = Some(item);
        } else {
            rest.push(item);
        }
    }

    let total_count = rest.len();
    let (start, end, page_count) = page_window(total_count, request)?;
    let items = rest.into_iter().skip(start).take(end - start).collect();

    Ok(PinnedPage {
        pinned: if request.is_first() { pinned } else { None },
        items,
        total_count,
        page_count,
        page: request.page,
        page_size: request.page_size,
    })
}

/// Favorites are moved ahead of the rest before counts and pages are computed.
/// On page 1 they are lifted into `favorites` and leave placeholders behind, so
/// `items` keeps the slot count the page metadata describes.
pub fn paginate_favorites_first<T>(
    backing: Vec<T>,
    is_favorite: impl Fn(&T) -> bool,
    request: PageRequest,
) -> Result<FavoritesPage<T>, AppError> {
    let (favorites, rest): (Vec<T>, Vec<T>) = backing.into_iter().partition(|item| is_favorite(item));

    let favorite_count = favorites.len();
    if favorite_count > request.page_size as usize {
        return Err(AppError::PageSizeExceeded(format!(
            "{} favorites do not fit in a page of {}",
            favorite_count, request.page_size
        )));
    }

    let total_count = favorite_count + rest.len();
    let (start, end, page_count) = page_window(total_count, request)?;

    let mut window = favorites
        .into_iter()
        .chain(rest)
        .skip(start)
        .take(end - start);

    if !request.is_first() {
        return Ok(FavoritesPage {
            favorites: Vec::new(),
            items: window.map(Slot::Item).collect(),
            total_count,
            page_count,
            page: request.page,
            page_size: request.page_size,
        });
    }

    let lifted: Vec<T> = window.by_ref().take(favorite_count).collect();
    let items = std::iter::repeat_with(|| Slot::Placeholder)
        .take(lifted.len())
        .chain(window.map(Slot::Item))
        .collect();

    Ok(FavoritesPage {
        favorites: lifted,
        items,
        total_count,
        page_count,
        page: request.page,
        page_size: request.page_size,
    })
}

/// `[start, end)` of the requested page and the page count. An empty collection
/// still has one (empty) page so page 1 can carry pinned elements.
fn page_window(total: usize, request: PageRequest) -> Result<(usize, usize, usize), AppError> {
    if request.page_size == 0 {
        return Err(AppError::InvalidPage("Page size must be at least 1".into()));
    }

    let size = request.page_size as usize;
    let page_count = total.div_ceil(size).max(1);

    if request.page == 0 || request.page as usize > page_count {
        return Err(AppError::InvalidPage(format!(
            "Page {} is out of range (1..={})",
            request.page, page_count
        )));
    }

    let start = (request.page as usize - 1) * size;
    let end = (start + size).min(total);
    Ok((start, end, page_count))
}
