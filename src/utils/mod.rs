pub mod string;

use anyhow::Result;
use mdbook::book::{Book, Chapter};
use mdbook::BookItem;

/// Applies `f` to every chapter in book order, stopping at the first error.
pub fn map_chapter<F>(book: &mut Book, f: &mut F) -> Result<()>
where
    F: FnMut(&mut Chapter) -> Result<()>,
{
    let mut err = None;
    book.for_each_mut(|item| {
        if err.is_some() {
            return;
        }
        if let BookItem::Chapter(chapter) = item {
            if let Err(e) = f(chapter) {
                err = Some(e);
            }
        }
    });

    match err {
        None => Ok(()),
        Some(err) => Err(err),
    }
}
