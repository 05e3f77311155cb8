mod books;

pub use books::*;

use bookstore_api_types::{BookResponse, BookShortResponse, BooksResponse};

use crate::domain::entities::BookRecord;

pub(crate) fn book_to_api(book: BookRecord) -> BookResponse {
    let category_name = book.category.map(|category| category.name);
    BookResponse {
        id: book.id,
        name: book.name,
        author: book.author,
        category_name,
    }
}

pub(crate) fn books_to_api(books: Vec<BookRecord>) -> BooksResponse {
    BooksResponse {
        books: books
            .into_iter()
            .map(|book| BookShortResponse {
                id: book.id,
                name: book.name,
                author: book.author,
            })
            .collect(),
    }
}
