use time::{macros::datetime, OffsetDateTime};

use super::models::{Book, BookCreate};

/// Ordered in-memory collection of books plus the id counter.
///
/// Ids start at 1 and only ever grow; nothing is removed, so an id is never
/// handed out twice.
#[derive(Debug, Clone)]
pub struct BookStore {
    books: Vec<Book>,
    next_id: i64,
}

impl BookStore {
    pub fn new() -> Self {
        Self {
            books: Vec::new(),
            next_id: 1,
        }
    }

    /// Store holding the four demonstration records, ids 1 to 4.
    pub fn seeded() -> Self {
        let created_at = datetime!(2024-01-01 10:00 UTC);
        let mut store = Self::new();

        let seed = [
            ("1984", "George Orwell", "978-0451524935", 1949, true),
            (
                "Le Petit Prince",
                "Antoine de Saint-Exupéry",
                "978-2070612758",
                1943,
                true,
            ),
            (
                "Harry Potter à l'école des sorciers",
                "J.K. Rowling",
                "978-2070584628",
                1997,
                false,
            ),
            ("Les Misérables", "Victor Hugo", "978-2070409228", 1862, true),
        ];

        for (title, author, isbn, published_year, available) in seed {
            let book = store.append(
                BookCreate {
                    title: title.to_string(),
                    author: author.to_string(),
                    isbn: isbn.to_string(),
                    published_year,
                },
                created_at,
            );
            book.available = available;
        }

        store
    }

    /// Append a new record under the next id. New books start available.
    pub fn append(&mut self, fields: BookCreate, created_at: OffsetDateTime) -> &mut Book {
        let id = self.next_id;
        self.next_id += 1;

        self.books.push(Book {
            id,
            title: fields.title,
            author: fields.author,
            isbn: fields.isbn,
            published_year: fields.published_year,
            available: true,
            created_at,
        });

        let last = self.books.len() - 1;
        &mut self.books[last]
    }

    /// Every record in insertion order.
    pub fn scan(&self) -> impl Iterator<Item = &Book> + '_ {
        self.books.iter()
    }

    pub fn get(&self, id: i64) -> Option<&Book> {
        self.books.iter().find(|book| book.id == id)
    }

    pub fn get_mut(&mut self, id: i64) -> Option<&mut Book> {
        self.books.iter_mut().find(|book| book.id == id)
    }

    pub fn find_by_isbn(&self, isbn: &str) -> Option<&Book> {
        self.books.iter().find(|book| book.isbn == isbn)
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}

impl Default for BookStore {
    fn default() -> Self {
        Self::new()
    }
}
