//! Display-ready book cards.

use crate::models::Book;
use std::fmt;

/// One entry of the book list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookCard {
    pub id: String,
    pub title: String,
    pub details: Vec<String>,
}

impl From<&Book> for BookCard {
    fn from(book: &Book) -> Self {
        let fields = &book.fields;
        Self {
            id: book.id.clone(),
            title: format!("Name: {}", fields.name),
            details: vec![
                format!("Author: {}", fields.author),
                format!("Publication date: {}", fields.publication_date),
                format!("Publisher: {}", fields.publisher),
                format!("Genre: {}", fields.genre),
            ],
        }
    }
}

impl fmt::Display for BookCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}  [{}]", self.title, self.id)?;
        for line in &self.details {
            writeln!(f, "    {}", line)?;
        }
        Ok(())
    }
}
