/*
 * Responsibility
 * - Books の response 表現 (text/plain)
 * - 1 冊 1 行: "{isbn}, {title}, {author}, £{price:.2}\n"
 */
use crate::repos::books::Book;

pub fn render_listing(books: &[Book]) -> String {
    let mut out = String::with_capacity(books.len() * 64);
    for book in books {
        out.push_str(&format!(
            "{}, {}, {}, £{:.2}\n",
            book.isbn, book.title, book.author, book.price
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(isbn: &str, title: &str, author: &str, price: f64) -> Book {
        Book {
            isbn: isbn.into(),
            title: title.into(),
            author: author.into(),
            price,
        }
    }

    #[test]
    fn empty_listing_is_empty() {
        assert_eq!(render_listing(&[]), "");
    }

    #[test]
    fn price_has_two_decimals() {
        let out = render_listing(&[book("978-0141439518", "Pride and Prejudice", "Jane Austen", 5.0)]);
        assert_eq!(out, "978-0141439518, Pride and Prejudice, Jane Austen, £5.00\n");
    }
}
