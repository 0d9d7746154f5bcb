use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;
use serde::Serialize;
use crate::books::domain::Book;
use crate::core::library::{LibraryError, LibraryResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum OrderField {
    Title,
    PublicationYear,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct OrderKey {
    pub field: OrderField,
    pub descending: bool,
}

impl OrderKey {
    fn parse(key: &str) -> Option<Self> {
        let key = key.trim();
        let (descending, name) = match key.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, key),
        };
        let field = match name {
            "title" => OrderField::Title,
            "publication_year" => OrderField::PublicationYear,
            _ => return None,
        };
        Some(Self { field, descending })
    }

    fn compare<B: Book>(&self, a: &B, b: &B) -> Ordering {
        let ord = match self.field {
            OrderField::Title => a.title().cmp(b.title()),
            OrderField::PublicationYear => a.publication_year().cmp(&b.publication_year()),
        };
        if self.descending { ord.reverse() } else { ord }
    }
}

// IntFilter is an equality filter on an integer field. An integer too wide
// for the stored field cannot equal any stored value, so it matches nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum IntFilter<T> {
    Equals(T),
    OutOfRange,
}

impl<T: FromStr + PartialEq + Copy> IntFilter<T> {
    // non-integer text yields None; integers that do not fit T yield OutOfRange
    fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let digits = value.strip_prefix(|c: char| c == '-' || c == '+').unwrap_or(value);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(value.parse::<T>().map(IntFilter::Equals).unwrap_or(IntFilter::OutOfRange))
    }

    fn accepts(&self, actual: T) -> bool {
        match self {
            IntFilter::Equals(expected) => *expected == actual,
            IntFilter::OutOfRange => false,
        }
    }
}

// PageRef is a page number or the `last` page
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum PageRef {
    Number(usize),
    Last,
}

impl PageRef {
    fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "last" => Some(PageRef::Last),
            other => other.parse().ok().map(PageRef::Number),
        }
    }
}

// BookQuery holds the list parameters of a request. Parameters that do not
// parse are dropped rather than rejected.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct BookQuery {
    pub title: Option<String>,
    pub author: Option<IntFilter<i64>>,
    pub publication_year: Option<IntFilter<i32>>,
    pub search: Option<String>,
    pub ordering: Vec<OrderKey>,
    pub page: Option<PageRef>,
    pub page_size: Option<usize>,
}

impl BookQuery {
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let non_empty = |k: &str| params.get(k).filter(|v| !v.is_empty());
        Self {
            title: non_empty("title").cloned(),
            author: non_empty("author").and_then(|v| IntFilter::parse(v)),
            publication_year: non_empty("publication_year").and_then(|v| IntFilter::parse(v)),
            search: params.get("search").map(|v| v.trim().to_string()).filter(|v| !v.is_empty()),
            ordering: params.get("ordering")
                .map(|v| v.split(',').filter_map(OrderKey::parse).collect())
                .unwrap_or_default(),
            page: non_empty("page").and_then(|v| PageRef::parse(v)),
            page_size: non_empty("page_size").and_then(|v| v.trim().parse().ok()).filter(|n| *n > 0),
        }
    }

    // equality filters in the attribute names of the book store
    pub fn predicate(&self) -> HashMap<String, String> {
        let mut predicate = HashMap::new();
        if let Some(title) = &self.title {
            predicate.insert("title".to_string(), title.to_string());
        }
        if let Some(IntFilter::Equals(author)) = self.author {
            predicate.insert("author_id".to_string(), author.to_string());
        }
        if let Some(IntFilter::Equals(year)) = self.publication_year {
            predicate.insert("publication_year".to_string(), year.to_string());
        }
        predicate
    }

    pub fn matches<B: Book>(&self, book: &B, author_names: &HashMap<i64, String>) -> bool {
        if let Some(title) = &self.title {
            if book.title() != title {
                return false;
            }
        }
        if let Some(author) = self.author {
            if !author.accepts(book.author_id()) {
                return false;
            }
        }
        if let Some(year) = self.publication_year {
            if !year.accepts(book.publication_year()) {
                return false;
            }
        }
        self.matches_search(book, author_names)
    }

    // case-insensitive substring match on the title or the author's name
    pub fn matches_search<B: Book>(&self, book: &B, author_names: &HashMap<i64, String>) -> bool {
        match &self.search {
            None => true,
            Some(term) => {
                let term = term.to_lowercase();
                book.title().to_lowercase().contains(&term) ||
                    author_names.get(&book.author_id())
                        .map(|name| name.to_lowercase().contains(&term))
                        .unwrap_or(false)
            }
        }
    }

    // true when a filter can match no stored book
    pub fn matches_nothing(&self) -> bool {
        self.author == Some(IntFilter::OutOfRange) || self.publication_year == Some(IntFilter::OutOfRange)
    }

    pub fn needs_author_names(&self) -> bool {
        self.search.is_some()
    }

    // stable multi-key sort; without keys the incoming order is kept
    pub fn sort<B: Book>(&self, books: &mut [B]) {
        if self.ordering.is_empty() {
            return;
        }
        books.sort_by(|a, b| {
            self.ordering.iter()
                .map(|key| key.compare(a, b))
                .find(|ord| *ord != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
    }

    pub fn effective_page_size(&self, default_size: usize, max_size: usize) -> usize {
        self.page_size.unwrap_or(default_size).min(max_size).max(1)
    }
}

// Page is a page-number slice of a result set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct Page<T> {
    pub count: usize,
    pub next: Option<usize>,
    pub previous: Option<usize>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            count: self.count,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

// pages are numbered from 1; page 1 of an empty set is valid, any other page past the end is not
pub(crate) fn paginate<T>(items: Vec<T>, page: Option<PageRef>, page_size: usize) -> LibraryResult<Page<T>> {
    let page_size = page_size.max(1);
    let count = items.len();
    let last_page = if count == 0 { 1 } else { (count + page_size - 1) / page_size };
    let page = match page {
        None => 1,
        Some(PageRef::Number(n)) => n,
        Some(PageRef::Last) => last_page,
    };
    if page == 0 || page > last_page {
        return Err(LibraryError::not_found(format!("invalid page {}", page).as_str()));
    }
    let results = items.into_iter().skip((page - 1) * page_size).take(page_size).collect();
    Ok(Page {
        count,
        next: if page < last_page { Some(page + 1) } else { None },
        previous: if page > 1 { Some(page - 1) } else { None },
        results,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use crate::books::dto::BookDto;
    use crate::catalog::domain::query::{BookQuery, IntFilter, OrderField, PageRef, paginate};
    use crate::core::library::LibraryError;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn books() -> Vec<BookDto> {
        vec![
            BookDto::new(1, "Test Book 1", 1, 2020),
            BookDto::new(2, "Another Book", 2, 2021),
            BookDto::new(3, "Search Test Book", 1, 2019),
        ]
    }

    fn names() -> HashMap<i64, String> {
        HashMap::from([(1, "Author One".to_string()), (2, "Author Two".to_string())])
    }

    fn run(query: &BookQuery) -> Vec<BookDto> {
        let names = names();
        let mut res: Vec<BookDto> = books().into_iter().filter(|b| query.matches(b, &names)).collect();
        query.sort(&mut res);
        res
    }

    #[tokio::test]
    async fn test_should_drop_malformed_filters() {
        let query = BookQuery::from_params(&params(&[
            ("author", "abc"), ("publication_year", "20x0"), ("title", ""), ("page", "first"), ("page_size", "0")]));
        assert_eq!(BookQuery::default(), query);
        assert_eq!(3, run(&query).len());
    }

    #[tokio::test]
    async fn test_should_filter_by_author_and_year() {
        assert_eq!(2, run(&BookQuery::from_params(&params(&[("author", "1")]))).len());
        assert!(run(&BookQuery::from_params(&params(&[("author", "99")]))).is_empty());
        let res = run(&BookQuery::from_params(&params(&[("publication_year", "2020")])));
        assert_eq!(1, res.len());
        assert_eq!("Test Book 1", res[0].title);
    }

    #[tokio::test]
    async fn test_should_match_nothing_for_integers_out_of_range() {
        let query = BookQuery::from_params(&params(&[("publication_year", "3000000000")]));
        assert_eq!(Some(IntFilter::OutOfRange), query.publication_year);
        assert!(query.matches_nothing());
        assert!(run(&query).is_empty());

        let query = BookQuery::from_params(&params(&[("author", "99999999999999999999")]));
        assert_eq!(Some(IntFilter::OutOfRange), query.author);
        assert!(run(&query).is_empty());

        let query = BookQuery::from_params(&params(&[("author", " +1 "), ("publication_year", "-20")]));
        assert_eq!(Some(IntFilter::Equals(1)), query.author);
        assert_eq!(Some(IntFilter::Equals(-20)), query.publication_year);
        assert!(!query.matches_nothing());
    }

    #[tokio::test]
    async fn test_should_filter_by_exact_title() {
        assert_eq!(1, run(&BookQuery::from_params(&params(&[("title", "Another Book")]))).len());
        assert!(run(&BookQuery::from_params(&params(&[("title", "another book")]))).is_empty());
    }

    #[tokio::test]
    async fn test_should_search_title_and_author_name() {
        let res = run(&BookQuery::from_params(&params(&[("search", "Another")])));
        assert_eq!(1, res.len());
        assert_eq!("Another Book", res[0].title);
        assert_eq!(2, run(&BookQuery::from_params(&params(&[("search", "  author one ")]))).len());
        assert_eq!(2, run(&BookQuery::from_params(&params(&[("search", "TEST")]))).len());
        assert_eq!(3, run(&BookQuery::from_params(&params(&[("search", "   ")]))).len());
    }

    #[tokio::test]
    async fn test_should_order_books() {
        let res = run(&BookQuery::from_params(&params(&[("ordering", "title")])));
        let titles: Vec<&str> = res.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(vec!["Another Book", "Search Test Book", "Test Book 1"], titles);

        let res = run(&BookQuery::from_params(&params(&[("ordering", "-publication_year")])));
        let years: Vec<i32> = res.iter().map(|b| b.publication_year).collect();
        assert_eq!(vec![2021, 2020, 2019], years);
    }

    #[tokio::test]
    async fn test_should_keep_ties_in_upstream_order() {
        let query = BookQuery::from_params(&params(&[("ordering", "-author,publication_year")]));
        assert_eq!(1, query.ordering.len());
        assert_eq!(OrderField::PublicationYear, query.ordering[0].field);

        let mut books = vec![
            BookDto::new(1, "Same", 1, 2000),
            BookDto::new(2, "Same", 1, 1990),
            BookDto::new(3, "Same", 1, 2000),
        ];
        BookQuery::from_params(&params(&[("ordering", "title")])).sort(&mut books);
        let ids: Vec<i64> = books.iter().map(|b| b.id).collect();
        assert_eq!(vec![1, 2, 3], ids);

        BookQuery::from_params(&params(&[("ordering", "title,-publication_year")])).sort(&mut books);
        let ids: Vec<i64> = books.iter().map(|b| b.id).collect();
        assert_eq!(vec![1, 3, 2], ids);
    }

    #[tokio::test]
    async fn test_should_ignore_unknown_ordering() {
        let query = BookQuery::from_params(&params(&[("ordering", "isbn,-")]));
        assert!(query.ordering.is_empty());
        let ids: Vec<i64> = run(&query).iter().map(|b| b.id).collect();
        assert_eq!(vec![1, 2, 3], ids);
    }

    #[tokio::test]
    async fn test_should_paginate() {
        let page = paginate((1..=25).collect::<Vec<i32>>(), None, 10).expect("first page");
        assert_eq!(25, page.count);
        assert_eq!(Some(2), page.next);
        assert_eq!(None, page.previous);
        assert_eq!(10, page.results.len());

        let page = paginate((1..=25).collect::<Vec<i32>>(), Some(PageRef::Number(3)), 10).expect("last page");
        assert_eq!(vec![21, 22, 23, 24, 25], page.results);
        assert_eq!(None, page.next);
        assert_eq!(Some(2), page.previous);

        assert!(matches!(paginate((1..=25).collect::<Vec<i32>>(), Some(PageRef::Number(4)), 10), Err(LibraryError::NotFound { .. })));
        assert!(paginate(Vec::<i32>::new(), None, 10).expect("empty page").results.is_empty());
        assert!(matches!(paginate((1..=25).collect::<Vec<i32>>(), Some(PageRef::Number(0)), 10), Err(LibraryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_should_resolve_last_page() {
        assert_eq!(Some(PageRef::Last), BookQuery::from_params(&params(&[("page", "last")])).page);
        assert_eq!(Some(PageRef::Number(2)), BookQuery::from_params(&params(&[("page", "2")])).page);

        let page = paginate((1..=25).collect::<Vec<i32>>(), Some(PageRef::Last), 10).expect("last page");
        assert_eq!(vec![21, 22, 23, 24, 25], page.results);
        assert_eq!(Some(2), page.previous);

        let page = paginate(Vec::<i32>::new(), Some(PageRef::Last), 10).expect("empty last page");
        assert!(page.results.is_empty());
        assert_eq!(None, page.previous);
    }

    #[tokio::test]
    async fn test_should_cap_page_size() {
        assert_eq!(10, BookQuery::default().effective_page_size(10, 100));
        assert_eq!(100, BookQuery::from_params(&params(&[("page_size", "1000")])).effective_page_size(10, 100));
        assert_eq!(5, BookQuery::from_params(&params(&[("page_size", "5")])).effective_page_size(10, 100));
    }
}
