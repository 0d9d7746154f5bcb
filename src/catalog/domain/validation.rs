use serde_json::Value;
use crate::books::domain::model::BookEntity;
use crate::core::library::FieldErrors;

pub(crate) const REQUIRED: &str = "This field is required.";
pub(crate) const NOT_NULL: &str = "This field may not be null.";
pub(crate) const NOT_BLANK: &str = "This field may not be blank.";
pub(crate) const NOT_STRING: &str = "Not a valid string.";
pub(crate) const NOT_INTEGER: &str = "A valid integer is required.";
pub(crate) const FUTURE_YEAR: &str = "publication year cannot be in the future";

pub(crate) fn too_long(max: usize) -> String {
    format!("Ensure this field has no more than {} characters.", max)
}

pub(crate) fn unknown_author(author_id: i64) -> String {
    format!("Invalid pk \"{}\" - object does not exist.", author_id)
}

// BookPatch holds the book fields a payload supplied, after type checks
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct BookPatch {
    pub title: Option<String>,
    pub author: Option<i64>,
    pub publication_year: Option<i32>,
}

impl BookPatch {
    // reads the book fields of `payload`; absent fields are errors unless `partial`
    pub fn parse(payload: &Value, partial: bool, errors: &mut FieldErrors) -> Self {
        Self {
            title: string_field(payload, "title", partial, errors),
            author: integer_field(payload, "author", partial, errors),
            publication_year: integer_field::<i32>(payload, "publication_year", partial, errors),
        }
    }

    // checks the supplied values that do not need storage lookups
    pub fn check(&self, max_title_length: usize, current_year: i32, errors: &mut FieldErrors) {
        if let Some(title) = &self.title {
            check_text("title", title, max_title_length, errors);
        }
        if let Some(year) = self.publication_year {
            if year > current_year {
                errors.add("publication_year", FUTURE_YEAR);
            }
        }
    }

    // returns the stored book with the supplied fields replaced
    pub fn apply(&self, book: &BookEntity) -> BookEntity {
        BookEntity {
            title: self.title.clone().unwrap_or_else(|| book.title.to_string()),
            author_id: self.author.unwrap_or(book.author_id),
            publication_year: self.publication_year.unwrap_or(book.publication_year),
            ..book.clone()
        }
    }
}

// AuthorPatch holds the author fields a payload supplied
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct AuthorPatch {
    pub name: Option<String>,
}

impl AuthorPatch {
    pub fn parse(payload: &Value, errors: &mut FieldErrors) -> Self {
        Self {
            name: string_field(payload, "name", false, errors),
        }
    }

    pub fn check(&self, max_name_length: usize, errors: &mut FieldErrors) {
        if let Some(name) = &self.name {
            check_text("name", name, max_name_length, errors);
        }
    }
}

fn check_text(field: &str, value: &str, max: usize, errors: &mut FieldErrors) {
    if value.trim().is_empty() {
        errors.add(field, NOT_BLANK);
    } else if value.chars().count() > max {
        errors.add(field, too_long(max).as_str());
    }
}

fn lookup<'a>(payload: &'a Value, field: &str, partial: bool, errors: &mut FieldErrors) -> Option<&'a Value> {
    match payload.get(field) {
        None => {
            if !partial {
                errors.add(field, REQUIRED);
            }
            None
        }
        Some(Value::Null) => {
            errors.add(field, NOT_NULL);
            None
        }
        Some(value) => Some(value),
    }
}

// strings are taken as-is; numbers are accepted in their text form
fn string_field(payload: &Value, field: &str, partial: bool, errors: &mut FieldErrors) -> Option<String> {
    match lookup(payload, field, partial, errors)? {
        Value::String(s) => Some(s.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => {
            errors.add(field, NOT_STRING);
            None
        }
    }
}

// integers may arrive as JSON numbers without a fraction or as integer-valued strings
fn integer_field<T: TryFrom<i64>>(payload: &Value, field: &str, partial: bool, errors: &mut FieldErrors) -> Option<T> {
    let parsed = match lookup(payload, field, partial, errors)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    match parsed.and_then(|n| T::try_from(n).ok()) {
        Some(n) => Some(n),
        None => {
            errors.add(field, NOT_INTEGER);
            None
        }
    }
}
