use crate::core::domain::Identifiable;

pub mod model;

// Book is the read-side view shared by stored books and their representations
pub(crate) trait Book: Identifiable {
    fn title(&self) -> &str;
    fn author_id(&self) -> i64;
    fn publication_year(&self) -> i32;
}
