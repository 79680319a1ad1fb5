pub use super::history::Entity as History;
