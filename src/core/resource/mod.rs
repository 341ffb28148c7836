pub mod list;
pub mod quantity;
