pub mod interface;
pub mod phased;
