pub mod generate;
pub mod models;
pub mod story;
