pub mod generation;
pub mod story;
