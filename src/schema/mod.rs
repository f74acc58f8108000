pub mod choice;
pub mod scene;
pub mod stats;
pub mod story;
