pub mod lint;
pub mod playthrough;
pub mod reorder;
pub mod session;
pub mod walker;
