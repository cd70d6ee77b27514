pub mod colors;
pub mod history;
pub mod stamps;
pub mod tools;
