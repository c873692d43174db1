pub mod catalog;
pub mod coordinator;
pub mod token;
