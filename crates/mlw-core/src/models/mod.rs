pub mod comment;
pub mod ids;
pub mod page;
pub mod survey;
