pub mod comments;
pub mod health;
pub mod surveys;
