pub mod ai;
pub mod documents;
pub mod health;
