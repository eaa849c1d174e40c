pub mod health;
pub mod payload;
