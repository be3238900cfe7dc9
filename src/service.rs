pub mod auth;
pub mod provider;
pub mod recipe;
pub mod token;
