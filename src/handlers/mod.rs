pub mod auth;
pub mod cards;
