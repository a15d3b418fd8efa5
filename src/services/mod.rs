pub mod api_token;
pub mod auth;
pub mod people;
