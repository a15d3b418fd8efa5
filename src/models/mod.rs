mod api_token;
mod person;
mod user;

pub use api_token::*;
pub use person::*;
pub use user::*;
