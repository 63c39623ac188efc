pub mod auth_models;
pub mod card_models;
pub mod user_models;

pub use auth_models::{LoginError, LoginForm, RegisterError, RegisterForm};
pub use card_models::{
    ApiResponse, Card, CardChanges, CardError, CardResponse, CreateCardRequest, NewCard,
    ReviewRequest, UpdateCardRequest,
};
pub use user_models::{NewUser, User};
