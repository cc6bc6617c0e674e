pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService};
pub use auth_service_impl::CredentialAuthService;

pub mod token_meter;
pub use token_meter::{MeterError, TokenMeter};

pub mod meme_maker;
pub use meme_maker::{MemeMaker, MemeProvider};

pub mod meme_service;
pub mod meme_service_impl;
pub use meme_service::{MemeError, MemeService};
pub use meme_service_impl::MeteredMemeService;

pub mod user_service;
pub mod user_service_impl;
pub use user_service::{UserError, UserService};
pub use user_service_impl::StoreUserService;
