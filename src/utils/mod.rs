pub mod token;

pub use token::{StaticTokenRegistry, TokenRegistry, get_known_token_symbol};
