pub mod accounts;
pub mod fees;
pub mod tokens;

pub use accounts::*;
pub use fees::*;
pub use tokens::*;
