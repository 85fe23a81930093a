pub mod password;
pub mod principal;
pub mod token;

pub use password::{hash_password, verify_password, PasswordError};
pub use principal::{authorize, Owned, Principal, Relation, Role};
pub use token::{Claims, Token, TokenError, TokenService};
