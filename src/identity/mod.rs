//! Central identity management for turfbook: principals, bearer tokens,
//! principal resolution, the role gate and the register/login flows.
//! Keep the public surface thin and split implementation across sub-modules.

mod principal;
mod token;
mod resolver;
mod authorizer;
mod provider;

pub use principal::{Principal, RoleTag};
pub use token::{Claims, TokenIssuer};
pub use resolver::resolve;
pub use authorizer::authorize;
pub use provider::{login, register};
