pub mod credentials;
pub mod login;
pub mod password;
pub mod policy;
pub mod principal;
pub mod secret;
pub mod token_codec;

pub use credentials::{CredentialError, CredentialVerifier, StoreCredentialVerifier};
pub use login::{IssuedToken, LoginService};
pub use password::{Argon2Params, Argon2PasswordHasher, PasswordHasher};
pub use policy::{AccessDenied, RequiredRoles, RoutePolicy, default_route_policy};
pub use principal::Principal;
pub use secret::SecretKey;
pub use token_codec::{TokenCodec, TokenError};
