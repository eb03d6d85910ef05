pub mod error;
pub mod product_repo;
pub mod user_repo;

pub use error::RepoError;
pub use product_repo::{InMemoryProductStore, NewProduct, ProductRow, ProductStore};
pub use user_repo::{InMemoryUserStore, NewUser, UserRow, UserStore};
