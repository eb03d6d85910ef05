pub mod health;
pub mod login;
pub mod products;
pub mod users;
