pub mod audit;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod contact;
pub mod orders;
pub mod products;
