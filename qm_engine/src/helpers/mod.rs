pub mod cart;
pub mod passwords;
