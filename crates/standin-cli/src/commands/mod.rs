pub mod cache;
pub mod generate;
pub mod signature;
pub mod status;
pub mod validate;
