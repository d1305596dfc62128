pub mod error;
pub mod ledger;
pub mod lifecycle;
pub mod product;
pub mod request;
pub mod store;
pub mod user;
pub mod utils;
