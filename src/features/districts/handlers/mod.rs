pub mod district_handler;

pub use district_handler::*;
