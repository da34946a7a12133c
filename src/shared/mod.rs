pub mod constants;
pub mod datetime;
pub mod templates;
#[cfg(test)]
pub mod test_helpers;
pub mod types;
