pub mod access_codes;
pub mod admin;
pub mod media;
pub mod questions;
pub mod results;
pub mod session;
pub mod students;
