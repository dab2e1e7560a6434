pub mod driver;
pub mod proctor;
pub mod recommendations;
pub mod scoring;
pub mod session;
