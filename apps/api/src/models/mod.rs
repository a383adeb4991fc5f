pub mod catalog;
pub mod profile;
pub mod quiz;
pub mod user;
