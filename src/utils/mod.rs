pub mod config;
pub mod email;
pub mod error;
pub mod hashing;
pub mod helpers;
pub mod model;
pub mod uploads;
pub mod validation;
