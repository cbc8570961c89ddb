pub mod controller;
pub mod gateway;
pub mod index;
pub mod prompt;
pub mod service;
