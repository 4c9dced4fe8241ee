pub mod errors;
pub mod models;
pub mod ports;
pub mod purger;
pub mod service;
