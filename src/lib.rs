pub mod barcode;
pub mod config;
pub mod errors;
pub mod intake;
pub mod logging;
