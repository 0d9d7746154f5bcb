pub mod date;
pub mod ddb;
pub mod logging;
pub mod memory;
