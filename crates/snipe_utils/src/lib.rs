pub mod abi;
pub mod env;
pub mod log;
pub mod utils;
