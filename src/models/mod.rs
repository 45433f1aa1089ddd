pub mod catalog;
pub mod receipt;

pub use catalog::*;
pub use receipt::*;
