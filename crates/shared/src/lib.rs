pub mod amount;
pub mod domain;
pub mod protocol;
