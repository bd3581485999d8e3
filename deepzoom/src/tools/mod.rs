pub mod generate;
pub mod probe;
