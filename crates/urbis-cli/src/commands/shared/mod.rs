pub mod exit;
pub mod input;
pub mod parse;
