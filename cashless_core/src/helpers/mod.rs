pub mod dto;
pub mod payload;
pub mod utils;
