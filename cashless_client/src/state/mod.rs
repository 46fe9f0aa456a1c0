pub mod dto;
pub mod reducer;

pub use dto::*;
pub use reducer::Action;
