pub mod dto;
pub mod handler;

pub use dto::{Notice, NoticeKind};
pub use handler::{NoticeTimers, NOTICE_TTL};
