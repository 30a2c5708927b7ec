pub mod diff;
pub mod retry;
pub mod time;
