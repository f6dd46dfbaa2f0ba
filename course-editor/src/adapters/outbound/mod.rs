pub mod lms;
pub mod memory;
