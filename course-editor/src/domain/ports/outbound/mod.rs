mod course_backend;

pub use course_backend::*;
