mod course_editor;

pub use course_editor::*;
