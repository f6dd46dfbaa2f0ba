mod activity;
mod course;
mod requests;
mod section;

pub use activity::*;
pub use course::*;
pub use requests::*;
pub use section::*;
