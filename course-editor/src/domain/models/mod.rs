mod activity;
mod ids;
mod section;

pub use activity::*;
pub use ids::*;
pub use section::*;
