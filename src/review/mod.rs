pub mod result;
pub mod sections;
pub mod service;

pub use result::{ReviewRequest, ReviewResponse, ReviewResult, ReviewStatus};
pub use sections::parse_sections;
pub use service::{ResponseShaping, ReviewProfile, ReviewService};
