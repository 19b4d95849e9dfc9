pub mod blog;
pub mod case_study;
pub mod user;
pub mod user_type;

pub use blog::{Blog, BlogInput, BlogSummary};
pub use case_study::{CaseStudy, CaseStudyInput, CaseStudySummary};
pub use user::{normalize_email, User, UserInput, UserView};
pub use user_type::{UserType, UserTypeInput};
