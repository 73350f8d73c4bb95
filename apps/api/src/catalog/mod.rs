pub mod handlers;
pub mod jobs;
pub mod resumes;
pub mod store;
