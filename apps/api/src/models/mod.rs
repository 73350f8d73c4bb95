pub mod evaluation;
pub mod job;
pub mod page;
pub mod resume;
