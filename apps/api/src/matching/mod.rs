pub mod fuzzy;
pub mod handlers;
pub mod job_ranking;
pub mod matcher;
pub mod models;
pub mod recommendations;
