//! Collaborators owned by other modules of the platform

pub mod projects;

pub use projects::{PgProjectDirectory, ProjectDirectory};
