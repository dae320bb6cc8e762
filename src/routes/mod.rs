pub mod auth;
pub mod choices;
pub mod courses;
pub mod departments;
pub mod health;
pub mod syllabi;
