//! BDD step definitions for sensutop

pub mod dashboard_steps;
