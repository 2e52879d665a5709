pub mod charts;
pub mod classes;
pub mod core;
pub mod journal;
pub mod stats;
pub mod students;
