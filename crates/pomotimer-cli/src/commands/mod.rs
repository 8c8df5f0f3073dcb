pub mod alarm;
pub mod config;
pub mod run;
pub mod sessions;
pub mod status;
