pub mod backup;
pub mod cli;
pub mod config;
pub mod github;
pub mod logging;
pub mod output;
pub mod run;
