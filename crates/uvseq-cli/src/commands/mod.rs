pub mod config;
pub mod duration;
pub mod preset;
pub mod run;
pub mod stop;
