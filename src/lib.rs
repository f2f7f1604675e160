// Library surface: the race engine, persistence and the interactive app state.
// The binary only wires these to a terminal.
pub mod account;
pub mod achievements;
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod corpus;
pub mod export;
pub mod game;
pub mod leaderboard;
pub mod model;
pub mod profile;
pub mod runtime;
pub mod scoring;
pub mod session;
pub mod store;
pub mod timer;
pub mod ui;
pub mod util;
