pub use listmgr_cli::cli;
pub use listmgr_cli::commands;
pub use listmgr_cli::config;
pub use listmgr_cli::run;
pub use listmgr_cli::AppConfig;

pub use listmgr_core as core;
pub use listmgr_core::database as db;
pub use listmgr_core::manager;
pub use listmgr_core::model;
