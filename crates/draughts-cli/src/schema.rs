pub mod run_settings;
