pub mod api;
pub mod config;
pub mod engine;
pub mod guard;
pub mod init;
pub mod interceptor;
pub mod logger;
pub mod mirror;
pub mod service;
pub mod storage;
