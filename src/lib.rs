//! Essay Grader CLI
//!
//! 共通ワークフローエンジンを reqwest で駆動し、端末から作文を一括批改する。

pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod review;
pub mod scanner;
pub mod transport;
