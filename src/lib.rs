//! Outlet Forge
//!
//! コンセント写真の分類から交換用モデルの保存までを行うCLIのライブラリ部分。

pub mod api;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod generator;
pub mod ingest;
pub mod prompt;
pub mod report;
pub mod workflow;

pub use classifier::{Classifier, HttpClassifier, OfflineClassifier};
pub use download::DownloadDispatcher;
pub use error::{OutletForgeError, Result};
pub use generator::{Generator, HttpGenerator, OfflineGenerator};
pub use workflow::Workflow;
