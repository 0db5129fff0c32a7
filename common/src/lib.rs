//! Outlet Forge Common Library
//!
//! CLIとサーバー連携部分で共有される型、検証、ワークフロー状態機械。
//! I/O は持たない。

pub mod catalog;
pub mod customize;
pub mod error;
pub mod fallback;
pub mod ingest;
pub mod presenter;
pub mod schema;
pub mod types;
pub mod workflow;

pub use customize::{collect, Selections};
pub use error::{Error, Result, ValidationError};
pub use presenter::{ConfidenceBand, ResultPresenter};
pub use schema::{
    parse_classify_response, parse_generate_response, ArtifactBody, ArtifactDescriptor,
    GenerateRequest,
};
pub use types::{
    Arrangement, ArtifactFormat, ClassificationResult, Color, Confidence, CustomizationOptions,
    DownloadArtifact, ImageMime, OutletType, ProductRecord, Provenance, UploadCandidate,
};
pub use workflow::{Action, Resolution, Session, Stage, Ticket, WorkflowState};
