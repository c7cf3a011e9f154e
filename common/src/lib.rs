//! Essay Grader Common Library
//!
//! CLIとWeb(WASM)で共有されるワークフロー・型・ステージアダプタ

pub mod types;
pub mod stage;
pub mod config;
pub mod error;
pub mod remote;
pub mod adapters;
pub mod validation;
pub mod workflow;
pub mod presentation;

pub use types::{
    FinalResult, ImageEntry, LocateResult, OcrField, OcrResult, ProcessResult, UploadedFile,
    CONTENT_CLASS, RENDERED_CLASS, TITLE_CLASS,
};
pub use stage::Stage;
pub use config::{Endpoints, ProcessMode, UploadPolicy, WorkflowConfig};
pub use error::{Error, Result};
pub use remote::{call, interpret_response, Method, RawResponse, RemoteCall, RequestBody, Transport};
pub use validation::{describe_rejections, merge_selection, validate_files, Rejection};
pub use workflow::{
    transition_for, Adapter, PendingAdvance, StageOutput, StageRequest, Workflow, WorkflowState,
};
pub use presentation::{
    controls_for, strip_data_url, to_data_url, view_for, Carousel, NavControls, StageView,
};
