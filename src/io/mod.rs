//! Archive service boundary and export routing.

pub mod export;
pub mod http;
pub mod service;

// Re-export main types
pub use export::{ExportDispatcher, ExportSummary};
pub use http::{HttpArchiveService, HttpServiceConfig};
pub use service::{
    ArchiveService, AssetExportRequest, DownloadRequest, ExportTaskId, ImageDescriptor,
    SearchQuery,
};
