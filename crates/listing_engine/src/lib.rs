//! Listing engine: uploads, persistence contract, the save pipeline and the
//! CSV exchange format.
mod csv;
mod engine;
mod filename;
mod persist;
mod store;
mod sync;
mod types;
mod upload;

pub use csv::{
    export_property, import_property, import_template, read_import_file, sanitize_value,
    write_export, CsvError, ImportOutcome, ImportedMedia, PropertyExport, BASE_HEADERS,
    REQUIRED_HEADERS,
};
pub use engine::EngineHandle;
pub use filename::export_filename;
pub use persist::{ensure_dir, write_atomic, PersistError};
pub use store::{MediaStore, StoreError};
pub use sync::{sync_media, ChannelProgressSink, NullProgressSink, ProgressSink};
pub use types::{
    EngineEvent, FailureKind, NewMedia, RequestId, SyncProgress, SyncReport, SyncRequest,
    SyncStage, UploadError, UploadReceipt,
};
pub use upload::{
    ReqwestUploader, UploadSettings, Uploader, ALLOWED_MIME_TYPES, DEFAULT_UPLOAD_ENDPOINT,
};
