//! One media editing session driven from the command line.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context, Result};
use listing_core::{update, Effect, ItemId, MediaBoard, Msg, Origin, SelectedFile};
use listing_engine::{
    EngineEvent, EngineHandle, ReqwestUploader, SyncReport, SyncRequest, SyncStage,
    UploadSettings,
};
use listing_logging::{listing_debug, listing_info, set_edit_session};

use crate::catalog::Catalog;

const POLL_INTERVAL: Duration = Duration::from_millis(200);

pub struct MediaArgs {
    pub property_id: String,
    pub add: Vec<std::path::PathBuf>,
    pub remove: Vec<String>,
    pub moves: Vec<(String, String)>,
    pub describe: Vec<(String, String)>,
    pub endpoint: String,
    pub max_files: usize,
    pub dry_run: bool,
}

pub fn run(catalog: Catalog, args: MediaArgs) -> Result<()> {
    let existing = catalog
        .media(&args.property_id)
        .ok_or_else(|| anyhow!("unknown property {}", args.property_id))?;
    set_edit_session(u64::from(std::process::id()));

    let mut board = step(
        MediaBoard::with_max_files(args.max_files),
        Msg::Initialize {
            existing,
            pending: Vec::new(),
        },
    );

    let files = args
        .add
        .iter()
        .map(|path| selected_file(path))
        .collect::<Result<Vec<_>>>()?;
    if !files.is_empty() {
        board = step(board, Msg::FilesSelected(files));
        if let Some(stats) = board.view().last_add_stats.filter(|stats| stats.dropped > 0) {
            println!(
                "Only {} more file(s) fit (limit {}); skipped {}.",
                stats.accepted,
                board.max_files(),
                stats.dropped
            );
        }
    }
    let edits = resolve_edits(&board, &args)?;
    board = apply_edits(board, edits);

    print_board(&board);
    if args.dry_run {
        set_edit_session(0);
        return Ok(());
    }

    let settings = UploadSettings::with_endpoint(&args.endpoint)
        .with_context(|| format!("invalid upload endpoint {}", args.endpoint))?;
    let request = SyncRequest::from_board(1, args.property_id.as_str(), &board);
    let deadline = settings.request_timeout * (request.uploads.len() as u32 + 1)
        + Duration::from_secs(30);

    let engine = EngineHandle::new(
        Arc::new(catalog),
        Arc::new(ReqwestUploader::new(settings)),
    );
    engine.submit(request);
    let report = wait_for_report(&engine, deadline)?;

    let failed = report.failed.len();
    let uploaded = report.uploaded.len();
    for msg in report.into_messages() {
        board = step(board, msg);
    }
    print_board(&board);
    listing_info!("media session saved: {uploaded} uploaded, {failed} failed");
    set_edit_session(0);

    if failed > 0 {
        bail!("{failed} file(s) could not be saved; run again to retry");
    }
    Ok(())
}

/// Removals, description edits and moves with every reference already
/// pinned to an item, so `new:N` keeps naming the same file however
/// earlier edits reorder the list.
#[derive(Debug, Default)]
struct ResolvedEdits {
    remove: Vec<ItemId>,
    describe: Vec<(ItemId, String)>,
    moves: Vec<(ItemId, Option<ItemId>)>,
}

fn resolve_edits(board: &MediaBoard, args: &MediaArgs) -> Result<ResolvedEdits> {
    let mut edits = ResolvedEdits::default();
    for raw in &args.remove {
        edits.remove.push(resolve(board, raw)?);
    }
    for (raw, description) in &args.describe {
        edits.describe.push((resolve(board, raw)?, description.clone()));
    }
    for (raw, target) in &args.moves {
        let before = match target.as_str() {
            "end" => None,
            other => Some(resolve(board, other)?),
        };
        edits.moves.push((resolve(board, raw)?, before));
    }
    Ok(edits)
}

fn apply_edits(mut board: MediaBoard, edits: ResolvedEdits) -> MediaBoard {
    for item in edits.remove {
        board = step(board, Msg::RemoveClicked(item));
    }
    for (item, description) in edits.describe {
        board = step(board, Msg::DescriptionEdited { item, description });
    }
    for (item, before) in edits.moves {
        board = step(board, Msg::Reorder { item, before });
    }
    board
}

fn step(board: MediaBoard, msg: Msg) -> MediaBoard {
    let (board, effects) = update(board, msg);
    for effect in &effects {
        match effect {
            Effect::PersistPriorities { assignments } => {
                listing_debug!("priorities now cover {} stored items", assignments.len())
            }
            Effect::PendingFilesReordered { files } => {
                listing_debug!("{} pending files reordered", files.len())
            }
            Effect::RemovalRequested { media_id } => {
                listing_debug!("removal of {media_id} queued for save")
            }
            Effect::UpdateDescription { media_id, .. } => {
                listing_debug!("description of {media_id} queued for save")
            }
        }
    }
    board
}

fn wait_for_report(engine: &EngineHandle, limit: Duration) -> Result<SyncReport> {
    let deadline = Instant::now() + limit;
    loop {
        match engine.recv_timeout(POLL_INTERVAL) {
            Some(EngineEvent::Progress(progress)) => {
                if let Some(line) = stage_line(progress.stage) {
                    println!("{line}");
                }
            }
            Some(EngineEvent::SyncCompleted { report, .. }) => return Ok(report),
            None if Instant::now() >= deadline => bail!("save did not finish in {limit:?}"),
            None => {}
        }
    }
}

fn stage_line(stage: SyncStage) -> Option<&'static str> {
    match stage {
        SyncStage::Removing => Some("Removing media..."),
        SyncStage::Describing => Some("Updating descriptions..."),
        SyncStage::Reordering => Some("Saving order..."),
        SyncStage::Uploading => Some("Uploading..."),
        SyncStage::Registering | SyncStage::Done => None,
    }
}

/// `new:N` names the N-th file still pending; anything else is a stored media id.
fn resolve(board: &MediaBoard, raw: &str) -> Result<ItemId> {
    let id = match raw.strip_prefix("new:") {
        Some(index) => {
            let index: usize = index
                .parse()
                .with_context(|| format!("bad file reference {raw}"))?;
            let file = index
                .checked_sub(1)
                .and_then(|index| board.pending_files().get(index))
                .ok_or_else(|| anyhow!("no pending file {raw}"))?;
            ItemId::Pending(file.handle)
        }
        None => ItemId::existing(raw),
    };
    if !board.items().iter().any(|item| item.id == id) {
        bail!("{raw} is not in the media list");
    }
    Ok(id)
}

fn selected_file(path: &Path) -> Result<SelectedFile> {
    let meta = fs::metadata(path).with_context(|| format!("reading {}", path.display()))?;
    if !meta.is_file() {
        bail!("{} is not a file", path.display());
    }
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow!("{} has no file name", path.display()))?;
    let mime_type = mime_for(path);
    Ok(SelectedFile::new(path, filename, meta.len(), mime_type))
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "ogv" | "ogg" => "video/ogg",
        "mov" => "video/quicktime",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

fn print_board(board: &MediaBoard) {
    let view = board.view();
    println!("Media ({})", view.count_label());
    for row in &view.rows {
        let origin = match row.origin {
            Origin::Existing => "stored",
            Origin::New => "new",
        };
        let mut line = format!("  {}. [{}] {} {}", row.order + 1, origin, row.kind, row.filename);
        if !row.description.is_empty() {
            line.push_str(&format!(" - {}", row.description));
        }
        if let Some(error) = &row.upload_error {
            line.push_str(&format!(" (failed: {error})"));
        }
        println!("{line}");
    }
}
