use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Instant;

use retouch_core::error::Result;
use retouch_core::export::export_image;
use retouch_core::source::ImageSource;
use tracing::info;

use crate::messages::{WorkerCommand, WorkerResult};

/// Spawn the worker thread. Returns the command sender.
pub fn spawn_worker(
    result_tx: mpsc::Sender<WorkerResult>,
    ctx: egui::Context,
) -> std::io::Result<mpsc::Sender<WorkerCommand>> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<WorkerCommand>();

    std::thread::Builder::new()
        .name("retouch-worker".into())
        .spawn(move || {
            worker_loop(cmd_rx, result_tx, ctx);
        })?;

    Ok(cmd_tx)
}

fn send(tx: &mpsc::Sender<WorkerResult>, ctx: &egui::Context, result: WorkerResult) {
    let _ = tx.send(result);
    ctx.request_repaint();
}

fn send_log(tx: &mpsc::Sender<WorkerResult>, ctx: &egui::Context, msg: impl Into<String>) {
    send(tx, ctx, WorkerResult::Log { message: msg.into() });
}

fn send_error(tx: &mpsc::Sender<WorkerResult>, ctx: &egui::Context, msg: impl Into<String>) {
    send(tx, ctx, WorkerResult::Error { message: msg.into() });
}

fn worker_loop(
    cmd_rx: mpsc::Receiver<WorkerCommand>,
    tx: mpsc::Sender<WorkerResult>,
    ctx: egui::Context,
) {
    while let Ok(cmd) = cmd_rx.recv() {
        match cmd {
            WorkerCommand::Decode { path, scale_cap } => {
                handle_decode(&path, &tx, &ctx, || ImageSource::open(&path, scale_cap));
            }
            WorkerCommand::OpenExisting {
                location,
                scale_cap,
            } => {
                let path = PathBuf::from(&location);
                handle_decode(&path, &tx, &ctx, || {
                    ImageSource::open_existing(&location, scale_cap)
                });
            }
            WorkerCommand::Export {
                source,
                view,
                config,
                renderer,
                path,
            } => {
                let start = Instant::now();
                let exported = export_image(&source, &view, &config, &renderer)
                    .and_then(|out| out.write_to(&path).map(|()| out));
                match exported {
                    Ok(out) => {
                        info!(path = %path.display(), elapsed = ?start.elapsed(), "Export written");
                        send(
                            &tx,
                            &ctx,
                            WorkerResult::Exported {
                                path,
                                width: out.width,
                                height: out.height,
                            },
                        );
                    }
                    Err(e) => send_error(&tx, &ctx, format!("Export failed: {e}")),
                }
            }
        }
    }
}

fn handle_decode(
    path: &Path,
    tx: &mpsc::Sender<WorkerResult>,
    ctx: &egui::Context,
    decode: impl FnOnce() -> Result<ImageSource>,
) {
    send(
        tx,
        ctx,
        WorkerResult::Loading {
            path: path.to_path_buf(),
        },
    );
    let start = Instant::now();
    let result = decode();
    if let Ok(ref source) = result {
        let (w, h) = source.original_size();
        send_log(
            tx,
            ctx,
            format!(
                "Decoded {}x{} in {:.0}ms",
                w,
                h,
                start.elapsed().as_secs_f32() * 1000.0
            ),
        );
    }
    send(
        tx,
        ctx,
        WorkerResult::Decoded {
            path: path.to_path_buf(),
            result,
        },
    );
}
