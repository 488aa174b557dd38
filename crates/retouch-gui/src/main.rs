mod app;
mod convert;
mod messages;
mod panels;
mod state;
mod worker;

use clap::Parser;

#[derive(Parser)]
#[command(name = "retouch-gui", about = "Crop, rotate, blur and annotate images")]
#[command(version)]
struct Cli {
    /// Existing image to edit (path or file:// URL). Without it the file
    /// picker opens on start-up.
    location: Option<String>,
}

fn main() -> eframe::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Retouch"),
        ..Default::default()
    };

    eframe::run_native(
        "Retouch",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::RetouchApp::new(&cc.egui_ctx, cli.location)?))
        }),
    )
}
