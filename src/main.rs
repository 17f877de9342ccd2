use race_photo_uploader::app::RacePhotoUploader;
use race_photo_uploader::config::Config;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("race_photo_uploader=info")),
        )
        .init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(2);
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start async runtime: {}", e);
            std::process::exit(1);
        }
    };

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([640.0, 760.0])
            .with_min_inner_size([480.0, 560.0]),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "Race Photo Uploader",
        options,
        Box::new(move |cc| Box::new(RacePhotoUploader::new(cc, config, runtime))),
    ) {
        error!("Window closed with error: {}", e);
        std::process::exit(1);
    }
}
