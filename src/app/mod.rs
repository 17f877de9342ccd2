mod state;
mod ui;

use crate::config::Config;
use crate::events::EventsClient;
use crate::upload::{
    FileProcessor, HttpTransport, JpegCompressor, QueueEvent, Session,
    UploadManager, UploadPipeline, UploadQueue,
};
use crate::utils::curl_parser::CurlParser;
use eframe::{egui, App};
pub use state::{AppMessage, FollowUp, UploadState};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tracing::{info, warn};

pub struct RacePhotoUploader {
    config: Config,
    runtime: Runtime,
    session: Arc<Session>,
    queue: UploadQueue,
    manager: Arc<UploadManager>,
    events_client: EventsClient,
    api_url: String,
    session_text: String,
    folder_path: Option<PathBuf>,
    photo_count: Option<usize>,
    patterns_text: String,
    state: UploadState,
    queue_events: mpsc::UnboundedReceiver<QueueEvent>,
    messages_tx: mpsc::UnboundedSender<AppMessage>,
    messages_rx: mpsc::UnboundedReceiver<AppMessage>,
}

impl RacePhotoUploader {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: Config, runtime: Runtime) -> Self {
        info!("Initializing race photo uploader against {}", config.api_url);

        let session = Arc::new(Session::new());
        session.set_token(config.access_token.clone());

        let queue = UploadQueue::new();
        let queue_events = queue.subscribe();
        let (messages_tx, messages_rx) = mpsc::unbounded_channel();

        let manager = Self::build_manager(&config, &config.api_url, &session, &queue, &messages_tx);
        let events_client = EventsClient::new(config.api_url.clone(), session.clone());

        let mut app = Self {
            api_url: config.api_url.clone(),
            state: UploadState {
                selected_event: config.event_id.clone(),
                selected_location: config.location_id.clone(),
                ..Default::default()
            },
            config,
            runtime,
            session,
            queue,
            manager,
            events_client,
            session_text: String::new(),
            folder_path: None,
            photo_count: None,
            patterns_text: String::new(),
            queue_events,
            messages_tx,
            messages_rx,
        };

        if app.session.is_active() {
            app.check_access();
        }
        app
    }

    fn build_manager(
        config: &Config,
        api_url: &str,
        session: &Arc<Session>,
        queue: &UploadQueue,
        messages_tx: &mpsc::UnboundedSender<AppMessage>,
    ) -> Arc<UploadManager> {
        let pipeline = UploadPipeline::new(
            Arc::new(JpegCompressor::new(config.compression_options())),
            Arc::new(HttpTransport::new(api_url)),
            session.clone(),
        );
        let tx = messages_tx.clone();
        Arc::new(
            UploadManager::with_queue(pipeline, queue.clone()).on_uploaded(move |photo| {
                // The window may already be closing; nothing to notify then.
                let _ = tx.send(AppMessage::Uploaded(photo.clone()));
                Ok(())
            }),
        )
    }

    /// Parses the pasted session and rewires API clients to its server.
    pub fn apply_session(&mut self) {
        if !self.state.can_change_session() {
            self.state.error_message =
                Some("Wait for the current upload to finish before switching session".to_string());
            return;
        }

        let mut parser = CurlParser::new();
        if let Err(e) = parser.parse(&self.session_text) {
            warn!("Could not parse session: {}", e);
            self.state.error_message = Some(e.to_string());
            return;
        }

        if let Some(base_url) = parser.base_url.take() {
            self.api_url = base_url;
        }
        if let Some(event_id) = parser.event_id.take() {
            self.state.selected_event = Some(event_id);
        }
        self.session.set_token(parser.access_token.take());
        self.state.error_message = None;
        self.state.reset_access();
        self.rebuild_clients();
        self.check_access();
    }

    pub fn sign_out(&mut self) {
        self.session.set_token(None);
        self.state.reset_access();
    }

    fn rebuild_clients(&mut self) {
        self.manager = Self::build_manager(
            &self.config,
            &self.api_url,
            &self.session,
            &self.queue,
            &self.messages_tx,
        );
        self.events_client = EventsClient::new(self.api_url.clone(), self.session.clone());
    }

    pub fn check_access(&self) {
        let client = self.events_client.clone();
        let tx = self.messages_tx.clone();
        self.runtime.spawn(async move {
            let result = client.check_access().await.map_err(|e| e.to_string());
            if let Ok(false) = result {
                warn!("Signed-in account has no photographer access");
            }
            let _ = tx.send(AppMessage::AccessChecked(result));
        });
    }

    pub fn load_events(&self) {
        let client = self.events_client.clone();
        let tx = self.messages_tx.clone();
        self.runtime.spawn(async move {
            let result = client
                .photographer_events()
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(AppMessage::EventsLoaded(result));
        });
    }

    pub fn load_locations(&self, event_id: String) {
        let client = self.events_client.clone();
        let tx = self.messages_tx.clone();
        self.runtime.spawn(async move {
            let result = client.locations(&event_id).await.map_err(|e| e.to_string());
            let _ = tx.send(AppMessage::LocationsLoaded { event_id, result });
        });
    }

    pub fn select_folder(&mut self, path: PathBuf) {
        let count = FileProcessor::new(&path).count_supported_files();
        info!("Found {} supported photo(s) in {}", count, path.display());
        self.photo_count = Some(count);
        self.folder_path = Some(path);
    }

    pub fn start_upload(&mut self) {
        let Some(target) = self.state.target() else {
            self.state.error_message = Some("Select an event first".to_string());
            return;
        };
        let Some(folder_path) = self.folder_path.clone() else {
            self.state.error_message = Some("No folder selected".to_string());
            return;
        };

        let processor = match FileProcessor::new(folder_path).with_patterns(self.patterns_text.split(',')) {
            Ok(processor) => processor,
            Err(e) => {
                self.state.error_message = Some(e.to_string());
                return;
            }
        };

        self.state.error_message = None;
        self.state.is_loading_photos = true;
        self.state.batch_running = true;

        let manager = self.manager.clone();
        let tx = self.messages_tx.clone();
        let policy = self.config.drain_policy();
        info!(
            "Starting upload from {} to event {}",
            processor.folder_path().display(),
            target.event_id
        );

        self.runtime.spawn(async move {
            let mut files = Vec::new();
            let mut skipped = Vec::new();
            for path in processor.collect_photos() {
                match processor.load_photo(&path).await {
                    Ok(file) => files.push(file),
                    Err(e) => {
                        warn!("Skipping {}: {}", path.display(), e);
                        skipped.push((path.display().to_string(), e.to_string()));
                    }
                }
            }

            let _ = tx.send(AppMessage::PhotosLoaded {
                loaded: files.len(),
                skipped,
            });
            if !files.is_empty() {
                manager.upload_photos(&target, files, policy).await;
            }
            let _ = tx.send(AppMessage::BatchFinished);
        });
    }

    pub fn retry_failed(&mut self) {
        let Some(target) = self.state.target() else {
            self.state.error_message = Some("Select an event first".to_string());
            return;
        };
        self.state.error_message = None;
        self.state.batch_running = true;

        let manager = self.manager.clone();
        let tx = self.messages_tx.clone();
        self.runtime.spawn(async move {
            manager.retry_failed(&target).await;
            let _ = tx.send(AppMessage::BatchFinished);
        });
    }

    pub fn clear_queue(&mut self) {
        self.manager.clear();
        self.state.clear_queue_view();
    }

    pub fn open_photo(&self, photo_path: &str) {
        match self.config.photo_url(photo_path) {
            Some(url) => {
                if let Err(e) = open::that(&url) {
                    warn!("Failed to open {}: {}", url, e);
                }
            }
            None => warn!("RACE_PHOTO_PUBLIC_URL is not set; cannot open {}", photo_path),
        }
    }

    pub fn update_state(&mut self, ctx: &egui::Context) {
        let mut queue_changed = false;
        while self.queue_events.try_recv().is_ok() {
            queue_changed = true;
        }
        if queue_changed {
            self.state.refresh(&self.queue);
        }

        let mut had_messages = false;
        while let Ok(message) = self.messages_rx.try_recv() {
            had_messages = true;
            match self.state.apply(message) {
                Some(FollowUp::LoadEvents) => self.load_events(),
                Some(FollowUp::LoadLocations(event_id)) => self.load_locations(event_id),
                None => {}
            }
        }

        self.state.is_uploading = self.manager.is_uploading();

        if queue_changed || had_messages {
            ctx.request_repaint();
        }
        if self.state.is_busy() {
            ctx.request_repaint_after(std::time::Duration::from_millis(200));
        }
    }
}

impl App for RacePhotoUploader {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_state(ctx);
        self.render(ctx);
    }
}
