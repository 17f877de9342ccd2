use crate::events::{Event, PhotoLocation};
use crate::upload::{TrackingKey, UploadEntry, UploadQueue, UploadStats, UploadTarget, UploadedPhoto};

/// Results posted back to the UI thread by background tasks.
#[derive(Debug)]
pub enum AppMessage {
    AccessChecked(Result<bool, String>),
    EventsLoaded(Result<Vec<Event>, String>),
    LocationsLoaded {
        event_id: String,
        result: Result<Vec<PhotoLocation>, String>,
    },
    PhotosLoaded {
        loaded: usize,
        skipped: Vec<(String, String)>,
    },
    Uploaded(UploadedPhoto),
    BatchFinished,
}

/// Background work the UI thread should start after applying a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowUp {
    LoadEvents,
    LoadLocations(String),
}

/// What the window shows. Queue data is a snapshot refreshed on every queue
/// change notification.
#[derive(Default)]
pub struct UploadState {
    pub entries: Vec<(TrackingKey, UploadEntry)>,
    pub stats: UploadStats,
    pub events: Vec<Event>,
    pub locations: Vec<PhotoLocation>,
    pub selected_event: Option<String>,
    pub selected_location: Option<String>,
    /// `None` until the signed-in account has been checked.
    pub has_access: Option<bool>,
    pub skipped: Vec<(String, String)>,
    pub jobs_created: usize,
    pub error_message: Option<String>,
    pub show_details: bool,
    pub is_loading_photos: bool,
    pub is_uploading: bool,
    /// Set from the moment a batch or retry task is spawned until it reports
    /// `BatchFinished`.
    pub batch_running: bool,
}

impl UploadState {
    pub fn refresh(&mut self, queue: &UploadQueue) {
        self.entries = queue.snapshot();
        self.stats = queue.stats();
    }

    pub fn clear_queue_view(&mut self) {
        self.entries.clear();
        self.stats = UploadStats::default();
        self.skipped.clear();
        self.jobs_created = 0;
        self.error_message = None;
    }

    pub fn is_busy(&self) -> bool {
        self.batch_running || self.is_uploading || self.is_loading_photos
    }

    /// Swapping the session rebuilds the upload clients, so it waits for the
    /// running batch.
    pub fn can_change_session(&self) -> bool {
        !self.is_busy()
    }

    pub fn can_upload(&self, folder_selected: bool) -> bool {
        !self.is_busy()
            && self.has_access == Some(true)
            && folder_selected
            && self.selected_event.is_some()
    }

    pub fn reset_access(&mut self) {
        self.has_access = None;
        self.events.clear();
        self.locations.clear();
    }

    pub fn target(&self) -> Option<UploadTarget> {
        let event_id = self.selected_event.clone()?;
        let target = UploadTarget::new(event_id);
        Some(match &self.selected_location {
            Some(location_id) => target.with_location(location_id.clone()),
            None => target,
        })
    }

    pub fn event_name(&self, event_id: &str) -> String {
        self.events
            .iter()
            .find(|e| e.id == event_id)
            .map(|e| e.name.clone())
            .unwrap_or_else(|| format!("Event {}", event_id))
    }

    pub fn location_name(&self, location_id: &str) -> String {
        self.locations
            .iter()
            .find(|l| l.id == location_id)
            .map(|l| l.name.clone())
            .unwrap_or_else(|| location_id.to_string())
    }

    pub fn apply(&mut self, message: AppMessage) -> Option<FollowUp> {
        match message {
            AppMessage::AccessChecked(Ok(true)) => {
                self.has_access = Some(true);
                self.error_message = None;
                return Some(FollowUp::LoadEvents);
            }
            AppMessage::AccessChecked(Ok(false)) => {
                self.reset_access();
                self.has_access = Some(false);
                self.error_message = Some("This account has no photographer access".to_string());
            }
            AppMessage::AccessChecked(Err(e)) => {
                self.reset_access();
                self.has_access = Some(false);
                self.error_message = Some(e);
            }
            AppMessage::EventsLoaded(Ok(events)) => {
                self.events = events;
                if self.selected_event.is_none() && self.events.len() == 1 {
                    self.selected_event = Some(self.events[0].id.clone());
                }
                return self.selected_event.clone().map(FollowUp::LoadLocations);
            }
            AppMessage::LocationsLoaded {
                event_id,
                result: Ok(locations),
            } => {
                if self.selected_event.as_deref() == Some(event_id.as_str()) {
                    self.locations = locations;
                    let still_valid = self
                        .selected_location
                        .as_ref()
                        .map_or(true, |id| self.locations.iter().any(|l| &l.id == id));
                    if !still_valid {
                        self.selected_location = None;
                    }
                }
            }
            AppMessage::EventsLoaded(Err(e)) | AppMessage::LocationsLoaded { result: Err(e), .. } => {
                self.error_message = Some(e);
            }
            AppMessage::PhotosLoaded { loaded, skipped } => {
                self.is_loading_photos = false;
                if loaded == 0 && skipped.is_empty() {
                    self.error_message = Some("No photos found in the selected folder".to_string());
                }
                self.skipped.extend(skipped);
            }
            AppMessage::Uploaded(photo) => {
                if photo.job_id.is_some() {
                    self.jobs_created += 1;
                }
            }
            AppMessage::BatchFinished => {
                self.batch_running = false;
                if self.stats.error > 0 {
                    self.error_message = Some(
                        "Some photos failed to upload. Check details or retry.".to_string(),
                    );
                }
            }
        }
        None
    }

    pub fn progress_fraction(&self) -> f32 {
        self.stats.settled_fraction()
    }

    pub fn status_text(&self) -> String {
        let stats = &self.stats;
        format!(
            "Progress: {}/{} photos | ✅ Uploaded: {} | 📤 In progress: {} | ⏳ Waiting: {} | ❌ Failed: {}",
            stats.settled(),
            stats.total,
            stats.success,
            stats.uploading,
            stats.idle,
            stats.error
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: &str) -> Event {
        Event {
            id: id.to_string(),
            name: format!("Race {}", id),
            start_date: None,
            end_date: None,
            location: None,
        }
    }

    fn location(id: &str, event_id: &str) -> PhotoLocation {
        PhotoLocation {
            id: id.to_string(),
            event_id: event_id.to_string(),
            name: format!("Spot {}", id),
        }
    }

    #[test]
    fn single_event_is_preselected() {
        let mut state = UploadState::default();

        let next = state.apply(AppMessage::EventsLoaded(Ok(vec![event("7")])));

        assert_eq!(next, Some(FollowUp::LoadLocations("7".to_string())));
        assert_eq!(state.target(), Some(UploadTarget::new("7")));
    }

    #[test]
    fn stale_locations_are_ignored() {
        let mut state = UploadState {
            selected_event: Some("2".to_string()),
            ..Default::default()
        };

        state.apply(AppMessage::LocationsLoaded {
            event_id: "1".to_string(),
            result: Ok(vec![location("a", "1")]),
        });

        assert!(state.locations.is_empty());
    }

    #[test]
    fn location_selection_reset_when_missing() {
        let mut state = UploadState {
            selected_event: Some("1".to_string()),
            selected_location: Some("gone".to_string()),
            ..Default::default()
        };

        state.apply(AppMessage::LocationsLoaded {
            event_id: "1".to_string(),
            result: Ok(vec![location("a", "1")]),
        });

        assert_eq!(state.selected_location, None);
        assert_eq!(state.target(), Some(UploadTarget::new("1")));
    }

    #[test]
    fn empty_folder_reports_error() {
        let mut state = UploadState {
            is_loading_photos: true,
            ..Default::default()
        };

        state.apply(AppMessage::PhotosLoaded {
            loaded: 0,
            skipped: Vec::new(),
        });

        assert!(!state.is_loading_photos);
        assert!(state.error_message.is_some());
    }

    #[test]
    fn granted_access_loads_events_and_enables_upload() {
        let mut state = UploadState {
            selected_event: Some("7".to_string()),
            ..Default::default()
        };
        assert!(!state.can_upload(true));

        let next = state.apply(AppMessage::AccessChecked(Ok(true)));

        assert_eq!(next, Some(FollowUp::LoadEvents));
        assert!(state.can_upload(true));
        assert!(!state.can_upload(false));
    }

    #[test]
    fn denied_access_blocks_upload() {
        let mut state = UploadState {
            selected_event: Some("7".to_string()),
            events: vec![event("7")],
            ..Default::default()
        };

        let next = state.apply(AppMessage::AccessChecked(Ok(false)));

        assert_eq!(next, None);
        assert_eq!(state.has_access, Some(false));
        assert!(state.events.is_empty());
        assert!(!state.can_upload(true));
        assert!(state.error_message.is_some());
    }

    #[test]
    fn failed_access_check_blocks_upload() {
        let mut state = UploadState::default();

        state.apply(AppMessage::AccessChecked(Err("Unauthorized".to_string())));

        assert_eq!(state.has_access, Some(false));
        assert_eq!(state.error_message.as_deref(), Some("Unauthorized"));
    }

    #[test]
    fn session_is_locked_until_the_batch_finishes() {
        let mut state = UploadState {
            has_access: Some(true),
            selected_event: Some("7".to_string()),
            batch_running: true,
            ..Default::default()
        };
        assert!(!state.can_change_session());
        assert!(!state.can_upload(true));

        // The manager may report idle before the task posts its result.
        state.is_uploading = false;
        assert!(!state.can_change_session());

        state.apply(AppMessage::BatchFinished);

        assert!(state.can_change_session());
        assert!(state.can_upload(true));
    }
}
