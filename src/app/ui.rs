use super::RacePhotoUploader;
use crate::upload::UploadStatus;
use crate::utils::color::{status_color, status_icon, ACCENT, FAILURE, MUTED};
use crate::utils::file_size::{compression_summary, format_size};
use eframe::egui::{self, Align, RichText};
use rfd::FileDialog;

impl RacePhotoUploader {
    pub fn render(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let footer_height = 30.0;
            let content_height = ui.available_height() - footer_height;

            egui::ScrollArea::vertical()
                .max_height(content_height)
                .show(ui, |ui| {
                    ui.add_space(16.0);
                    ui.vertical_centered(|ui| {
                        ui.heading("Race Photo Uploader");
                        ui.add_space(4.0);
                        ui.label(
                            RichText::new("Compress and upload event photos for bib search")
                                .color(ui.visuals().text_color().gamma_multiply(0.7)),
                        );
                    });
                    ui.add_space(16.0);

                    self.render_session(ui);
                    ui.add_space(12.0);
                    self.render_target(ui);
                    ui.add_space(12.0);
                    self.render_folder(ui);
                    ui.add_space(16.0);
                    self.render_actions(ui);
                    ui.add_space(16.0);

                    if self.state.stats.total > 0 {
                        self.render_progress(ui);
                        ui.add_space(10.0);
                        self.render_details(ui);
                    }
                });

            ui.with_layout(egui::Layout::bottom_up(Align::Center), |ui| {
                ui.add_space(8.0);
                self.render_footer(ui);
            });
        });
    }

    fn render_session(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.label("Session");
                ui.label("ℹ").on_hover_text_at_pointer(
                    "Paste your access token, or a request copied from the web app:\n\
                    1. Sign in to the web app and open Developer Tools (F12)\n\
                    2. Go to the Network tab and open any /api/events request\n\
                    3. Right-click and Copy as cURL",
                );
                match (self.session.is_active(), self.state.has_access) {
                    (true, Some(true)) => {
                        ui.colored_label(ACCENT, "● signed in");
                    }
                    (true, Some(false)) => {
                        ui.colored_label(FAILURE, "● no photographer access");
                    }
                    (true, None) => {
                        ui.colored_label(MUTED, "● checking access…");
                    }
                    (false, _) => {}
                }
            });
            ui.add_space(6.0);
            ui.add_sized(
                [ui.available_width(), 80.0],
                egui::TextEdit::multiline(&mut self.session_text)
                    .font(egui::TextStyle::Monospace)
                    .hint_text("curl 'https://…/api/events/<event-id>/locations' -H 'authorization: Bearer …'"),
            );
            ui.horizontal(|ui| {
                ui.label("Server:");
                ui.label(RichText::new(&self.api_url).monospace());
                let can_apply =
                    self.state.can_change_session() && !self.session_text.trim().is_empty();
                if ui
                    .add_enabled(can_apply, egui::Button::new("Use session"))
                    .clicked()
                {
                    self.apply_session();
                }
                if self.session.is_active()
                    && self.state.can_change_session()
                    && ui.button("Sign out").clicked()
                {
                    self.sign_out();
                }
            });
        });
    }

    fn render_target(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            let previous_event = self.state.selected_event.clone();
            let event_text = self
                .state
                .selected_event
                .as_deref()
                .map(|id| self.state.event_name(id))
                .unwrap_or_else(|| "Select event".to_string());

            ui.horizontal(|ui| {
                egui::ComboBox::from_label("Event")
                    .selected_text(event_text)
                    .show_ui(ui, |ui| {
                        for event in &self.state.events {
                            ui.selectable_value(
                                &mut self.state.selected_event,
                                Some(event.id.clone()),
                                event.name.as_str(),
                            );
                        }
                    });
                if ui.small_button("⟳").on_hover_text("Reload events").clicked() {
                    self.load_events();
                }
            });

            if self.state.selected_event != previous_event {
                self.state.locations.clear();
                self.state.selected_location = None;
                if let Some(event_id) = self.state.selected_event.clone() {
                    self.load_locations(event_id);
                }
            }

            let location_text = self
                .state
                .selected_location
                .as_deref()
                .map(|id| self.state.location_name(id))
                .unwrap_or_else(|| "No location".to_string());

            ui.add_enabled_ui(self.state.selected_event.is_some(), |ui| {
                egui::ComboBox::from_label("Location")
                    .selected_text(location_text)
                    .show_ui(ui, |ui| {
                        ui.selectable_value(&mut self.state.selected_location, None, "No location");
                        for location in &self.state.locations {
                            ui.selectable_value(
                                &mut self.state.selected_location,
                                Some(location.id.clone()),
                                location.name.as_str(),
                            );
                        }
                    });
            });
        });
    }

    fn render_folder(&mut self, ui: &mut egui::Ui) {
        ui.label("Note: hidden files and files listed in .gitignore are skipped");
        ui.add_space(6.0);
        ui.group(|ui| {
            ui.horizontal(|ui| {
                if ui.button("📁 Select Folder").clicked() {
                    if let Some(path) = FileDialog::new().pick_folder() {
                        self.select_folder(path);
                    }
                }
                if let Some(folder) = &self.folder_path {
                    ui.label(format!("Selected: {}", folder.display()));
                }
                if let Some(count) = self.photo_count {
                    ui.label(RichText::new(format!("{} photo(s)", count)).color(MUTED));
                }
            });
            ui.horizontal(|ui| {
                ui.label("Only files matching:");
                ui.add(
                    egui::TextEdit::singleline(&mut self.patterns_text)
                        .hint_text("finish/*, *_bib*.jpg"),
                );
            });
            ui.add(egui::Slider::new(&mut self.config.concurrency, 1..=6).text("parallel uploads"));
        });
    }

    fn render_actions(&mut self, ui: &mut egui::Ui) {
        let busy = self.state.is_busy();
        let can_upload = self.state.can_upload(self.folder_path.is_some());

        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(can_upload, |ui| {
                let button =
                    egui::Button::new("📤 Upload Photos").min_size(egui::vec2(200.0, 40.0));
                if ui.add(button).clicked() {
                    self.start_upload();
                }
            });

            ui.add_space(6.0);
            ui.horizontal(|ui| {
                let can_retry =
                    !busy && self.state.has_access == Some(true) && self.state.stats.error > 0;
                ui.add_enabled_ui(can_retry, |ui| {
                    if ui.button("🔄 Retry Failed").clicked() {
                        self.retry_failed();
                    }
                });
                ui.add_enabled_ui(!busy && self.state.stats.total > 0, |ui| {
                    if ui.button("🗑 Clear Queue").clicked() {
                        self.clear_queue();
                    }
                });
            });
        });
    }

    fn render_progress(&self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            let heading = if self.state.is_loading_photos {
                "Reading photos…"
            } else if self.state.is_uploading {
                "📤 Uploading"
            } else if self.state.stats.error > 0 {
                "Finished with failures"
            } else {
                "Upload complete"
            };
            ui.label(heading);

            ui.add(
                egui::ProgressBar::new(self.state.progress_fraction())
                    .show_percentage()
                    .fill(ACCENT),
            );
            ui.label(self.state.status_text());
            if self.state.jobs_created > 0 {
                ui.label(
                    RichText::new(format!("{} recognition job(s) queued", self.state.jobs_created))
                        .color(MUTED),
                );
            }
        });
    }

    fn render_details(&mut self, ui: &mut egui::Ui) {
        let label = if self.state.show_details {
            "Hide Details"
        } else {
            "Show Details"
        };
        if ui.button(label).clicked() {
            self.state.show_details = !self.state.show_details;
        }
        if !self.state.show_details {
            return;
        }

        let mut open_path = None;
        egui::ScrollArea::vertical()
            .id_source("details")
            .max_height(240.0)
            .show(ui, |ui| {
                egui::Frame::none()
                    .fill(ui.style().visuals.extreme_bg_color)
                    .show(ui, |ui| {
                        ui.add_space(6.0);
                        for (_, entry) in &self.state.entries {
                            ui.horizontal(|ui| {
                                ui.label(status_icon(entry.status));
                                ui.colored_label(status_color(entry.status), &entry.file.name);

                                match entry.status {
                                    UploadStatus::Error => {
                                        let error = entry.error.as_deref().unwrap_or("Upload failed");
                                        ui.colored_label(FAILURE, error);
                                    }
                                    UploadStatus::Success => {
                                        if let Some(size) = entry.compressed_size {
                                            ui.label(
                                                RichText::new(compression_summary(entry.file.size(), size))
                                                    .color(MUTED),
                                            );
                                        }
                                        if let Some(path) = &entry.result_path {
                                            if self.config.public_url.is_some()
                                                && ui.small_button("Open").clicked()
                                            {
                                                open_path = Some(path.clone());
                                            }
                                        }
                                    }
                                    status => {
                                        ui.label(
                                            RichText::new(format!(
                                                "{} {}% · {}",
                                                status.label(),
                                                entry.progress,
                                                format_size(entry.file.size())
                                            ))
                                            .color(MUTED),
                                        );
                                    }
                                }
                            });
                            ui.add_space(3.0);
                        }
                        for (name, reason) in &self.state.skipped {
                            ui.horizontal(|ui| {
                                ui.label("⏩");
                                ui.colored_label(MUTED, format!("{} - {}", name, reason));
                            });
                        }
                        ui.add_space(6.0);
                    });
            });

        if let Some(path) = open_path {
            self.open_photo(&path);
        }
    }

    fn render_footer(&self, ui: &mut egui::Ui) {
        if let Some(error) = &self.state.error_message {
            ui.colored_label(FAILURE, error);
        }
    }
}
