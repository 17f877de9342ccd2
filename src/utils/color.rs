use crate::upload::UploadStatus;
use eframe::egui::Color32;

pub const ACCENT: Color32 = Color32::from_rgb(232, 93, 4);
pub const MUTED: Color32 = Color32::from_rgb(150, 150, 150);
pub const SUCCESS: Color32 = Color32::from_rgb(0, 180, 0);
pub const FAILURE: Color32 = Color32::from_rgb(220, 50, 50);

pub fn status_color(status: UploadStatus) -> Color32 {
    match status {
        status if status.is_active() => ACCENT,
        UploadStatus::Success => SUCCESS,
        UploadStatus::Error => FAILURE,
        _ => MUTED,
    }
}

pub fn status_icon(status: UploadStatus) -> &'static str {
    match status {
        UploadStatus::Idle => "⏳",
        UploadStatus::Compressing => "🗜",
        UploadStatus::Uploading => "📤",
        UploadStatus::Success => "✅",
        UploadStatus::Error => "❌",
    }
}
