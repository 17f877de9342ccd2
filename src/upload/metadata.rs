use crate::upload::types::PhotoMeta;
use chrono::NaiveDateTime;
use exif::{Exif, In, Tag, Value};
use std::io::Cursor;
use tracing::debug;

/// Reads capture attributes from the photo's EXIF block. A photo without
/// readable EXIF still gets a meta carrying its original name.
pub fn read_photo_meta(original_name: &str, bytes: &[u8]) -> PhotoMeta {
    let mut meta = PhotoMeta::new(original_name);

    let exif = match exif::Reader::new().read_from_container(&mut Cursor::new(bytes)) {
        Ok(exif) => exif,
        Err(e) => {
            debug!("No EXIF in {}: {}", original_name, e);
            return meta;
        }
    };

    meta.original_time = ascii_tag(&exif, Tag::DateTimeOriginal)
        .or_else(|| ascii_tag(&exif, Tag::DateTime))
        .and_then(|raw| exif_datetime(&raw));
    meta.cam_make = ascii_tag(&exif, Tag::Make);
    meta.cam_model = ascii_tag(&exif, Tag::Model);
    meta.lens_model = ascii_tag(&exif, Tag::LensModel);
    meta.iso = exif
        .get_field(Tag::PhotographicSensitivity, In::PRIMARY)
        .and_then(|field| field.value.get_uint(0));
    meta.aperture = rational_tag(&exif, Tag::FNumber);
    meta.exposure_time = rational_tag(&exif, Tag::ExposureTime);
    meta.focal_length = rational_tag(&exif, Tag::FocalLength);

    meta
}

fn ascii_tag(exif: &Exif, tag: Tag) -> Option<String> {
    match &exif.get_field(tag, In::PRIMARY)?.value {
        Value::Ascii(parts) => parts
            .first()
            .map(|raw| String::from_utf8_lossy(raw).trim_matches(char::from(0)).trim().to_string())
            .filter(|s| !s.is_empty()),
        _ => None,
    }
}

fn rational_tag(exif: &Exif, tag: Tag) -> Option<f64> {
    match &exif.get_field(tag, In::PRIMARY)?.value {
        Value::Rational(values) => values
            .first()
            .filter(|r| r.denom != 0)
            .map(|r| r.to_f64()),
        _ => None,
    }
}

/// `2024:03:10 07:15:22` -> `2024-03-10T07:15:22`
fn exif_datetime(raw: &str) -> Option<String> {
    NaiveDateTime::parse_from_str(raw, "%Y:%m:%d %H:%M:%S")
        .ok()
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string())
}
