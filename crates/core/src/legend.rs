use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Highlight color for fields without a legend entry.
pub const DEFAULT_OVERLAY_COLOR: Rgb = Rgb(100, 100, 100);

/// Summary label color for fields without a legend entry.
pub const DEFAULT_SUMMARY_COLOR: Rgb = Rgb(0, 0, 0);

/// Field colors shown on annotated pages and in the summary legend.
///
/// Channels are RGB on both outputs, so every entry renders as its name.
pub const LEGEND: [(&str, Rgb); 9] = [
    ("owner_name", Rgb(0, 255, 0)),             // Green
    ("property_address", Rgb(255, 0, 0)),       // Red
    ("property_parcel_id", Rgb(0, 0, 255)),     // Blue
    ("document_id", Rgb(255, 165, 0)),          // Orange
    ("legal_description", Rgb(128, 0, 128)),    // Purple
    ("recording_information", Rgb(255, 192, 203)), // Pink
    ("grantor_name", Rgb(255, 128, 0)),         // Dark Orange
    ("grantee_name", Rgb(0, 255, 255)),         // Cyan
    ("deed_type", Rgb(128, 128, 0)),            // Olive
];

/// Legend color for a field name, if it has one.
pub fn legend_color(name: &str) -> Option<Rgb> {
    LEGEND
        .iter()
        .find(|(field, _)| *field == name)
        .map(|(_, color)| *color)
}

/// Color used when highlighting OCR words matched to `name`.
pub fn overlay_color(name: &str) -> Rgb {
    legend_color(name).unwrap_or(DEFAULT_OVERLAY_COLOR)
}

/// Color used for `name`'s label in the summary. Lookup ignores case.
pub fn summary_color(name: &str) -> Rgb {
    legend_color(&name.to_lowercase()).unwrap_or(DEFAULT_SUMMARY_COLOR)
}
