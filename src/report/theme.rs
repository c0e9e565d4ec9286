//! Report colors and status styling

use crate::models::StatusCategory;

// ============================================================================
// Color Constants (RGB 0-255)
// ============================================================================

pub const COLOR_PRIMARY: (u8, u8, u8) = (26, 115, 232);         // #1a73e8 header band, titles
pub const COLOR_ACCENT: (u8, u8, u8) = (66, 133, 244);          // #4285f4 table headers, rules
pub const COLOR_SUCCESS: (u8, u8, u8) = (52, 168, 83);          // #34a853
pub const COLOR_WARNING: (u8, u8, u8) = (251, 188, 5);          // #fbbc05
pub const COLOR_DANGER: (u8, u8, u8) = (234, 67, 53);           // #ea4335
pub const COLOR_PANEL: (u8, u8, u8) = (240, 247, 255);          // #f0f7ff filter boxes
pub const COLOR_PANEL_NEUTRAL: (u8, u8, u8) = (248, 249, 250);  // #f8f9fa info boxes
pub const COLOR_ROW_TINT: (u8, u8, u8) = (232, 240, 254);       // #e8f0fe even table rows
pub const COLOR_TEXT_DARK: (u8, u8, u8) = (32, 33, 36);         // #202124
pub const COLOR_TEXT_MEDIUM: (u8, u8, u8) = (95, 99, 104);      // #5f6368
pub const COLOR_WHITE: (u8, u8, u8) = (255, 255, 255);

/// Chart series colors
pub const COLOR_PULSE: (u8, u8, u8) = COLOR_DANGER;
pub const COLOR_FORCE: (u8, u8, u8) = COLOR_ACCENT;

pub fn status_color(category: StatusCategory) -> (u8, u8, u8) {
    match category {
        StatusCategory::Completed => COLOR_SUCCESS,
        StatusCategory::Pending => COLOR_WARNING,
        StatusCategory::Cancelled => COLOR_DANGER,
        StatusCategory::Other => COLOR_PRIMARY,
    }
}

/// Pulse average coloring: high above 100, low below 60
pub fn pulse_color(average: f64) -> (u8, u8, u8) {
    if average > 100.0 {
        COLOR_DANGER
    } else if average < 60.0 {
        COLOR_WARNING
    } else {
        COLOR_PRIMARY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_colors() {
        assert_eq!(status_color(StatusCategory::classify("Completada")), COLOR_SUCCESS);
        assert_eq!(status_color(StatusCategory::classify("pending")), COLOR_WARNING);
        assert_eq!(status_color(StatusCategory::classify("canceled")), COLOR_DANGER);
        assert_eq!(status_color(StatusCategory::classify("unknown")), COLOR_PRIMARY);
    }

    #[test]
    fn test_pulse_thresholds() {
        assert_eq!(pulse_color(100.0), COLOR_PRIMARY);
        assert_eq!(pulse_color(100.01), COLOR_DANGER);
        assert_eq!(pulse_color(60.0), COLOR_PRIMARY);
        assert_eq!(pulse_color(59.9), COLOR_WARNING);
    }
}
