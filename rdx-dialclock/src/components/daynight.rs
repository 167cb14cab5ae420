//! Day/night background tint for skins whose outer border enables auto-fill.
//!
//! Black at night, white during the day, with a one-hour grayscale fade at
//! dawn (05:30 to 06:30) and dusk (17:30 to 18:30).

const DAWN_START: u32 = 5 * 60 + 30;
const DAWN_END: u32 = 6 * 60 + 30;
const DUSK_START: u32 = 17 * 60 + 30;
const DUSK_END: u32 = 18 * 60 + 30;
const FADE_MINUTES: f64 = 60.0;

/// Gray level (0 black, 255 white) for a minute of the day.
pub fn gray_level(minute_of_day: u32) -> u8 {
    match minute_of_day {
        m if m < DAWN_START => 0,
        m if m < DAWN_END => ramp(f64::from(m - DAWN_START) / FADE_MINUTES),
        m if m < DUSK_START => 255,
        m if m < DUSK_END => ramp(1.0 - f64::from(m - DUSK_START) / FADE_MINUTES),
        _ => 0,
    }
}

// Truncates like an integer conversion would.
fn ramp(ratio: f64) -> u8 {
    (ratio * 255.0) as u8
}

/// Background fill for a minute of the day as a `#rrggbb` color.
pub fn fill_color(minute_of_day: u32) -> String {
    let gray = u32::from(gray_level(minute_of_day));
    format!("#{:06x}", gray | gray << 8 | gray << 16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn night_is_black_and_day_is_white() {
        for minute in (0..330).chain(1110..1440) {
            assert_eq!(fill_color(minute), "#000000", "minute {}", minute);
        }
        for minute in 390..1050 {
            assert_eq!(fill_color(minute), "#ffffff", "minute {}", minute);
        }
    }

    #[test]
    fn dawn_ramps_up_from_black() {
        assert_eq!(fill_color(330), "#000000");
        assert_eq!(fill_color(331), "#040404");
        assert_eq!(fill_color(360), "#7f7f7f");
        for minute in 331..390 {
            assert!(gray_level(minute) > gray_level(minute - 1));
        }
    }

    #[test]
    fn dusk_ramps_down_to_black() {
        assert_eq!(fill_color(1050), "#ffffff");
        assert_eq!(fill_color(1080), "#7f7f7f");
        for minute in 1051..1110 {
            assert!(gray_level(minute) < gray_level(minute - 1));
        }
        assert_eq!(gray_level(1110), 0);
    }
}
