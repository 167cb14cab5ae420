//! Digital readout formatting.

/// Formats a time as `H:MM[:SS][ am|pm]`.
///
/// With `show_am_pm` the hour is shown on a 12-hour dial (0 and 12 both read
/// as 12) and a suffix is appended; otherwise the hour is shown as given.
pub fn format_time(
    hour: u32,
    minute: u32,
    second: u32,
    show_am_pm: bool,
    show_secs: bool,
) -> String {
    let mut text = if show_am_pm {
        let dial_hour = match hour % 12 {
            0 => 12,
            h => h,
        };
        format!("{}:{:02}", dial_hour, minute)
    } else {
        format!("{}:{:02}", hour, minute)
    };
    if show_secs {
        text.push_str(&format!(":{:02}", second));
    }
    if show_am_pm {
        text.push_str(if hour < 12 { " am" } else { " pm" });
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twelve_hour_with_seconds() {
        assert_eq!(format_time(9, 5, 7, true, true), "9:05:07 am");
        assert_eq!(format_time(0, 5, 7, true, true), "12:05:07 am");
        assert_eq!(format_time(12, 0, 0, true, true), "12:00:00 pm");
        assert_eq!(format_time(23, 59, 59, true, true), "11:59:59 pm");
    }

    #[test]
    fn twenty_four_hour_without_seconds() {
        assert_eq!(format_time(13, 0, 0, false, false), "13:00");
        assert_eq!(format_time(0, 9, 30, false, false), "0:09");
        assert_eq!(format_time(7, 3, 4, false, true), "7:03:04");
    }

    #[test]
    fn twelve_hour_without_seconds() {
        assert_eq!(format_time(18, 45, 12, true, false), "6:45 pm");
    }
}
