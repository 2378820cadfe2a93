use serde::Serialize;

use ottrcal_core::models::BadgeCategory;
use ottrcal_core::progress::ProgressEvents;

/// Prints celebration lines for level-ups and streak changes. Goes to
/// stderr so `--json` output on stdout stays machine-readable.
pub(crate) struct CliEvents;

impl ProgressEvents for CliEvents {
    fn on_level_up(&self, new_level: u32) {
        eprintln!("Level up! You reached level {new_level}");
    }

    fn on_streak_changed(&self, new_streak: u32) {
        if new_streak == 1 {
            eprintln!("New streak started — day 1");
        } else {
            eprintln!("Streak: {new_streak} days in a row");
        }
    }
}

/// Render a progress bar like `[######----] 60/100 XP`.
pub(crate) fn xp_bar(xp: u32, next_level_xp: u32) -> String {
    const WIDTH: u32 = 10;
    let filled = if next_level_xp == 0 {
        0
    } else {
        (xp * WIDTH / next_level_xp).min(WIDTH)
    };
    let mut bar = String::with_capacity(WIDTH as usize + 2);
    bar.push('[');
    for i in 0..WIDTH {
        bar.push(if i < filled { '#' } else { '-' });
    }
    bar.push(']');
    format!("{bar} {xp}/{next_level_xp} XP")
}

pub(crate) fn category_label(category: BadgeCategory) -> &'static str {
    match category {
        BadgeCategory::Streak => "streak",
        BadgeCategory::Level => "level",
        BadgeCategory::FoodLogCount => "food logs",
        BadgeCategory::Xp => "xp",
    }
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xp_bar_empty_and_full() {
        assert_eq!(xp_bar(0, 100), "[----------] 0/100 XP");
        assert_eq!(xp_bar(100, 100), "[##########] 100/100 XP");
    }

    #[test]
    fn test_xp_bar_partial() {
        assert_eq!(xp_bar(45, 100), "[####------] 45/100 XP");
        assert_eq!(xp_bar(99, 100), "[#########-] 99/100 XP");
    }

    #[test]
    fn test_xp_bar_zero_denominator() {
        // Level thresholds are never zero, but the bar must not panic.
        assert_eq!(xp_bar(5, 0), "[----------] 5/0 XP");
    }

    #[test]
    fn test_category_labels() {
        assert_eq!(category_label(BadgeCategory::FoodLogCount), "food logs");
        assert_eq!(category_label(BadgeCategory::Xp), "xp");
    }

    #[test]
    fn test_json_error_shape() {
        let out = json_error("boom");
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["error"], "boom");
    }

    #[test]
    fn test_truncate_utf8() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world this is long", 10), "hello w...");
        assert_eq!(truncate("Crème fraîche", 10), "Crème f...");
    }
}
