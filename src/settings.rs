use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{QuizSettings, MIN_TIMER_SECONDS};

static DEFAULT_TIMER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\(default\s*timer:\s*(\d+)s?\)").expect("valid regex"));
static NEGATIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\(negative:\s*([-+]?\d*\.?\d+)\)").expect("valid regex")
});
static ALL_VISIBLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\(all[\s-]visible\)").expect("valid regex"));

/// Document-wide defaults, resolved once before any question block is read.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalDefaults {
    pub settings: QuizSettings,
    pub warnings: Vec<String>,
}

impl GlobalDefaults {
    pub fn timer_seconds(&self) -> u32 {
        self.settings.default_timer_seconds
    }

    pub fn points_if_wrong(&self) -> f64 {
        self.settings.negative_marking_default
    }
}

/// Scans the whole document for global markers and layers them over `seed`.
/// The first occurrence of each marker wins.
pub fn extract_globals(text: &str, seed: &QuizSettings) -> GlobalDefaults {
    let mut settings = seed.clone();
    let mut warnings = Vec::new();

    if let Some(caps) = DEFAULT_TIMER.captures(text) {
        match caps[1].parse::<u32>() {
            Ok(secs) => settings.default_timer_seconds = secs,
            Err(_) => warnings.push("Default timer value out of range, using default".to_string()),
        }
    }

    if let Some(caps) = NEGATIVE.captures(text) {
        if let Ok(value) = caps[1].parse::<f64>() {
            settings.negative_marking_default = value;
        }
    }

    if ALL_VISIBLE.is_match(text) {
        settings.display_all_questions_at_once = true;
    }

    // Seeds and documents alike can ask for less than the floor.
    if settings.default_timer_seconds < MIN_TIMER_SECONDS {
        settings.default_timer_seconds = MIN_TIMER_SECONDS;
        warnings.push("Default timer increased to minimum 3 seconds".to_string());
    }

    log::debug!(
        "global defaults: timer={}s negative={} all_visible={}",
        settings.default_timer_seconds,
        settings.negative_marking_default,
        settings.display_all_questions_at_once
    );

    GlobalDefaults { settings, warnings }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_override_seed() {
        let text = "Quiz\n(default timer: 20s) (negative: -0.5) (all visible)\n1) Q";
        let globals = extract_globals(text, &QuizSettings::default());
        assert_eq!(globals.settings.default_timer_seconds, 20);
        assert_eq!(globals.settings.negative_marking_default, -0.5);
        assert!(globals.settings.display_all_questions_at_once);
        assert!(globals.warnings.is_empty());
    }

    #[test]
    fn absent_markers_keep_seed() {
        let seed = QuizSettings {
            default_timer_seconds: 15,
            shuffle_options: true,
            ..QuizSettings::default()
        };
        let globals = extract_globals("1) Q? A) x B) y", &seed);
        assert_eq!(globals.settings, seed);
    }

    #[test]
    fn default_timer_is_clamped() {
        let globals = extract_globals("(Default Timer: 1)", &QuizSettings::default());
        assert_eq!(globals.timer_seconds(), 3);
        assert_eq!(
            globals.warnings,
            vec!["Default timer increased to minimum 3 seconds".to_string()]
        );
    }

    #[test]
    fn negative_without_leading_digit() {
        let globals = extract_globals("(negative: -.5)", &QuizSettings::default());
        assert_eq!(globals.points_if_wrong(), -0.5);
    }

    #[test]
    fn oversized_default_timer_keeps_seed() {
        let globals = extract_globals("(default timer: 99999999999s)", &QuizSettings::default());
        assert_eq!(globals.timer_seconds(), 8);
        assert_eq!(
            globals.warnings,
            vec!["Default timer value out of range, using default".to_string()]
        );
    }

    #[test]
    fn hyphenated_all_visible() {
        let globals = extract_globals("(ALL-VISIBLE)", &QuizSettings::default());
        assert!(globals.settings.display_all_questions_at_once);
    }
}
