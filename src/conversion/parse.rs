//! Parse modes and the cell-level date parser.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::ConversionError;

/// How cell text is interpreted as a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// Infer the layout of every value (see [`AUTO_DATE_FORMATS`]).
    #[default]
    Auto,
    /// `MM/DD/YYYY`.
    Us,
    /// `DD/MM/YYYY`.
    Eu,
}

/// Parser settings for one [`ParseMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseModeSettings {
    /// `chrono` pattern searched for in every cell, if the mode has a fixed layout.
    pub explicit_format: Option<&'static str>,
    /// Try the inference candidates instead of a fixed pattern.
    pub use_inference: bool,
}

impl ParseMode {
    /// Modes in the order a host menu lists them.
    pub const ALL: [ParseMode; 3] = [ParseMode::Auto, ParseMode::Us, ParseMode::Eu];

    /// Mode at position `index` of the host menu.
    pub fn from_menu_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Menu label, lowercase.
    pub fn label(self) -> &'static str {
        match self {
            ParseMode::Auto => "auto",
            ParseMode::Us => "date (u.s.) mm/dd/yyyy",
            ParseMode::Eu => "date (e.u.) dd/mm/yyyy",
        }
    }

    /// Fixed parser settings of this mode.
    pub const fn settings(self) -> ParseModeSettings {
        match self {
            ParseMode::Auto => ParseModeSettings {
                explicit_format: None,
                use_inference: true,
            },
            ParseMode::Us => ParseModeSettings {
                explicit_format: Some("%m/%d/%Y"),
                use_inference: false,
            },
            ParseMode::Eu => ParseModeSettings {
                explicit_format: Some("%d/%m/%Y"),
                use_inference: false,
            },
        }
    }
}

impl fmt::Display for ParseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ParseMode {
    type Err = ConversionError;

    /// Accepts the menu labels (case-insensitive) and the short names `auto`, `us`, `eu`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        match wanted.as_str() {
            "us" => return Ok(ParseMode::Us),
            "eu" => return Ok(ParseMode::Eu),
            _ => {}
        }
        Self::ALL
            .into_iter()
            .find(|mode| mode.label() == wanted)
            .ok_or_else(|| ConversionError::InvalidParams {
                message: format!("unknown date type '{s}'"),
            })
    }
}

/// Date layouts tried by [`ParseMode::Auto`], in order. The first that parses wins.
///
/// Year-first layouts come first, then month-first (US), then day-first (EU), then written
/// month names. An ambiguous `08.07.2018` is therefore read as August 7.
pub const AUTO_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%m.%d.%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Time-of-day layouts accepted after an inferred date.
const AUTO_TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];

/// Cell parser for one [`ParseMode`], memoizing results by raw text.
///
/// Columns tend to repeat the same few values, so each distinct string is parsed once.
#[derive(Debug, Clone)]
pub struct DateTimeParser {
    settings: ParseModeSettings,
    cache: HashMap<String, Option<NaiveDateTime>>,
}

impl DateTimeParser {
    /// Empty-cache parser for `mode`.
    pub fn new(mode: ParseMode) -> Self {
        Self {
            settings: mode.settings(),
            cache: HashMap::new(),
        }
    }

    /// Parse `raw`, returning `None` if it holds no date in this mode's layout.
    pub fn parse(&mut self, raw: &str) -> Option<NaiveDateTime> {
        if let Some(hit) = self.cache.get(raw) {
            return *hit;
        }
        let parsed = parse_with(self.settings, raw);
        self.cache.insert(raw.to_owned(), parsed);
        parsed
    }

    /// Number of distinct strings parsed so far.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}

fn parse_with(settings: ParseModeSettings, raw: &str) -> Option<NaiveDateTime> {
    match settings.explicit_format {
        Some(fmt) => search_date(raw, fmt),
        None if settings.use_inference => infer_datetime(raw),
        None => None,
    }
}

/// Find the first offset of `raw` where `fmt` parses as a date. Text around the match is
/// ignored, so `"..08/07/2018T00:00.."` matches `%m/%d/%Y`.
///
/// A match may not start or end inside a run of digits, and `%Y` must cover exactly four
/// digits: `"08/07/18"`, `"08/07/20189"` and `"13/12/2018"` (as `%m/%d/%Y`) find nothing.
pub fn search_date(raw: &str, fmt: &str) -> Option<NaiveDateTime> {
    let bytes = raw.as_bytes();
    raw.char_indices()
        .filter(|&(i, _)| i == 0 || !bytes[i - 1].is_ascii_digit())
        .find_map(|(i, _)| {
            let tail = &raw[i..];
            let (date, rest) = NaiveDate::parse_and_remainder(tail, fmt).ok()?;
            let matched = &tail[..tail.len() - rest.len()];
            let bounded = !rest.starts_with(|c: char| c.is_ascii_digit());
            (bounded && year_has_four_digits(matched, fmt)).then_some(date)
        })
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// chrono's `%Y` takes one to four digits; only four are a year here. Every layout in this
/// module puts `%Y` first or last.
fn year_has_four_digits(matched: &str, fmt: &str) -> bool {
    let run = if fmt.starts_with("%Y") {
        matched
            .trim_start()
            .bytes()
            .take_while(u8::is_ascii_digit)
            .count()
    } else if fmt.ends_with("%Y") {
        matched
            .trim_end()
            .bytes()
            .rev()
            .take_while(u8::is_ascii_digit)
            .count()
    } else {
        return true;
    };
    run == 4
}

/// Best-effort inference over [`AUTO_DATE_FORMATS`].
///
/// Surrounding whitespace and ASCII punctuation are stripped first. A layout only matches when
/// its year has four digits and the rest of the text is empty or a time of day introduced by
/// `T` or a space.
pub fn infer_datetime(raw: &str) -> Option<NaiveDateTime> {
    let text = raw.trim_matches(|c: char| c.is_whitespace() || c.is_ascii_punctuation());
    if text.is_empty() {
        return None;
    }
    AUTO_DATE_FORMATS.iter().find_map(|fmt| {
        let (date, rest) = NaiveDate::parse_and_remainder(text, fmt).ok()?;
        if !year_has_four_digits(&text[..text.len() - rest.len()], fmt) {
            return None;
        }
        let time = time_of_day(rest)?;
        Some(date.and_time(time))
    })
}

fn time_of_day(rest: &str) -> Option<NaiveTime> {
    if rest.trim().is_empty() {
        return NaiveTime::from_hms_opt(0, 0, 0);
    }
    let clock = rest.strip_prefix('T').or_else(|| rest.strip_prefix(' '))?.trim();
    let clock = clock.strip_suffix('Z').unwrap_or(clock);
    AUTO_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(clock, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aug_7() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2018, 8, 7)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn settings_table() {
        assert_eq!(ParseMode::Auto.settings().explicit_format, None);
        assert!(ParseMode::Auto.settings().use_inference);
        assert_eq!(ParseMode::Us.settings().explicit_format, Some("%m/%d/%Y"));
        assert_eq!(ParseMode::Eu.settings().explicit_format, Some("%d/%m/%Y"));
        assert!(!ParseMode::Eu.settings().use_inference);
    }

    #[test]
    fn mode_from_menu_index_and_label() {
        assert_eq!(ParseMode::from_menu_index(0), Some(ParseMode::Auto));
        assert_eq!(ParseMode::from_menu_index(2), Some(ParseMode::Eu));
        assert_eq!(ParseMode::from_menu_index(3), None);
        assert_eq!("Date (U.S.) MM/DD/YYYY".parse::<ParseMode>().unwrap(), ParseMode::Us);
        assert_eq!(" eu ".parse::<ParseMode>().unwrap(), ParseMode::Eu);
        assert!("iso".parse::<ParseMode>().is_err());
    }

    #[test]
    fn explicit_format_tolerates_noise() {
        for raw in ["08/07/2018", " 08/07/2018T00:00:00 ", "..08/07/2018T00:00:00:00.."] {
            assert_eq!(search_date(raw, "%m/%d/%Y"), Some(aug_7()), "raw={raw:?}");
        }
        for raw in ["07/08/2018", " 07/08/2018T00:00:00 ", "..07/08/2018T00:00:00.."] {
            assert_eq!(search_date(raw, "%d/%m/%Y"), Some(aug_7()), "raw={raw:?}");
        }
    }

    #[test]
    fn explicit_format_rejects_other_layouts() {
        assert_eq!(search_date("2018-08-07", "%m/%d/%Y"), None);
        assert_eq!(search_date("08-07-2018", "%m/%d/%Y"), None);
        assert_eq!(search_date("no date here", "%m/%d/%Y"), None);
        assert_eq!(search_date("", "%d/%m/%Y"), None);
    }

    #[test]
    fn explicit_format_needs_four_digit_year() {
        assert_eq!(search_date("08/07/18", "%m/%d/%Y"), None);
        assert_eq!(search_date("07/08/18", "%d/%m/%Y"), None);
        assert_eq!(search_date(" 08/07/18T00:00:00 ", "%m/%d/%Y"), None);
        assert_eq!(search_date("08/07/20189", "%m/%d/%Y"), None);
    }

    #[test]
    fn explicit_format_does_not_start_inside_digits() {
        // Without the boundary, "13/12/2018" would be read from its second digit as March 12.
        assert_eq!(search_date("13/12/2018", "%m/%d/%Y"), None);
        assert_eq!(search_date("108/07/2018", "%m/%d/%Y"), None);
        assert_eq!(search_date("02/30/2018", "%m/%d/%Y"), None);
        assert_eq!(search_date("32/08/2018", "%d/%m/%Y"), None);
        assert_eq!(search_date("x08/07/2018", "%m/%d/%Y"), Some(aug_7()));
    }

    #[test]
    fn inference_covers_common_layouts() {
        for raw in [
            "2018-08-07",
            " 2018.08.07T00:00:00 ",
            "..2018.08.07T00:00:00..",
            "08.07.2018",
            "08/07/2018",
            "August 7, 2018",
            "August 07, 2018",
            "Aug 7 2018",
            "7 August 2018",
        ] {
            assert_eq!(infer_datetime(raw), Some(aug_7()), "raw={raw:?}");
        }
    }

    #[test]
    fn inference_keeps_time_of_day() {
        let expected = NaiveDate::from_ymd_opt(2018, 8, 7)
            .unwrap()
            .and_hms_opt(13, 45, 10)
            .unwrap();
        assert_eq!(infer_datetime("2018-08-07T13:45:10Z"), Some(expected));
        assert_eq!(infer_datetime("2018-08-07 13:45:10"), Some(expected));
    }

    #[test]
    fn inference_falls_back_to_day_first() {
        let expected = NaiveDate::from_ymd_opt(2018, 8, 25)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(infer_datetime("25/08/2018"), Some(expected));
    }

    #[test]
    fn inference_rejects_garbage() {
        assert_eq!(infer_datetime(""), None);
        assert_eq!(infer_datetime("99"), None);
        assert_eq!(infer_datetime("not a date"), None);
        assert_eq!(infer_datetime("2018-08-07 tomorrow"), None);
    }

    #[test]
    fn inference_never_reads_short_years() {
        for raw in ["08/07/18", "18/08/07", "18-08-07", "8.7.18", "August 7, 18", "08/07/20189"] {
            assert_eq!(infer_datetime(raw), None, "raw={raw:?}");
        }
    }

    #[test]
    fn inference_rejects_out_of_range_fields() {
        assert_eq!(infer_datetime("2018-13-07"), None);
        assert_eq!(infer_datetime("2018-02-30"), None);
        assert_eq!(infer_datetime("32/13/2018"), None);
    }

    #[test]
    fn parser_memoizes_by_raw_text() {
        let mut parser = DateTimeParser::new(ParseMode::Us);
        for _ in 0..3 {
            assert_eq!(parser.parse("08/07/2018"), Some(aug_7()));
            assert_eq!(parser.parse("junk"), None);
        }
        assert_eq!(parser.cached_len(), 2);
    }
}
