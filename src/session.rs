//! Event session module (the `generate` flow).
//! Collects event name and date at the terminal, reads the attendee list,
//! and renders one certificate per attendee behind a progress bar.
//! Year and month must parse; the day is re-prompted until it fits the month.

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::prompt::Prompter;
use crate::render::{CertificateRenderer, DATE_FORMAT};

pub const DEFAULT_NAMES_PATH: &str = "random_names.txt";

const PROGRESS_LABEL: &str = "Generating Certificates";

/// Name and date of the event the certificates are for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventMetadata {
    pub name: String,
    pub date: NaiveDate,
}

impl EventMetadata {
    pub fn formatted_date(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    /// The single description line printed under every attendee's name.
    pub fn description_lines(&self) -> Vec<String> {
        vec![format!(
            "for their active participation and enthusiasm during {} conducted on {}",
            self.name,
            self.formatted_date()
        )]
    }
}

/// Number of days in `month` of `year`. Fails for a month outside 1..=12.
pub fn days_in_month(year: i32, month: u32) -> Result<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .with_context(|| format!("No such month: {}-{}", year, month))?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .with_context(|| format!("Year {} is out of range", year))?;
    Ok(next.signed_duration_since(first).num_days() as u32)
}

/// Accepts an integer day in `1..=max_day`.
pub fn validate_day(input: &str, max_day: u32) -> Result<u32, String> {
    match input.trim().parse::<u32>() {
        Ok(day) if (1..=max_day).contains(&day) => Ok(day),
        _ => Err(format!("Enter a day between 1 and {max_day}")),
    }
}

/// Prompts for event name, year, month, and a day valid for that month.
pub fn prompt_event(prompter: &mut dyn Prompter) -> Result<EventMetadata> {
    let name = prompter.ask("Name of the Event")?;

    let year_raw = prompter.ask("Year of the Event")?;
    let year: i32 = year_raw
        .trim()
        .parse()
        .with_context(|| format!("Invalid year '{}'", year_raw.trim()))?;
    let month_raw = prompter.ask("Month of the Event")?;
    let month: u32 = month_raw
        .trim()
        .parse()
        .with_context(|| format!("Invalid month '{}'", month_raw.trim()))?;

    let max_day = days_in_month(year, month)?;
    let check = |line: &str| validate_day(line, max_day).map(|_| ());
    let day_raw = prompter.ask_validated(&format!("Date of the Event (1-{max_day})"), &check)?;
    let day = validate_day(&day_raw, max_day).map_err(anyhow::Error::msg)?;

    let date = NaiveDate::from_ymd_opt(year, month, day)
        .with_context(|| format!("Invalid date {}-{}-{}", year, month, day))?;
    info!(event = %name, year = date.year(), month = date.month(), day = date.day(), "event details collected");
    Ok(EventMetadata { name, date })
}

/// One trimmed name per line; blank lines are skipped.
pub fn read_names(path: &Path) -> Result<Vec<String>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read attendee list {}", path.display()))?;
    Ok(parse_names(&raw))
}

fn parse_names(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Counts from one generation run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub rendered: usize,
    pub skipped: usize,
}

/// Runs `render` for every name, upper-cased, in list order, calling `tick` after each.
pub fn render_all<F, T>(names: &[String], mut render: F, mut tick: T) -> Result<Summary>
where
    F: FnMut(&str) -> Result<bool>,
    T: FnMut(),
{
    let mut summary = Summary::default();
    for name in names {
        if render(&name.to_uppercase())? {
            summary.rendered += 1;
        } else {
            summary.skipped += 1;
        }
        tick();
    }
    Ok(summary)
}

/// Full generate flow: event prompts, attendee list, rendering with progress.
pub fn run(
    prompter: &mut dyn Prompter,
    renderer: &CertificateRenderer,
    names_path: &Path,
) -> Result<Summary> {
    let event = prompt_event(prompter)?;
    let description = event.description_lines();

    let names = read_names(names_path)?;
    if names.is_empty() {
        warn!(path = %names_path.display(), "attendee list has no names");
    }

    render_with_progress(&names, |name| {
        Ok(renderer.render(name, &description)?.is_some())
    })
}

/// `render_all` behind a labelled progress bar, with a closing summary log.
pub fn render_with_progress<F>(names: &[String], render: F) -> Result<Summary>
where
    F: FnMut(&str) -> Result<bool>,
{
    let bar = ProgressBar::new(names.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{msg}: [{percent:>3}%] {bar:40.cyan/blue} {pos}/{len}")
            .context("Invalid progress bar template")?
            .progress_chars("##."),
    );
    bar.set_message(PROGRESS_LABEL);

    let summary = render_all(names, render, || bar.inc(1))?;
    bar.finish();

    if summary.skipped > 0 {
        warn!(skipped = summary.skipped, "some certificates could not be saved");
    }
    info!(rendered = summary.rendered, skipped = summary.skipped, "generation finished");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::scripted::ScriptedPrompter;
    use tempfile::tempdir;

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 2).unwrap(), 29);
        assert_eq!(days_in_month(2023, 2).unwrap(), 28);
        assert_eq!(days_in_month(1900, 2).unwrap(), 28);
        assert_eq!(days_in_month(2000, 2).unwrap(), 29);
        assert_eq!(days_in_month(2025, 4).unwrap(), 30);
        assert_eq!(days_in_month(2025, 12).unwrap(), 31);
        assert!(days_in_month(2025, 0).is_err());
        assert!(days_in_month(2025, 13).is_err());
    }

    #[test]
    fn test_validate_day_bounds_for_every_month() {
        for year in [1999, 2000, 2024, 2100] {
            for month in 1..=12 {
                let max = days_in_month(year, month).unwrap();
                assert_eq!(validate_day("1", max), Ok(1));
                assert_eq!(validate_day(&max.to_string(), max), Ok(max));
                assert!(validate_day("0", max).is_err());
                assert!(validate_day(&(max + 1).to_string(), max).is_err());
                assert!(validate_day("tenth", max).is_err());
                assert!(validate_day("", max).is_err());
            }
        }
    }

    #[test]
    fn test_description_line() {
        let event = EventMetadata {
            name: "HackFest".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
        };
        assert_eq!(event.formatted_date(), "Mar 09, 2024");
        assert_eq!(
            event.description_lines(),
            ["for their active participation and enthusiasm during HackFest conducted on Mar 09, 2024"]
        );
    }

    #[test]
    fn test_prompt_event_reprompts_bad_day() {
        let mut prompter = ScriptedPrompter::new(&["HackFest", "2023", "2", "29", "x", "28"]);
        let event = prompt_event(&mut prompter).unwrap();
        assert_eq!(event.date, NaiveDate::from_ymd_opt(2023, 2, 28).unwrap());
        assert_eq!(prompter.prompts[3], "Date of the Event (1-28)");
        assert_eq!(prompter.remaining(), 0);
    }

    #[test]
    fn test_prompt_event_bad_year_is_fatal() {
        let mut prompter = ScriptedPrompter::new(&["HackFest", "twenty", "2"]);
        let err = prompt_event(&mut prompter).unwrap_err();
        assert!(err.to_string().contains("Invalid year"));
    }

    #[test]
    fn test_prompt_event_bad_month_is_fatal() {
        let mut prompter = ScriptedPrompter::new(&["HackFest", "2024", "13"]);
        assert!(prompt_event(&mut prompter).is_err());
    }

    #[test]
    fn test_read_names_trims_and_skips_blanks() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("names.txt");
        fs::write(&path, "  Bob Smith \n\nJane Doe\r\n").unwrap();
        assert_eq!(read_names(&path).unwrap(), ["Bob Smith", "Jane Doe"]);
    }

    #[test]
    fn test_read_names_missing_file_is_fatal() {
        let dir = tempdir().unwrap();
        assert!(read_names(&dir.path().join("nope.txt")).is_err());
    }

    #[test]
    fn test_render_all_uppercases_in_order_and_continues_after_skip() {
        let names = parse_names("jane doe\nbob smith\nann lee");
        let mut seen = Vec::new();
        let mut ticks = 0;

        let summary = render_all(
            &names,
            |name| {
                seen.push(name.to_string());
                Ok(name != "BOB SMITH")
            },
            || ticks += 1,
        )
        .unwrap();

        assert_eq!(seen, ["JANE DOE", "BOB SMITH", "ANN LEE"]);
        assert_eq!(ticks, 3);
        assert_eq!(summary, Summary { rendered: 2, skipped: 1 });
    }

    #[test]
    fn test_empty_attendee_list_finishes_with_nothing_rendered() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("names.txt");
        fs::write(&path, "\n  \n").unwrap();
        let names = read_names(&path).unwrap();

        let summary = render_with_progress(&names, |name| panic!("rendered {name}")).unwrap();

        assert_eq!(summary, Summary::default());
    }

    #[test]
    fn test_render_with_progress_counts_skips() {
        let names = parse_names("a\nb\nc");
        let summary = render_with_progress(&names, |name| Ok(name != "B")).unwrap();
        assert_eq!(summary, Summary { rendered: 2, skipped: 1 });
    }

    #[test]
    fn test_render_all_stops_on_fatal_error() {
        let names = parse_names("a\nb");
        let mut calls = 0;
        let result = render_all(
            &names,
            |_| {
                calls += 1;
                anyhow::bail!("font missing")
            },
            || {},
        );
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }
}
