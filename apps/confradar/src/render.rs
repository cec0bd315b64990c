//! Plain-text rendering of conferences according to the user's display
//! preferences.

use chrono::{DateTime, Utc};
use shared::{
    dates::{self, Zone},
    domain::{Conference, Deadline},
    preferences::{DateFormat, TimezoneMode, UserPreferences, ViewMode},
    protocol::UpcomingDeadline,
};

const GRID_WIDTH: usize = 72;

#[derive(Debug, Clone)]
pub struct DisplayOptions {
    pub view_mode: ViewMode,
    pub date_format: DateFormat,
    pub zone: Zone,
    pub now: DateTime<Utc>,
}

impl DisplayOptions {
    /// Local mode renders in the configured label's zone, or the machine's
    /// timezone when none is set.
    pub fn from_preferences(preferences: &UserPreferences, now: DateTime<Utc>) -> Self {
        let zone = match preferences.timezone_mode {
            TimezoneMode::Aoe => Zone::aoe(),
            TimezoneMode::Local => {
                dates::parse_timezone(&preferences.display.timezone).unwrap_or(Zone::Local)
            }
        };
        Self {
            view_mode: preferences.view_mode,
            date_format: preferences.display.date_format,
            zone,
            now,
        }
    }

    fn deadline_text(&self, due_at: DateTime<Utc>) -> String {
        let absolute = self.zone.format(due_at);
        match self.date_format {
            DateFormat::Absolute => absolute,
            DateFormat::Relative => {
                format!("{} ({absolute})", dates::relative_label(due_at, self.now))
            }
        }
    }
}

fn date_range(conference: &Conference) -> String {
    let start = conference.start_instant();
    let end = conference.end_instant();
    match (start, end) {
        (Some(start), Some(end)) if start != end => format!(
            "{} - {}",
            dates::format_date(Some(start)),
            dates::format_date(Some(end))
        ),
        (start, _) => dates::format_date(start),
    }
}

fn tag_list(conference: &Conference) -> String {
    let tags: Vec<_> = conference.tags.iter().map(String::as_str).collect();
    tags.join(", ")
}

/// Newline-terminated lines.
fn join_lines(lines: impl IntoIterator<Item = String>) -> String {
    lines.into_iter().map(|line| line + "\n").collect()
}

fn favorite_marker(preferences: &UserPreferences, conference: &Conference) -> &'static str {
    if preferences.is_favorite(conference.id.as_str()) {
        "*"
    } else {
        " "
    }
}

fn next_deadline_text(conference: &Conference, options: &DisplayOptions) -> String {
    match conference.next_deadline(options.now) {
        Some((deadline, due_at)) => {
            format!("{}: {}", deadline.name, options.deadline_text(due_at))
        }
        None if conference.deadlines.is_empty() => dates::TBA.to_string(),
        None => "all deadlines passed".to_string(),
    }
}

pub fn render_conferences(
    conferences: &[Conference],
    preferences: &UserPreferences,
    options: &DisplayOptions,
) -> String {
    if conferences.is_empty() {
        return "No conferences match the current filters.\n".to_string();
    }
    match options.view_mode {
        ViewMode::Grid => render_grid(conferences, preferences, options),
        ViewMode::List => render_list(conferences, preferences, options),
    }
}

fn render_grid(
    conferences: &[Conference],
    preferences: &UserPreferences,
    options: &DisplayOptions,
) -> String {
    let rule = "-".repeat(GRID_WIDTH);
    let mut lines = Vec::new();
    for conference in conferences {
        lines.push(rule.clone());
        lines.push(format!(
            "{} {}  [{}]",
            favorite_marker(preferences, conference),
            conference.title(),
            conference.id
        ));
        let location = conference.location.display();
        if !location.is_empty() {
            lines.push(format!("  Where:    {location}"));
        }
        lines.push(format!("  When:     {}", date_range(conference)));
        lines.push(format!("  Next:     {}", next_deadline_text(conference, options)));
        if !conference.tags.is_empty() {
            lines.push(format!("  Tags:     {}", tag_list(conference)));
        }
    }
    lines.push(rule);
    join_lines(lines)
}

fn render_list(
    conferences: &[Conference],
    preferences: &UserPreferences,
    options: &DisplayOptions,
) -> String {
    let id_width = conferences
        .iter()
        .map(|conference| conference.id.as_str().len())
        .max()
        .unwrap_or(0);
    let lines = conferences.iter().map(|conference| {
        let label = conference
            .acronym
            .as_deref()
            .unwrap_or(conference.name.as_str());
        format!(
            "{} {:<id_width$}  {:<10}  {:<22}  {}",
            favorite_marker(preferences, conference),
            conference.id.as_str(),
            label,
            dates::format_date(conference.start_instant()),
            next_deadline_text(conference, options),
        )
    });
    join_lines(lines)
}

fn render_deadline(deadline: &Deadline, options: &DisplayOptions) -> String {
    match deadline.instant() {
        Some(due_at) if dates::is_past(due_at, options.now) => format!(
            "{}: {} (passed)",
            deadline.name,
            options.zone.format(due_at)
        ),
        Some(due_at) => format!("{}: {}", deadline.name, options.deadline_text(due_at)),
        None => format!("{}: {}", deadline.name, dates::TBA),
    }
}

pub fn render_detail(
    conference: &Conference,
    preferences: &UserPreferences,
    options: &DisplayOptions,
) -> String {
    let mut lines = vec![format!(
        "{} {}",
        favorite_marker(preferences, conference),
        conference.title()
    )];
    if let Some(description) = conference.description.as_deref() {
        lines.push(format!("\n{description}\n"));
    }
    let location = conference.location.display();
    lines.push(format!(
        "Where:    {}",
        if location.is_empty() { dates::TBA } else { location.as_str() }
    ));
    lines.push(format!("When:     {}", date_range(conference)));
    if let Some(website) = conference.website.as_deref() {
        lines.push(format!("Website:  {website}"));
    }
    if !conference.tags.is_empty() {
        lines.push(format!("Tags:     {}", tag_list(conference)));
    }
    if conference.deadlines.is_empty() {
        lines.push(format!("Deadlines: {}", dates::TBA));
    } else {
        lines.push("Deadlines:".to_string());
        lines.extend(
            conference
                .deadlines
                .iter()
                .map(|deadline| format!("  - {}", render_deadline(deadline, options))),
        );
    }
    join_lines(lines)
}

pub fn render_not_found(id: &str) -> String {
    format!(
        "Conference not found\n\nThere is no conference with id '{id}'. \
         Run `confradar list` to browse the available conferences.\n"
    )
}

pub fn render_upcoming(entries: &[UpcomingDeadline], options: &DisplayOptions) -> String {
    if entries.is_empty() {
        return "No deadlines in this window.\n".to_string();
    }
    let lines = entries.iter().map(|entry| {
        let label = entry
            .acronym
            .as_deref()
            .unwrap_or(entry.conference_name.as_str());
        format!(
            "{:>4}d  {:<10}  {}: {}",
            entry.days_remaining,
            label,
            entry.deadline.name,
            options.deadline_text(entry.due_at)
        )
    });
    join_lines(lines)
}

pub fn render_preferences(preferences: &UserPreferences) -> String {
    let favorites: Vec<_> = preferences.favorites.iter().map(|id| id.as_str()).collect();
    let timezone = match preferences.display.timezone.as_str() {
        "" => "system",
        label => label,
    };
    join_lines([
        format!("theme:          {}", preferences.theme),
        format!("view mode:      {}", preferences.view_mode),
        format!("timezone mode:  {}", preferences.timezone_mode),
        format!("timezone:       {timezone}"),
        format!("date format:    {}", preferences.display.date_format),
        format!(
            "notifications:  {} ({} days before)",
            if preferences.notifications.enabled { "on" } else { "off" },
            preferences.notifications.days_before_deadline
        ),
        format!(
            "favorites:      {}",
            if favorites.is_empty() {
                "none".to_string()
            } else {
                favorites.join(", ")
            }
        ),
    ])
}
