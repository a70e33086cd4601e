use chrono::{NaiveDate, Utc};
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::camp::{Child, ChildWithDisciplines, ChildWithGroups, DisciplineRow, Group, GroupWithChildren, Measurement, ResultType};
use crate::config::Config;
use crate::ranking::{AggregationMethod, DisciplineResults};

/// Rendering knobs taken from the `display` section of the config
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayOptions {
    pub decimals: usize,
    pub medals: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            decimals: crate::config::DEFAULT_DECIMALS,
            medals: true,
        }
    }
}

impl From<&Config> for DisplayOptions {
    fn from(config: &Config) -> Self {
        Self {
            decimals: config.decimals(),
            medals: config.medals(),
        }
    }
}

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a name to fit available width, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Format an aggregated value with a fixed number of decimals
pub fn format_value(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, value)
}

/// Podium icon for a 0-based position
pub fn rank_icon(position: usize, medals: bool) -> String {
    match (medals, position) {
        (true, 0) => "🥇".to_string(),
        (true, 1) => "🥈".to_string(),
        (true, 2) => "🥉".to_string(),
        _ => format!("#{}", position + 1),
    }
}

fn attempts_label(n: usize) -> String {
    if n == 1 {
        "1 attempt".to_string()
    } else {
        format!("{} attempts", n)
    }
}

/// Format a ranking as a table: header with badges, then one row per child.
/// Row columns: icon (4), name, attempts, value, value label.
pub fn format_ranking(results: &DisciplineResults, opts: &DisplayOptions, use_colors: bool) -> String {
    let header_text = format!(
        "{} - Rankings  [{}] [{}]",
        results.name,
        results.result_type.label(),
        results.aggregation_method.label()
    );
    let header = if use_colors {
        format!("{}", header_text.bold())
    } else {
        header_text
    };

    if results.results.is_empty() {
        return format!("{}\nNo results recorded yet.", header);
    }

    let values: Vec<String> = results
        .results
        .iter()
        .map(|r| format_value(r.aggregated_value, opts.decimals))
        .collect();
    let value_width = values.iter().map(|v| v.len()).max().unwrap_or(0);
    let value_label = results.aggregation_method.value_label();

    let icon_width = 4;
    let attempts_width = 11; // fits "99 attempts"
    let separator = "  ";
    let fixed_width = icon_width + attempts_width + value_width + value_label.len() + separator.len() * 4;
    let name_width = get_terminal_width().map(|w| if w > fixed_width + 10 { w - fixed_width } else { 20 });
    let longest_name = results
        .results
        .iter()
        .map(|r| r.child_name.chars().count())
        .max()
        .unwrap_or(0);
    let name_col = name_width.map_or(longest_name, |w| longest_name.min(w));

    let rows = results.results.iter().zip(values.iter()).enumerate().map(|(idx, (r, value))| {
        let icon = rank_icon(idx, opts.medals);
        // Emoji medals render two columns wide
        let icon_padded = if opts.medals && idx < 3 {
            format!("{}  ", icon)
        } else {
            format!("{:<width$}", icon, width = icon_width)
        };
        let name = match name_width {
            Some(w) => truncate_name(&r.child_name, w),
            None => r.child_name.clone(),
        };
        let name_padded = format!("{:<width$}", name, width = name_col);
        let attempts = format!("{:<width$}", attempts_label(r.total_attempts), width = attempts_width);
        let value_padded = format!("{:>width$}", value, width = value_width);

        if use_colors {
            format!(
                "{}{}{}{}{}{}{}{}",
                icon_padded,
                name_padded.bold(),
                separator,
                attempts.dimmed(),
                separator,
                value_padded.blue().bold(),
                separator,
                value_label.dimmed()
            )
        } else {
            format!(
                "{}{}{}{}{}{}{}{}",
                icon_padded, name_padded, separator, attempts, separator, value_padded, separator, value_label
            )
        }
    });

    let mut lines = vec![header];
    lines.extend(rows.map(|line| line.trim_end().to_string()));
    lines.join("\n")
}

/// Format a ranking as tab-separated values for scripting
/// Columns: rank, child_id, child_name, aggregated_value, total_attempts
pub fn format_ranking_tsv(results: &DisciplineResults, decimals: usize) -> String {
    results
        .results
        .iter()
        .enumerate()
        .map(|(idx, r)| {
            format!(
                "{}\t{}\t{}\t{}\t{}",
                idx + 1,
                r.child_id,
                tsv_field(&r.child_name),
                format_value(r.aggregated_value, decimals),
                r.total_attempts
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Tabs and line breaks would shift TSV columns
fn tsv_field(s: &str) -> String {
    s.replace(['\t', '\n', '\r'], " ")
}

/// One line per child: "{id}. {name} | {age}y | {gender} | born {date}"
pub fn format_children(children: &[Child], use_colors: bool) -> String {
    if children.is_empty() {
        return "No children found.".to_string();
    }
    let today = Utc::now().date_naive();
    children
        .iter()
        .map(|child| format_child_line(child, today, use_colors))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_child_line(child: &Child, today: NaiveDate, use_colors: bool) -> String {
    let id = format!("{:>3}.", child.id);
    let age = format!("{}y", child.age_on(today));
    if use_colors {
        format!(
            "{} {} | {} | {} | born {}",
            id.dimmed(),
            child.name.bold(),
            age,
            child.gender.cyan(),
            child.birth_date
        )
    } else {
        format!(
            "{} {} | {} | {} | born {}",
            id, child.name, age, child.gender, child.birth_date
        )
    }
}

/// Detailed multi-line view of a child with groups and disciplines
pub fn format_child_detail(
    with_groups: &ChildWithGroups,
    with_disciplines: &ChildWithDisciplines,
    use_colors: bool,
) -> String {
    let child = &with_groups.child;
    let groups = join_or_none(with_groups.groups.iter().map(|g| g.name.as_str()));
    let disciplines = join_or_none(with_disciplines.disciplines.iter().map(|d| d.name.as_str()));
    let title = if use_colors {
        format!("{}", child.name.bold())
    } else {
        child.name.clone()
    };
    format!(
        "{}\n  Id: {}\n  Born: {} ({}y)\n  Gender: {}\n  Groups: {}\n  Disciplines: {}",
        title,
        child.id,
        child.birth_date,
        child.age_on(Utc::now().date_naive()),
        child.gender,
        groups,
        disciplines
    )
}

fn join_or_none<'a>(names: impl Iterator<Item = &'a str>) -> String {
    let joined = names.collect::<Vec<_>>().join(", ");
    if joined.is_empty() {
        "(none)".to_string()
    } else {
        joined
    }
}

pub fn format_groups(groups: &[Group]) -> String {
    if groups.is_empty() {
        return "No groups found.".to_string();
    }
    groups
        .iter()
        .map(|g| format!("{:>3}. {}", g.id, g.name))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_group_detail(group: &GroupWithChildren) -> String {
    let mut out = format!("{} ({} children)", group.group.name, group.children.len());
    for child in &group.children {
        out.push_str(&format!("\n  - {} (id {})", child.name, child.id));
    }
    out
}

/// Human label for a stored discipline field, keeping unrecognized raw values
/// visible instead of hiding them.
fn discipline_labels(row: &DisciplineRow) -> (String, String) {
    let result_type = ResultType::parse(&row.result_type)
        .map(|rt| rt.label().to_string())
        .unwrap_or_else(|_| format!("{} (invalid)", row.result_type));
    let method = AggregationMethod::parse(&row.aggregation_method)
        .map(|m| m.label().to_string())
        .unwrap_or_else(|_| format!("{} (invalid)", row.aggregation_method));
    (result_type, method)
}

pub fn format_disciplines(rows: &[DisciplineRow], use_colors: bool) -> String {
    if rows.is_empty() {
        return "No disciplines found.".to_string();
    }
    rows.iter()
        .map(|row| {
            let (result_type, method) = discipline_labels(row);
            if use_colors {
                format!(
                    "{:>3}. {} | {} | {}",
                    row.id,
                    row.name.bold(),
                    result_type.cyan(),
                    method.yellow()
                )
            } else {
                format!("{:>3}. {} | {} | {}", row.id, row.name, result_type, method)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_measurement(m: &Measurement, child_name: &str, discipline_name: &str) -> String {
    format!(
        "Recorded {} for {} in {} (attempt {}, id {})",
        m.value, child_name, discipline_name, m.attempt_number, m.id
    )
}
