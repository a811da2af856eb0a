/*!
format.rs

Report formatting for `lifx-adapter`.

Two audiences:
  - The host: markdown reports (tables, fenced JSON) stored as the artifact's
    human-readable text. These never contain ANSI codes.
  - The terminal: colored box headers and aligned tables for the CLI's own
    output (`commands`, human mode error boxes). NO_COLOR / NO_EMOJI disable
    the decorations.

Public API Summary:
  - markdown_table(headers, rows) -> String
  - json_block(title, value) -> String
  - relative_time(raw, now) / relative_time_now(raw) -> String
  - StyleOptions::detect(), color(), emoji(), box_header(), table()

NOTE:
  - This module avoids logging or printing directly (returns formatted strings).
*/

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::borrow::Cow;

/* -------------------------------------------------------------------------- */
/* Markdown (host reports)                                                    */
/* -------------------------------------------------------------------------- */

/// Markdown table; an empty row set renders as `**No entries.**`.
pub fn markdown_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    if rows.is_empty() {
        return "**No entries.**".to_string();
    }
    let mut out = String::new();
    out.push_str(&format!("|{}|\n", headers.join("|")));
    out.push_str(&format!("|{}|\n", vec!["---"; headers.len()].join("|")));
    for row in rows {
        let cells: Vec<String> = (0..headers.len())
            .map(|i| escape_cell(row.get(i).map(String::as_str).unwrap_or("")))
            .collect();
        out.push_str(&format!("|{}|\n", cells.join("|")));
    }
    out.truncate(out.trim_end().len());
    out
}

fn escape_cell(raw: &str) -> String {
    raw.replace('|', "\\|").replace(['\r', '\n'], " ")
}

/// Title followed by pretty-printed JSON in a fenced block.
pub fn json_block(title: &str, value: &Value) -> String {
    let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    format!("{title}\n```json\n{pretty}\n```")
}

/// Table cell text for an arbitrary JSON value (`-` for null / missing).
pub fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::String(s)) if s.is_empty() => "-".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// `Some(text)` or `-`.
pub fn or_dash(value: Option<&str>) -> String {
    value
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| "-".to_string())
}

/* -------------------------------------------------------------------------- */
/* Relative Timestamps                                                        */
/* -------------------------------------------------------------------------- */

const UNITS: [(&str, i64); 6] = [
    ("year", 365 * 86_400),
    ("month", 30 * 86_400),
    ("day", 86_400),
    ("hour", 3_600),
    ("minute", 60),
    ("second", 1),
];

/// `YYYY-MM-DD HH:MM:SS (N unit(s) ago)` for an epoch-seconds value.
///
/// Future timestamps render without the relative part. Missing input
/// renders as `-`; anything unparseable is echoed back unchanged.
pub fn relative_time(raw: Option<&str>, now: DateTime<Utc>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return "-".to_string();
    };
    let Some(secs) = parse_epoch(raw) else {
        return raw.to_string();
    };
    let Some(at) = DateTime::<Utc>::from_timestamp(secs, 0) else {
        return raw.to_string();
    };

    let absolute = at.format("%Y-%m-%d %H:%M:%S").to_string();
    let delta = now.timestamp() - secs;
    if delta < 0 {
        return absolute;
    }

    let (unit, count) = UNITS
        .iter()
        .map(|(name, size)| (*name, delta / size))
        .find(|(_, count)| *count >= 1)
        .unwrap_or(("second", 0));
    let plural = if count == 1 { "" } else { "s" };
    format!("{absolute} ({count} {unit}{plural} ago)")
}

/// `relative_time` against the current clock.
pub fn relative_time_now(raw: Option<&str>) -> String {
    relative_time(raw, Utc::now())
}

fn parse_epoch(raw: &str) -> Option<i64> {
    if let Ok(n) = raw.parse::<i64>() {
        return Some(n);
    }
    let f = raw.parse::<f64>().ok().filter(|f| f.is_finite())?;
    if f.abs() > i64::MAX as f64 {
        return None;
    }
    Some(f.trunc() as i64)
}

/* -------------------------------------------------------------------------- */
/* Terminal Style Options                                                     */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone)]
pub struct StyleOptions {
    pub use_color: bool,
    pub use_emoji: bool,
    pub term_width: usize,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self::detect()
    }
}

impl StyleOptions {
    pub fn detect() -> Self {
        let width = std::env::var("COLUMNS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .map(|w| w.clamp(40, 220))
            .unwrap_or(100);

        StyleOptions {
            use_color: std::env::var_os("NO_COLOR").is_none(),
            use_emoji: std::env::var_os("NO_EMOJI").is_none(),
            term_width: width,
        }
    }

    /// No colors, no emoji (deterministic output).
    #[cfg(test)]
    pub fn plain() -> Self {
        StyleOptions {
            use_color: false,
            use_emoji: false,
            term_width: 100,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Role {
    Primary,
    Secondary,
    Accent,
    Success,
    Error,
    Dim,
}

pub fn color(role: Role, text: impl AsRef<str>, style: &StyleOptions) -> String {
    if !style.use_color {
        return text.as_ref().to_string();
    }
    let code = match role {
        Role::Primary => "38;5;45",    // cyan-ish
        Role::Secondary => "38;5;250", // gray
        Role::Accent => "38;5;213",    // magenta/pink
        Role::Success => "38;5;82",    // green
        Role::Error => "38;5;196",     // red
        Role::Dim => "2",              // faint
    };
    format!("\x1b[{code}m{}\x1b[0m", text.as_ref())
}

pub fn emoji(tag: &str, style: &StyleOptions) -> &'static str {
    if !style.use_emoji {
        return "";
    }
    match tag {
        "success" => "✔",
        "error" => "✖",
        "info" => "ℹ",
        "bulb" => "💡",
        "list" => "📜",
        _ => "",
    }
}

/* -------------------------------------------------------------------------- */
/* Box Header                                                                 */
/* -------------------------------------------------------------------------- */

/// Single-box header: title plus optional subtitle, wrapped to terminal width.
pub fn box_header(
    title: impl AsRef<str>,
    subtitle: Option<impl AsRef<str>>,
    style: &StyleOptions,
) -> String {
    let title_styled = color(Role::Primary, title.as_ref(), style);
    let inner = match subtitle {
        Some(s) => format!("{title_styled}  {}", color(Role::Secondary, s.as_ref(), style)),
        None => title_styled,
    };

    let max_inner = style.term_width.clamp(20, 200) - 4;
    let lines = wrap_text(&inner, max_inner);
    let width = lines.iter().map(|l| display_width(l)).max().unwrap_or(0);

    let mut out = Vec::with_capacity(lines.len() + 2);
    out.push(format!("┌{}┐", "─".repeat(width + 2)));
    for line in lines {
        let pad = width - display_width(&line);
        out.push(format!("│ {line}{} │", " ".repeat(pad)));
    }
    out.push(format!("└{}┘", "─".repeat(width + 2)));
    out.join("\n")
}

/* -------------------------------------------------------------------------- */
/* Terminal Table                                                             */
/* -------------------------------------------------------------------------- */

/// Column-aligned table; the widest columns shrink (with `…`) to fit.
pub fn table(headers: &[&str], rows: &[Vec<String>], style: &StyleOptions) -> String {
    if headers.is_empty() {
        return String::new();
    }
    let col_count = headers.len();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, c) in row.iter().enumerate().take(col_count) {
            widths[i] = widths[i].max(display_width(c));
        }
    }

    let total: usize = widths.iter().sum::<usize>() + (col_count - 1) * 2;
    if total > style.term_width {
        let mut overflow = total - style.term_width;
        let mut order: Vec<usize> = (0..col_count).collect();
        order.sort_by(|a, b| widths[*b].cmp(&widths[*a]));
        for idx in order {
            if overflow == 0 {
                break;
            }
            let shrink = widths[idx].saturating_sub(4).min(overflow);
            widths[idx] -= shrink;
            overflow -= shrink;
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 2);
    let header: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| color(Role::Accent, pad_or_truncate(h, widths[i]), style))
        .collect();
    lines.push(header.join("  "));
    let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    lines.push(color(Role::Dim, sep.join("  "), style));

    for row in rows {
        let cells: Vec<String> = (0..col_count)
            .map(|c| pad_or_truncate(row.get(c).map(String::as_str).unwrap_or(""), widths[c]))
            .collect();
        lines.push(cells.join("  ").trim_end().to_string());
    }
    lines.join("\n")
}

fn pad_or_truncate(s: &str, width: usize) -> String {
    let len = display_width(s);
    if len <= width {
        return format!("{s}{}", " ".repeat(width - len));
    }
    if width <= 1 {
        return "…".to_string();
    }
    let plain = strip_ansi(s);
    let mut out: String = plain.chars().take(width - 1).collect();
    out.push('…');
    out
}

/* -------------------------------------------------------------------------- */
/* Text Helpers                                                               */
/* -------------------------------------------------------------------------- */

pub fn wrap_text(s: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut rest = s;
    while !rest.is_empty() {
        let word_start = rest.find(|c: char| !c.is_whitespace()).unwrap_or(rest.len());
        let gap = &rest[..word_start];
        rest = &rest[word_start..];
        let word_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let word = &rest[..word_end];
        rest = &rest[word_end..];
        if word.is_empty() {
            break;
        }
        // inner spacing is kept as written; line breaks become one space
        let gap = if gap.contains(['\n', '\r']) { " " } else { gap };
        if !current.is_empty() {
            if max_width > 0
                && display_width(&current) + display_width(gap) + display_width(word) > max_width
            {
                lines.push(std::mem::take(&mut current));
            } else {
                current.push_str(gap);
            }
        }
        current.push_str(word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

fn strip_ansi(s: &str) -> Cow<'_, str> {
    if !s.contains('\x1b') {
        return Cow::Borrowed(s);
    }
    let mut buf = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for t in chars.by_ref() {
                if t.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        buf.push(c);
    }
    Cow::Owned(buf)
}

fn display_width(s: &str) -> usize {
    strip_ansi(s).chars().count()
}

/* -------------------------------------------------------------------------- */
/* Tests                                                                      */
/* -------------------------------------------------------------------------- */
