/*!
format.rs

Human output helpers for `mcp-reg` (boxes, colour roles, tables, the
command preview). JSON paths never go through here.

Style is decided once per command from the environment:
  NO_COLOR  -> plain text
  NO_EMOJI  -> no pictographs
  COLUMNS   -> width hint (clamped 40..=220, default 100)

Functions return strings; callers decide where they are printed.
*/

use std::borrow::Cow;

use crate::error::RegisterError;
use crate::mcp::ArgumentVector;

#[derive(Debug, Clone)]
pub struct StyleOptions {
    pub use_color: bool,
    pub use_emoji: bool,
    pub term_width: usize,
}

impl StyleOptions {
    pub fn detect() -> Self {
        let term_width = std::env::var("COLUMNS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .map(|w| w.clamp(40, 220))
            .unwrap_or(100);
        StyleOptions {
            use_color: std::env::var_os("NO_COLOR").is_none(),
            use_emoji: std::env::var_os("NO_EMOJI").is_none(),
            term_width,
        }
    }

    /// No colour, no emoji, fixed width.
    pub fn plain(term_width: usize) -> Self {
        StyleOptions {
            use_color: false,
            use_emoji: false,
            term_width,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Role {
    Primary,
    Secondary,
    Accent,
    Success,
    Warning,
    Error,
    Dim,
}

pub fn color(role: Role, text: impl AsRef<str>, style: &StyleOptions) -> String {
    if !style.use_color {
        return text.as_ref().to_string();
    }
    let code = match role {
        Role::Primary => "38;5;45",
        Role::Secondary => "38;5;250",
        Role::Accent => "38;5;213",
        Role::Success => "38;5;82",
        Role::Warning => "38;5;214",
        Role::Error => "38;5;196",
        Role::Dim => "2",
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
        "warn" => "⚠",
        "info" => "ℹ",
        "lock" => "🔒",
        "list" => "📜",
        "run" => "▶",
        _ => "",
    }
}

/* -------------------------------------------------------------------------- */
/* Box Header                                                                 */
/* -------------------------------------------------------------------------- */

/// Single-row box around a title and optional subtitle. Overlong content is
/// truncated to the terminal width.
pub fn box_header(
    title: impl AsRef<str>,
    subtitle: Option<impl AsRef<str>>,
    style: &StyleOptions,
) -> String {
    let max_inner = style.term_width.clamp(20, 200) - 4;
    let title = title.as_ref().trim();
    let plain = match &subtitle {
        Some(s) => format!("{title}  {}", s.as_ref()),
        None => title.to_string(),
    };
    let visible = truncate_ellipsis(&strip_ansi(&plain), max_inner);
    let width = display_width(&visible);

    let styled = if width < display_width(&plain) {
        // Truncated: colouring partial segments is not worth it.
        color(Role::Primary, &visible, style)
    } else {
        match &subtitle {
            Some(s) => format!(
                "{}  {}",
                color(Role::Primary, title, style),
                color(Role::Secondary, s.as_ref(), style)
            ),
            None => color(Role::Primary, title, style),
        }
    };

    let bar = "─".repeat(width + 2);
    format!("┌{bar}┐\n│ {styled} │\n└{bar}┘")
}

/* -------------------------------------------------------------------------- */
/* Table                                                                      */
/* -------------------------------------------------------------------------- */

/// Left-aligned table. The widest columns shrink first when the row would
/// exceed the terminal width.
pub fn table(headers: &[&str], rows: &[Vec<String>], style: &StyleOptions) -> String {
    if headers.is_empty() {
        return String::new();
    }
    let cols = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| display_width(h)).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(cols) {
            widths[i] = widths[i].max(display_width(cell));
        }
    }

    let gap = 2 * (cols - 1);
    let mut total: usize = widths.iter().sum::<usize>() + gap;
    while total > style.term_width {
        let Some((idx, w)) = widths
            .iter()
            .copied()
            .enumerate()
            .max_by_key(|(_, w)| *w)
        else {
            break;
        };
        if w <= 4 {
            break;
        }
        widths[idx] -= 1;
        total -= 1;
    }

    let render_row = |cells: Vec<String>| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(i, c)| pad(&truncate_ellipsis(c, widths[i]), widths[i]))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    let header_cells = headers.iter().map(|h| h.to_string()).collect();
    lines.push(color(Role::Accent, render_row(header_cells), style));
    let sep = widths
        .iter()
        .map(|w| "-".repeat(*w))
        .collect::<Vec<_>>()
        .join("  ");
    lines.push(color(Role::Dim, sep, style));
    for row in rows {
        let cells = (0..cols)
            .map(|i| row.get(i).cloned().unwrap_or_default())
            .collect();
        lines.push(render_row(cells));
    }
    lines.join("\n")
}

/* -------------------------------------------------------------------------- */
/* Domain Output                                                              */
/* -------------------------------------------------------------------------- */

/// `▶ claude mcp add ...` line. `args` must already be redacted.
pub fn command_preview(program: &str, args: &ArgumentVector, style: &StyleOptions) -> String {
    let line = format!("{} {args}", shell_words::quote(program));
    format!(
        "{} {}",
        emoji("run", style),
        color(Role::Dim, line, style)
    )
    .trim_start()
    .to_string()
}

/// Boxed error with the taxonomy label as title.
pub fn error_box(err: &RegisterError, style: &StyleOptions) -> String {
    let title = format!("{} {}", emoji("error", style), err.kind());
    box_header(title, Some(color(Role::Error, err.to_string(), style)), style)
}

/* -------------------------------------------------------------------------- */
/* Text Helpers                                                               */
/* -------------------------------------------------------------------------- */

pub fn truncate_ellipsis(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut out: String = s.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}

fn pad(s: &str, width: usize) -> String {
    let len = display_width(s);
    if len >= width {
        s.to_string()
    } else {
        format!("{s}{}", " ".repeat(width - len))
    }
}

/// Remove CSI sequences (`ESC [ ... letter`).
pub fn strip_ansi(s: &str) -> Cow<'_, str> {
    if !s.contains('\x1b') {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for inner in chars.by_ref() {
                if inner.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        out.push(c);
    }
    Cow::Owned(out)
}

fn display_width(s: &str) -> usize {
    strip_ansi(s).chars().count()
}
