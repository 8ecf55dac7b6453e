//! Terminal output helpers: colored notes, tutor sections and the doctor's
//! check table.

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Whether stdout should get ANSI colors.
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && (std::env::var("COLORTERM").is_ok()
            || std::env::var("TERM").map(|t| t != "dumb").unwrap_or(false))
}

/// Strip ANSI escape codes from a string.
pub fn strip_ansi(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
        } else {
            result.push(c);
        }
    }
    result
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Success,
    Warn,
    Error,
}

impl Tone {
    fn marker(self, color: bool) -> String {
        let (c, glyph, plain) = match self {
            Tone::Info => (CYAN, "ℹ", "INFO:"),
            Tone::Success => (GREEN, "✓", "OK:"),
            Tone::Warn => (YELLOW, "⚠", "WARN:"),
            Tone::Error => (RED, "✗", "ERROR:"),
        };
        if color {
            format!("{c}{BOLD}{glyph}{RESET}")
        } else {
            plain.to_string()
        }
    }
}

pub fn format_note(tone: Tone, msg: &str, color: bool) -> String {
    format!("{} {msg}", tone.marker(color))
}

pub fn note_info(msg: &str) {
    println!("{}", format_note(Tone::Info, msg, supports_color()));
}

pub fn note_success(msg: &str) {
    println!("{}", format_note(Tone::Success, msg, supports_color()));
}

pub fn note_warn(msg: &str) {
    println!("{}", format_note(Tone::Warn, msg, supports_color()));
}

pub fn note_error(msg: &str) {
    eprintln!("{}", format_note(Tone::Error, msg, supports_color()));
}

/// Print a titled block of tutor output.
pub fn print_section(title: &str, body: &str) {
    if supports_color() {
        println!("{BOLD}{GREEN}{title}{RESET}");
    } else {
        println!("== {title} ==");
    }
    println!("{body}\n");
}

/// One line of `mathmentor doctor` output.
pub struct CheckRow {
    pub name: String,
    pub tone: Tone,
    pub detail: String,
}

impl CheckRow {
    pub fn new(name: impl Into<String>, tone: Tone, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tone,
            detail: detail.into(),
        }
    }
}

/// Render check rows as an aligned three-column table.
pub fn render_checks(rows: &[CheckRow], color: bool) -> String {
    let name_width = rows
        .iter()
        .map(|r| r.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Check".len());

    let mut out = format!("  {:<name_width$}  Status  Detail\n", "Check");
    out.push_str(&format!("  {}  ------  ------\n", "-".repeat(name_width)));
    for row in rows {
        let marker = row.tone.marker(color);
        let pad = 6usize.saturating_sub(strip_ansi(&marker).chars().count());
        out.push_str(&format!(
            "  {:<name_width$}  {marker}{}  {}\n",
            row.name,
            " ".repeat(pad),
            row.detail
        ));
    }
    out
}
