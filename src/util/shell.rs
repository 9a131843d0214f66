//! Centralized shell output.
//!
//! All user-facing status lines go through [`Shell`] so that spacing, colors
//! and verbosity are handled in one place. Status lines go to stderr in the
//! `{status:>12} {message}` format; machine-readable output (`--json`) is
//! written to stdout by the commands themselves.

use std::fmt::Display;
use std::io::{self, IsTerminal};
use std::time::Duration;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// --quiet: errors only
    Quiet,
    #[default]
    Normal,
    /// --verbose: status lines plus debug logging
    Verbose,
}

/// Color output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Detect TTY and use colors if available.
    #[default]
    Auto,
    Always,
    Never,
}

impl std::str::FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            _ => Err(format!(
                "invalid color choice '{}'; expected 'auto', 'always', or 'never'",
                s
            )),
        }
    }
}

/// Status types for output messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    // Success statuses (green)
    Created,
    Copied,
    Finished,
    Removed,

    // In-progress statuses (cyan)
    Resolving,
    Generating,
    Installing,
    Building,
    Packaging,

    // Info statuses (blue)
    Info,

    // Warning statuses (yellow)
    Skipped,
    Warning,
}

impl Status {
    fn as_str(&self) -> &'static str {
        match self {
            Status::Created => "Created",
            Status::Copied => "Copied",
            Status::Finished => "Finished",
            Status::Removed => "Removed",
            Status::Resolving => "Resolving",
            Status::Generating => "Generating",
            Status::Installing => "Installing",
            Status::Building => "Building",
            Status::Packaging => "Packaging",
            Status::Info => "Info",
            Status::Skipped => "Skipped",
            Status::Warning => "Warning",
        }
    }

    fn color_code(&self) -> &'static str {
        match self {
            Status::Created | Status::Copied | Status::Finished | Status::Removed => "\x1b[1;32m",
            Status::Resolving
            | Status::Generating
            | Status::Installing
            | Status::Building
            | Status::Packaging => "\x1b[1;36m",
            Status::Info => "\x1b[1;34m",
            Status::Skipped | Status::Warning => "\x1b[1;33m",
        }
    }
}

/// Width statuses are right-aligned to.
const STATUS_WIDTH: usize = 12;

/// Central shell for all CLI output.
#[derive(Debug, Clone)]
pub struct Shell {
    verbosity: Verbosity,
    use_color: bool,
}

impl Shell {
    pub fn new(verbosity: Verbosity, color: ColorChoice) -> Self {
        let use_color = match color {
            ColorChoice::Auto => io::stderr().is_terminal(),
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        };
        Shell {
            verbosity,
            use_color,
        }
    }

    /// Create a shell from CLI flags. Quiet wins over verbose.
    pub fn from_flags(quiet: bool, verbose: bool, color: ColorChoice) -> Self {
        let verbosity = if quiet {
            Verbosity::Quiet
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };
        Shell::new(verbosity, color)
    }

    pub fn is_quiet(&self) -> bool {
        self.verbosity == Verbosity::Quiet
    }

    pub fn is_verbose(&self) -> bool {
        self.verbosity == Verbosity::Verbose
    }

    pub fn use_color(&self) -> bool {
        self.use_color
    }

    /// Print a status message. Nothing is printed in quiet mode.
    pub fn status(&self, status: Status, msg: impl Display) {
        if self.is_quiet() {
            return;
        }
        eprintln!("{} {}", self.format_status(status), msg);
    }

    pub fn note(&self, msg: impl Display) {
        self.status(Status::Info, msg);
    }

    pub fn warn(&self, msg: impl Display) {
        self.status(Status::Warning, msg);
    }

    fn format_status(&self, status: Status) -> String {
        let text = status.as_str();
        if self.use_color {
            format!(
                "{}{:>width$}\x1b[0m",
                status.color_code(),
                text,
                width = STATUS_WIDTH
            )
        } else {
            format!("{:>width$}", text, width = STATUS_WIDTH)
        }
    }
}

impl Default for Shell {
    fn default() -> Self {
        Shell::new(Verbosity::Normal, ColorChoice::Auto)
    }
}

/// Format a duration in a human-readable way.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 60.0 {
        format!("{:.2}s", secs)
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_choice_parse() {
        assert_eq!("auto".parse::<ColorChoice>().unwrap(), ColorChoice::Auto);
        assert_eq!("ALWAYS".parse::<ColorChoice>().unwrap(), ColorChoice::Always);
        assert_eq!("never".parse::<ColorChoice>().unwrap(), ColorChoice::Never);
        assert!("invalid".parse::<ColorChoice>().is_err());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(500)), "0.50s");
        assert_eq!(format_duration(Duration::from_secs(2)), "2.00s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1.5m");
    }

    #[test]
    fn test_status_formatting() {
        let shell = Shell::new(Verbosity::Normal, ColorChoice::Never);
        let formatted = shell.format_status(Status::Installing);
        assert_eq!(formatted.trim(), "Installing");
        assert_eq!(formatted.len(), 12);
        assert_eq!(shell.format_status(Status::Warning).trim(), "Warning");
    }

    #[test]
    fn test_from_flags() {
        let shell = Shell::from_flags(false, false, ColorChoice::Never);
        assert!(!shell.is_quiet());
        assert!(!shell.is_verbose());
        assert!(!shell.use_color());

        assert!(Shell::from_flags(true, false, ColorChoice::Auto).is_quiet());
        assert!(Shell::from_flags(false, true, ColorChoice::Auto).is_verbose());
        assert!(Shell::from_flags(true, true, ColorChoice::Auto).is_quiet());
        assert!(Shell::from_flags(false, false, ColorChoice::Always).use_color());
    }
}
