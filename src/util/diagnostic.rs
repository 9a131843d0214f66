//! User-friendly diagnostic messages.
//!
//! Errors shown to the user carry the root cause plus, where one exists, a
//! concrete next step.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion when the package store lacks an installed dependency.
    pub const MISSING_PACKAGE: &str =
        "help: Run the install step (`splot ci`) or point `--store` at the installed packages";

    /// Suggestion when an external tool is not on PATH.
    pub const TOOL_NOT_FOUND: &str = "help: Install the tool and ensure it is in your PATH";

    /// Suggestion when a build step fails.
    pub const STEP_FAILED: &str = "help: Run `splot ci --verbose` for more details";

    /// Suggestion when the manifest is invalid.
    pub const INVALID_MANIFEST: &str = "help: Remove Splot.toml to fall back to the built-in recipe";
}

/// A diagnostic message with optional suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub message: String,
    pub context: Vec<String>,
    pub suggestions: Vec<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let label = if color { "\x1b[1;31merror\x1b[0m" } else { "error" };

        let mut output = format!("{}: {}\n", label, self.message);
        for ctx in &self.context {
            output.push_str(&format!("  -> {}\n", ctx));
        }
        for suggestion in &self.suggestions {
            output.push_str(suggestion);
            output.push('\n');
        }
        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// Manifest syntax or schema error pointing into the manifest source.
#[derive(Debug, Error, MietteDiagnostic)]
#[error("invalid manifest `{name}`: {message}")]
#[diagnostic(
    code(splot::manifest::parse),
    help("Remove Splot.toml to fall back to the built-in recipe")
)]
pub struct ManifestParseError {
    pub name: String,
    pub message: String,
    #[source_code]
    pub src: NamedSource<String>,
    #[label("here")]
    pub span: Option<SourceSpan>,
}

impl ManifestParseError {
    pub fn from_toml(name: &str, content: &str, err: &toml::de::Error) -> Self {
        ManifestParseError {
            name: name.to_string(),
            message: err.message().to_string(),
            src: NamedSource::new(name, content.to_string()),
            span: err.span().map(|r| SourceSpan::from(r.start..r.end)),
        }
    }

    /// Render with source snippet, for terminal output.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let handler = miette::GraphicalReportHandler::new();
        if handler.render_report(&mut out, self).is_err() {
            return self.to_string();
        }
        out
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_formatting() {
        let diag = Diagnostic::error("step `install` failed")
            .with_context("`conan install ..` exited with code 2")
            .with_suggestion(suggestions::STEP_FAILED);

        let output = diag.format(false);
        assert!(output.starts_with("error: step `install` failed"));
        assert!(output.contains("-> `conan install ..` exited with code 2"));
        assert!(output.contains("help: Run `splot ci --verbose`"));
    }

    #[test]
    fn test_manifest_error_has_span() {
        let content = "[package\nname = 42\n";
        let err = toml::from_str::<toml::Value>(content).unwrap_err();
        let diag = ManifestParseError::from_toml("Splot.toml", content, &err);
        assert!(diag.span.is_some());
        assert!(diag.to_string().starts_with("invalid manifest `Splot.toml`"));
    }
}
