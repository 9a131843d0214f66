//! Platform-conditional option rules.
//!
//! Each rule assigns one dependency option when its OS predicate holds. Rules
//! targeting a package the recipe does not require are skipped.

use crate::core::options::{OptionKey, OptionValue};
use crate::core::platform::Os;

/// Static option value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleValue {
    Bool(bool),
    Str(&'static str),
}

impl From<RuleValue> for OptionValue {
    fn from(value: RuleValue) -> Self {
        match value {
            RuleValue::Bool(b) => OptionValue::Bool(b),
            RuleValue::Str(s) => OptionValue::Str(s.to_string()),
        }
    }
}

/// A single option assignment guarded by an OS predicate.
#[derive(Clone, Copy)]
pub struct Rule {
    pub package: &'static str,
    pub option: &'static str,
    pub value: RuleValue,
    pub applies: fn(&Os) -> bool,
    pub reason: &'static str,
}

impl Rule {
    pub fn key(&self) -> OptionKey {
        OptionKey::new(self.package, self.option)
    }
}

fn always(_: &Os) -> bool {
    true
}

fn not_windows(os: &Os) -> bool {
    !os.is_windows()
}

fn macos(os: &Os) -> bool {
    os.is_macos()
}

/// OpenGL version the UI is written against.
pub const GL_VERSION: &str = "3.2";

/// The serial-plotter option rules, in application order.
pub const RULES: &[Rule] = &[
    Rule {
        package: "glad",
        option: "spec",
        value: RuleValue::Str("gl"),
        applies: always,
        reason: "UI renders through desktop OpenGL",
    },
    Rule {
        package: "glad",
        option: "gl_profile",
        value: RuleValue::Str("core"),
        applies: always,
        reason: "UI renders through desktop OpenGL",
    },
    Rule {
        package: "glad",
        option: "gl_version",
        value: RuleValue::Str(GL_VERSION),
        applies: always,
        reason: "UI renders through desktop OpenGL",
    },
    Rule {
        package: "sdl",
        option: "pulse",
        value: RuleValue::Bool(false),
        applies: not_windows,
        reason: "PulseAudio support is turned off outside Windows",
    },
    Rule {
        package: "boost",
        option: "with_stacktrace_backtrace",
        value: RuleValue::Bool(false),
        applies: macos,
        reason: "libbacktrace stacktrace backend does not build on macOS",
    },
];

/// Rules that apply on `os`.
pub fn rules_for(os: &Os) -> impl Iterator<Item = &'static Rule> + '_ {
    RULES.iter().filter(move |rule| (rule.applies)(os))
}
