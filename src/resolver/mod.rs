//! Configuration resolution.
//!
//! Turns a recipe plus the host settings into a concrete [`Configuration`]:
//! the dependency pins, the platform-conditional options and a typed view of
//! the features those options select. Resolution is pure; all I/O happens in
//! `ops::generate`.

pub mod rules;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::dependency::DependencyRef;
use crate::core::options::{OptionError, OptionSet};
use crate::core::platform::{Os, Settings};
use crate::core::recipe::Recipe;
use crate::util::hash::Fingerprint;

/// Errors produced by resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("recipe `{0}` requires no dependencies")]
    NoRequirements(String),

    #[error("illegal option for {os}: {source}")]
    IllegalOption {
        os: Os,
        #[source]
        source: OptionError,
    },
}

/// OpenGL profile selected for the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlProfile {
    Core,
    Compatibility,
}

/// Graphics loader configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphicsBackend {
    pub spec: String,
    pub profile: GlProfile,
    pub version: String,
}

impl fmt::Display for GraphicsBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let profile = match self.profile {
            GlProfile::Core => "core",
            GlProfile::Compatibility => "compatibility",
        };
        write!(f, "{} {} {}", self.spec, profile, self.version)
    }
}

/// Typed view over the resolved options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Features {
    /// `None` when the recipe has no graphics loader dependency.
    pub graphics: Option<GraphicsBackend>,
    /// PulseAudio subsystem of the audio/windowing dependency.
    pub audio_backend: bool,
    /// Backtrace-based stacktrace backend.
    pub stacktrace_backtrace: bool,
}

impl Features {
    fn from_options(options: &OptionSet) -> Self {
        let str_opt = |package: &str, option: &str| match options.get(package, option) {
            Some(crate::core::OptionValue::Str(s)) => Some(s.clone()),
            _ => None,
        };
        let bool_opt = |package: &str, option: &str| {
            options.get(package, option).and_then(|v| v.as_bool())
        };

        let graphics = str_opt("glad", "spec").map(|spec| GraphicsBackend {
            spec,
            profile: match str_opt("glad", "gl_profile").as_deref() {
                Some("compatibility") => GlProfile::Compatibility,
                _ => GlProfile::Core,
            },
            version: str_opt("glad", "gl_version").unwrap_or_else(|| rules::GL_VERSION.to_string()),
        });

        Features {
            graphics,
            audio_backend: bool_opt("sdl", "pulse").unwrap_or(true),
            stacktrace_backtrace: bool_opt("boost", "with_stacktrace_backtrace").unwrap_or(true),
        }
    }
}

/// Fully resolved configuration for one build invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    pub package: String,
    pub version: String,
    pub settings: Settings,
    pub requires: Vec<DependencyRef>,
    pub features: Features,
    pub options: OptionSet,
    pub fingerprint: String,
}

impl Configuration {
    /// Options as `package:option=value` command-line assignments.
    pub fn option_assignments(&self) -> Vec<String> {
        self.options.to_assignments()
    }
}

/// Resolve `recipe` for `settings`.
pub fn resolve(recipe: &Recipe, settings: &Settings) -> Result<Configuration, ResolveError> {
    if recipe.requires.is_empty() {
        return Err(ResolveError::NoRequirements(recipe.package.name.clone()));
    }

    let mut options = OptionSet::new();
    for rule in rules::rules_for(&settings.os) {
        if !recipe.requires_package(rule.package) {
            tracing::debug!(
                "skipping rule {}: `{}` is not required",
                rule.key(),
                rule.package
            );
            continue;
        }
        tracing::debug!("{}={:?} ({})", rule.key(), rule.value, rule.reason);
        options.set(rule.key(), rule.value);
    }

    options.merge(&recipe.options);
    options
        .validate(&settings.os)
        .map_err(|source| ResolveError::IllegalOption {
            os: settings.os.clone(),
            source,
        })?;

    let features = Features::from_options(&options);
    let fingerprint = fingerprint(recipe, settings, &options);

    Ok(Configuration {
        package: recipe.package.name.clone(),
        version: recipe.package.version.to_string(),
        settings: settings.clone(),
        requires: recipe.requires.clone(),
        features,
        options,
        fingerprint,
    })
}

/// Fingerprint over everything that changes the generated files.
///
/// Only the settings the recipe declares take part.
fn fingerprint(recipe: &Recipe, settings: &Settings, options: &OptionSet) -> String {
    let mut fp = Fingerprint::new();
    fp.section("package")
        .update_str(&recipe.package.name)
        .update_str(&recipe.package.version.to_string());

    fp.section("settings");
    for name in &recipe.package.settings {
        let value = settings.get(name).unwrap_or_default();
        fp.update_str(name).update_str(&value);
    }

    fp.section("requires");
    for dep in &recipe.requires {
        fp.update_str(&dep.to_string());
    }

    fp.section("options");
    fp.update_strs(options.to_assignments().iter().map(String::as_str));

    fp.section("bindings");
    fp.update_strs(recipe.bindings.patterns.iter().map(String::as_str))
        .update_str(&recipe.bindings.dir);

    fp.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::options::{OptionKey, OptionValue};
    use crate::core::platform::{Arch, BuildType};

    fn resolve_for(os: Os) -> Configuration {
        resolve(&Recipe::builtin(), &Settings::new(os, Arch::X86_64)).unwrap()
    }

    #[test]
    fn test_graphics_pinned_everywhere() {
        for os in Os::known() {
            let config = resolve_for(os.clone());
            let graphics = config.features.graphics.clone().unwrap();
            assert_eq!(graphics.spec, "gl");
            assert_eq!(graphics.profile, GlProfile::Core);
            assert_eq!(graphics.version, "3.2");
            assert_eq!(graphics.to_string(), "gl core 3.2");
        }
    }

    #[test]
    fn test_audio_flag_never_unsupported() {
        for os in Os::known() {
            let config = resolve_for(os.clone());
            if os.is_windows() {
                assert!(!config.options.contains("sdl", "pulse"));
                assert!(config.features.audio_backend);
            } else {
                assert_eq!(
                    config.options.get("sdl", "pulse"),
                    Some(&OptionValue::Bool(false))
                );
                assert!(!config.features.audio_backend);
            }
        }
    }

    #[test]
    fn test_stacktrace_only_on_macos() {
        for os in Os::known() {
            let config = resolve_for(os.clone());
            assert_eq!(
                config.options.contains("boost", "with_stacktrace_backtrace"),
                os.is_macos()
            );
            assert_eq!(config.features.stacktrace_backtrace, !os.is_macos());
        }
    }

    #[test]
    fn test_linux_assignments() {
        let config = resolve_for(Os::Linux);
        assert_eq!(
            config.option_assignments(),
            vec![
                "glad:gl_profile=core",
                "glad:gl_version=3.2",
                "glad:spec=gl",
                "sdl:pulse=False"
            ]
        );
        assert_eq!(config.package, "serial-plotter");
        assert_eq!(config.version, "0.0.2");
    }

    #[test]
    fn test_rules_skip_missing_packages() {
        let mut recipe = Recipe::builtin();
        recipe.requires.retain(|d| d.name() != "sdl" && d.name() != "glad");
        let config = resolve(&recipe, &Settings::new(Os::Linux, Arch::X86_64)).unwrap();
        assert!(config.options.is_empty());
        assert!(config.features.graphics.is_none());
    }

    #[test]
    fn test_manifest_options_override_and_validate() {
        let mut recipe = Recipe::builtin();
        recipe
            .options
            .set(OptionKey::new("glad", "gl_profile"), "compatibility");
        let config = resolve(&recipe, &Settings::new(Os::Linux, Arch::X86_64)).unwrap();
        assert_eq!(
            config.features.graphics.unwrap().profile,
            GlProfile::Compatibility
        );

        recipe.options.set(OptionKey::new("sdl", "pulse"), true);
        let err = resolve(&recipe, &Settings::new(Os::Windows, Arch::X86_64)).unwrap_err();
        assert!(matches!(err, ResolveError::IllegalOption { .. }));
    }

    #[test]
    fn test_manifest_string_boolean_resolves() {
        let recipe = Recipe::parse(
            "requires = [\"sdl/2.0.14\"]\n\
             [package]\nname = \"p\"\nversion = \"0.1.0\"\n\
             [options]\n\"sdl:pulse\" = \"False\"\n",
            "Splot.toml",
        )
        .unwrap();
        let config = resolve(&recipe, &Settings::new(Os::Linux, Arch::X86_64)).unwrap();
        assert_eq!(config.options.get("sdl", "pulse"), Some(&OptionValue::Bool(false)));
        assert!(config.option_assignments().contains(&"sdl:pulse=False".to_string()));
    }

    #[test]
    fn test_empty_recipe_is_rejected() {
        let mut recipe = Recipe::builtin();
        recipe.requires.clear();
        let err = resolve(&recipe, &Settings::host()).unwrap_err();
        assert!(matches!(err, ResolveError::NoRequirements(_)));
    }

    #[test]
    fn test_fingerprint_tracks_settings() {
        let recipe = Recipe::builtin();
        let linux = Settings::new(Os::Linux, Arch::X86_64);
        let a = resolve(&recipe, &linux).unwrap();
        let b = resolve(&recipe, &linux).unwrap();
        let c = resolve(&recipe, &linux.clone().with_build_type(BuildType::Debug)).unwrap();
        let d = resolve(&recipe, &Settings::new(Os::Macos, Arch::X86_64)).unwrap();
        assert_eq!(a.fingerprint, b.fingerprint);
        assert_ne!(a.fingerprint, c.fingerprint);
        assert_ne!(a.fingerprint, d.fingerprint);
    }
}
