//! Listener presets and configuration-driven assembly.

use crate::complex_method::{self, ComplexMethod, DEFAULT_THRESHOLD};
use crate::package_count::{self, PackageCountProcessor};
use crate::project_counts::CountProcessor;
use crate::unnecessary_parentheses::{self, UnnecessaryParentheses};
use ktscan_core::{Config, ListenerBox, Rule, Severity};
use tracing::warn;

/// Preset listener selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    /// Every rule and every processor.
    #[default]
    Default,
    /// Only rules that report findings.
    Rules,
    /// Only processors that report project metrics.
    Metrics,
}

impl Preset {
    /// Looks a preset up by its configuration name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "default" | "all" => Some(Self::Default),
            "rules" => Some(Self::Rules),
            "metrics" => Some(Self::Metrics),
            _ => None,
        }
    }

    /// Returns the listeners for this preset with default settings.
    #[must_use]
    pub fn listeners(self) -> Vec<ListenerBox> {
        self.configured(&Config::default())
    }

    /// Returns the listeners for this preset, applying severity overrides
    /// and rule options from `config`.
    #[must_use]
    pub fn configured(self, config: &Config) -> Vec<ListenerBox> {
        let mut listeners: Vec<ListenerBox> = Vec::new();
        if self != Self::Metrics {
            listeners.push(Box::new(configure_parentheses(config)));
            listeners.push(Box::new(configure_complex_method(config)));
        }
        if self != Self::Rules {
            listeners.push(Box::new(PackageCountProcessor::new()));
            listeners.push(Box::new(CountProcessor::classes()));
            listeners.push(Box::new(CountProcessor::functions()));
            listeners.push(Box::new(CountProcessor::lines_of_code()));
        }
        listeners
    }
}

/// Returns all available listeners with default settings.
#[must_use]
pub fn all_listeners() -> Vec<ListenerBox> {
    Preset::Default.listeners()
}

/// Assembles the listeners selected by the configuration's preset.
///
/// Disabled listeners are still returned; the analyzer drops them when it
/// is built.
#[must_use]
pub fn listeners_from_config(config: &Config) -> Vec<ListenerBox> {
    let preset = match config.preset.as_deref() {
        None => Preset::Default,
        Some(name) => Preset::from_name(name).unwrap_or_else(|| {
            warn!("Unknown preset '{name}', using default");
            Preset::Default
        }),
    };
    preset.configured(config)
}

/// What a listener is, for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerInfo {
    /// Listener id.
    pub id: &'static str,
    /// Default severity, for rules.
    pub severity: Option<Severity>,
    /// One-line description.
    pub description: &'static str,
}

/// Describes every built-in listener.
#[must_use]
pub fn catalog() -> Vec<ListenerInfo> {
    vec![
        ListenerInfo {
            id: unnecessary_parentheses::ID,
            severity: Some(UnnecessaryParentheses::new().issue().severity),
            description: "Parentheses that can be removed without changing meaning",
        },
        ListenerInfo {
            id: complex_method::ID,
            severity: Some(ComplexMethod::new().issue().severity),
            description: "Functions whose cyclomatic complexity reaches the threshold",
        },
        ListenerInfo {
            id: package_count::ID,
            severity: None,
            description: "Project metric: number of packages",
        },
        ListenerInfo {
            id: "ClassCountProcessor",
            severity: None,
            description: "Project metric: number of classes",
        },
        ListenerInfo {
            id: "FunctionCountProcessor",
            severity: None,
            description: "Project metric: number of functions",
        },
        ListenerInfo {
            id: "LinesOfCodeProcessor",
            severity: None,
            description: "Project metric: lines of code",
        },
    ]
}

fn configure_parentheses(config: &Config) -> UnnecessaryParentheses {
    let rule = UnnecessaryParentheses::new();
    match config.rule_severity(unnecessary_parentheses::ID) {
        Some(severity) => rule.severity(severity),
        None => rule,
    }
}

fn configure_complex_method(config: &Config) -> ComplexMethod {
    let options = config.rule_config(complex_method::ID);
    let default = i64::try_from(DEFAULT_THRESHOLD).unwrap_or(i64::MAX);
    let threshold = options.get_int("threshold", default);
    let threshold = usize::try_from(threshold).unwrap_or_else(|_| {
        warn!("Ignoring negative {} threshold {threshold}", complex_method::ID);
        DEFAULT_THRESHOLD
    });

    let rule = ComplexMethod::new().threshold(threshold);
    match config.rule_severity(complex_method::ID) {
        Some(severity) => rule.severity(severity),
        None => rule,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(listeners: &[ListenerBox]) -> Vec<String> {
        listeners.iter().map(|l| l.id().to_string()).collect()
    }

    #[test]
    fn test_preset_listeners() {
        assert_eq!(Preset::Default.listeners().len(), 6);
        assert_eq!(
            ids(&Preset::Rules.listeners()),
            vec!["UnnecessaryParentheses", "ComplexMethod"]
        );
        assert_eq!(Preset::Metrics.listeners().len(), 4);
    }

    #[test]
    fn catalog_matches_listeners() {
        let catalog: Vec<String> = catalog().iter().map(|i| i.id.to_string()).collect();
        assert_eq!(catalog, ids(&all_listeners()));
    }

    #[test]
    fn preset_comes_from_config() {
        let config = Config::parse("preset = \"metrics\"\n").unwrap();
        assert!(!ids(&listeners_from_config(&config)).contains(&"ComplexMethod".to_string()));

        let config = Config::parse("preset = \"unknown\"\n").unwrap();
        assert_eq!(listeners_from_config(&config).len(), 6);
    }

    #[test]
    fn from_name_rejects_unknown() {
        assert_eq!(Preset::from_name("rules"), Some(Preset::Rules));
        assert_eq!(Preset::from_name("strict"), None);
    }
}
