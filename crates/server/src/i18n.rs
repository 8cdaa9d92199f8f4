use std::{collections::HashMap, fmt::Display, fs, path::Path};

use anyhow::{Context, Result};
use log::warn;

pub const PREFIX: &str = "Prefix";
pub const NO_DATA: &str = "No data available";
pub const TITLE: &str = "topcredits.title";
pub const PLAYER_LINE: &str = "topcredits.players";

const BUILTIN: &str = include_str!("../../../lang/en.json");

pub trait Localizer: Send + Sync {
    /// Renders `key` with `{0}`, `{1}`... replaced by `args`. Unknown keys render as themselves.
    fn lookup(&self, key: &str, args: &[&dyn Display]) -> String;
}

#[derive(Debug, Clone, Default)]
pub struct Translations {
    strings: HashMap<String, String>,
}

impl Translations {
    pub fn builtin() -> Self {
        match Self::from_json(BUILTIN) {
            Ok(t) => t,
            Err(e) => {
                warn!("Built-in translations are broken: {e}");
                Self::default()
            }
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let strings = serde_json::from_str(json).context("Translations must be a flat object")?;
        Ok(Self { strings })
    }

    /// Built-in strings overridden by the ones in `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        let overrides = Self::from_json(&json)?;

        let mut translations = Self::builtin();
        translations.strings.extend(overrides.strings);
        Ok(translations)
    }
}

impl Localizer for Translations {
    fn lookup(&self, key: &str, args: &[&dyn Display]) -> String {
        let Some(template) = self.strings.get(key) else {
            return key.to_string();
        };

        format_template(template, args)
    }
}

/// Substitutes `{i}` placeholders in a single left to right pass. Inserted text is never
/// scanned again, so arguments containing braces come out verbatim.
fn format_template(template: &str, args: &[&dyn Display]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let arg = after.find('}').and_then(|close| {
            let idx: usize = after[..close].parse().ok()?;
            Some((close, args.get(idx)?))
        });

        match arg {
            Some((close, arg)) => {
                out.push_str(&arg.to_string());
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
