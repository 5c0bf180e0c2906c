//! Named theme token sets with an active-theme pointer, persisted as JSON.
//!
//! Tokens become CSS custom properties, so every key and value passes
//! [`sanitize_token`] before it is emitted as a style declaration.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;

static TOKEN_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("valid token key pattern"));
static TOKEN_VALUE_FORBIDDEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[;{}]").expect("valid token value pattern"));

/// Token name → CSS value.
pub type TokenSet = BTreeMap<String, String>;

/// Return `value` if the token is safe to write as `--key: value`.
pub fn sanitize_token<'a>(key: &str, value: &'a str) -> Option<&'a str> {
    if !TOKEN_KEY.is_match(key) {
        return None;
    }
    if TOKEN_VALUE_FORBIDDEN.is_match(value) {
        return None;
    }
    Some(value)
}

/// Sanitised `(--key, value)` declarations for a token set; unsafe tokens
/// are skipped.
pub fn style_declarations(tokens: &TokenSet) -> Vec<(String, String)> {
    tokens
        .iter()
        .filter_map(|(key, value)| match sanitize_token(key, value) {
            Some(safe) => Some((format!("--{key}"), safe.to_string())),
            None => {
                debug!(key, "dropping unsafe theme token");
                None
            }
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct StoreData {
    themes: BTreeMap<String, TokenSet>,
    active: Option<String>,
    scheme: Option<String>,
}

/// Theme registry backed by an optional JSON file.
#[derive(Debug, Clone, Default)]
pub struct ThemeStore {
    path: Option<PathBuf>,
    data: StoreData,
}

impl ThemeStore {
    /// Store that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the store at `path`. A missing or unreadable file starts empty.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let data = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "theme store load failed");
                StoreData::default()
            }),
            Err(_) => StoreData::default(),
        };
        Self { path: Some(path), data }
    }

    fn save(&self) -> Result<()> {
        if let Some(path) = &self.path {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, serde_json::to_string_pretty(&self.data)?)?;
        }
        Ok(())
    }

    /// Add or replace a named theme. An empty name is ignored.
    pub fn register(&mut self, name: &str, tokens: TokenSet) -> Result<&mut Self> {
        if name.is_empty() {
            return Ok(self);
        }
        self.data.themes.insert(name.to_string(), tokens);
        self.save()?;
        Ok(self)
    }

    /// Make `name` the active theme (if given) and return the sanitised
    /// declarations of whichever theme is active afterwards.
    pub fn use_theme(&mut self, name: Option<&str>) -> Result<Vec<(String, String)>> {
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            self.data.active = Some(name.to_string());
            self.save()?;
        }
        Ok(self.active_theme().map(style_declarations).unwrap_or_default())
    }

    pub fn active_name(&self) -> Option<&str> {
        self.data.active.as_deref()
    }

    pub fn active_theme(&self) -> Option<&TokenSet> {
        self.data.active.as_ref().and_then(|name| self.data.themes.get(name))
    }

    pub fn theme(&self, name: &str) -> Option<&TokenSet> {
        self.data.themes.get(name)
    }

    pub fn theme_names(&self) -> impl Iterator<Item = &str> {
        self.data.themes.keys().map(String::as_str)
    }

    pub fn scheme(&self) -> Option<&str> {
        self.data.scheme.as_deref()
    }

    /// Record the preferred color scheme (e.g. `light`, `dark`).
    pub fn set_scheme(&mut self, scheme: Option<&str>) -> Result<()> {
        self.data.scheme = scheme.map(str::to_string);
        self.save()
    }

    /// The active theme as a CSS rule for `selector`.
    pub fn to_css(&self, selector: &str) -> Option<String> {
        let declarations = style_declarations(self.active_theme()?);
        let body: String = declarations
            .iter()
            .map(|(k, v)| format!("  {k}: {v};\n"))
            .collect();
        Some(format!("{selector} {{\n{body}}}\n"))
    }
}
