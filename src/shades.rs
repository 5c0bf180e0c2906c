//! Thirteen-step tone ramps for each palette role.
//!
//! The ramps only vary lightness: tone `t` maps to `L = t / 100` while chroma
//! and hue come from the (clamped) role color. Input colors may arrive in any
//! of the shapes older consumers produced, see [`ColorShape`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::oklch::{Lch, normalize_hue};
use crate::roles::Palette;

/// Tone levels of every ramp, darkest first.
pub const TONES: [u8; 13] = [0, 10, 20, 30, 40, 50, 60, 70, 80, 90, 95, 98, 100];

const PRIMARY_CHROMA: (f32, f32) = (0.10, 0.35);
const SECONDARY_CHROMA: (f32, f32) = (0.06, 0.25);
const ACCENT_CHROMA: (f32, f32) = (0.06, 0.25);
const NEUTRAL_CHROMA: f32 = 0.015;
const NEUTRAL_VARIANT_CHROMA: f32 = 0.04;

/// A color coordinate in one of the recognised serialized shapes.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ColorShape {
    /// `{ "oklch": { "L", "C", "h" }, ... }`
    Nested { oklch: Lch },
    /// `{ "l", "c", "h" }`
    Legacy { l: f32, c: f32, h: f32 },
    /// `{ "L", "c", "h" }`
    Alternate {
        #[serde(rename = "L")]
        l: f32,
        c: f32,
        h: f32,
    },
}

impl ColorShape {
    pub fn to_lch(self) -> Lch {
        match self {
            Self::Nested { oklch } => oklch,
            Self::Legacy { l, c, h } | Self::Alternate { l, c, h } => Lch::new(l, c, h),
        }
    }

    /// Parse a JSON value; unrecognised shapes yield `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        Self::deserialize(value).ok()
    }
}

/// One ramp: tone level → `oklch(L C h)` string.
pub type ToneRamp = BTreeMap<u8, String>;

/// The tones at one level across all ramps.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToneSet {
    pub primary: Option<String>,
    pub secondary: Option<String>,
    pub accent: Option<String>,
    pub neutral: Option<String>,
    pub neutral_variant: Option<String>,
}

/// Result of [`Shades::validate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shades {
    pub primary: ToneRamp,
    pub secondary: ToneRamp,
    pub accent: ToneRamp,
    pub neutral: ToneRamp,
    pub neutral_variant: ToneRamp,
}

fn clamp_chroma(color: Lch, (min, max): (f32, f32)) -> Lch {
    Lch {
        l: color.l.clamp(0.0, 1.0),
        c: color.c.clamp(min, max),
        h: normalize_hue(color.h),
    }
}

/// Build a ramp for `base`, optionally overriding its chroma.
pub fn tone_ramp(base: Lch, force_chroma: Option<f32>) -> ToneRamp {
    let chroma = force_chroma.unwrap_or(base.c);
    TONES
        .iter()
        .map(|&tone| {
            let lightness = tone as f32 / 100.0;
            (tone, format!("oklch({lightness:.3} {chroma:.3} {:.1})", base.h))
        })
        .collect()
}

impl Shades {
    /// Ramps for an extracted palette.
    pub fn generate(palette: &Palette) -> Self {
        Self::from_coordinates(
            Some(palette.primary.oklch),
            Some(palette.secondary.oklch),
            Some(palette.accent.oklch),
            Some(palette.neutral.oklch),
        )
    }

    /// Ramps for a loosely shaped JSON palette (`primary`, `secondary`,
    /// `accent`, `neutral` keys). Missing or unrecognised roles count as absent.
    pub fn from_json(value: &Value) -> Self {
        let role = |name: &str| value.get(name).and_then(ColorShape::from_value).map(ColorShape::to_lch);
        Self::from_coordinates(role("primary"), role("secondary"), role("accent"), role("neutral"))
    }

    /// Ramps from individual coordinates. Without a primary or an accent the
    /// default ramps are returned.
    pub fn from_coordinates(
        primary: Option<Lch>,
        secondary: Option<Lch>,
        accent: Option<Lch>,
        neutral: Option<Lch>,
    ) -> Self {
        let (Some(primary), Some(accent)) = (primary, accent) else {
            return Self::default_shades();
        };

        let primary_clamped = clamp_chroma(primary, PRIMARY_CHROMA);
        let secondary_clamped = clamp_chroma(secondary.unwrap_or(primary), SECONDARY_CHROMA);
        let accent_clamped = clamp_chroma(accent, ACCENT_CHROMA);
        let neutral_l = neutral.map_or(primary.l, |n| n.l);
        let neutral_clamped = Lch::new(neutral_l, NEUTRAL_CHROMA, primary_clamped.h);

        Self {
            primary: tone_ramp(primary_clamped, None),
            secondary: tone_ramp(secondary_clamped, None),
            accent: tone_ramp(accent_clamped, None),
            neutral: tone_ramp(neutral_clamped, None),
            neutral_variant: tone_ramp(neutral_clamped, Some(NEUTRAL_VARIANT_CHROMA)),
        }
    }

    /// Safe blue-based ramps.
    pub fn default_shades() -> Self {
        let blue = Lch::new(0.45, 0.15, 220.0);
        let neutral = Lch::new(0.5, 0.01, 220.0);
        Self {
            primary: tone_ramp(blue, None),
            secondary: tone_ramp(Lch { h: 280.0, ..blue }, None),
            accent: tone_ramp(Lch { h: 20.0, ..blue }, None),
            neutral: tone_ramp(neutral, None),
            neutral_variant: tone_ramp(neutral, Some(NEUTRAL_VARIANT_CHROMA)),
        }
    }

    fn ramps(&self) -> [(&'static str, &ToneRamp); 5] {
        [
            ("primary", &self.primary),
            ("secondary", &self.secondary),
            ("accent", &self.accent),
            ("neutral", &self.neutral),
            ("neutralVariant", &self.neutral_variant),
        ]
    }

    /// Every ramp's color at one tone level.
    pub fn tone(&self, tone: u8) -> ToneSet {
        ToneSet {
            primary: self.primary.get(&tone).cloned(),
            secondary: self.secondary.get(&tone).cloned(),
            accent: self.accent.get(&tone).cloned(),
            neutral: self.neutral.get(&tone).cloned(),
            neutral_variant: self.neutral_variant.get(&tone).cloned(),
        }
    }

    /// Material-style semantic tokens picked from fixed tone levels.
    ///
    /// Keys are valid custom-property names, so the map can be registered in
    /// a [`ThemeStore`](crate::theme::ThemeStore) as is.
    pub fn semantic_tokens(&self) -> BTreeMap<String, String> {
        let pick = |ramp: &ToneRamp, tone: u8| ramp.get(&tone).cloned().unwrap_or_default();
        let entries = [
            ("primary", pick(&self.primary, 40)),
            ("onPrimary", pick(&self.primary, 100)),
            ("primaryContainer", pick(&self.primary, 90)),
            ("onPrimaryContainer", pick(&self.primary, 10)),
            ("secondary", pick(&self.secondary, 40)),
            ("onSecondary", pick(&self.secondary, 100)),
            ("secondaryContainer", pick(&self.secondary, 90)),
            ("onSecondaryContainer", pick(&self.secondary, 10)),
            ("accent", pick(&self.accent, 40)),
            ("onAccent", pick(&self.accent, 100)),
            ("accentContainer", pick(&self.accent, 90)),
            ("onAccentContainer", pick(&self.accent, 10)),
            ("background", pick(&self.neutral, 98)),
            ("onBackground", pick(&self.neutral, 10)),
            ("surface", pick(&self.neutral, 95)),
            ("onSurface", pick(&self.neutral, 10)),
            ("surfaceVariant", pick(&self.neutral_variant, 90)),
            ("onSurfaceVariant", pick(&self.neutral_variant, 30)),
            ("outline", pick(&self.neutral_variant, 50)),
            ("outlineVariant", pick(&self.neutral_variant, 80)),
        ];
        entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    /// Check that every ramp has all tones in `oklch(...)` form.
    pub fn validate(&self) -> ValidationReport {
        let mut issues = Vec::new();
        for (name, ramp) in self.ramps() {
            let missing: Vec<String> = TONES
                .iter()
                .filter(|t| !ramp.contains_key(t))
                .map(|t| t.to_string())
                .collect();
            if !missing.is_empty() {
                issues.push(format!("Palette {name} missing tones: {}", missing.join(", ")));
            }
            for tone in TONES {
                if let Some(color) = ramp.get(&tone) {
                    if !color.contains("oklch(") {
                        issues.push(format!("Palette {name} tone {tone} has invalid format"));
                    }
                }
            }
        }
        ValidationReport { is_valid: issues.is_empty(), issues }
    }

    /// `--{prefix}{ramp}-{tone}` custom properties for every tone.
    pub fn to_css_variables(&self, prefix: &str) -> Vec<(String, String)> {
        let mut vars = Vec::with_capacity(5 * TONES.len());
        for (name, ramp) in self.ramps() {
            for tone in TONES {
                if let Some(color) = ramp.get(&tone) {
                    vars.push((format!("--{prefix}{name}-{tone}"), color.clone()));
                }
            }
        }
        vars
    }
}

/// Tone that reads well on top of `tone`: dark tones pair with near-white,
/// light tones with near-black.
pub fn complementary_tone(tone: f32) -> f32 {
    if tone <= 50.0 {
        90.0 + (50.0 - tone) / 5.0
    } else {
        10.0 + (100.0 - tone) / 5.0
    }
}

/// CSS gradient between two tones of a ramp, `transparent` if either is missing.
pub fn gradient(ramp: &ToneRamp, from: u8, to: u8) -> String {
    match (ramp.get(&from), ramp.get(&to)) {
        (Some(a), Some(b)) => format!("linear-gradient(90deg, {a}, {b})"),
        _ => "transparent".to_string(),
    }
}
