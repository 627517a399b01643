use serde::{Deserialize, Serialize};

/// The fixed set of color roles every game and the page chrome consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeRole {
    Primary,
    Accent,
    Secondary,
    Background,
    Text,
}

impl ThemeRole {
    pub const ALL: &[ThemeRole] = &[
        ThemeRole::Primary,
        ThemeRole::Accent,
        ThemeRole::Secondary,
        ThemeRole::Background,
        ThemeRole::Text,
    ];

    pub fn css_name(self) -> &'static str {
        match self {
            ThemeRole::Primary => "primary",
            ThemeRole::Accent => "accent",
            ThemeRole::Secondary => "secondary",
            ThemeRole::Background => "bg",
            ThemeRole::Text => "text",
        }
    }
}

/// Named color mapping loaded once per page life from the settings document.
/// Read-only in the core: games receive it by value and never mutate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeColors {
    pub primary: String,
    pub accent: String,
    pub secondary: String,
    #[serde(rename = "bg")]
    pub background: String,
    pub text: String,
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            primary: "#4d7cfe".to_string(),
            accent: "#00ffc6".to_string(),
            secondary: "#ff3366".to_string(),
            background: "#0d0d17".to_string(),
            text: "#ffffff".to_string(),
        }
    }
}

impl ThemeColors {
    pub fn value(&self, role: ThemeRole) -> &str {
        match role {
            ThemeRole::Primary => &self.primary,
            ThemeRole::Accent => &self.accent,
            ThemeRole::Secondary => &self.secondary,
            ThemeRole::Background => &self.background,
            ThemeRole::Text => &self.text,
        }
    }

    /// Parse a role's color into linear RGB. Malformed values fall back to
    /// the role's default so a bad admin edit never breaks a game.
    pub fn rgb(&self, role: ThemeRole) -> [f32; 3] {
        parse_hex(self.value(role))
            .unwrap_or_else(|| parse_hex(ThemeColors::default().value(role)).unwrap_or([1.0; 3]))
    }

    pub fn rgba(&self, role: ThemeRole, alpha: f32) -> [f32; 4] {
        let [r, g, b] = self.rgb(role);
        [r, g, b, alpha]
    }

    /// Export the mapping as `--color-<role>` custom properties for the
    /// page chrome.
    pub fn css_custom_properties(&self) -> Vec<(String, String)> {
        ThemeRole::ALL
            .iter()
            .map(|&role| {
                (
                    format!("--color-{}", role.css_name()),
                    self.value(role).to_string(),
                )
            })
            .collect()
    }
}

/// Parse `#rgb` or `#rrggbb` into normalized components.
fn parse_hex(value: &str) -> Option<[f32; 3]> {
    let hex = value.trim().strip_prefix('#')?;
    let (r, g, b) = match hex.len() {
        3 => {
            let mut it = hex.chars();
            let r = it.next()?.to_digit(16)? as f32;
            let g = it.next()?.to_digit(16)? as f32;
            let b = it.next()?.to_digit(16)? as f32;
            (r * 17.0, g * 17.0, b * 17.0)
        },
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()? as f32;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()? as f32;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()? as f32;
            (r, g, b)
        },
        _ => return None,
    };
    Some([r / 255.0, g / 255.0, b / 255.0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_theme_matches_palette() {
        let theme = ThemeColors::default();
        assert_eq!(theme.accent, "#00ffc6");
        assert_eq!(theme.value(ThemeRole::Background), "#0d0d17");
    }

    #[test]
    fn partial_json_fills_defaults() {
        let theme: ThemeColors = serde_json::from_str(r##"{"accent": "#123456"}"##).unwrap();
        assert_eq!(theme.accent, "#123456");
        assert_eq!(theme.secondary, "#ff3366");
    }

    #[test]
    fn hex_parsing_full_and_short() {
        assert_eq!(parse_hex("#ffffff"), Some([1.0, 1.0, 1.0]));
        assert_eq!(parse_hex("#fff"), Some([1.0, 1.0, 1.0]));
        let [r, g, b] = parse_hex("#ff3366").unwrap();
        assert!((r - 1.0).abs() < 1e-6);
        assert!((g - 0x33 as f32 / 255.0).abs() < 1e-6);
        assert!((b - 0x66 as f32 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn malformed_color_falls_back_to_default() {
        let theme = ThemeColors {
            accent: "teal-ish".to_string(),
            ..ThemeColors::default()
        };
        let fallback = ThemeColors::default().rgb(ThemeRole::Accent);
        assert_eq!(theme.rgb(ThemeRole::Accent), fallback);
    }

    #[test]
    fn css_export_covers_all_roles() {
        let props = ThemeColors::default().css_custom_properties();
        assert_eq!(props.len(), ThemeRole::ALL.len());
        assert!(props.iter().any(|(k, _)| k == "--color-bg"));
        assert!(props.iter().any(|(k, v)| k == "--color-accent" && v == "#00ffc6"));
    }
}
