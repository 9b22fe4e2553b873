//! Theme color tokens and color derivation for chart datasets.
//!
//! A series or threshold names its color with a *token*. Tokens resolve in order:
//! 1. a named theme color (`primary`, `error`, …) from [`StyleTokens`]
//! 2. hex notation: `#RGB`, `#RRGGBB`, `#RRGGBBAA`
//! 3. functional notation: `rgb(r, g, b)` / `rgba(r, g, b, a)`

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Color with 8-bit channels and a 0..1 alpha.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn with_alpha(self, a: f64) -> Self {
        Self {
            a: clamp01(a),
            ..self
        }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Microsoft Office (2013+) chart series palette.
/// Order: Blue, Orange, Gray, Gold, Light Blue, Green, Dark Blue, Dark Orange,
/// Dark Gray, Brownish Gold.
pub const OFFICE10: [Rgba; 10] = [
    Rgba::rgb(68, 114, 196),  // blue      (#4472C4)
    Rgba::rgb(237, 125, 49),  // orange    (#ED7D31)
    Rgba::rgb(165, 165, 165), // gray      (#A5A5A5)
    Rgba::rgb(255, 192, 0),   // gold      (#FFC000)
    Rgba::rgb(91, 155, 213),  // light blue(#5B9BD5)
    Rgba::rgb(112, 173, 71),  // green     (#70AD47)
    Rgba::rgb(38, 68, 120),   // dark blue (#264478)
    Rgba::rgb(158, 72, 14),   // dark org. (#9E480E)
    Rgba::rgb(99, 99, 99),    // dark gray (#636363)
    Rgba::rgb(153, 115, 0),   // brownish  (#997300)
];

/// Theme colors supplied by the host page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleTokens {
    pub primary: Rgba,
    pub secondary: Rgba,
    pub error: Rgba,
    pub warning: Rgba,
    pub success: Rgba,
    pub info: Rgba,
    pub grid: Rgba,
    pub text: Rgba,
    pub background: Rgba,
    pub palette: Vec<Rgba>,
}

impl Default for StyleTokens {
    fn default() -> Self {
        Self {
            primary: Rgba::rgb(25, 118, 210),
            secondary: Rgba::rgb(156, 39, 176),
            error: Rgba::rgb(211, 47, 47),
            warning: Rgba::rgb(237, 108, 2),
            success: Rgba::rgb(46, 125, 50),
            info: Rgba::rgb(2, 136, 209),
            grid: Rgba::rgb(224, 224, 224),
            text: Rgba::rgb(33, 33, 33),
            background: Rgba::rgb(255, 255, 255),
            palette: OFFICE10.to_vec(),
        }
    }
}

impl StyleTokens {
    /// Resolve a color token; `None` when it is neither a theme name nor a parsable color.
    pub fn resolve(&self, token: &str) -> Option<Rgba> {
        let t = token.trim();
        let named = match t.to_ascii_lowercase().as_str() {
            "primary" => Some(self.primary),
            "secondary" => Some(self.secondary),
            "error" | "critical" => Some(self.error),
            "warning" | "moderate" => Some(self.warning),
            "success" | "safe" => Some(self.success),
            "info" => Some(self.info),
            "grid" => Some(self.grid),
            "text" => Some(self.text),
            "background" => Some(self.background),
            _ => None,
        };
        named.or_else(|| parse_color(t))
    }

    /// Resolve a token, falling back to the primary color.
    pub fn resolve_or_primary(&self, token: Option<&str>) -> Rgba {
        match token {
            None => self.primary,
            Some(t) => self.resolve(t).unwrap_or_else(|| {
                log::warn!("unknown color token {t:?}, using primary");
                self.primary
            }),
        }
    }

    /// Palette color for position `idx` (wraps around).
    pub fn palette_color(&self, idx: usize) -> Rgba {
        if self.palette.is_empty() {
            return self.primary;
        }
        self.palette[idx % self.palette.len()]
    }
}

/// Parse hex (`#RGB`, `#RRGGBB`, `#RRGGBBAA`) or `rgb()/rgba()` notation.
pub fn parse_color(s: &str) -> Option<Rgba> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }
    parse_functional(s)
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => {
            let nib = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
            Some(Rgba::rgb(nib(0)?, nib(1)?, nib(2)?))
        }
        6 => Some(Rgba::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Rgba::rgb(byte(0)?, byte(2)?, byte(4)?).with_alpha(byte(6)? as f64 / 255.0)),
        _ => None,
    }
}

fn functional_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"^(?i)rgba?\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*",
            r"(?:,\s*([0-9]*\.?[0-9]+)\s*)?\)$",
        ))
        .expect("static color regex")
    })
}

fn parse_functional(s: &str) -> Option<Rgba> {
    let caps = functional_re().captures(s)?;
    let chan = |i: usize| caps.get(i)?.as_str().parse::<u16>().ok().filter(|v| *v <= 255);
    let r = chan(1)? as u8;
    let g = chan(2)? as u8;
    let b = chan(3)? as u8;
    let a = match caps.get(4) {
        Some(m) => m.as_str().parse::<f64>().ok()?,
        None => 1.0,
    };
    Some(Rgba::rgb(r, g, b).with_alpha(a))
}

fn clamp01(x: f64) -> f64 {
    if x.is_nan() { 1.0 } else { x.clamp(0.0, 1.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_forms() {
        assert_eq!(parse_color("#fff"), Some(Rgba::rgb(255, 255, 255)));
        assert_eq!(parse_color("#1976D2"), Some(Rgba::rgb(25, 118, 210)));
        let c = parse_color("#1976d280").unwrap();
        assert_eq!((c.r, c.g, c.b), (25, 118, 210));
        assert!((c.a - 128.0 / 255.0).abs() < 1e-9);
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("#zzzzzz"), None);
    }

    #[test]
    fn parses_functional_forms() {
        assert_eq!(parse_color("rgb(1, 2, 3)"), Some(Rgba::rgb(1, 2, 3)));
        assert_eq!(
            parse_color("rgba(10,20,30,0.5)"),
            Some(Rgba::rgb(10, 20, 30).with_alpha(0.5))
        );
        assert_eq!(parse_color("rgb(300, 2, 3)"), None);
        assert_eq!(parse_color("blue-ish"), None);
    }

    #[test]
    fn named_tokens_win_and_unknown_falls_back() {
        let tokens = StyleTokens::default();
        assert_eq!(tokens.resolve("error"), Some(tokens.error));
        assert_eq!(tokens.resolve("Critical"), Some(tokens.error));
        assert_eq!(tokens.resolve_or_primary(Some("nope")), tokens.primary);
        assert_eq!(tokens.resolve_or_primary(None), tokens.primary);
    }

    #[test]
    fn palette_wraps() {
        let tokens = StyleTokens::default();
        assert_eq!(tokens.palette_color(0), tokens.palette_color(10));
    }
}
