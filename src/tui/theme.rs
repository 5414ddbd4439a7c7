/*
Catppuccin Color Palette

Mocha (dark, default) and Latte (light). Screens use the named colors
directly; `brand` comes from the manifest's primary color when it parses.
*/

use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeVariant {
    #[default]
    Mocha, // Dark theme (default)
    Latte, // Light theme
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub brand: Color,
    pub red: Color,
    pub peach: Color,
    pub yellow: Color,
    pub green: Color,
    pub teal: Color,
    pub blue: Color,
    pub mauve: Color,
    pub lavender: Color,
    pub text: Color,
    pub subtext0: Color,
    pub overlay1: Color,
    pub overlay0: Color,
    pub surface1: Color,
    pub surface0: Color,
    pub base: Color,
}

impl Theme {
    pub fn new(variant: ThemeVariant) -> Self {
        match variant {
            ThemeVariant::Mocha => Self::mocha(),
            ThemeVariant::Latte => Self::latte(),
        }
    }

    fn mocha() -> Self {
        Self {
            brand: Color::Rgb(0x89, 0xb4, 0xfa),
            red: Color::Rgb(0xf3, 0x8b, 0xa8),
            peach: Color::Rgb(0xfa, 0xb3, 0x87),
            yellow: Color::Rgb(0xf9, 0xe2, 0xaf),
            green: Color::Rgb(0xa6, 0xe3, 0xa1),
            teal: Color::Rgb(0x94, 0xe2, 0xd5),
            blue: Color::Rgb(0x89, 0xb4, 0xfa),
            mauve: Color::Rgb(0xcb, 0xa6, 0xf7),
            lavender: Color::Rgb(0xb4, 0xbe, 0xfe),
            text: Color::Rgb(0xcd, 0xd6, 0xf4),
            subtext0: Color::Rgb(0xa6, 0xad, 0xc8),
            overlay1: Color::Rgb(0x7f, 0x84, 0x9c),
            overlay0: Color::Rgb(0x6c, 0x70, 0x86),
            surface1: Color::Rgb(0x45, 0x47, 0x5a),
            surface0: Color::Rgb(0x31, 0x32, 0x44),
            base: Color::Rgb(0x1e, 0x1e, 0x2e),
        }
    }

    fn latte() -> Self {
        Self {
            brand: Color::Rgb(0x1e, 0x66, 0xf5),
            red: Color::Rgb(0xd2, 0x0f, 0x39),
            peach: Color::Rgb(0xfe, 0x64, 0x0b),
            yellow: Color::Rgb(0xdf, 0x8e, 0x1d),
            green: Color::Rgb(0x40, 0xa0, 0x2b),
            teal: Color::Rgb(0x17, 0x92, 0x99),
            blue: Color::Rgb(0x1e, 0x66, 0xf5),
            mauve: Color::Rgb(0x88, 0x39, 0xef),
            lavender: Color::Rgb(0x72, 0x87, 0xfd),
            text: Color::Rgb(0x4c, 0x4f, 0x69),
            subtext0: Color::Rgb(0x6c, 0x6f, 0x85),
            overlay1: Color::Rgb(0x8c, 0x8f, 0xa1),
            overlay0: Color::Rgb(0x9c, 0xa0, 0xb0),
            surface1: Color::Rgb(0xbc, 0xc0, 0xcc),
            surface0: Color::Rgb(0xcc, 0xd0, 0xda),
            base: Color::Rgb(0xef, 0xf1, 0xf5),
        }
    }

    /// Override the brand color with a `#rrggbb` string; anything else keeps the palette default
    pub fn with_brand(mut self, hex: Option<&str>) -> Self {
        if let Some(color) = hex.and_then(parse_hex_color) {
            self.brand = color;
        }
        self
    }

    // Status indicators (errors, warnings, success)
    pub fn error_style(&self) -> Style {
        Style::default().fg(self.red)
    }

    pub fn warning_style(&self) -> Style {
        Style::default().fg(self.yellow)
    }

    pub fn success_style(&self) -> Style {
        Style::default().fg(self.green)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.overlay1)
    }

    pub fn title_style(&self) -> Style {
        Style::default().fg(self.brand).add_modifier(Modifier::BOLD)
    }

    /// Style for the focused control in a form
    pub fn focus_style(&self) -> Style {
        Style::default().fg(self.lavender).bg(self.surface0).add_modifier(Modifier::BOLD)
    }

    pub fn disabled_style(&self) -> Style {
        Style::default().fg(self.overlay0)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::new(ThemeVariant::default())
    }
}

fn parse_hex_color(hex: &str) -> Option<Color> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brand_override() {
        let theme = Theme::default().with_brand(Some("#2F80ED"));
        assert_eq!(theme.brand, Color::Rgb(0x2f, 0x80, 0xed));
    }

    #[test]
    fn test_invalid_brand_keeps_default() {
        let default = Theme::default().brand;
        for bad in ["2F80ED", "#2F80", "#GGGGGG", "#2F80EDFF"] {
            assert_eq!(Theme::default().with_brand(Some(bad)).brand, default, "{bad}");
        }
        assert_eq!(Theme::default().with_brand(None).brand, default);
    }
}
