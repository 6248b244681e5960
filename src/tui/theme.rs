//! Colour themes
//!
//! A small semantic palette plus the colour blending used to render dialog
//! opacity: a colour at opacity `o` is mixed toward the theme background by
//! `1 - o`.

use ratatui::style::{Color, Modifier, Style};

/// Complete visual style configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: String,
    pub is_dark: bool,

    // Brand colours
    pub primary: Color,
    pub secondary: Color,
    pub accent: Color,

    // Backgrounds
    pub bg_base: Color,
    pub bg_overlay: Color,
    pub bg_subtle: Color,

    // Foregrounds
    pub fg_base: Color,
    pub fg_muted: Color,
    pub fg_subtle: Color,

    // Borders
    pub border: Color,
    pub border_focus: Color,

    // Status
    pub success: Color,
    pub error: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),
            is_dark: true,
            primary: Color::Rgb(130, 130, 255),
            secondary: Color::Rgb(255, 130, 200),
            accent: Color::Rgb(130, 220, 255),
            bg_base: Color::Rgb(23, 23, 23),
            bg_overlay: Color::Rgb(38, 38, 38),
            bg_subtle: Color::Rgb(52, 52, 52),
            fg_base: Color::Rgb(229, 229, 229),
            fg_muted: Color::Rgb(156, 156, 156),
            fg_subtle: Color::Rgb(115, 115, 115),
            border: Color::Rgb(82, 82, 82),
            border_focus: Color::Rgb(130, 130, 255),
            success: Color::Rgb(34, 197, 94),
            error: Color::Rgb(239, 68, 68),
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light".to_string(),
            is_dark: false,
            primary: Color::Rgb(79, 70, 229),
            secondary: Color::Rgb(219, 39, 119),
            accent: Color::Rgb(8, 145, 178),
            bg_base: Color::Rgb(250, 250, 250),
            bg_overlay: Color::Rgb(255, 255, 255),
            bg_subtle: Color::Rgb(229, 229, 229),
            fg_base: Color::Rgb(23, 23, 23),
            fg_muted: Color::Rgb(82, 82, 82),
            fg_subtle: Color::Rgb(115, 115, 115),
            border: Color::Rgb(209, 209, 209),
            border_focus: Color::Rgb(79, 70, 229),
            success: Color::Rgb(22, 163, 74),
            error: Color::Rgb(220, 38, 38),
        }
    }

    /// Look up a built-in theme by name
    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "dark" => Some(Self::dark()),
            "light" => Some(Self::light()),
            _ => None,
        }
    }

    pub fn names() -> &'static [&'static str] {
        &["dark", "light"]
    }

    /// `color` rendered at `opacity` over the base background
    pub fn fade(&self, color: Color, opacity: f32) -> Color {
        let opacity = opacity.clamp(0.0, 1.0);
        if opacity >= 1.0 {
            return color;
        }
        let background = RgbColor::from_color(self.bg_base);
        RgbColor::from_color(color)
            .lerp(&background, 1.0 - opacity)
            .to_color()
    }

    pub fn base(&self) -> Style {
        Style::default().fg(self.fg_base).bg(self.bg_base)
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(self.fg_muted)
    }

    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.primary)
            .add_modifier(Modifier::BOLD)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

/// Colour in RGB space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn from_color(color: Color) -> Self {
        match color {
            Color::Rgb(r, g, b) => Self::new(r, g, b),
            Color::Black => Self::new(0, 0, 0),
            Color::Red => Self::new(205, 0, 0),
            Color::Green => Self::new(0, 205, 0),
            Color::Yellow => Self::new(205, 205, 0),
            Color::Blue => Self::new(0, 0, 238),
            Color::Magenta => Self::new(205, 0, 205),
            Color::Cyan => Self::new(0, 205, 205),
            Color::Gray => Self::new(229, 229, 229),
            Color::DarkGray => Self::new(127, 127, 127),
            Color::LightRed => Self::new(255, 0, 0),
            Color::LightGreen => Self::new(0, 255, 0),
            Color::LightYellow => Self::new(255, 255, 0),
            Color::LightBlue => Self::new(92, 92, 255),
            Color::LightMagenta => Self::new(255, 0, 255),
            Color::LightCyan => Self::new(0, 255, 255),
            Color::White => Self::new(255, 255, 255),
            // indexed and reset colours have no fixed value
            _ => Self::new(255, 255, 255),
        }
    }

    pub fn to_color(self) -> Color {
        Color::Rgb(self.r, self.g, self.b)
    }

    /// Linear interpolation in RGB space
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fade_endpoints() {
        let theme = Theme::dark();
        assert_eq!(theme.fade(theme.primary, 1.0), theme.primary);
        assert_eq!(theme.fade(theme.primary, 0.0), theme.bg_base);
        assert_eq!(theme.fade(theme.primary, 3.0), theme.primary);
    }

    #[test]
    fn test_fade_blends_toward_background() {
        let theme = Theme::dark();
        let faded = theme.fade(Color::Rgb(223, 223, 223), 0.5);
        assert_eq!(faded, Color::Rgb(123, 123, 123));
    }

    #[test]
    fn test_rgb_lerp() {
        let red = RgbColor::new(255, 0, 0);
        let blue = RgbColor::new(0, 0, 255);
        assert_eq!(red.lerp(&blue, 0.5), RgbColor::new(128, 0, 128));
        assert_eq!(red.lerp(&blue, 0.0), red);
    }

    #[test]
    fn test_theme_lookup() {
        assert_eq!(Theme::by_name("Light").map(|t| t.is_dark), Some(false));
        assert!(Theme::by_name("neon").is_none());
    }
}
