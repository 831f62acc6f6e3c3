//! Static theme catalog. Names match the theme cards on the selection page.

use crate::pptx::RgbColor;

pub const DEFAULT_THEME: &str = "modern_blue";

/// Colors and font for one visual style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,
    pub label: &'static str,
    pub background: RgbColor,
    pub accent_bar: RgbColor,
    pub title_color: RgbColor,
    pub bullet_color: RgbColor,
    pub font: &'static str,
}

pub static THEMES: [Theme; 4] = [
    Theme {
        name: "modern_blue",
        label: "Modern Blue",
        background: RgbColor(245, 247, 250),
        accent_bar: RgbColor(11, 102, 182),
        title_color: RgbColor(4, 58, 107),
        bullet_color: RgbColor(33, 37, 41),
        font: "Calibri",
    },
    Theme {
        name: "warm_retro",
        label: "Warm Retro",
        background: RgbColor(255, 250, 245),
        accent_bar: RgbColor(232, 106, 42),
        title_color: RgbColor(102, 51, 0),
        bullet_color: RgbColor(64, 32, 0),
        font: "Georgia",
    },
    Theme {
        name: "aqua_minimal",
        label: "Aqua Minimal",
        background: RgbColor(245, 255, 255),
        accent_bar: RgbColor(30, 166, 168),
        title_color: RgbColor(0, 77, 77),
        bullet_color: RgbColor(0, 51, 51),
        font: "Arial",
    },
    Theme {
        name: "dark_elegant",
        label: "Dark Elegant",
        background: RgbColor(20, 22, 25),
        accent_bar: RgbColor(68, 75, 255),
        title_color: RgbColor(255, 255, 255),
        bullet_color: RgbColor(220, 220, 220),
        font: "Calibri",
    },
];

/// Looks a theme up by exact name, falling back to `modern_blue`.
pub fn theme_by_name(name: &str) -> &'static Theme {
    THEMES
        .iter()
        .find(|t| t.name == name)
        .unwrap_or(&THEMES[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_four_unique_names() {
        let mut names: Vec<&str> = THEMES.iter().map(|t| t.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 4);
        assert_eq!(THEMES[0].name, DEFAULT_THEME);
    }

    #[test]
    fn test_lookup_is_exact() {
        assert_eq!(theme_by_name("warm_retro").font, "Georgia");
        assert_eq!(theme_by_name("dark_elegant").title_color, RgbColor(255, 255, 255));
        assert_eq!(theme_by_name("Warm_Retro").name, "modern_blue");
    }

    #[test]
    fn test_unknown_name_falls_back_to_default() {
        let theme = theme_by_name("neon_dreams");
        assert_eq!(theme.name, DEFAULT_THEME);
        assert_eq!(theme.accent_bar, RgbColor(11, 102, 182));
    }
}
