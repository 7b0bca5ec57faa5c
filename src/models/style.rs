use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Style {
    pub name: &'static str,
    pub description: &'static str,
}

/// Fixed style catalog. The first entry is the default selection.
pub const STYLES: &[Style] = &[
    Style {
        name: "Fantasy",
        description: "Epic fantasy style, vibrant, modern, bold design",
    },
    Style {
        name: "Cyberpunk",
        description: "Cyberpunk style, neon, futuristic, high-tech, dark",
    },
    Style {
        name: "Minimalist",
        description: "Minimalist style, clean, simple, geometric shapes and solid colors",
    },
    Style {
        name: "Retro",
        description: "Retro style, pixel art, 8-bit, vibrant colors, nostalgic",
    },
    Style {
        name: "Sci-Fi",
        description: "Sci-Fi style, science fiction, spaceships, advanced technology, cosmos",
    },
    Style {
        name: "Medieval",
        description: "Fantastic medieval style, dragons, castles, swords, ancient magic",
    },
    Style {
        name: "Abstract",
        description: "Abstract style, organic shapes, vibrant colors, modern conceptual art",
    },
];

impl Style {
    pub fn default_style() -> &'static Style {
        &STYLES[0]
    }

    /// Exact, case-sensitive lookup by name.
    pub fn find(name: &str) -> Option<&'static Style> {
        STYLES.iter().find(|style| style.name == name)
    }

    pub fn all() -> &'static [Style] {
        STYLES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_first() {
        assert_eq!(Style::default_style().name, "Fantasy");
    }

    #[test]
    fn test_find() {
        let style = Style::find("Cyberpunk").unwrap();
        assert!(style.description.contains("neon"));
        assert!(Style::find("cyberpunk").is_none());
        assert!(Style::find("Vaporwave").is_none());
    }

    #[test]
    fn test_catalog_is_well_formed() {
        for style in Style::all() {
            assert!(!style.name.is_empty());
            assert!(!style.description.trim().is_empty());
        }
        let mut names: Vec<_> = STYLES.iter().map(|s| s.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), STYLES.len());
    }
}
