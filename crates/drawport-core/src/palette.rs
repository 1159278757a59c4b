//! Color naming for annotation text.
//!
//! Maps hex color strings to a human-readable family name ("Red", "Blue",
//! "Black") by nearest match against the Tailwind CSS palette.

use peniko::Color;

/// Text used when a color cannot be named.
pub const UNKNOWN_COLOR: &str = "Unknown Color";

/// Color assumed when an annotation carries no color at all.
pub const FALLBACK_COLOR: &str = "#ffffff";

/// Resolves a color string to a human-readable name.
pub trait ColorNamer {
    /// Name for `color`, or `None` when it cannot be resolved.
    fn name_of(&self, color: &str) -> Option<String>;
}

/// A named color family with its shades.
#[derive(Clone, Copy)]
pub struct ColorFamily {
    /// Family name (e.g., "Red", "Blue")
    pub name: &'static str,
    /// RGB shades belonging to the family
    pub shades: &'static [(u8, u8, u8)],
}

impl ColorFamily {
    pub const fn new(name: &'static str, shades: &'static [(u8, u8, u8)]) -> Self {
        Self { name, shades }
    }

    /// Smallest squared RGB distance from `rgb` to any shade of this family.
    fn distance(&self, rgb: (u8, u8, u8)) -> u32 {
        self.shades
            .iter()
            .map(|&(r, g, b)| {
                let dr = r as i32 - rgb.0 as i32;
                let dg = g as i32 - rgb.1 as i32;
                let db = b as i32 - rgb.2 as i32;
                (dr * dr + dg * dg + db * db) as u32
            })
            .min()
            .unwrap_or(u32::MAX)
    }
}

/// Nearest-family namer over [`NAMED_COLORS`].
#[derive(Debug, Default, Clone, Copy)]
pub struct PaletteNamer;

impl PaletteNamer {
    pub fn new() -> Self {
        Self
    }
}

impl ColorNamer for PaletteNamer {
    fn name_of(&self, color: &str) -> Option<String> {
        let rgba = parse_hex_color(color)?.to_rgba8();
        let rgb = (rgba.r, rgba.g, rgba.b);
        NAMED_COLORS
            .iter()
            .min_by_key(|family| family.distance(rgb))
            .map(|family| family.name.to_string())
    }
}

/// Resolve an annotation color to a display name.
///
/// Absent colors are looked up as white; colors the namer cannot resolve
/// become [`UNKNOWN_COLOR`].
pub fn describe_color(namer: &dyn ColorNamer, color: Option<&str>) -> String {
    namer
        .name_of(color.unwrap_or(FALLBACK_COLOR))
        .unwrap_or_else(|| UNKNOWN_COLOR.to_string())
}

/// Parse a CSS hex color (`#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa`).
pub fn parse_hex_color(color: &str) -> Option<Color> {
    let hex = color.trim().strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    let short = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);

    let (r, g, b, a) = match hex.len() {
        3 => (short(0)?, short(1)?, short(2)?, 255),
        4 => (short(0)?, short(1)?, short(2)?, short(3)?),
        6 => (channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?, 255),
        8 => (
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
            channel(&hex[6..8])?,
        ),
        _ => return None,
    };
    Some(Color::from_rgba8(r, g, b, a))
}

// Black and White come first so exact matches win ties against the grays.
// Tailwind CSS colors - https://tailwindcss.com/docs/colors
pub const NAMED_COLORS: &[ColorFamily] = &[
    ColorFamily::new("Black", &[(0, 0, 0), (30, 30, 30)]),
    ColorFamily::new("White", &[(255, 255, 255)]),
    ColorFamily::new("Red", &[
        (254, 242, 242), (254, 226, 226), (254, 202, 202), (252, 165, 165),
        (248, 113, 113), (239, 68, 68), (220, 38, 38), (185, 28, 28),
        (153, 27, 27), (127, 29, 29), (69, 10, 10),
    ]),
    ColorFamily::new("Orange", &[
        (255, 247, 237), (255, 237, 213), (254, 215, 170), (253, 186, 116),
        (251, 146, 60), (249, 115, 22), (234, 88, 12), (194, 65, 12),
        (154, 52, 18), (124, 45, 18), (67, 20, 7),
    ]),
    ColorFamily::new("Amber", &[
        (255, 251, 235), (254, 243, 199), (253, 230, 138), (252, 211, 77),
        (251, 191, 36), (245, 158, 11), (217, 119, 6), (180, 83, 9),
        (146, 64, 14), (120, 53, 15), (69, 26, 3),
    ]),
    ColorFamily::new("Yellow", &[
        (254, 252, 232), (254, 249, 195), (254, 240, 138), (253, 224, 71),
        (250, 204, 21), (234, 179, 8), (202, 138, 4), (161, 98, 7),
        (133, 77, 14), (113, 63, 18), (66, 32, 6),
    ]),
    ColorFamily::new("Lime", &[
        (247, 254, 231), (236, 252, 203), (217, 249, 157), (190, 242, 100),
        (163, 230, 53), (132, 204, 22), (101, 163, 13), (77, 124, 15),
        (63, 98, 18), (54, 83, 20), (26, 46, 5),
    ]),
    ColorFamily::new("Green", &[
        (240, 253, 244), (220, 252, 231), (187, 247, 208), (134, 239, 172),
        (74, 222, 128), (34, 197, 94), (22, 163, 74), (21, 128, 61),
        (22, 101, 52), (20, 83, 45), (5, 46, 22),
    ]),
    ColorFamily::new("Emerald", &[
        (236, 253, 245), (209, 250, 229), (167, 243, 208), (110, 231, 183),
        (52, 211, 153), (16, 185, 129), (5, 150, 105), (4, 120, 87),
        (6, 95, 70), (6, 78, 59), (2, 44, 34),
    ]),
    ColorFamily::new("Teal", &[
        (240, 253, 250), (204, 251, 241), (153, 246, 228), (94, 234, 212),
        (45, 212, 191), (20, 184, 166), (13, 148, 136), (15, 118, 110),
        (17, 94, 89), (19, 78, 74), (4, 47, 46),
    ]),
    ColorFamily::new("Cyan", &[
        (236, 254, 255), (207, 250, 254), (165, 243, 252), (103, 232, 249),
        (34, 211, 238), (6, 182, 212), (8, 145, 178), (14, 116, 144),
        (21, 94, 117), (22, 78, 99), (8, 51, 68),
    ]),
    ColorFamily::new("Sky", &[
        (240, 249, 255), (224, 242, 254), (186, 230, 253), (125, 211, 252),
        (56, 189, 248), (14, 165, 233), (2, 132, 199), (3, 105, 161),
        (7, 89, 133), (12, 74, 110), (8, 47, 73),
    ]),
    ColorFamily::new("Blue", &[
        (239, 246, 255), (219, 234, 254), (191, 219, 254), (147, 197, 253),
        (96, 165, 250), (59, 130, 246), (37, 99, 235), (29, 78, 216),
        (30, 64, 175), (30, 58, 138), (23, 37, 84),
    ]),
    ColorFamily::new("Indigo", &[
        (238, 242, 255), (224, 231, 255), (199, 210, 254), (165, 180, 252),
        (129, 140, 248), (99, 102, 241), (79, 70, 229), (67, 56, 202),
        (55, 48, 163), (49, 46, 129), (30, 27, 75),
    ]),
    ColorFamily::new("Violet", &[
        (245, 243, 255), (237, 233, 254), (221, 214, 254), (196, 181, 253),
        (167, 139, 250), (139, 92, 246), (124, 58, 237), (109, 40, 217),
        (91, 33, 182), (76, 29, 149), (46, 16, 101),
    ]),
    ColorFamily::new("Purple", &[
        (250, 245, 255), (243, 232, 255), (233, 213, 255), (216, 180, 254),
        (192, 132, 252), (168, 85, 247), (147, 51, 234), (126, 34, 206),
        (107, 33, 168), (88, 28, 135), (59, 7, 100),
    ]),
    ColorFamily::new("Fuchsia", &[
        (253, 244, 255), (250, 232, 255), (245, 208, 254), (240, 171, 252),
        (232, 121, 249), (217, 70, 239), (192, 38, 211), (162, 28, 175),
        (134, 25, 143), (112, 26, 117), (74, 4, 78),
    ]),
    ColorFamily::new("Pink", &[
        (253, 242, 248), (252, 231, 243), (251, 207, 232), (249, 168, 212),
        (244, 114, 182), (236, 72, 153), (219, 39, 119), (190, 24, 93),
        (157, 23, 77), (131, 24, 67), (80, 7, 36),
    ]),
    ColorFamily::new("Rose", &[
        (255, 241, 242), (255, 228, 230), (254, 205, 211), (253, 164, 175),
        (251, 113, 133), (244, 63, 94), (225, 29, 72), (190, 18, 60),
        (159, 18, 57), (136, 19, 55), (76, 5, 25),
    ]),
    ColorFamily::new("Slate", &[
        (248, 250, 252), (241, 245, 249), (226, 232, 240), (203, 213, 225),
        (148, 163, 184), (100, 116, 139), (71, 85, 105), (51, 65, 85),
        (30, 41, 59), (15, 23, 42), (2, 6, 23),
    ]),
    ColorFamily::new("Gray", &[
        (249, 250, 251), (243, 244, 246), (229, 231, 235), (209, 213, 219),
        (156, 163, 175), (107, 114, 128), (75, 85, 99), (55, 65, 81),
        (31, 41, 55), (17, 24, 39), (3, 7, 18),
    ]),
    ColorFamily::new("Zinc", &[
        (250, 250, 250), (244, 244, 245), (228, 228, 231), (212, 212, 216),
        (161, 161, 170), (113, 113, 122), (82, 82, 91), (63, 63, 70),
        (39, 39, 42), (24, 24, 27), (9, 9, 11),
    ]),
    ColorFamily::new("Neutral", &[
        (250, 250, 250), (245, 245, 245), (229, 229, 229), (212, 212, 212),
        (163, 163, 163), (115, 115, 115), (82, 82, 82), (64, 64, 64),
        (38, 38, 38), (23, 23, 23), (10, 10, 10),
    ]),
    ColorFamily::new("Stone", &[
        (250, 250, 249), (245, 245, 244), (231, 229, 228), (214, 211, 209),
        (168, 162, 158), (120, 113, 108), (87, 83, 78), (68, 64, 60),
        (41, 37, 36), (28, 25, 23), (12, 10, 9),
    ]),
];
