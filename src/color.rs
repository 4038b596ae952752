//! sRGB colors for template fills and strokes.
//!
//! Parsing accepts hex (`#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`, leading `#`
//! optional) and the names `black`, `white` and `transparent`.

/// 8-bit sRGB color with straight (non-premultiplied) alpha.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color with explicit alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from `0xRRGGBB`.
    pub const fn hex(rgb: u32) -> Self {
        Self::rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    /// Same color with alpha given as a fraction in `0.0..=1.0`.
    pub fn with_opacity(self, opacity: f32) -> Self {
        let a = if opacity.is_finite() {
            (opacity.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
        } else {
            255
        };
        Self { a, ..self }
    }

    /// Alpha as a fraction in `0.0..=1.0`.
    pub fn opacity(&self) -> f32 {
        f32::from(self.a) / 255.0
    }

    /// Fully transparent.
    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Parse a hex or named color. Returns `None` for anything else.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        let hex = s.strip_prefix('#').unwrap_or(s);
        parse_hex(hex).or_else(|| lookup_named(s))
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let b = hex.as_bytes();
    match b.len() {
        3 => Some(Color::rgb(
            expand_nibble(b[0])?,
            expand_nibble(b[1])?,
            expand_nibble(b[2])?,
        )),
        4 => Some(Color::rgba(
            expand_nibble(b[0])?,
            expand_nibble(b[1])?,
            expand_nibble(b[2])?,
            expand_nibble(b[3])?,
        )),
        6 => Some(Color::rgb(
            parse_byte(&b[0..2])?,
            parse_byte(&b[2..4])?,
            parse_byte(&b[4..6])?,
        )),
        8 => Some(Color::rgba(
            parse_byte(&b[0..2])?,
            parse_byte(&b[2..4])?,
            parse_byte(&b[4..6])?,
            parse_byte(&b[6..8])?,
        )),
        _ => None,
    }
}

/// `'f'` → `0xFF`, `'a'` → `0xAA`.
fn expand_nibble(ch: u8) -> Option<u8> {
    let n = hex_val(ch)?;
    Some(n << 4 | n)
}

fn hex_val(ch: u8) -> Option<u8> {
    match ch {
        b'0'..=b'9' => Some(ch - b'0'),
        b'a'..=b'f' => Some(ch - b'a' + 10),
        b'A'..=b'F' => Some(ch - b'A' + 10),
        _ => None,
    }
}

fn parse_byte(pair: &[u8]) -> Option<u8> {
    Some(hex_val(pair[0])? << 4 | hex_val(pair[1])?)
}

fn lookup_named(name: &str) -> Option<Color> {
    [
        ("black", Color::BLACK),
        ("transparent", Color::TRANSPARENT),
        ("white", Color::WHITE),
    ]
    .into_iter()
    .find(|(n, _)| name.eq_ignore_ascii_case(n))
    .map(|(_, c)| c)
}
