use std::fmt;

/// RGB colour used to style the hits of a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Colours offered by name in the pattern editor.
const NAMED: [(&str, Color); 16] = [
    ("black", Color::rgb(0x00, 0x00, 0x00)),
    ("white", Color::rgb(0xff, 0xff, 0xff)),
    ("red", Color::rgb(0xff, 0x00, 0x00)),
    ("green", Color::rgb(0x00, 0x80, 0x00)),
    ("blue", Color::rgb(0x00, 0x00, 0xff)),
    ("yellow", Color::rgb(0xff, 0xff, 0x00)),
    ("cyan", Color::rgb(0x00, 0xff, 0xff)),
    ("magenta", Color::rgb(0xff, 0x00, 0xff)),
    ("grey", Color::rgb(0x80, 0x80, 0x80)),
    ("silver", Color::rgb(0xc0, 0xc0, 0xc0)),
    ("maroon", Color::rgb(0x80, 0x00, 0x00)),
    ("olive", Color::rgb(0x80, 0x80, 0x00)),
    ("navy", Color::rgb(0x00, 0x00, 0x80)),
    ("purple", Color::rgb(0x80, 0x00, 0x80)),
    ("teal", Color::rgb(0x00, 0x80, 0x80)),
    ("orange", Color::rgb(0xff, 0xa5, 0x00)),
];

impl Color {
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses a colour name, `#rrggbb`, `rrggbb` or a decimal host colour number
    /// (`0x00BBGGRR` layout). Bare `rrggbb` needs at least one hex letter;
    /// all-digit input is a host number. Anything else yields `fallback`.
    pub fn parse_lenient(input: &str, fallback: Color) -> Color {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return fallback;
        }
        if let Some(color) = Self::named(trimmed) {
            return color;
        }
        if let Some(hex) = trimmed.strip_prefix('#') {
            return parse_hex(hex).unwrap_or(fallback);
        }
        if trimmed.len() == 6 && trimmed.bytes().any(|b| b.is_ascii_alphabetic()) {
            if let Some(color) = parse_hex(trimmed) {
                return color;
            }
        }
        match trimmed.parse::<u32>() {
            Ok(value) if value <= 0x00ff_ffff => Self::from_host(value),
            _ => fallback,
        }
    }

    pub fn named(name: &str) -> Option<Color> {
        NAMED
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
            .map(|(_, color)| *color)
    }

    pub fn name(&self) -> Option<&'static str> {
        NAMED
            .iter()
            .find(|(_, color)| color == self)
            .map(|(name, _)| *name)
    }

    /// Host editors store colours as `0x00BBGGRR`.
    pub fn from_host(value: u32) -> Self {
        Self {
            r: (value & 0xff) as u8,
            g: ((value >> 8) & 0xff) as u8,
            b: ((value >> 16) & 0xff) as u8,
        }
    }

    pub fn to_host(self) -> u32 {
        u32::from(self.r) | (u32::from(self.g) << 8) | (u32::from(self.b) << 16)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b),
        }
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some(Color {
        r: channel(0..2)?,
        g: channel(2..4)?,
        b: channel(4..6)?,
    })
}
