use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    pub const BLACK: Self = Self::rgba(0, 0, 0, 255);
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);
    pub const RED: Self = Self::rgba(255, 0, 0, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_rgba_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn from_rgba_array(color: [u8; 4]) -> Self {
        Self::rgba(color[0], color[1], color[2], color[3])
    }

    pub fn is_transparent(self) -> bool {
        self.a == 0
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorParseErrorKind {
    InvalidLength { len: usize },
    InvalidHex,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorParseError {
    pub input: String,
    pub kind: ColorParseErrorKind,
}

impl std::fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            ColorParseErrorKind::InvalidLength { len } => write!(
                f,
                "invalid color string: {} (expected RRGGBB or RRGGBBAA, got {len} characters)",
                self.input
            ),
            ColorParseErrorKind::InvalidHex => {
                write!(f, "invalid color string: {} (not hexadecimal)", self.input)
            }
        }
    }
}

impl std::error::Error for ColorParseError {}

/// Parse `RRGGBB` or `RRGGBBAA`. The six digit form is fully opaque.
pub fn parse_color(input: &str) -> Result<Color, ColorParseError> {
    let fail = |kind| ColorParseError {
        input: input.to_string(),
        kind,
    };

    let len = input.len();
    if len != 6 && len != 8 {
        return Err(fail(ColorParseErrorKind::InvalidLength { len }));
    }
    // also rules out multi-byte chars, so the pair slicing below is safe
    if !input.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(fail(ColorParseErrorKind::InvalidHex));
    }

    let channel = |start: usize| {
        u8::from_str_radix(&input[start..start + 2], 16)
            .map_err(|_| fail(ColorParseErrorKind::InvalidHex))
    };

    let r = channel(0)?;
    let g = channel(2)?;
    let b = channel(4)?;
    let a = if len == 8 { channel(6)? } else { 0xFF };

    Ok(Color::rgba(r, g, b, a))
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_color(s)
    }
}
