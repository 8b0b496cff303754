use serde::{Deserialize, Serialize};

/// Flat material colour packed as `0xRRGGBB`.
///
/// Serializes as an integer; deserializes from an integer or from a
/// `"#rrggbb"` / `"0xrrggbb"` string.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RgbRepr", into = "u32")]
pub struct Rgb(u32);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0x000000);
    pub const WHITE: Rgb = Rgb(0xffffff);

    pub const fn from_hex(hex: u32) -> Self {
        Rgb(hex & 0x00ff_ffff)
    }

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Rgb(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    pub const fn hex(self) -> u32 {
        self.0
    }

    pub const fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn b(self) -> u8 {
        self.0 as u8
    }

    /// Normalized `[r, g, b]` in `0.0..=1.0` for shader uniforms.
    pub fn to_f32(self) -> [f32; 3] {
        [
            self.r() as f32 / 255.0,
            self.g() as f32 / 255.0,
            self.b() as f32 / 255.0,
        ]
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

impl From<Rgb> for u32 {
    fn from(c: Rgb) -> u32 {
        c.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RgbRepr {
    Int(u32),
    Str(String),
}

impl TryFrom<RgbRepr> for Rgb {
    type Error = String;

    fn try_from(repr: RgbRepr) -> Result<Self, Self::Error> {
        let hex = match repr {
            RgbRepr::Int(v) => v,
            RgbRepr::Str(s) => {
                let digits = s
                    .strip_prefix('#')
                    .or_else(|| s.strip_prefix("0x"))
                    .unwrap_or(s.as_str());
                u32::from_str_radix(digits, 16).map_err(|e| format!("invalid colour {s:?}: {e}"))?
            }
        };
        if hex > 0x00ff_ffff {
            return Err(format!("colour out of range: {hex:#x}"));
        }
        Ok(Rgb(hex))
    }
}
