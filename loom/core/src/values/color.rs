//! ARGB color value

use std::fmt;
use std::str::FromStr;

use crate::error::{LoomError, LoomResult};

/// 32-bit ARGB color (`0xAARRGGBB`)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Color(pub u32);

impl Color {
    /// Fully transparent black
    pub const TRANSPARENT: Color = Color(0);
    /// Opaque black
    pub const BLACK: Color = Color(0xFF00_0000);
    /// Opaque white
    pub const WHITE: Color = Color(0xFFFF_FFFF);
    /// Opaque red
    pub const RED: Color = Color(0xFFFF_0000);
    /// Opaque blue
    pub const BLUE: Color = Color(0xFF00_00FF);

    /// Build a color from its four channels
    #[must_use]
    pub const fn argb(alpha: u8, red: u8, green: u8, blue: u8) -> Self {
        Color(((alpha as u32) << 24) | ((red as u32) << 16) | ((green as u32) << 8) | blue as u32)
    }

    /// Alpha, red, green and blue channels
    #[must_use]
    pub const fn channels(self) -> (u8, u8, u8, u8) {
        (self.alpha(), self.red(), self.green(), self.blue())
    }

    /// Alpha channel
    #[must_use]
    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Red channel
    #[must_use]
    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// Green channel
    #[must_use]
    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Blue channel
    #[must_use]
    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    /// `#RRGGBB` form, alpha dropped
    #[must_use]
    pub fn rgb_string(self) -> String {
        format!("#{:06X}", self.0 & 0x00FF_FFFF)
    }

    /// CSS form: `rgb(r,g,b)` when opaque, else `rgba(r,g,b,.aa)`
    #[must_use]
    pub fn css_string(self) -> String {
        let (alpha, red, green, blue) = self.channels();
        if alpha < 255 {
            let text = format!("{:.2}", f64::from(alpha) / 255.0);
            let text = text.strip_prefix('0').unwrap_or(&text);
            format!("rgba({red},{green},{blue},{text})")
        } else {
            format!("rgb({red},{green},{blue})")
        }
    }

    /// Look up a CSS named color (case-insensitive)
    #[must_use]
    pub fn named(name: &str) -> Option<Color> {
        let name = name.to_ascii_lowercase();
        NAMED_COLORS
            .binary_search_by(|(key, _)| (*key).cmp(name.as_str()))
            .ok()
            .map(|index| Color(NAMED_COLORS[index].1))
    }

    /// Parse `#AARRGGBB`, `#RRGGBB`, `#ARGB`, `#RGB`, `rgb(..)`, `rgba(..)` or a color name
    pub fn parse(text: &str) -> LoomResult<Color> {
        let text = text.trim();
        if text.is_empty() {
            return Err(LoomError::invalid("color", text));
        }

        if let Some(hex) = text.strip_prefix('#') {
            // from_str_radix also takes a sign
            if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(LoomError::invalid("color", text));
            }
            let value =
                u32::from_str_radix(hex, 16).map_err(|_| LoomError::invalid("color", text))?;
            let expand = |nibble: u32| (nibble << 4) | nibble;
            return match hex.len() {
                8 => Ok(Color(value)),
                6 => Ok(Color(value | 0xFF00_0000)),
                4 => Ok(Color(
                    (expand((value >> 12) & 0xF) << 24)
                        | (expand((value >> 8) & 0xF) << 16)
                        | (expand((value >> 4) & 0xF) << 8)
                        | expand(value & 0xF),
                )),
                3 => Ok(Color(
                    0xFF00_0000
                        | (expand((value >> 8) & 0xF) << 16)
                        | (expand((value >> 4) & 0xF) << 8)
                        | expand(value & 0xF),
                )),
                _ => Err(LoomError::invalid("color", text)),
            };
        }

        let lower = text.to_ascii_lowercase();
        if let Some(args) = lower.strip_prefix("rgba") {
            if let Some([r, g, b, a]) = parse_rgb_args(args).as_deref() {
                return Ok(Color::argb(*a, *r, *g, *b));
            }
        } else if let Some(args) = lower.strip_prefix("rgb") {
            if let Some([r, g, b]) = parse_rgb_args(args).as_deref() {
                return Ok(Color::argb(255, *r, *g, *b));
            }
        }

        Color::named(&lower).ok_or_else(|| LoomError::invalid("color", text))
    }
}

/// Parse `( a, b, c[, d] )` where each item is `0..=255`, `n%` or a `0..1` float
fn parse_rgb_args(args: &str) -> Option<Vec<u8>> {
    let inner = args.trim().strip_prefix('(')?.strip_suffix(')')?;
    inner
        .split(',')
        .map(|item| {
            let item = item.trim();
            if let Some(percent) = item.strip_suffix('%') {
                let n: u32 = percent.parse().ok()?;
                (n <= 100).then(|| (n * 255 / 100) as u8)
            } else if item.contains('.') {
                let f: f64 = item.parse().ok()?;
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                (0.0..=1.0).contains(&f).then(|| (f * 255.0) as u8)
            } else {
                item.parse::<u8>().ok()
            }
        })
        .collect()
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08X}", self.0)
    }
}

impl FromStr for Color {
    type Err = LoomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s)
    }
}

impl From<u32> for Color {
    fn from(value: u32) -> Self {
        Color(value)
    }
}

/// CSS named colors, sorted by name
static NAMED_COLORS: &[(&str, u32)] = &[
    ("aliceblue", 0xFFF0F8FF),
    ("antiquewhite", 0xFFFAEBD7),
    ("aqua", 0xFF00FFFF),
    ("aquamarine", 0xFF7FFFD4),
    ("azure", 0xFFF0FFFF),
    ("beige", 0xFFF5F5DC),
    ("bisque", 0xFFFFE4C4),
    ("black", 0xFF000000),
    ("blanchedalmond", 0xFFFFEBCD),
    ("blue", 0xFF0000FF),
    ("blueviolet", 0xFF8A2BE2),
    ("brown", 0xFFA52A2A),
    ("burlywood", 0xFFDEB887),
    ("cadetblue", 0xFF5F9EA0),
    ("chartreuse", 0xFF7FFF00),
    ("chocolate", 0xFFD2691E),
    ("coral", 0xFFFF7F50),
    ("cornflowerblue", 0xFF6495ED),
    ("cornsilk", 0xFFFFF8DC),
    ("crimson", 0xFFDC143C),
    ("cyan", 0xFF00FFFF),
    ("darkblue", 0xFF00008B),
    ("darkcyan", 0xFF008B8B),
    ("darkgoldenrod", 0xFFB8860B),
    ("darkgray", 0xFFA9A9A9),
    ("darkgreen", 0xFF006400),
    ("darkgrey", 0xFFA9A9A9),
    ("darkkhaki", 0xFFBDB76B),
    ("darkmagenta", 0xFF8B008B),
    ("darkolivegreen", 0xFF556B2F),
    ("darkorange", 0xFFFF8C00),
    ("darkorchid", 0xFF9932CC),
    ("darkred", 0xFF8B0000),
    ("darksalmon", 0xFFE9967A),
    ("darkseagreen", 0xFF8FBC8F),
    ("darkslateblue", 0xFF483D8B),
    ("darkslategray", 0xFF2F4F4F),
    ("darkslategrey", 0xFF2F4F4F),
    ("darkturquoise", 0xFF00CED1),
    ("darkviolet", 0xFF9400D3),
    ("deeppink", 0xFFFF1493),
    ("deepskyblue", 0xFF00BFFF),
    ("dimgray", 0xFF696969),
    ("dimgrey", 0xFF696969),
    ("dodgerblue", 0xFF1E90FF),
    ("firebrick", 0xFFB22222),
    ("floralwhite", 0xFFFFFAF0),
    ("forestgreen", 0xFF228B22),
    ("fuchsia", 0xFFFF00FF),
    ("gainsboro", 0xFFDCDCDC),
    ("ghostwhite", 0xFFF8F8FF),
    ("gold", 0xFFFFD700),
    ("goldenrod", 0xFFDAA520),
    ("gray", 0xFF808080),
    ("green", 0xFF008000),
    ("greenyellow", 0xFFADFF2F),
    ("grey", 0xFF808080),
    ("honeydew", 0xFFF0FFF0),
    ("hotpink", 0xFFFF69B4),
    ("indianred", 0xFFCD5C5C),
    ("indigo", 0xFF4B0082),
    ("ivory", 0xFFFFFFF0),
    ("khaki", 0xFFF0E68C),
    ("lavender", 0xFFE6E6FA),
    ("lavenderblush", 0xFFFFF0F5),
    ("lawngreen", 0xFF7CFC00),
    ("lemonchiffon", 0xFFFFFACD),
    ("lightblue", 0xFFADD8E6),
    ("lightcoral", 0xFFF08080),
    ("lightcyan", 0xFFE0FFFF),
    ("lightgoldenrodyellow", 0xFFFAFAD2),
    ("lightgray", 0xFFD3D3D3),
    ("lightgreen", 0xFF90EE90),
    ("lightgrey", 0xFFD3D3D3),
    ("lightpink", 0xFFFFB6C1),
    ("lightsalmon", 0xFFFFA07A),
    ("lightseagreen", 0xFF20B2AA),
    ("lightskyblue", 0xFF87CEFA),
    ("lightslategray", 0xFF778899),
    ("lightslategrey", 0xFF778899),
    ("lightsteelblue", 0xFFB0C4DE),
    ("lightyellow", 0xFFFFFFE0),
    ("lime", 0xFF00FF00),
    ("limegreen", 0xFF32CD32),
    ("linen", 0xFFFAF0E6),
    ("magenta", 0xFFFF00FF),
    ("maroon", 0xFF800000),
    ("mediumaquamarine", 0xFF66CDAA),
    ("mediumblue", 0xFF0000CD),
    ("mediumorchid", 0xFFBA55D3),
    ("mediumpurple", 0xFF9370DB),
    ("mediumseagreen", 0xFF3CB371),
    ("mediumslateblue", 0xFF7B68EE),
    ("mediumspringgreen", 0xFF00FA9A),
    ("mediumturquoise", 0xFF48D1CC),
    ("mediumvioletred", 0xFFC71585),
    ("midnightblue", 0xFF191970),
    ("mintcream", 0xFFF5FFFA),
    ("mistyrose", 0xFFFFE4E1),
    ("moccasin", 0xFFFFE4B5),
    ("navajowhite", 0xFFFFDEAD),
    ("navy", 0xFF000080),
    ("oldlace", 0xFFFDF5E6),
    ("olive", 0xFF808000),
    ("olivedrab", 0xFF6B8E23),
    ("orange", 0xFFFFA500),
    ("orangered", 0xFFFF4500),
    ("orchid", 0xFFDA70D6),
    ("palegoldenrod", 0xFFEEE8AA),
    ("palegreen", 0xFF98FB98),
    ("paleturquoise", 0xFFAFEEEE),
    ("palevioletred", 0xFFDB7093),
    ("papayawhip", 0xFFFFEFD5),
    ("peachpuff", 0xFFFFDAB9),
    ("peru", 0xFFCD853F),
    ("pink", 0xFFFFC0CB),
    ("plum", 0xFFDDA0DD),
    ("powderblue", 0xFFB0E0E6),
    ("purple", 0xFF800080),
    ("red", 0xFFFF0000),
    ("rosybrown", 0xFFBC8F8F),
    ("royalblue", 0xFF4169E1),
    ("saddlebrown", 0xFF8B4513),
    ("salmon", 0xFFFA8072),
    ("sandybrown", 0xFFF4A460),
    ("seagreen", 0xFF2E8B57),
    ("seashell", 0xFFFFF5EE),
    ("sienna", 0xFFA0522D),
    ("silver", 0xFFC0C0C0),
    ("skyblue", 0xFF87CEEB),
    ("slateblue", 0xFF6A5ACD),
    ("slategray", 0xFF708090),
    ("slategrey", 0xFF708090),
    ("snow", 0xFFFFFAFA),
    ("springgreen", 0xFF00FF7F),
    ("steelblue", 0xFF4682B4),
    ("tan", 0xFFD2B48C),
    ("teal", 0xFF008080),
    ("thistle", 0xFFD8BFD8),
    ("tomato", 0xFFFF6347),
    ("transparent", 0x00000000),
    ("turquoise", 0xFF40E0D0),
    ("violet", 0xFFEE82EE),
    ("wheat", 0xFFF5DEB3),
    ("white", 0xFFFFFFFF),
    ("whitesmoke", 0xFFF5F5F5),
    ("yellow", 0xFFFFFF00),
    ("yellowgreen", 0xFF9ACD32),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(Color::parse("#80FF0000").unwrap(), Color(0x80FF_0000));
        assert_eq!(Color::parse("#FF0000").unwrap(), Color(0xFFFF_0000));
        assert_eq!(Color::parse("#8F00").unwrap(), Color(0x88FF_0000));
        assert_eq!(Color::parse("#F00").unwrap(), Color(0xFFFF_0000));
        assert!(Color::parse("#F0000").is_err());
        assert!(Color::parse("#GG0000").is_err());
        assert!(Color::parse("#+FFF").is_err());
        assert!(Color::parse("#-FF0000").is_err());
    }

    #[test]
    fn test_css_string() {
        let color = Color::parse("#80FF0000").unwrap();
        assert_eq!(color.channels(), (0x80, 0xFF, 0, 0));
        assert_eq!(color.css_string(), "rgba(255,0,0,.50)");
        assert_eq!(Color::BLACK.css_string(), "rgb(0,0,0)");
    }

    #[test]
    fn test_display_and_rgb_string() {
        let color = Color(0x12AB_CDEF);
        assert_eq!(color.to_string(), "#12ABCDEF");
        assert_eq!(color.rgb_string(), "#ABCDEF");
        assert_eq!(Color::parse(&color.to_string()).unwrap(), color);
    }

    #[test]
    fn test_rgb_function_forms() {
        assert_eq!(Color::parse("rgb(255, 0, 0)").unwrap(), Color::RED);
        assert_eq!(
            Color::parse("RGBA(0, 0, 255, .5)").unwrap(),
            Color::argb(127, 0, 0, 255)
        );
        assert_eq!(Color::parse("rgb(100%, 0%, 0%)").unwrap(), Color::RED);
        assert!(Color::parse("rgb(256, 0, 0)").is_err());
        assert!(Color::parse("rgb(1, 2)").is_err());
    }

    #[test]
    fn test_named_colors() {
        assert_eq!(Color::parse("Red").unwrap(), Color::RED);
        assert_eq!(Color::named("aliceblue"), Some(Color(0xFFF0_F8FF)));
        assert_eq!(Color::named("transparent"), Some(Color::TRANSPARENT));
        assert!(Color::parse("reddish").is_err());
    }
}
