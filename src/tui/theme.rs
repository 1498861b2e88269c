//! Maps the catalog's color strings onto ratatui colors.
//!
//! The core stores channel colors as plain strings so it stays free of UI
//! types; this is the one place they become `ratatui::style::Color`.

use ratatui::style::Color;

/// Parse a configured color: a named ratatui color ("cyan", "light-red",
/// "darkgray", ...) or a "#rrggbb" hex value. Unknown values fall back to
/// gray rather than failing the render.
pub fn parse_color(name: &str) -> Color {
    if let Some(hex) = name.strip_prefix('#') {
        return parse_hex(hex).unwrap_or(Color::Gray);
    }
    match name.to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "gray" | "grey" => Color::Gray,
        "darkgray" | "darkgrey" => Color::DarkGray,
        "lightred" => Color::LightRed,
        "lightgreen" => Color::LightGreen,
        "lightyellow" => Color::LightYellow,
        "lightblue" => Color::LightBlue,
        "lightmagenta" => Color::LightMagenta,
        "lightcyan" => Color::LightCyan,
        "white" => Color::White,
        _ => Color::Gray,
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_colors_parse() {
        assert_eq!(parse_color("cyan"), Color::Cyan);
        assert_eq!(parse_color("Light-Red"), Color::LightRed);
        assert_eq!(parse_color("DARK GRAY"), Color::DarkGray);
    }

    #[test]
    fn hex_colors_parse() {
        assert_eq!(parse_color("#1c6ba7"), Color::Rgb(0x1c, 0x6b, 0xa7));
    }

    #[test]
    fn unknown_falls_back_to_gray() {
        assert_eq!(parse_color("chartreuse-ish"), Color::Gray);
        assert_eq!(parse_color("#12345"), Color::Gray);
    }
}
