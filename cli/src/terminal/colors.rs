use colored::Color;

pub const PRIMARY: Color = Color::TrueColor { r: 102, g: 204, b: 255 };
pub const ACCENT: Color = Color::TrueColor { r: 255, g: 204, b: 102 };
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::White;
pub const IPV4_ADDR: Color = Color::TrueColor { r: 153, g: 255, b: 153 };
pub const IPV6_ADDR: Color = Color::TrueColor { r: 204, g: 153, b: 255 };
pub const UP: Color = Color::Green;
pub const DOWN: Color = Color::Red;
pub const UNKNOWN: Color = Color::BrightBlack;
