//! One-line summary of a material in the list

use colored::Colorize;

use crate::format::with_commas;
use crate::models::Material;

/// `#rrggbb` or `#rgb` to an RGB triple
pub fn parse_hex_color(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();

    match hex.len() {
        6 => Some((channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
        3 => {
            let mut rgb = hex.chars().map(|c| channel(&c.to_string()).map(|v| v * 17));
            Some((rgb.next()??, rgb.next()??, rgb.next()??))
        }
        _ => None,
    }
}

/// Two-cell color block, or `??` when the color is not a hex value
pub fn swatch(color: &str) -> String {
    match parse_hex_color(color) {
        Some((r, g, b)) => "██".truecolor(r, g, b).to_string(),
        None => "??".dimmed().to_string(),
    }
}

pub fn render_list_item(material: &Material, selected: bool) -> String {
    let marker = if selected { ">" } else { " " };
    let name = if selected {
        material.name.bold().to_string()
    } else {
        material.name.clone()
    };
    let volume = format!("{} m³", with_commas(material.volume));

    format!(
        "{} {} {}  {}",
        marker,
        swatch(&material.color),
        name,
        volume.dimmed()
    )
}
