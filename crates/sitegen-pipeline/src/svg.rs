//! Post-processing for generated SVG markup
//!
//! The vector model tends to emit a white background path and near-black
//! line art; neither survives on a dark page. Two passes rewrite the markup
//! before it is persisted: strip the first white-filled `<path>`, then remap
//! dark fills to the page's text color. The white-strip pass is idempotent;
//! the dark-fill rewrite is intentionally one-directional.

use regex::Regex;

/// Fallback page foreground used when no theme is supplied upstream.
pub const DEFAULT_THEME_TEXT_COLOR: &str = "#eef1f5";

const DARK_CHANNEL_MAX: u32 = 80;
const WHITE_CHANNEL_MIN: u32 = 240;

pub fn post_process_svg(svg: &str, theme_text_color: &str) -> String {
    let processed = strip_white_background(svg);
    let processed = rewrite_dark_fills(&processed, theme_text_color);
    // `none` stretches the viewBox and distorts icons in layout.
    processed.replace(
        r#"preserveAspectRatio="none""#,
        r#"preserveAspectRatio="xMidYMid meet""#,
    )
}

/// Remove the first `<path>` element when its fill is white or near-white
/// (all rgb channels above 240). The generator uses such a path as an
/// opaque background plate.
fn strip_white_background(svg: &str) -> String {
    let path_tag = Regex::new(r"<path\s[^>]*?>").unwrap();

    let Some(found) = path_tag.find(svg) else {
        return svg.to_string();
    };

    if let Some(fill) = fill_attribute(found.as_str()) {
        if is_near_white(&fill) {
            let mut out = String::with_capacity(svg.len());
            out.push_str(&svg[..found.start()]);
            out.push_str(&svg[found.end()..]);
            return out;
        }
    }

    svg.to_string()
}

/// Rewrite every near-black fill (keyword, 6-digit hex, or rgb triple with
/// all channels below 80) to the theme text color.
fn rewrite_dark_fills(svg: &str, theme_text_color: &str) -> String {
    let fill_attr = Regex::new(r#"fill="([^"]+)""#).unwrap();

    fill_attr
        .replace_all(svg, |caps: &regex::Captures| {
            let fill = caps[1].trim().to_lowercase();
            if is_near_black(&fill) {
                format!(r#"fill="{}""#, theme_text_color)
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

fn fill_attribute(tag: &str) -> Option<String> {
    let fill_attr = Regex::new(r#"fill="([^"]+)""#).unwrap();
    fill_attr
        .captures(tag)
        .map(|caps| caps[1].trim().to_lowercase())
}

fn is_near_white(fill: &str) -> bool {
    if fill == "white" || fill == "#fff" || fill == "#ffffff" {
        return true;
    }
    matches!(
        parse_rgb(fill),
        Some((r, g, b)) if r > WHITE_CHANNEL_MIN && g > WHITE_CHANNEL_MIN && b > WHITE_CHANNEL_MIN
    )
}

fn is_near_black(fill: &str) -> bool {
    if fill == "black" || fill == "#000" || fill == "#000000" {
        return true;
    }
    if let Some((r, g, b)) = parse_hex6(fill) {
        return r < DARK_CHANNEL_MAX && g < DARK_CHANNEL_MAX && b < DARK_CHANNEL_MAX;
    }
    matches!(
        parse_rgb(fill),
        Some((r, g, b)) if r < DARK_CHANNEL_MAX && g < DARK_CHANNEL_MAX && b < DARK_CHANNEL_MAX
    )
}

fn parse_rgb(fill: &str) -> Option<(u32, u32, u32)> {
    let rgb = Regex::new(r"^rgb\(\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*\)$").unwrap();
    let caps = rgb.captures(fill)?;
    Some((
        caps[1].parse().ok()?,
        caps[2].parse().ok()?,
        caps[3].parse().ok()?,
    ))
}

fn parse_hex6(fill: &str) -> Option<(u32, u32, u32)> {
    let hex = Regex::new(r"^#([0-9a-f]{6})$").unwrap();
    let caps = hex.captures(fill)?;
    let digits = &caps[1];
    Some((
        u32::from_str_radix(&digits[0..2], 16).ok()?,
        u32::from_str_radix(&digits[2..4], 16).ok()?,
        u32::from_str_radix(&digits[4..6], 16).ok()?,
    ))
}
