use regex::Regex;
use std::sync::OnceLock;

use crate::services::Route;

/// Tags that start a new line in the rendered panel.
fn block_tags() -> &'static Regex {
    static BLOCKS: OnceLock<Regex> = OnceLock::new();
    BLOCKS.get_or_init(|| {
        Regex::new(r"(?i)</?(div|p|br|li|ul|ol|tr|table)\b[^>]*>").expect("block tag pattern is valid")
    })
}

fn html_tags() -> &'static Regex {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    TAGS.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"))
}

/// Block tags become a space, inline tags (`<b>`, `<span>`, `<wbr/>`) vanish
/// so text without word spacing stays joined.
fn strip_markup(html: &str) -> String {
    let separated = block_tags().replace_all(html, " ");
    let text = html_tags().replace_all(&separated, "");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Plain-text turn-by-turn listing of a route, as shown in the directions
/// panel.
pub fn render_panel_text(route: &Route) -> String {
    let mut lines = Vec::new();
    if !route.summary.is_empty() {
        lines.push(format!("經由 {}", route.summary));
    }
    for leg in &route.legs {
        lines.push(format!(
            "{} → {} ({}, {})",
            leg.start_address, leg.end_address, leg.distance_text, leg.duration_text
        ));
        for (i, step) in leg.steps.iter().enumerate() {
            let instruction = strip_markup(&step.instruction);
            lines.push(format!("  {}. {} ({})", i + 1, instruction, step.distance_text));
        }
    }
    lines.join("\n")
}
