//! The `hudlcd:<x>:<y>:<scale>` placement line that HUD mods read from the
//! display's secondary text field.

use tracing::debug;

use crate::{
    host::{BlockId, Host},
    settings::Settings,
};

const PREFIX: &str = "hudlcd:";

pub fn hud_line(settings: &Settings) -> String {
    format!(
        "{PREFIX}{}:{}:{}",
        settings.hud_anchor_x, settings.hud_anchor_y, settings.hud_scale
    )
}

/// The field contents with its first placement line set to `desired`, or
/// `None` if nothing needs to change. A missing line is inserted on top.
pub fn with_hud_line(custom_data: &str, desired: &str) -> Option<String> {
    let mut lines: Vec<&str> = custom_data.split('\n').collect();
    match lines
        .iter()
        .position(|l| l.trim().to_lowercase().starts_with(PREFIX))
    {
        Some(i) if lines[i].trim() == desired.trim() => return None,
        Some(i) => lines[i] = desired,
        None => lines.insert(0, desired),
    }
    Some(lines.join("\n"))
}

pub fn refresh<H: Host + ?Sized>(host: &mut H, display: BlockId, settings: &Settings) {
    let desired = hud_line(settings);
    if let Some(updated) = with_hud_line(&host.display_custom_data(display), &desired) {
        debug!("hudline::refresh: {desired}");
        host.set_display_custom_data(display, updated);
    }
}

#[test]
fn line_format() {
    let settings = Settings {
        hud_anchor_x: -0.95,
        hud_anchor_y: 0.95,
        hud_scale: "1.1".into(),
        ..Settings::default()
    };
    assert_eq!(hud_line(&settings), "hudlcd:-0.95:0.95:1.1");
    assert_eq!(hud_line(&Settings::default()), "hudlcd:0.6:0.98:0.8");
}

#[test]
fn updates_are_idempotent() {
    let desired = "hudlcd:0.6:0.98:0.8";
    assert_eq!(with_hud_line("", desired).as_deref(), Some("hudlcd:0.6:0.98:0.8\n"));
    assert_eq!(
        with_hud_line("notes\nHUDLCD:0:0:1\nmore", desired).as_deref(),
        Some("notes\nhudlcd:0.6:0.98:0.8\nmore")
    );
    assert_eq!(with_hud_line("notes\n  hudlcd:0.6:0.98:0.8  ", desired), None);
    assert_eq!(
        with_hud_line("a\nb", desired).as_deref(),
        Some("hudlcd:0.6:0.98:0.8\na\nb")
    );
}
