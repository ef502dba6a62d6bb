use colored::Colorize;

use crate::matching::Evidence;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitFormat {
    Plain,
    Color,
    Json,
}

/// Which fields a hit line carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `<address> <length>`
    Origin,
    /// `<address> <host> <status> <length> <scheme>`
    Methods,
}

pub fn render(ev: &Evidence, layout: Layout, format: HitFormat) -> String {
    if format == HitFormat::Json {
        return serde_json::to_string(ev).unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to serialize hit");
            format!("{} {}", ev.address, ev.body_length)
        });
    }

    let color = format == HitFormat::Color;
    match layout {
        Layout::Origin if color => format!("{} {}", ev.address.to_string().green().bold(), ev.body_length),
        Layout::Origin => format!("{} {}", ev.address, ev.body_length),
        Layout::Methods if color => format!(
            "{} {} {} {} {}",
            ev.address.to_string().green().bold(),
            ev.host_header.cyan(),
            ev.status.to_string().yellow(),
            ev.body_length.to_string().magenta(),
            ev.scheme.to_string().blue()
        ),
        Layout::Methods => format!(
            "{} {} {} {} {}",
            ev.address, ev.host_header, ev.status, ev.body_length, ev.scheme
        ),
    }
}
