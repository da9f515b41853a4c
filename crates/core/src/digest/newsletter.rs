//! Newsletter assembly and email-safe rendering.
//!
//! Mail clients ignore `<style>` blocks and most layout CSS, so the edition is
//! a nested table layout with inline styles only.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use super::feeds::Headline;
use super::sidebar::Sidebar;
use crate::render::escape_html;

/// Headlines from one feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub source: String,
    pub headlines: Vec<Headline>,
}

/// One edition of the paper.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Newsletter {
    pub title: String,
    /// When the edition was built, in the location's offset.
    pub edition: DateTime<FixedOffset>,
    pub location: String,
    pub sections: Vec<Section>,
    pub sidebar: Sidebar,
}

impl Newsletter {
    pub fn headline_count(&self) -> usize {
        self.sections.iter().map(|s| s.headlines.len()).sum()
    }

    /// Masthead date, e.g. `Tuesday, January 7, 2025`.
    pub fn edition_date(&self) -> String {
        self.edition.format("%A, %B %-d, %Y").to_string()
    }

    pub fn subject_line(&self) -> String {
        format!("{} | {}", self.title, self.edition_date())
    }
}

const FONT: &str = "Georgia, 'Times New Roman', serif";
const SANS: &str = "Helvetica, Arial, sans-serif";

/// Renders the edition as a self-contained HTML email.
pub fn render_newsletter(newsletter: &Newsletter) -> String {
    let title = escape_html(&newsletter.title);
    let date = escape_html(&newsletter.edition_date());

    let mut html = String::new();
    html.push_str(&format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n<title>{title}</title>\n</head>\n"
    ));
    html.push_str("<body style=\"margin:0;padding:0;background:#f1efe9;\">\n");
    html.push_str(
        "<table role=\"presentation\" width=\"100%\" cellpadding=\"0\" cellspacing=\"0\" border=\"0\" style=\"background:#f1efe9;\">\n<tr><td align=\"center\" style=\"padding:24px 12px;\">\n",
    );
    html.push_str(
        "<table role=\"presentation\" width=\"640\" cellpadding=\"0\" cellspacing=\"0\" border=\"0\" style=\"max-width:640px;width:100%;background:#fffdf8;border:1px solid #d8d3c4;\">\n",
    );

    html.push_str(&format!(
        "<tr><td colspan=\"2\" align=\"center\" style=\"padding:28px 24px 12px;border-bottom:3px double #222;\">\
<div style=\"font-family:{FONT};font-size:34px;font-weight:bold;color:#111;\">{title}</div>\
<div style=\"font-family:{SANS};font-size:12px;letter-spacing:1px;text-transform:uppercase;color:#666;padding-top:6px;\">{date}</div>\
</td></tr>\n"
    ));

    html.push_str("<tr>\n<td valign=\"top\" style=\"padding:16px 20px;\">\n");
    for section in &newsletter.sections {
        render_section(&mut html, section);
    }
    html.push_str("</td>\n");

    html.push_str(
        "<td valign=\"top\" width=\"200\" style=\"width:200px;padding:16px 16px;border-left:1px solid #d8d3c4;background:#f7f4ec;\">\n",
    );
    render_sidebar(&mut html, &newsletter.sidebar, &newsletter.location);
    html.push_str("</td>\n</tr>\n");

    html.push_str(&format!(
        "<tr><td colspan=\"2\" align=\"center\" style=\"padding:14px;border-top:1px solid #d8d3c4;font-family:{SANS};font-size:11px;color:#888;\">{} headlines from {} sources</td></tr>\n",
        newsletter.headline_count(),
        newsletter.sections.len()
    ));

    html.push_str("</table>\n</td></tr>\n</table>\n</body>\n</html>\n");
    html
}

fn render_section(html: &mut String, section: &Section) {
    html.push_str(&format!(
        "<h2 style=\"font-family:{SANS};font-size:13px;letter-spacing:1px;text-transform:uppercase;color:#8a1c1c;border-bottom:1px solid #d8d3c4;padding-bottom:4px;margin:18px 0 8px;\">{}</h2>\n",
        escape_html(&section.source)
    ));

    for headline in &section.headlines {
        html.push_str(&format!(
            "<p style=\"font-family:{FONT};font-size:17px;line-height:1.35;margin:0 0 10px;\"><a href=\"{}\" style=\"color:#111;text-decoration:none;\">{}</a></p>\n",
            escape_html(&headline.link),
            escape_html(&headline.title)
        ));
    }
}

fn render_sidebar(html: &mut String, sidebar: &Sidebar, location: &str) {
    let heading = |html: &mut String, text: &str| {
        html.push_str(&format!(
            "<h3 style=\"font-family:{SANS};font-size:11px;letter-spacing:1px;text-transform:uppercase;color:#555;margin:14px 0 6px;\">{}</h3>\n",
            escape_html(text)
        ));
    };
    let line = |html: &mut String, text: &str| {
        html.push_str(&format!(
            "<p style=\"font-family:{FONT};font-size:14px;line-height:1.4;color:#222;margin:0 0 4px;\">{}</p>\n",
            escape_html(text)
        ));
    };

    if sidebar.is_empty() {
        line(html, "Sidebar unavailable today.");
        return;
    }

    if let Some(weather) = &sidebar.weather {
        heading(html, &format!("Weather in {location}"));
        line(html, &weather.description);
        line(html, &format!("{:.0}°C, wind {:.0} km/h", weather.temperature_c, weather.wind_kmh));
    }

    if let Some(sun) = &sidebar.sun {
        heading(html, "Sun");
        line(html, &format!("Rises {}", sun.sunrise));
        line(html, &format!("Sets {}", sun.sunset));
        line(html, &format!("Daylight {}", sun.day_length));
    }

    if let Some(people) = &sidebar.astronauts {
        heading(html, &format!("In space ({})", people.len()));
        for person in people {
            line(html, &format!("{} ({})", person.name, person.craft));
        }
    }
}
