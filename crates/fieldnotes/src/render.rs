//! HTML and terminal rendering of notes.
//!
//! Rendering is a pure function of its inputs: the same collection always
//! produces the same markup. Every piece of user-supplied text is escaped
//! before it is placed in markup, including attribute values.

use std::fmt::Write as _;

use chrono::{FixedOffset, Local, Utc};

use crate::config::RenderConfig;
use crate::network::OfflineBanner;
use crate::note::{Note, NO_LOCATION_TEXT};
use crate::router::View;

/// Shown in place of an empty title.
pub const UNTITLED: &str = "(untitled)";

/// Shown when there are no notes.
pub const EMPTY_LIST_MESSAGE: &str = "No notes yet. Go to “Add”.";

/// Escape text for use in HTML content or a quoted attribute value.
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Time zone timestamps are shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeBasis {
    /// The machine's local time zone.
    #[default]
    Local,
    /// Coordinated Universal Time.
    Utc,
    /// A fixed offset from UTC.
    Fixed(FixedOffset),
}

/// State of the creation form shown in the `add` panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormView<'a> {
    /// Title input value.
    pub title: &'a str,
    /// Text input value.
    pub text: &'a str,
    /// Location output text.
    pub geo_text: &'a str,
    /// Whether the video preview and snapshot controls are shown.
    pub camera_streaming: bool,
    /// Captured still, shown as a preview.
    pub preview: Option<&'a str>,
    /// Status message below the save button.
    pub message: Option<&'a str>,
}

impl Default for FormView<'_> {
    fn default() -> Self {
        Self {
            title: "",
            text: "",
            geo_text: NO_LOCATION_TEXT,
            camera_streaming: false,
            preview: None,
            message: None,
        }
    }
}

/// Everything the application page shows.
#[derive(Debug, Clone, Copy)]
pub struct Page<'a> {
    /// The visible panel.
    pub view: View,
    /// Notes for the listing.
    pub notes: &'a [Note],
    /// The offline banner.
    pub banner: OfflineBanner,
    /// The creation form.
    pub form: FormView<'a>,
}

/// Renders notes with a fixed time zone and timestamp format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Renderer {
    basis: TimeBasis,
    timestamp_format: String,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(TimeBasis::Local, "%Y-%m-%d %H:%M:%S")
    }
}

impl Renderer {
    /// Create a renderer.
    ///
    /// `timestamp_format` is a `chrono` format string and must be valid;
    /// [`crate::config::Config::validate`] checks configured values.
    pub fn new(basis: TimeBasis, timestamp_format: impl Into<String>) -> Self {
        Self {
            basis,
            timestamp_format: timestamp_format.into(),
        }
    }

    /// Create a renderer from configuration.
    #[must_use]
    pub fn from_config(config: &RenderConfig) -> Self {
        let basis = if config.use_utc {
            TimeBasis::Utc
        } else {
            TimeBasis::Local
        };
        Self::new(basis, config.timestamp_format.clone())
    }

    /// Format a note's creation time.
    #[must_use]
    pub fn format_timestamp(&self, note: &Note) -> String {
        let created = note.created();
        let format = self.timestamp_format.as_str();
        match self.basis {
            TimeBasis::Local => created.with_timezone(&Local).format(format).to_string(),
            TimeBasis::Utc => created.with_timezone(&Utc).format(format).to_string(),
            TimeBasis::Fixed(offset) => created.with_timezone(&offset).format(format).to_string(),
        }
    }

    /// Render one listing card.
    #[must_use]
    pub fn render_card(&self, note: &Note) -> String {
        let title = if note.title.is_empty() {
            UNTITLED
        } else {
            &note.title
        };
        let geo_text = if note.geo_text.is_empty() {
            NO_LOCATION_TEXT
        } else {
            &note.geo_text
        };

        let mut html = String::new();
        html.push_str("<li class=\"noteCard\">\n");
        html.push_str("  <div class=\"noteHeader\">\n");
        let _ = writeln!(
            html,
            "    <strong class=\"noteTitle\">{}</strong>",
            escape_html(title)
        );
        html.push_str("    <div class=\"noteHeaderRight\">\n");
        let _ = writeln!(
            html,
            "      <span class=\"noteDate\">{}</span>",
            escape_html(&self.format_timestamp(note))
        );
        let _ = writeln!(
            html,
            "      <button class=\"noteDeleteBtn danger\" type=\"button\" \
             data-id=\"{}\">Delete</button>",
            escape_html(&note.id)
        );
        html.push_str("    </div>\n");
        html.push_str("  </div>\n");
        if !note.text.is_empty() {
            let _ = writeln!(
                html,
                "  <div class=\"noteText\">{}</div>",
                escape_html(&note.text)
            );
        }
        let _ = writeln!(
            html,
            "  <div class=\"noteMeta\"><span>{}</span></div>",
            escape_html(geo_text)
        );
        if let Some(photo) = &note.photo_data_url {
            let _ = writeln!(
                html,
                "  <img class=\"noteImg\" alt=\"Photo\" src=\"{}\" />",
                escape_html(photo)
            );
        }
        html.push_str("</li>\n");
        html
    }

    /// Render the items of the notes list, newest first.
    #[must_use]
    pub fn render_notes(&self, notes: &[Note]) -> String {
        if notes.is_empty() {
            return format!("<li class=\"muted\">{EMPTY_LIST_MESSAGE}</li>\n");
        }
        notes.iter().map(|note| self.render_card(note)).collect()
    }

    /// Render the complete application page.
    #[must_use]
    pub fn render_page(&self, page: &Page<'_>) -> String {
        let hidden = |view: View| if page.view == view { "" } else { " hidden" };
        let form = &page.form;

        let mut html = String::new();
        html.push_str("<!doctype html>\n<html lang=\"en\">\n<head>\n");
        html.push_str("  <meta charset=\"utf-8\" />\n");
        html.push_str(
            "  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />\n",
        );
        html.push_str("  <title>Field Notes</title>\n");
        html.push_str("  <link rel=\"manifest\" href=\"manifest.webmanifest\" />\n");
        html.push_str("  <link rel=\"stylesheet\" href=\"styles.css\" />\n");
        html.push_str("</head>\n<body>\n");

        let _ = writeln!(
            html,
            "<div id=\"offlineBanner\" class=\"banner{}\">\
             You are offline. Notes are kept on this device.</div>",
            if page.banner.is_hidden() { " hidden" } else { "" }
        );
        html.push_str("<nav>\n");
        for (view, label) in [(View::Home, "Notes"), (View::Add, "Add"), (View::About, "About")] {
            let _ = writeln!(
                html,
                "  <a href=\"{}\"{}>{label}</a>",
                view.fragment(),
                if page.view == view { " aria-current=\"page\"" } else { "" }
            );
        }
        html.push_str("</nav>\n<main>\n");

        // Listing
        let _ = writeln!(html, "<section id=\"view-home\" class=\"view{}\">", hidden(View::Home));
        html.push_str("  <h1>Notes</h1>\n");
        html.push_str(
            "  <button id=\"clearBtn\" class=\"danger\" type=\"button\">Clear all</button>\n",
        );
        html.push_str("  <ul id=\"notesList\">\n");
        html.push_str(&self.render_notes(page.notes));
        html.push_str("  </ul>\n</section>\n");

        // Creation form
        let _ = writeln!(html, "<section id=\"view-add\" class=\"view{}\">", hidden(View::Add));
        html.push_str("  <h1>Add note</h1>\n");
        let _ = writeln!(
            html,
            "  <input id=\"titleInput\" type=\"text\" placeholder=\"Title\" value=\"{}\" />",
            escape_html(form.title)
        );
        let _ = writeln!(
            html,
            "  <textarea id=\"textInput\" placeholder=\"Description\">{}</textarea>",
            escape_html(form.text)
        );
        html.push_str("  <button id=\"geoBtn\" type=\"button\">Get location</button>\n");
        let _ = writeln!(
            html,
            "  <output id=\"geoOut\">{}</output>",
            escape_html(form.geo_text)
        );
        let camera_hidden = if form.camera_streaming { "" } else { " class=\"hidden\"" };
        html.push_str("  <button id=\"camBtn\" type=\"button\">Start camera</button>\n");
        let _ = writeln!(
            html,
            "  <video id=\"video\" autoplay playsinline{camera_hidden}></video>"
        );
        html.push_str("  <canvas id=\"canvas\" class=\"hidden\"></canvas>\n");
        let _ = writeln!(
            html,
            "  <button id=\"snapBtn\" type=\"button\"{camera_hidden}>Take photo</button>"
        );
        let _ = writeln!(
            html,
            "  <button id=\"stopCamBtn\" type=\"button\"{camera_hidden}>Stop camera</button>"
        );
        match form.preview {
            Some(src) => {
                let _ = writeln!(
                    html,
                    "  <img id=\"photoPreview\" alt=\"Preview\" src=\"{}\" />",
                    escape_html(src)
                );
            }
            None => html.push_str(
                "  <img id=\"photoPreview\" alt=\"Preview\" class=\"hidden\" src=\"\" />\n",
            ),
        }
        html.push_str("  <button id=\"saveBtn\" type=\"button\">Save</button>\n");
        let _ = writeln!(
            html,
            "  <p id=\"saveMsg\">{}</p>",
            escape_html(form.message.unwrap_or_default())
        );
        html.push_str("</section>\n");

        // About
        let _ = writeln!(html, "<section id=\"view-about\" class=\"view{}\">", hidden(View::About));
        html.push_str("  <h1>About</h1>\n");
        html.push_str(
            "  <p>Field Notes keeps notes with an optional location and photo on this device. \
             It works offline; nothing is sent anywhere.</p>\n",
        );
        html.push_str("</section>\n</main>\n</body>\n</html>\n");
        html
    }

    /// Render the notes as plain text for a terminal.
    #[must_use]
    pub fn render_plain(&self, notes: &[Note]) -> String {
        if notes.is_empty() {
            return "No notes yet. Add one with `fnote add`.\n".to_string();
        }

        let mut out = String::new();
        for (index, note) in notes.iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            let title = if note.title.is_empty() {
                UNTITLED
            } else {
                &note.title
            };
            let _ = writeln!(out, "{title}  [{}]", note.id);
            let _ = write!(
                out,
                "  {} | {}",
                self.format_timestamp(note),
                if note.geo_text.is_empty() {
                    NO_LOCATION_TEXT
                } else {
                    &note.geo_text
                }
            );
            if note.has_photo() {
                out.push_str(" | photo");
            }
            out.push('\n');
            for line in note.text.lines() {
                let _ = writeln!(out, "  {line}");
            }
        }
        out
    }
}
