use serde::{ Deserialize, Serialize };
use serde_json::{ Map, Value as JsonValue };

/// Generated website code. `html`, `css` and `js` are always present;
/// any other keys the model produced are kept in `extra` and serialized back
/// alongside them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratedSite {
    #[serde(default)]
    pub html: String,
    #[serde(default)]
    pub css: String,
    #[serde(default)]
    pub js: String,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl GeneratedSite {
    pub fn new(html: impl Into<String>, css: impl Into<String>, js: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            css: css.into(),
            js: js.into(),
            extra: Map::new(),
        }
    }

    /// Single-page document combining the three parts, as rendered in the
    /// preview frame. Closing `</style` and `</script` sequences inside the
    /// css/js are escaped so they cannot terminate their element early.
    pub fn preview_document(&self) -> String {
        format!(
            "<!DOCTYPE html><html><head><style>{}</style></head><body>{}<script>{}</script></body></html>",
            escape_closing_tag(&self.css, "style"),
            self.html,
            escape_closing_tag(&self.js, "script")
        )
    }
}

fn escape_closing_tag(source: &str, tag: &str) -> String {
    let needle = format!("</{}", tag);
    let lower = source.to_ascii_lowercase();
    let mut out = String::with_capacity(source.len());
    let mut last = 0;
    for (idx, _) in lower.match_indices(&needle) {
        out.push_str(&source[last..idx]);
        out.push_str("<\\/");
        last = idx + 2;
    }
    out.push_str(&source[last..]);
    out
}
