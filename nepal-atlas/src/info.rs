//! Contents of the attribute panel.

use geojson::JsonObject;
use serde_json::Value;

use crate::layer::OverlayKind;

/// Message shown when a query click hits no feature.
pub const NOT_FOUND_MESSAGE: &str = "No feature found at this location.";

/// Title of the attribute table.
pub const ATTRIBUTES_TITLE: &str = "Attributes";

/// Message shown after a query layer is selected.
pub fn query_mode_message(kind: OverlayKind) -> String {
    format!(
        "Query mode: {}. Click on the map to get attribute information.",
        kind.feature_name()
    )
}

/// What the attribute panel shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InfoPanel {
    /// Nothing.
    #[default]
    Empty,
    /// A status message.
    Message(String),
    /// Attributes of the queried feature.
    Attributes(AttributeTable),
}

impl InfoPanel {
    /// Plain text rendering of the panel.
    pub fn to_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Message(message) => message.clone(),
            Self::Attributes(table) => table.to_text(),
        }
    }

    /// HTML rendering of the panel with all values escaped.
    pub fn to_html(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Message(message) => format!("<p>{}</p>", escape_html(message)),
            Self::Attributes(table) => table.to_html(),
        }
    }
}

/// Key/value rows of a feature's properties, in property order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeTable {
    rows: Vec<(String, String)>,
}

impl AttributeTable {
    /// Builds the table from feature properties.
    pub fn from_properties(properties: &JsonObject) -> Self {
        Self {
            rows: properties
                .iter()
                .map(|(key, value)| (key.clone(), value_text(value)))
                .collect(),
        }
    }

    /// Rows of the table.
    pub fn rows(&self) -> &[(String, String)] {
        &self.rows
    }

    /// Plain text rendering: the title followed by one `key: value` line per row.
    pub fn to_text(&self) -> String {
        let mut text = ATTRIBUTES_TITLE.to_string();
        for (key, value) in &self.rows {
            text.push('\n');
            text.push_str(key);
            text.push_str(": ");
            text.push_str(value);
        }
        text
    }

    /// HTML table. Keys and values are escaped, so markup in the data is shown as text.
    pub fn to_html(&self) -> String {
        let mut html = format!("<h4>{ATTRIBUTES_TITLE}</h4><table>");
        for (key, value) in &self.rows {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td></tr>",
                escape_html(key),
                escape_html(value)
            ));
        }
        html.push_str("</table>");
        html
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => match number.as_f64() {
            Some(float) if number.is_f64() && float.fract() == 0.0 && float.abs() < 1e15 => {
                format!("{}", float as i64)
            }
            _ => number.to_string(),
        },
        other => other.to_string(),
    }
}

/// Escapes the characters with special meaning in HTML.
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn properties() -> JsonObject {
        let value = json!({
            "DISTRICT": "KATHMANDU",
            "AREA": 395.0,
            "CODE": 27,
            "NOTE": "<b>capital</b>",
            "EMPTY": null
        });
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn rows_keep_property_order() {
        let table = AttributeTable::from_properties(&properties());
        let keys: Vec<_> = table.rows().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["DISTRICT", "AREA", "CODE", "NOTE", "EMPTY"]);
    }

    #[test]
    fn values_are_plain_text() {
        let table = AttributeTable::from_properties(&properties());
        assert_eq!(
            table.to_text(),
            "Attributes\nDISTRICT: KATHMANDU\nAREA: 395\nCODE: 27\nNOTE: <b>capital</b>\nEMPTY: null"
        );
    }

    #[test]
    fn html_escapes_markup() {
        let html = InfoPanel::Attributes(AttributeTable::from_properties(&properties())).to_html();
        assert!(html.starts_with("<h4>Attributes</h4><table>"));
        assert!(html.contains("<tr><td>NOTE</td><td>&lt;b&gt;capital&lt;/b&gt;</td></tr>"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn query_mode_message_names_feature() {
        assert_eq!(
            query_mode_message(OverlayKind::Municipality),
            "Query mode: Municipality. Click on the map to get attribute information."
        );
    }
}
