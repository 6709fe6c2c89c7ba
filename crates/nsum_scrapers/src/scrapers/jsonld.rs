use scraper::{Html, Selector};
use serde_json::Value;
use tracing::debug;

use super::metadata::{AuthorHit, SiteNameHit};
use super::utils::clean_text;

/// Parses every `application/ld+json` script in document order.
/// Top-level arrays and `@graph` containers are flattened so each
/// returned value is a single node. Malformed blocks are skipped.
pub fn extract_nodes(document: &Html) -> Vec<Value> {
    let mut nodes = Vec::new();

    if let Ok(script_selector) = Selector::parse("script[type='application/ld+json']") {
        for script in document.select(&script_selector) {
            let raw = script.text().collect::<String>();
            match serde_json::from_str::<Value>(raw.trim()) {
                Ok(json) => flatten_into(json, &mut nodes),
                Err(e) => debug!(error = %e, "Skipping malformed JSON-LD block"),
            }
        }
    }

    nodes
}

fn flatten_into(value: Value, nodes: &mut Vec<Value>) {
    match value {
        Value::Array(items) => {
            for item in items {
                flatten_into(item, nodes);
            }
        }
        Value::Object(mut obj) => {
            if let Some(Value::Array(graph)) = obj.remove("@graph") {
                if !obj.is_empty() {
                    nodes.push(Value::Object(obj));
                }
                for item in graph {
                    flatten_into(item, nodes);
                }
            } else {
                nodes.push(Value::Object(obj));
            }
        }
        _ => {}
    }
}

fn has_type(node: &Value, wanted: &str) -> bool {
    match node.get("@type") {
        Some(Value::String(t)) => t == wanted,
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some(wanted)),
        _ => false,
    }
}

fn name_of(value: &Value) -> Option<String> {
    value.get("name").and_then(Value::as_str).and_then(clean_text)
}

/// Publisher name, then Organization name, then WebSite name.
pub fn site_name(node: &Value) -> SiteNameHit {
    if let Some(publisher) = node.get("publisher").filter(|p| p.is_object()) {
        if let Some(name) = name_of(publisher) {
            return SiteNameHit::Publisher(name);
        }
    }
    if has_type(node, "Organization") {
        if let Some(name) = name_of(node) {
            return SiteNameHit::Organization(name);
        }
    }
    if has_type(node, "WebSite") {
        if let Some(name) = name_of(node) {
            return SiteNameHit::WebSite(name);
        }
    }
    SiteNameHit::Miss
}

/// Handles the three shapes `author` takes: a list of names or objects,
/// a single object, or a bare string.
pub fn author(node: &Value) -> AuthorHit {
    match node.get("author") {
        Some(Value::Array(entries)) => entries
            .iter()
            .find_map(|entry| match entry {
                Value::Object(_) => name_of(entry),
                Value::String(s) => clean_text(s),
                _ => None,
            })
            .map(AuthorHit::ListEntry)
            .unwrap_or(AuthorHit::Miss),
        Some(obj @ Value::Object(_)) => name_of(obj).map(AuthorHit::Object).unwrap_or(AuthorHit::Miss),
        Some(Value::String(s)) => clean_text(s).map(AuthorHit::Name).unwrap_or(AuthorHit::Miss),
        _ => AuthorHit::Miss,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(blocks: &[&str]) -> Html {
        let scripts: String = blocks
            .iter()
            .map(|b| format!("<script type=\"application/ld+json\">{}</script>", b))
            .collect();
        Html::parse_document(&format!("<html><head>{}</head><body></body></html>", scripts))
    }

    #[test]
    fn test_malformed_block_is_skipped() {
        let document = doc(&[r#"{"@type": "NewsArticle", "#, r#"{"@type": "WebSite", "name": "Daily Planet"}"#]);
        let nodes = extract_nodes(&document);
        assert_eq!(nodes.len(), 1);
        assert_eq!(site_name(&nodes[0]), SiteNameHit::WebSite("Daily Planet".to_string()));
    }

    #[test]
    fn test_graph_and_arrays_are_flattened() {
        let document = doc(&[
            r#"{"@context": "https://schema.org", "@graph": [{"@type": "WebPage"}, {"@type": "Organization", "name": "Globe"}]}"#,
            r#"[{"@type": "Person", "name": "Lois Lane"}]"#,
        ]);
        let nodes = extract_nodes(&document);
        assert_eq!(nodes.len(), 4);
        assert_eq!(site_name(&nodes[2]), SiteNameHit::Organization("Globe".to_string()));
    }

    #[test]
    fn test_site_name_priority() {
        let node = json!({
            "@type": "Organization",
            "name": "Org Name",
            "publisher": {"@type": "Organization", "name": "Publisher Name"}
        });
        assert_eq!(site_name(&node), SiteNameHit::Publisher("Publisher Name".to_string()));

        let node = json!({"@type": ["WebSite", "Thing"], "name": "Site &amp; Co"});
        assert_eq!(site_name(&node), SiteNameHit::WebSite("Site & Co".to_string()));

        let node = json!({"@type": "NewsArticle", "publisher": "just a string"});
        assert_eq!(site_name(&node), SiteNameHit::Miss);
    }

    #[test]
    fn test_author_shapes() {
        let list = json!({"author": [{"@type": "Person"}, {"name": "Clark Kent"}, "Lois Lane"]});
        assert_eq!(author(&list), AuthorHit::ListEntry("Clark Kent".to_string()));

        let list_of_strings = json!({"author": ["", "Jimmy Olsen"]});
        assert_eq!(author(&list_of_strings), AuthorHit::ListEntry("Jimmy Olsen".to_string()));

        let object = json!({"author": {"@type": "Person", "name": "Perry White"}});
        assert_eq!(author(&object), AuthorHit::Object("Perry White".to_string()));

        let string = json!({"author": " Cat Grant "});
        assert_eq!(author(&string), AuthorHit::Name("Cat Grant".to_string()));

        assert_eq!(author(&json!({"author": 42})), AuthorHit::Miss);
        assert_eq!(author(&json!({"headline": "x"})), AuthorHit::Miss);
    }
}
