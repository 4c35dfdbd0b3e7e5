//! JSON document fixtures: layout options plus the declarative tree.

use crate::DocumentError;
use crate::builder::{DocumentBuilder, ElementSpec, LayoutOptions};
use crate::document::Document;
use serde::{Deserialize, Serialize};
use std::io::Read;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFixture {
    #[serde(default)]
    pub layout: LayoutOptions,
    pub root: ElementSpec,
}

impl DocumentFixture {
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, DocumentError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn build(&self) -> Result<Document, DocumentError> {
        DocumentBuilder::new(self.layout).build(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecut_traits::GeometryOracle;
    use serde_json::json;

    #[test]
    fn fixture_builds_a_document() {
        let fixture = json!({
            "layout": { "width": 300.0, "lineHeight": 10.0 },
            "root": {
                "tag": "main",
                "children": [
                    { "tag": "h1", "attributes": { "id": "title" }, "style": "height: 40px" },
                    { "tag": "p", "children": ["some words here"] }
                ]
            }
        });
        let doc = DocumentFixture::from_json(&fixture.to_string())
            .unwrap()
            .build()
            .unwrap();
        let root = doc.root();
        assert_eq!(doc.tag_name(root), Some("main"));
        let title = doc.element_by_id("title").unwrap();
        assert_eq!(doc.bottom(title, root), 40.0);
        assert_eq!(doc.height(root), 50.0);
    }

    #[test]
    fn missing_root_is_an_error() {
        let result = DocumentFixture::from_json(r#"{ "layout": {} }"#);
        assert!(matches!(result, Err(DocumentError::Json(_))));
    }
}
