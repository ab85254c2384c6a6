//! WASM bindings for the paginator
//!
//! Documents, heights and outcomes cross the boundary as JSON strings.

use crate::{Document, HeightMap, PageSetup, PaginationConfig, Paginator};
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn from_json<T: DeserializeOwned>(json: &str) -> crate::Result<T> {
    Ok(serde_json::from_str(json)?)
}

/// Empty strings select the default
fn from_json_or_default<T: DeserializeOwned + Default>(json: &str) -> crate::Result<T> {
    if json.trim().is_empty() {
        Ok(T::default())
    } else {
        from_json(json)
    }
}

/// WASM-exposed paginator wrapper
#[wasm_bindgen]
pub struct WasmPaginator {
    paginator: Paginator,
}

#[wasm_bindgen]
impl WasmPaginator {
    /// Create a paginator for a JSON document with the default page setup
    #[wasm_bindgen(constructor)]
    pub fn new(document_json: &str) -> Result<WasmPaginator, JsError> {
        let document: Document = from_json_or_default(document_json)?;
        Ok(Self {
            paginator: Paginator::new(document),
        })
    }

    /// Create a paginator with a custom page setup and config (JSON, may be empty)
    #[wasm_bindgen(js_name = withSetup)]
    pub fn with_setup(
        document_json: &str,
        setup_json: &str,
        config_json: &str,
    ) -> Result<WasmPaginator, JsError> {
        let document: Document = from_json_or_default(document_json)?;
        let setup: PageSetup = from_json_or_default(setup_json)?;
        let config: PaginationConfig = from_json_or_default(config_json)?;
        Ok(Self {
            paginator: Paginator::with_policy(document, setup, config),
        })
    }

    /// Replace the document after an edit
    #[wasm_bindgen(js_name = setDocument)]
    pub fn set_document(&mut self, document_json: &str) -> Result<(), JsError> {
        let document: Document = from_json(document_json)?;
        self.paginator.set_document(document);
        Ok(())
    }

    /// Get the document as JSON
    #[wasm_bindgen(js_name = getDocument)]
    pub fn get_document(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(self.paginator.document())?)
    }

    #[wasm_bindgen(js_name = setCursor)]
    pub fn set_cursor(&mut self, offset: Option<usize>) {
        self.paginator.set_cursor(offset);
    }

    #[wasm_bindgen(js_name = getCursor)]
    pub fn get_cursor(&self) -> Option<usize> {
        self.paginator.cursor()
    }

    /// Run a pass with measured heights (`{"<block id>": height}`)
    ///
    /// Returns the outcome as JSON.
    pub fn paginate(&mut self, heights_json: &str) -> Result<String, JsError> {
        let heights: HeightMap = from_json_or_default(heights_json)?;
        let outcome = self.paginator.paginate(&heights)?;
        Ok(serde_json::to_string(&outcome)?)
    }

    /// Get full document text
    #[wasm_bindgen(js_name = getText)]
    pub fn get_text(&self) -> String {
        self.paginator.text()
    }

    /// Get page count
    #[wasm_bindgen(js_name = getPageCount)]
    pub fn get_page_count(&self) -> usize {
        self.paginator.page_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PassOutcome;

    fn ok<T>(result: Result<T, JsError>) -> T {
        result.ok().expect("call failed")
    }

    const DOC: &str = r#"{"pages":[{"number":1,"regions":[{"kind":"body","blocks":[
        {"id":0,"class":"action","text":"The door opens."},
        {"id":1,"class":"action","text":"Wind."}
    ]}]}]}"#;

    #[test]
    fn test_json_pass() {
        let mut pager = ok(WasmPaginator::new(DOC));
        pager.set_cursor(Some(4));

        let json = ok(pager.paginate(r#"{"0": 640.0, "1": 24.0}"#));
        let outcome: PassOutcome = serde_json::from_str(&json).unwrap();
        assert!(!outcome.is_unchanged());
        assert_eq!(pager.get_page_count(), 2);
        assert_eq!(pager.get_cursor(), Some(4));
        assert_eq!(pager.get_text(), "The door opens.\nWind.");
    }

    #[test]
    fn test_custom_setup() {
        let mut pager = ok(WasmPaginator::with_setup(
            DOC,
            r#"{"first_page_header": true}"#,
            "",
        ));
        ok(pager.paginate(""));
        let doc: Document = serde_json::from_str(&ok(pager.get_document())).unwrap();
        assert_eq!(doc.pages[0].header().unwrap().blocks[0].text, "1.");
    }

    #[test]
    fn test_json_helpers() {
        let config: PaginationConfig = from_json_or_default("  ").unwrap();
        assert_eq!(config, PaginationConfig::default());
        assert!(from_json::<Document>("{").is_err());
    }
}
