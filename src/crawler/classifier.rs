//! Recipe classification from embedded JSON-LD
//!
//! A recipe-shaped URL is only a candidate. The page is a recipe when one of
//! its `application/ld+json` blocks declares a `Recipe`.

use crate::ScoutError;
use scraper::{Html, Selector};
use serde_json::Value;

const RECIPE_TYPE: &str = "Recipe";

/// Decides whether a fetched page is a genuine recipe
#[derive(Debug, Clone)]
pub struct RecipeClassifier {
    json_ld: Selector,
}

impl RecipeClassifier {
    pub fn new() -> Result<Self, ScoutError> {
        let json_ld = Selector::parse(r#"script[type="application/ld+json"]"#)
            .map_err(|e| ScoutError::HtmlParse(e.to_string()))?;
        Ok(Self { json_ld })
    }

    /// Returns true if any JSON-LD block in `html` describes a recipe
    ///
    /// Blocks that fail to parse are skipped; a page with no usable block is
    /// not a recipe.
    pub fn is_recipe(&self, html: &str) -> bool {
        let document = Html::parse_document(html);
        self.is_recipe_document(&document)
    }

    /// Same as [`is_recipe`](Self::is_recipe) for an already-parsed document
    pub fn is_recipe_document(&self, document: &Html) -> bool {
        document.select(&self.json_ld).any(|script| {
            let text: String = script.text().collect();
            match serde_json::from_str::<Value>(text.trim()) {
                Ok(data) => declares_recipe(&data),
                Err(e) => {
                    tracing::trace!("Skipping malformed JSON-LD block: {}", e);
                    false
                }
            }
        })
    }
}

/// Parses `html` and checks it for a recipe declaration
pub fn is_recipe(html: &str) -> bool {
    RecipeClassifier::new()
        .map(|classifier| classifier.is_recipe(html))
        .unwrap_or(false)
}

/// A top-level object that is a recipe, an array holding one, or a `@graph` holding one
fn declares_recipe(data: &Value) -> bool {
    match data {
        Value::Object(_) => {
            is_recipe_object(data)
                || data
                    .get("@graph")
                    .and_then(Value::as_array)
                    .is_some_and(|items| items.iter().any(is_recipe_object))
        }
        Value::Array(items) => items.iter().any(is_recipe_object),
        _ => false,
    }
}

/// `@type` is `"Recipe"` or an array containing `"Recipe"`
fn is_recipe_object(item: &Value) -> bool {
    match item.get("@type") {
        Some(Value::String(kind)) => kind == RECIPE_TYPE,
        Some(Value::Array(kinds)) => kinds.iter().any(|k| k.as_str() == Some(RECIPE_TYPE)),
        _ => false,
    }
}
