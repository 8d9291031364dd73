//! URL handling module for Recipe-Scout
//!
//! This module provides canonicalization, site authority extraction, recipe
//! path matching, and link classification for the single crawled site.

mod domain;
mod matcher;
mod normalize;

use crate::UrlError;
use url::Url;

// Re-export main functions
pub use domain::extract_authority;
pub use matcher::matches_recipe_path;
pub use normalize::{canonicalize, canonicalize_str};

/// How a discovered link is treated by the crawler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// Same-site link with the recipe path shape: fetched and classified, never crawled
    RecipeCandidate,
    /// Same-site link: crawled for further links
    Internal,
    /// Another site: ignored
    External,
}

impl LinkKind {
    /// Returns true if the link belongs to the crawled site
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::RecipeCandidate | Self::Internal)
    }
}

/// The crawled site: its authority and where its recipe pages live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteScope {
    authority: String,
    recipe_prefix: String,
}

impl SiteScope {
    /// Builds the scope from the crawl's start URL
    ///
    /// # Examples
    ///
    /// ```
    /// use recipe_scout::url::{LinkKind, SiteScope};
    /// use url::Url;
    ///
    /// let scope = SiteScope::from_start_url("https://www.bbcgoodfood.com/recipes", "/recipes/").unwrap();
    /// let link = Url::parse("https://www.bbcgoodfood.com/recipes/lemon-drizzle-cake").unwrap();
    /// assert_eq!(scope.classify(&link), LinkKind::RecipeCandidate);
    /// ```
    pub fn from_start_url(start_url: &str, recipe_prefix: &str) -> Result<Self, UrlError> {
        let start = canonicalize_str(start_url)?;
        let authority = extract_authority(&start).ok_or(UrlError::MissingDomain)?;
        Ok(Self {
            authority,
            recipe_prefix: recipe_prefix.to_string(),
        })
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn recipe_prefix(&self) -> &str {
        &self.recipe_prefix
    }

    /// Returns true if the URL is on the crawled site
    pub fn is_internal(&self, url: &Url) -> bool {
        extract_authority(url).as_deref() == Some(self.authority.as_str())
    }

    /// Returns true if the URL is on the crawled site and has the recipe path shape
    pub fn is_recipe_candidate(&self, url: &Url) -> bool {
        self.is_internal(url) && matches_recipe_path(&self.recipe_prefix, url.path())
    }

    /// Classifies a (canonical) link
    ///
    /// Recipe shape is checked first: a recipe candidate is a leaf and must
    /// never be treated as an ordinary frontier entry.
    pub fn classify(&self, url: &Url) -> LinkKind {
        if !self.is_internal(url) {
            LinkKind::External
        } else if matches_recipe_path(&self.recipe_prefix, url.path()) {
            LinkKind::RecipeCandidate
        } else {
            LinkKind::Internal
        }
    }
}
