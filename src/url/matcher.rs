/// Checks whether a URL path has the recipe page shape
///
/// A recipe path sits under `prefix` and names something after it:
/// `/recipes/` itself is the listing page, `/recipes/lemon-tart` is a recipe.
///
/// # Examples
///
/// ```
/// use recipe_scout::url::matches_recipe_path;
///
/// assert!(matches_recipe_path("/recipes/", "/recipes/lemon-tart"));
/// assert!(matches_recipe_path("/recipes/", "/recipes/collection/vegan"));
/// assert!(!matches_recipe_path("/recipes/", "/recipes/"));
/// assert!(!matches_recipe_path("/recipes/", "/recipes"));
/// assert!(!matches_recipe_path("/recipes/", "/howto/lemon-tart"));
/// ```
pub fn matches_recipe_path(prefix: &str, path: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => !rest.trim_matches('/').is_empty(),
        None => false,
    }
}
