//! Visible-subset computation for the resource catalog.
//!
//! Three independent predicates (free-text query, category tag, region)
//! ANDed together; input order is preserved and an empty result is a valid,
//! displayable state.

use crate::models::resource::{Region, Resource};

/// The category-tag sentinel that matches every resource.
pub const ALL_TAG: &str = "All";

/// Computes the visible subset of `resources` for the given query, selected
/// category tag, and the viewer's region. Order of the input is preserved.
pub fn filter<'a>(
    resources: &'a [Resource],
    query: &str,
    selected_tag: &str,
    user_region: &Region,
) -> Vec<&'a Resource> {
    resources
        .iter()
        .filter(|r| {
            matches_query(r, query) && matches_tag(r, selected_tag) && matches_region(r, user_region)
        })
        .collect()
}

/// Case-insensitive substring match against the title; an empty or
/// whitespace-only query matches everything.
fn matches_query(resource: &Resource, query: &str) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return true;
    }
    resource.title.to_lowercase().contains(&query.to_lowercase())
}

/// Matches when the sentinel "All" tag is selected, or when any comma-split
/// component of the resource's category equals the tag case-insensitively.
fn matches_tag(resource: &Resource, selected_tag: &str) -> bool {
    let selected = selected_tag.trim();
    if selected.is_empty() || selected.eq_ignore_ascii_case(ALL_TAG) {
        return true;
    }
    resource
        .tags()
        .iter()
        .any(|t| t.eq_ignore_ascii_case(selected))
}

/// A resource with no region, or region ALL, is visible everywhere; a viewer
/// with region ALL sees everything.
fn matches_region(resource: &Resource, user_region: &Region) -> bool {
    if user_region.is_all() {
        return true;
    }
    match &resource.region {
        None => true,
        Some(region) => region.is_all() || region == user_region,
    }
}
