//! Connector category listing aggregation.

use govctl_types::ConnectorCategory;

/// Merge dynamically discovered categories into a static listing.
///
/// Connectors of a dynamic category whose title matches an existing static
/// category are appended into that category; otherwise the whole dynamic
/// category is appended to the listing. Linear scan per dynamic category,
/// which is fine at the tens-of-categories scale this runs at.
pub fn combine_categories(
    static_categories: &[ConnectorCategory],
    dynamic_categories: &[ConnectorCategory],
) -> Vec<ConnectorCategory> {
    let mut merged: Vec<ConnectorCategory> = static_categories.to_vec();

    for dynamic in dynamic_categories {
        match merged.iter_mut().find(|category| category.title == dynamic.title) {
            Some(existing) => existing.connectors.extend(dynamic.connectors.iter().cloned()),
            None => merged.push(dynamic.clone()),
        }
    }

    merged
}
