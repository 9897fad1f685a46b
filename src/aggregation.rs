// 📊 Aggregation Queries - Option lists for the filter dropdowns

use crate::category::category_set;
use crate::model::System;
use std::collections::BTreeSet;

/// All distinct data uses across systems, sorted
pub fn unique_data_uses(systems: &[System]) -> Vec<String> {
    let uses: BTreeSet<&str> = systems.iter().flat_map(|s| s.data_uses()).collect();
    uses.into_iter().map(str::to_string).collect()
}

/// All distinct short categories across systems, sorted
pub fn unique_data_categories_list(systems: &[System]) -> Vec<String> {
    let categories: BTreeSet<&str> = systems.iter().flat_map(category_set).collect();
    categories.into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PrivacyDeclaration;

    fn declaration(data_use: &str, categories: &[&str]) -> PrivacyDeclaration {
        PrivacyDeclaration {
            data_categories: categories.iter().map(|c| c.to_string()).collect(),
            data_subjects: vec![],
            data_use: data_use.to_string(),
            name: String::new(),
        }
    }

    fn system(key: &str, declarations: Vec<PrivacyDeclaration>) -> System {
        System {
            fides_key: key.to_string(),
            name: key.to_string(),
            description: String::new(),
            system_type: "Service".to_string(),
            system_dependencies: vec![],
            privacy_declarations: declarations,
        }
    }

    #[test]
    fn test_unique_data_uses() {
        let systems = vec![
            system("a", vec![declaration("advertising", &[])]),
            system(
                "b",
                vec![declaration("advertising", &[]), declaration("analytics", &[])],
            ),
        ];

        assert_eq!(unique_data_uses(&systems), vec!["advertising", "analytics"]);
    }

    #[test]
    fn test_unique_data_uses_sorted_regardless_of_input_order() {
        let systems = vec![
            system("a", vec![declaration("provide.service", &[])]),
            system("b", vec![declaration("advertising", &[])]),
        ];

        assert_eq!(
            unique_data_uses(&systems),
            vec!["advertising", "provide.service"]
        );
    }

    #[test]
    fn test_unique_categories_across_systems() {
        let systems = vec![
            system("a", vec![declaration("x", &["user.derived.identifiable.location"])]),
            system(
                "b",
                vec![declaration("y", &["user.provided.identifiable.contact.email"])],
            ),
            system("c", vec![declaration("z", &["other.location"])]),
        ];

        assert_eq!(unique_data_categories_list(&systems), vec!["email", "location"]);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(unique_data_uses(&[]).is_empty());
        assert!(unique_data_categories_list(&[]).is_empty());

        let bare = vec![system("a", vec![])];
        assert!(unique_data_uses(&bare).is_empty());
        assert!(unique_data_categories_list(&bare).is_empty());
    }
}
