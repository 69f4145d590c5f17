//! Splits component aggregates into per-table records and joins them back
//!
//! The changeset format carries whole components; the store keeps metadata,
//! code, and the search projection in separate tables. The split is pure:
//! the same aggregate always produces the same three records, which is what
//! makes the differ's field-for-field comparison meaningful.
//!
//! ## Design
//!
//! - `validate_aggregate` collects every finding instead of stopping at the
//!   first, so a validation report lists the full remediation set.
//! - The component id is the one field the split normalizes (trims). All
//!   other fields pass through verbatim and survive a split/join round trip
//!   unchanged.
//! - The search haystack is derived from the metadata fields and file paths,
//!   not file contents; facets are the sorted, deduplicated filter values.

use tessella_core::{
    has_errors, CodeRecord, ComponentAggregate, ComponentId, ComponentRecord, Error, Issue,
    Result, SearchRecord,
};

use std::collections::BTreeSet;

/// The three records one aggregate splits into.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitComponent {
    /// Metadata row for the components table.
    pub metadata: ComponentRecord,
    /// Code row carrying the source files.
    pub code: CodeRecord,
    /// Derived search projection.
    pub search: SearchRecord,
}

/// Validate a component aggregate, collecting every finding.
///
/// `base_path` locates the aggregate inside its container, for example
/// `operations/3/component`; finding paths extend it per field.
pub fn validate_aggregate(aggregate: &ComponentAggregate, base_path: &str) -> Vec<Issue> {
    let mut issues = Vec::new();

    let id = aggregate.component_id.trim();
    if id.is_empty() {
        issues.push(Issue::error(
            format!("{base_path}/componentId"),
            "componentId must be non-empty after trimming",
        ));
    } else if id != aggregate.component_id {
        issues.push(Issue::warning(
            format!("{base_path}/componentId"),
            "componentId has surrounding whitespace; the trimmed form is used as the key",
        ));
    }

    for (field, value) in [
        ("name", &aggregate.name),
        ("framework", &aggregate.framework),
        ("styling", &aggregate.styling),
    ] {
        if value.trim().is_empty() {
            issues.push(Issue::error(
                format!("{base_path}/{field}"),
                format!("{field} must not be empty"),
            ));
        }
    }

    if aggregate.files.is_empty() {
        issues.push(Issue::error(
            format!("{base_path}/files"),
            "component must carry at least one file",
        ));
    }

    let mut seen_paths = BTreeSet::new();
    for (index, file) in aggregate.files.iter().enumerate() {
        if file.path.trim().is_empty() {
            issues.push(Issue::error(
                format!("{base_path}/files/{index}/path"),
                "file path must not be empty",
            ));
            continue;
        }
        if !seen_paths.insert(file.path.as_str()) {
            issues.push(Issue::warning(
                format!("{base_path}/files/{index}/path"),
                format!("duplicate file path {:?}", file.path),
            ));
        }
        if file.contents.is_empty() {
            issues.push(Issue::warning(
                format!("{base_path}/files/{index}/contents"),
                "file contents are empty",
            ));
        }
    }

    for (field, values) in [
        ("dependencies", &aggregate.dependencies),
        ("primitives", &aggregate.primitives),
        ("animationLibraries", &aggregate.animation_libraries),
    ] {
        for (index, value) in values.iter().enumerate() {
            if value.trim().is_empty() {
                issues.push(Issue::warning(
                    format!("{base_path}/{field}/{index}"),
                    format!("blank entry in {field}"),
                ));
            }
        }
    }

    issues
}

/// Split an aggregate into its metadata, code, and search records.
///
/// Fails with [`Error::Validation`] when the aggregate carries any
/// error-severity finding; the codec only encodes valid components.
pub fn split_component(aggregate: &ComponentAggregate) -> Result<SplitComponent> {
    let issues = validate_aggregate(aggregate, "component");
    if has_errors(&issues) {
        let messages: Vec<&str> = issues
            .iter()
            .filter(|issue| issue.is_error())
            .map(Issue::message)
            .collect();
        return Err(Error::Validation {
            message: messages.join("; "),
        });
    }

    let id = ComponentId::new(&aggregate.component_id)?;
    let component_id = id.into_string();

    let metadata = ComponentRecord {
        component_id: component_id.clone(),
        name: aggregate.name.clone(),
        framework: aggregate.framework.clone(),
        styling: aggregate.styling.clone(),
        dependencies: aggregate.dependencies.clone(),
        intent: aggregate.intent.clone(),
        motion: aggregate.motion.clone(),
        primitives: aggregate.primitives.clone(),
        animation_libraries: aggregate.animation_libraries.clone(),
        attribution: aggregate.attribution.clone(),
        description: aggregate.description.clone(),
    };

    let code = CodeRecord {
        component_id: component_id.clone(),
        files: aggregate.files.clone(),
    };

    let search = SearchRecord {
        component_id,
        haystack: build_haystack(aggregate),
        facets: build_facets(aggregate),
    };

    Ok(SplitComponent {
        metadata,
        code,
        search,
    })
}

/// Join a metadata and code record back into the aggregate shape.
pub fn join_component(metadata: &ComponentRecord, code: &CodeRecord) -> ComponentAggregate {
    ComponentAggregate {
        component_id: metadata.component_id.clone(),
        name: metadata.name.clone(),
        framework: metadata.framework.clone(),
        styling: metadata.styling.clone(),
        dependencies: metadata.dependencies.clone(),
        intent: metadata.intent.clone(),
        motion: metadata.motion.clone(),
        primitives: metadata.primitives.clone(),
        animation_libraries: metadata.animation_libraries.clone(),
        attribution: metadata.attribution.clone(),
        files: code.files.clone(),
        description: metadata.description.clone(),
    }
}

/// Lowercased, single-spaced text blob over the searchable fields.
fn build_haystack(aggregate: &ComponentAggregate) -> String {
    let mut parts: Vec<&str> = Vec::new();

    parts.push(&aggregate.name);
    if let Some(description) = &aggregate.description {
        parts.push(description);
    }
    if let Some(intent) = &aggregate.intent {
        parts.push(intent);
    }
    parts.push(&aggregate.framework);
    parts.push(&aggregate.styling);
    if let Some(motion) = &aggregate.motion {
        parts.push(motion);
    }
    parts.extend(aggregate.primitives.iter().map(String::as_str));
    parts.extend(aggregate.animation_libraries.iter().map(String::as_str));
    parts.extend(aggregate.dependencies.iter().map(String::as_str));
    parts.extend(aggregate.files.iter().map(|file| file.path.as_str()));

    let joined = parts.join(" ").to_lowercase();
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Sorted, deduplicated filter values.
fn build_facets(aggregate: &ComponentAggregate) -> Vec<String> {
    let mut facets = BTreeSet::new();

    let mut add = |value: &str| {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            facets.insert(trimmed.to_lowercase());
        }
    };

    add(&aggregate.framework);
    add(&aggregate.styling);
    if let Some(motion) = &aggregate.motion {
        add(motion);
    }
    for primitive in &aggregate.primitives {
        add(primitive);
    }
    for library in &aggregate.animation_libraries {
        add(library);
    }

    facets.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tessella_core::CodeFile;

    fn aggregate(id: &str) -> ComponentAggregate {
        ComponentAggregate {
            component_id: id.to_string(),
            name: "Hero Banner".to_string(),
            framework: "React".to_string(),
            styling: "Tailwind".to_string(),
            dependencies: vec!["framer-motion".to_string()],
            intent: Some("marketing".to_string()),
            motion: Some("Parallax".to_string()),
            primitives: vec!["section".to_string()],
            animation_libraries: vec!["framer-motion".to_string()],
            attribution: None,
            files: vec![CodeFile {
                path: "hero.tsx".to_string(),
                contents: "export const Hero = () => null;".to_string(),
                language: Some("tsx".to_string()),
            }],
            description: Some("Full-width hero".to_string()),
        }
    }

    // ========== Validation Tests ==========

    #[test]
    fn test_valid_aggregate_has_no_issues() {
        assert!(validate_aggregate(&aggregate("hero"), "component").is_empty());
    }

    #[test]
    fn test_blank_required_fields_are_errors() {
        let mut bad = aggregate("hero");
        bad.name = "  ".to_string();
        bad.framework = String::new();

        let issues = validate_aggregate(&bad, "operations/2/component");
        let paths: Vec<&str> = issues.iter().map(Issue::path).collect();
        assert!(paths.contains(&"operations/2/component/name"));
        assert!(paths.contains(&"operations/2/component/framework"));
        assert!(issues.iter().all(Issue::is_error));
    }

    #[test]
    fn test_empty_id_is_error_padded_id_is_warning() {
        let mut empty = aggregate("");
        empty.component_id = "  ".to_string();
        let issues = validate_aggregate(&empty, "component");
        assert!(issues.iter().any(|i| i.is_error() && i.path() == "component/componentId"));

        let padded = aggregate(" hero ");
        let issues = validate_aggregate(&padded, "component");
        assert!(issues.iter().any(|i| !i.is_error() && i.path() == "component/componentId"));
    }

    #[test]
    fn test_missing_files_is_error() {
        let mut bad = aggregate("hero");
        bad.files.clear();
        let issues = validate_aggregate(&bad, "component");
        assert!(issues.iter().any(|i| i.is_error() && i.path() == "component/files"));
    }

    #[test]
    fn test_file_findings_are_indexed() {
        let mut bad = aggregate("hero");
        bad.files = vec![
            CodeFile {
                path: "a.tsx".to_string(),
                contents: "x".to_string(),
                language: None,
            },
            CodeFile {
                path: String::new(),
                contents: "x".to_string(),
                language: None,
            },
            CodeFile {
                path: "a.tsx".to_string(),
                contents: String::new(),
                language: None,
            },
        ];

        let issues = validate_aggregate(&bad, "component");
        assert!(issues.iter().any(|i| i.is_error() && i.path() == "component/files/1/path"));
        assert!(issues
            .iter()
            .any(|i| !i.is_error() && i.path() == "component/files/2/path"));
        assert!(issues
            .iter()
            .any(|i| !i.is_error() && i.path() == "component/files/2/contents"));
    }

    #[test]
    fn test_blank_taxonomy_entries_are_warnings() {
        let mut suspect = aggregate("hero");
        suspect.dependencies.push("  ".to_string());
        suspect.primitives.push(String::new());

        let issues = validate_aggregate(&suspect, "component");
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| !i.is_error()));
    }

    #[test]
    fn test_all_findings_are_collected_not_just_the_first() {
        let mut bad = aggregate("");
        bad.name = String::new();
        bad.styling = String::new();
        bad.files.clear();

        let issues = validate_aggregate(&bad, "component");
        assert_eq!(issues.iter().filter(|i| i.is_error()).count(), 4);
    }

    // ========== Split Tests ==========

    #[test]
    fn test_split_produces_three_records_with_shared_key() {
        let split = split_component(&aggregate("hero")).unwrap();
        assert_eq!(split.metadata.component_id, "hero");
        assert_eq!(split.code.component_id, "hero");
        assert_eq!(split.search.component_id, "hero");
        assert_eq!(split.code.files.len(), 1);
    }

    #[test]
    fn test_split_trims_the_component_id() {
        let split = split_component(&aggregate("  hero \t")).unwrap();
        assert_eq!(split.metadata.component_id, "hero");
    }

    #[test]
    fn test_split_rejects_invalid_aggregate_listing_every_error() {
        let mut bad = aggregate("hero");
        bad.name = String::new();
        bad.files.clear();

        let err = split_component(&bad).unwrap_err();
        match err {
            Error::Validation { message } => {
                assert!(message.contains("name"));
                assert!(message.contains("file"));
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_haystack_is_lowercase_and_single_spaced() {
        let split = split_component(&aggregate("hero")).unwrap();
        let haystack = &split.search.haystack;
        assert_eq!(haystack, &haystack.to_lowercase());
        assert!(!haystack.contains("  "));
        assert!(haystack.contains("hero banner"));
        assert!(haystack.contains("parallax"));
        assert!(haystack.contains("hero.tsx"));
    }

    #[test]
    fn test_haystack_excludes_file_contents() {
        let split = split_component(&aggregate("hero")).unwrap();
        assert!(!split.search.haystack.contains("export const"));
    }

    #[test]
    fn test_facets_are_sorted_and_deduplicated() {
        let mut agg = aggregate("hero");
        agg.primitives = vec!["Section".to_string(), "section".to_string()];
        let split = split_component(&agg).unwrap();

        let mut sorted = split.search.facets.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(split.search.facets, sorted);
        assert_eq!(
            split.search.facets.iter().filter(|f| *f == "section").count(),
            1
        );
    }

    #[test]
    fn test_split_is_deterministic() {
        let agg = aggregate("hero");
        assert_eq!(split_component(&agg).unwrap(), split_component(&agg).unwrap());
    }

    // ========== Join Tests ==========

    #[test]
    fn test_join_recovers_the_aggregate() {
        let original = aggregate("hero");
        let split = split_component(&original).unwrap();
        let joined = join_component(&split.metadata, &split.code);
        assert_eq!(joined, original);
    }

    #[test]
    fn test_join_recovers_trimmed_id_for_padded_input() {
        let original = aggregate(" hero ");
        let split = split_component(&original).unwrap();
        let joined = join_component(&split.metadata, &split.code);
        assert_eq!(joined.component_id, "hero");
        assert_eq!(joined.name, original.name);
        assert_eq!(joined.files, original.files);
    }

    // ========== Property Tests ==========

    fn word() -> impl Strategy<Value = String> {
        "[a-zA-Z][a-zA-Z0-9-]{0,11}"
    }

    proptest! {
        #[test]
        fn prop_split_join_round_trips(
            id in word(),
            name in word(),
            framework in word(),
            styling in word(),
            path in word(),
            contents in ".{0,40}",
        ) {
            let original = ComponentAggregate {
                component_id: id,
                name,
                framework,
                styling,
                dependencies: vec![],
                intent: None,
                motion: None,
                primitives: vec![],
                animation_libraries: vec![],
                attribution: None,
                files: vec![CodeFile { path, contents, language: None }],
                description: None,
            };

            let split = split_component(&original).unwrap();
            prop_assert_eq!(join_component(&split.metadata, &split.code), original);
        }

        #[test]
        fn prop_haystack_is_always_lowercase(
            id in word(),
            name in word(),
            framework in word(),
            styling in word(),
        ) {
            let mut agg = aggregate(&id);
            agg.name = name;
            agg.framework = framework;
            agg.styling = styling;

            let split = split_component(&agg).unwrap();
            prop_assert_eq!(split.search.haystack.clone(), split.search.haystack.to_lowercase());
        }
    }
}
