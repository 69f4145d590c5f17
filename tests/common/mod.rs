//! Shared test utilities for the integration suites.
//!
//! Import via `mod common;` from any top-level test file.

#![allow(dead_code)]

use std::sync::Arc;

pub use tessella::{
    Catalog, Changeset, ChangesetSource, CodeFile, ComponentAggregate, EmbeddingEntry,
    MemoryStore, Operation, SourceAttribution, Table, EMBEDDING_DIMENSIONS,
};

/// Smallest aggregate that passes validation.
pub fn minimal_aggregate(id: &str, name: &str) -> ComponentAggregate {
    ComponentAggregate {
        component_id: id.to_string(),
        name: name.to_string(),
        framework: "react".to_string(),
        styling: "tailwind".to_string(),
        dependencies: Vec::new(),
        intent: None,
        motion: None,
        primitives: Vec::new(),
        animation_libraries: Vec::new(),
        attribution: None,
        files: vec![CodeFile {
            path: format!("{id}.tsx"),
            contents: "export {};".to_string(),
            language: Some("tsx".to_string()),
        }],
        description: None,
    }
}

/// Aggregate with every optional field populated.
pub fn rich_aggregate(id: &str) -> ComponentAggregate {
    ComponentAggregate {
        component_id: id.to_string(),
        name: "Animated Hero".to_string(),
        framework: "react".to_string(),
        styling: "tailwind".to_string(),
        dependencies: vec!["framer-motion".to_string(), "clsx".to_string()],
        intent: Some("landing page hero".to_string()),
        motion: Some("spring".to_string()),
        primitives: vec!["Button".to_string(), "Card".to_string()],
        animation_libraries: vec!["framer-motion".to_string()],
        attribution: Some(SourceAttribution {
            source: "community".to_string(),
            url: Some("https://example.com/hero".to_string()),
            license: Some("MIT".to_string()),
            author: Some("ada".to_string()),
        }),
        files: vec![
            CodeFile {
                path: "hero.tsx".to_string(),
                contents: "export const Hero = () => null;".to_string(),
                language: Some("tsx".to_string()),
            },
            CodeFile {
                path: "hero.css".to_string(),
                contents: ".hero { display: grid; }".to_string(),
                language: Some("css".to_string()),
            },
        ],
        description: Some("Full-bleed hero section with a spring entrance.".to_string()),
    }
}

/// Wrap aggregates into a manual-source changeset, one upsert per aggregate.
pub fn changeset_of(aggregates: Vec<ComponentAggregate>) -> Changeset {
    Changeset::new(
        ChangesetSource::Manual,
        aggregates
            .into_iter()
            .map(|component| Operation::Upsert { component })
            .collect(),
    )
}

/// Deterministic full-dimension vector derived from a seed.
pub fn seeded_vector(seed: u64) -> Vec<f32> {
    (0..EMBEDDING_DIMENSIONS)
        .map(|i| {
            let mixed = seed.wrapping_mul(31).wrapping_add(i as u64);
            ((mixed % 997) as f32 / 997.0) * 2.0 - 1.0
        })
        .collect()
}

/// Embedding entry with a seeded vector.
pub fn entry(id: &str, model: &str, seed: u64) -> EmbeddingEntry {
    EmbeddingEntry {
        component_id: id.to_string(),
        model: model.to_string(),
        embedding: seeded_vector(seed),
    }
}

/// Catalog plus a handle to its concrete store for row-level assertions.
pub fn catalog_with_store() -> (Catalog, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (Catalog::new(store.clone()), store)
}

/// Same, but without the unique-key backstop, for staging duplicate rows.
pub fn unconstrained_catalog() -> (Catalog, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::unconstrained());
    (Catalog::new(store.clone()), store)
}
