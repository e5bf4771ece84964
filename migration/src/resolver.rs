//! Creation-order resolution over the entity catalog.
//!
//! Implements Kahn's algorithm with a min-heap keyed on catalog position, so
//! entities without a dependency relationship keep their catalog order.

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashMap};

use thiserror::Error;

use crate::catalog::EntityDef;

/// Errors produced while ordering the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("cyclic dependency between entities: {}", .entities.join(", "))]
    CyclicDependency { entities: Vec<&'static str> },
    #[error("entity '{entity}' references unknown entity '{target}'")]
    UnknownReference {
        entity: &'static str,
        target: &'static str,
    },
}

/// A dependency edge: `from` references `to`, so `to` must be created first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DependencyEdge {
    pub from: &'static str,
    pub to: &'static str,
}

/// Collects every distinct dependency edge declared by the catalog, covering
/// both foreign keys and seed-time data dependencies.
pub fn dependency_edges(catalog: &[EntityDef]) -> Vec<DependencyEdge> {
    let edges: BTreeSet<DependencyEdge> = catalog
        .iter()
        .flat_map(|entity| {
            entity.dependencies().map(move |to| DependencyEdge {
                from: entity.name,
                to,
            })
        })
        .collect();
    edges.into_iter().collect()
}

/// Returns the catalog entities in an order where every entity follows all
/// entities it depends on.
pub fn resolve_order(catalog: &[EntityDef]) -> Result<Vec<&EntityDef>, ResolveError> {
    let position: HashMap<&str, usize> = catalog
        .iter()
        .enumerate()
        .map(|(idx, entity)| (entity.name, idx))
        .collect();

    // dependents[i] = entities that must come after entity i
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); catalog.len()];
    let mut in_degree: Vec<usize> = vec![0; catalog.len()];

    for edge in dependency_edges(catalog) {
        let Some(&to) = position.get(edge.to) else {
            return Err(ResolveError::UnknownReference {
                entity: edge.from,
                target: edge.to,
            });
        };
        let from = position[edge.from];
        dependents[to].push(from);
        in_degree[from] += 1;
    }

    let mut ready: BinaryHeap<Reverse<usize>> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, degree)| **degree == 0)
        .map(|(idx, _)| Reverse(idx))
        .collect();

    let mut order = Vec::with_capacity(catalog.len());
    while let Some(Reverse(idx)) = ready.pop() {
        order.push(idx);
        for &next in &dependents[idx] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                ready.push(Reverse(next));
            }
        }
    }

    if order.len() != catalog.len() {
        let entities = in_degree
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree > 0)
            .map(|(idx, _)| catalog[idx].name)
            .collect();
        return Err(ResolveError::CyclicDependency { entities });
    }

    Ok(order.into_iter().map(|idx| &catalog[idx]).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ForeignKeyDef, OnDelete, CATALOG};

    fn entity(name: &'static str, foreign_keys: &'static [ForeignKeyDef]) -> EntityDef {
        EntityDef {
            name,
            label: name,
            fields: &[],
            unique: &[],
            foreign_keys,
            indexes: &[],
            seed_after: &[],
        }
    }

    fn names(order: &[&EntityDef]) -> Vec<&'static str> {
        order.iter().map(|e| e.name).collect()
    }

    #[test]
    fn resolves_the_eventhive_creation_order() {
        let order = resolve_order(CATALOG).unwrap();
        assert_eq!(
            names(&order),
            vec![
                "users",
                "organizer_profiles",
                "events",
                "tickets",
                "transactions",
                "attendees",
                "promotions",
                "user_sessions",
                "event_reviews",
                "event_templates",
            ]
        );
    }

    #[test]
    fn every_edge_target_precedes_its_source() {
        let order = names(&resolve_order(CATALOG).unwrap());
        let index = |name: &str| order.iter().position(|n| *n == name).unwrap();
        let edges = dependency_edges(CATALOG);
        assert!(edges.contains(&DependencyEdge {
            from: "events",
            to: "organizer_profiles"
        }));
        for edge in edges {
            assert!(index(edge.to) < index(edge.from), "{:?}", edge);
        }
    }

    #[test]
    fn detects_reference_cycles() {
        let catalog = [
            entity("root", &[]),
            entity(
                "a",
                &[ForeignKeyDef {
                    column: "b_id",
                    references: "b",
                    on_delete: OnDelete::Cascade,
                }],
            ),
            entity(
                "b",
                &[ForeignKeyDef {
                    column: "a_id",
                    references: "a",
                    on_delete: OnDelete::SetNull,
                }],
            ),
        ];

        let err = resolve_order(&catalog).unwrap_err();
        assert_eq!(
            err,
            ResolveError::CyclicDependency {
                entities: vec!["a", "b"]
            }
        );
        assert!(err.to_string().contains("a, b"));
    }

    #[test]
    fn seed_dependencies_participate_in_cycles() {
        let mut a = entity("a", &[]);
        a.seed_after = &["b"];
        let b = entity(
            "b",
            &[ForeignKeyDef {
                column: "a_id",
                references: "a",
                on_delete: OnDelete::Cascade,
            }],
        );

        assert!(matches!(
            resolve_order(&[a, b]),
            Err(ResolveError::CyclicDependency { .. })
        ));
    }

    #[test]
    fn rejects_unknown_references() {
        let catalog = [entity(
            "tickets",
            &[ForeignKeyDef {
                column: "event_id",
                references: "events",
                on_delete: OnDelete::Cascade,
            }],
        )];

        assert_eq!(
            resolve_order(&catalog).unwrap_err(),
            ResolveError::UnknownReference {
                entity: "tickets",
                target: "events"
            }
        );
    }

    #[test]
    fn self_references_impose_no_order() {
        let catalog = [
            entity(
                "categories",
                &[ForeignKeyDef {
                    column: "parent_id",
                    references: "categories",
                    on_delete: OnDelete::SetNull,
                }],
            ),
            entity("tags", &[]),
        ];

        assert_eq!(
            names(&resolve_order(&catalog).unwrap()),
            vec!["categories", "tags"]
        );
    }

    #[test]
    fn unrelated_entities_keep_catalog_order() {
        let catalog = [
            entity(
                "child",
                &[ForeignKeyDef {
                    column: "parent_id",
                    references: "parent",
                    on_delete: OnDelete::Cascade,
                }],
            ),
            entity("standalone", &[]),
            entity("parent", &[]),
        ];

        assert_eq!(
            names(&resolve_order(&catalog).unwrap()),
            vec!["standalone", "parent", "child"]
        );
    }
}
