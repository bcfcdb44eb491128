//! The in-memory store of entities: identity resolution, anonymous-entity
//! matching, and the merge engine that keeps references intact across the
//! whole population.

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use log::{debug, info};

use crate::consts::is_anonymous_uri;
use crate::entity::Entity;
use crate::errors::IdentityConflictError;
use crate::registry::TypeRegistry;

/// Owns every entity reachable from it. The primary index maps URIs to
/// entities; a secondary index per class short name backs anonymous-entity
/// matching. Entity references inside property sets are URI-keyed, so a
/// lookup through the primary index always reaches the canonical entity.
#[derive(Debug, Default)]
pub struct ObjectGraph {
    entities: HashMap<String, Entity>,
    by_class: HashMap<String, HashSet<String>>,
    namespaces: HashMap<String, String>,
}

impl ObjectGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from a batch of entities, running the full `add`
    /// semantics (including merges) for each.
    pub fn from_entities(entities: Vec<Entity>, registry: &TypeRegistry) -> Result<Self> {
        let mut graph = Self::new();
        for entity in entities {
            graph.add(entity, None, registry)?;
        }
        Ok(graph)
    }

    /// Adds an entity and returns the URI under which it is now known.
    ///
    /// When an anonymous entity structurally matches an anonymous entity
    /// already in the graph, the match's URI is returned and the incoming
    /// entity is discarded; callers must use the returned URI to reach the
    /// canonical copy. When the target URI already exists, the two entities
    /// merge: the one with the more specific runtime class survives and
    /// absorbs the other's property values.
    pub fn add(
        &mut self,
        mut entity: Entity,
        explicit_uri: Option<&str>,
        registry: &TypeRegistry,
    ) -> Result<String> {
        let target_uri = match explicit_uri {
            Some(uri) => uri.to_string(),
            None => {
                if entity.is_anonymous() {
                    if let Some(canonical) = self.find_existing_anonymous(&entity) {
                        debug!(
                            "Anonymous {} matches existing {}",
                            entity.uri(),
                            canonical
                        );
                        let alias = entity.uri().to_string();
                        if alias != canonical {
                            self.rewrite_refs(&alias, &canonical);
                        }
                        return Ok(canonical);
                    }
                }
                entity.uri().to_string()
            }
        };
        entity.set_uri(target_uri.clone());

        if !self.entities.contains_key(&target_uri) {
            self.by_class
                .entry(entity.short_name().to_string())
                .or_default()
                .insert(target_uri.clone());
            self.entities.insert(target_uri.clone(), entity);
            return Ok(target_uri);
        }

        // merge: keep whichever side has the more specific runtime class
        let existing = self.entities.remove(&target_uri).unwrap();
        let incoming_more_specific =
            registry.is_subtype_of(entity.class_uri().as_ref(), existing.class_uri().as_ref());
        let existing_more_specific =
            registry.is_subtype_of(existing.class_uri().as_ref(), entity.class_uri().as_ref());
        if !incoming_more_specific && !existing_more_specific {
            let err = IdentityConflictError {
                uri: target_uri.clone(),
                existing_class: existing.class_uri().to_string(),
                incoming_class: entity.class_uri().to_string(),
            };
            // leave prior state intact
            self.entities.insert(target_uri, existing);
            return Err(err.into());
        }
        let (mut keeper, discarded) = if incoming_more_specific {
            (entity, existing)
        } else {
            (existing, entity)
        };
        debug!("Merging {} into {}", discarded.uri(), keeper.uri());

        if let Some(index) = self.by_class.get_mut(discarded.short_name()) {
            index.remove(&target_uri);
        }

        // union every property of the discarded side into the keeper;
        // members were validated when first inserted
        for (name, set) in discarded.props() {
            match keeper.props_mut().get_mut(name) {
                Some(keeper_set) => keeper_set.absorb(set),
                None => keeper.insert_prop_set(name.clone(), set.clone()),
            }
        }

        self.by_class
            .entry(keeper.short_name().to_string())
            .or_default()
            .insert(target_uri.clone());
        self.entities.insert(target_uri.clone(), keeper);
        Ok(target_uri)
    }

    pub fn have_uri(&self, uri: &str) -> bool {
        self.entities.contains_key(uri)
    }

    pub fn get(&self, uri: &str) -> Option<&Entity> {
        self.entities.get(uri)
    }

    pub fn get_mut(&mut self, uri: &str) -> Option<&mut Entity> {
        self.entities.get_mut(uri)
    }

    /// All entities of one class short name, sorted by URI.
    pub fn by_class(&self, short_name: &str) -> Vec<&Entity> {
        let mut uris: Vec<&String> = self
            .by_class
            .get(short_name)
            .map(|set| set.iter().collect())
            .unwrap_or_default();
        uris.sort();
        uris.iter().filter_map(|uri| self.entities.get(*uri)).collect()
    }

    pub fn entities(&self) -> &HashMap<String, Entity> {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn bind(&mut self, prefix: &str, base: &str) {
        self.namespaces.insert(prefix.to_string(), base.to_string());
    }

    pub fn namespaces(&self) -> &HashMap<String, String> {
        &self.namespaces
    }

    /// Adds bindings from another table; existing prefixes keep their
    /// binding.
    pub fn merge_namespaces(&mut self, source: &HashMap<String, String>) {
        for (prefix, base) in source {
            self.namespaces
                .entry(prefix.clone())
                .or_insert_with(|| base.clone());
        }
    }

    /// Searches the per-class index for an anonymous entity with identical
    /// property contents.
    fn find_existing_anonymous(&self, entity: &Entity) -> Option<String> {
        let index = self.by_class.get(entity.short_name())?;
        let mut uris: Vec<&String> = index.iter().collect();
        uris.sort();
        for uri in uris {
            if !is_anonymous_uri(uri) {
                continue;
            }
            if let Some(candidate) = self.entities.get(uri) {
                if candidate.contents_equal(entity) {
                    info!("Found existing anonymous entity {} matching candidate", uri);
                    return Some(uri.clone());
                }
            }
        }
        None
    }

    /// Redirects every reference in the population from one URI onto
    /// another.
    fn rewrite_refs(&mut self, from: &str, to: &str) {
        for entity in self.entities.values_mut() {
            for set in entity.props_mut().values_mut() {
                set.rewrite_ref(from, to);
            }
        }
    }
}
