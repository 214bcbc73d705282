//! Cached global transforms
//!
//! [`Scene::global_transform`] multiplies the chain of local transforms on
//! every call. [`GlobalTransformResolver`] keeps the product per node and
//! reuses it while the chain from the node to the top of its tree is
//! unchanged: same nodes, same transform revisions. Re-parenting, adding or
//! removing a transform, and any transform mutation along the chain all
//! break the signature and force a recompute.

use super::{NodeId, Scene};
use crate::foundation::collections::SecondaryMap;
use crate::foundation::math::Mat4;

#[derive(Debug, Clone)]
struct CachedGlobal {
    matrix: Mat4,
    // (node, transform revision) from the node itself up to the top
    chain: Vec<(NodeId, Option<u64>)>,
}

/// Revision-checked cache of global transforms
#[derive(Debug, Default)]
pub struct GlobalTransformResolver {
    cache: SecondaryMap<NodeId, CachedGlobal>,
    hits: u64,
    misses: u64,
}

impl GlobalTransformResolver {
    /// Empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Global transform of `id`, from cache when still valid. Ancestors
    /// are resolved, and cached, along the way.
    pub fn resolve(&mut self, scene: &Scene, id: NodeId) -> Option<Mat4> {
        if !scene.contains(id) {
            self.cache.remove(id);
            return None;
        }

        if let Some(cached) = self.cache.get(id) {
            if chain_matches(scene, id, &cached.chain) {
                self.hits += 1;
                return Some(cached.matrix);
            }
        }
        self.misses += 1;

        let (parent_global, mut chain) = match scene.parent(id) {
            Some(parent) => {
                let matrix = self.resolve(scene, parent)?;
                let chain = self
                    .cache
                    .get(parent)
                    .map(|c| c.chain.clone())
                    .unwrap_or_default();
                (matrix, chain)
            }
            None => (Mat4::identity(), Vec::new()),
        };

        let matrix = parent_global * scene.local_transform(id);
        chain.insert(0, (id, scene.transform_revision(id)));
        self.cache.insert(id, CachedGlobal { matrix, chain });
        Some(matrix)
    }

    /// Drop the cached entry of `id`
    pub fn invalidate(&mut self, id: NodeId) {
        self.cache.remove(id);
    }

    /// Drop the entries of nodes no longer in `scene`, returning how many
    /// were removed
    pub fn prune(&mut self, scene: &Scene) -> usize {
        let before = self.cache.len();
        self.cache.retain(|id, _| scene.contains(id));
        let removed = before - self.cache.len();
        if removed > 0 {
            log::trace!("resolver pruned {removed} stale entries");
        }
        removed
    }

    /// Drop every cached entry
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if nothing is cached
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Cache hits and misses since creation
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}

fn chain_matches(scene: &Scene, id: NodeId, chain: &[(NodeId, Option<u64>)]) -> bool {
    let mut links = std::iter::once(id).chain(scene.ancestors(id));
    chain
        .iter()
        .all(|(node, revision)| {
            links.next() == Some(*node) && scene.transform_revision(*node) == *revision
        })
        && links.next().is_none()
}
