//! Caller-owned cache of constructed fields.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;
use rayon::prelude::*;

use super::galois::GaloisField;
use crate::error::Result;

/// Immutable fields keyed by their order q.
///
/// Entries are shared through `Arc` and never mutated, so one cache can
/// feed any number of graph builders, including ones running on other
/// threads.
#[derive(Debug, Clone, Default)]
pub struct FieldCache {
    fields: BTreeMap<u32, Arc<GaloisField>>,
}

impl FieldCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds every distinct order in `orders` in parallel.
    ///
    /// Fails with the first construction error, in ascending order of q.
    pub fn build_parallel(orders: &[u32]) -> Result<Self> {
        let mut distinct: Vec<u32> = orders.to_vec();
        distinct.sort_unstable();
        distinct.dedup();

        debug!("Building {} field(s) in parallel: {:?}", distinct.len(), distinct);
        let built: Vec<GaloisField> = distinct
            .par_iter()
            .map(|&q| GaloisField::new(q))
            .collect::<Result<Vec<_>>>()?;

        let fields = built
            .into_iter()
            .map(|field| (field.order(), Arc::new(field)))
            .collect();
        Ok(Self { fields })
    }

    pub fn get(&self, q: u32) -> Option<Arc<GaloisField>> {
        self.fields.get(&q).cloned()
    }

    /// Returns the cached GF(q), building and caching it on first use.
    pub fn get_or_build(&mut self, q: u32) -> Result<Arc<GaloisField>> {
        if let Some(field) = self.fields.get(&q) {
            return Ok(Arc::clone(field));
        }
        let field = Arc::new(GaloisField::new(q)?);
        self.fields.insert(q, Arc::clone(&field));
        Ok(field)
    }

    /// Adds an already-built field, replacing nothing if GF(q) is cached.
    pub fn insert(&mut self, field: GaloisField) -> Arc<GaloisField> {
        Arc::clone(self.fields.entry(field.order()).or_insert_with(|| Arc::new(field)))
    }

    /// Cached orders, ascending.
    pub fn orders(&self) -> Vec<u32> {
        self.fields.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
