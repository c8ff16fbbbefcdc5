use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

use crate::ast::Tree;

/// Identifies a parsed tree: the URI and the delimiters it was parsed with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// The URI the source was fetched from.
    pub uri:   String,
    /// The left delimiter.
    pub left:  String,
    /// The right delimiter.
    pub right: String,
}

impl CacheKey {
    /// Creates a key.
    #[must_use]
    pub fn new(uri: &str, left: &str, right: &str) -> Self {
        Self { uri:   uri.to_string(),
               left:  left.to_string(),
               right: right.to_string(), }
    }
}

/// Shares parsed trees between renders and engines.
///
/// Trees are immutable once built. Insertion is the only write; when two
/// builders race for the same key, the first tree published wins and both
/// callers get it.
#[derive(Debug, Default)]
pub struct TreeCache {
    trees: RwLock<HashMap<CacheKey, Arc<Tree>>>,
}

impl TreeCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the tree for `key`, if cached.
    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<Arc<Tree>> {
        self.trees.read().unwrap_or_else(PoisonError::into_inner).get(key).cloned()
    }

    /// Publishes `tree` under `key` unless a tree is already there, and
    /// returns the cached tree.
    pub fn insert(&self, key: CacheKey, tree: Tree) -> Arc<Tree> {
        let mut trees = self.trees.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(trees.entry(key).or_insert_with(|| Arc::new(tree)))
    }

    /// Returns the cached tree for `key`, or builds one with `build` outside
    /// the lock and publishes it.
    ///
    /// # Errors
    /// Whatever `build` returns; nothing is cached then.
    ///
    /// # Example
    /// ```
    /// use templar::{
    ///     ast::{Node, Tree},
    ///     interpreter::resource::cache::{CacheKey, TreeCache},
    /// };
    ///
    /// let cache = TreeCache::new();
    /// let key = CacheKey::new("a.tpl", "{", "}");
    /// let build = || Ok::<_, ()>(Tree::new(Node::Root { children: Vec::new() }, "a.tpl", "{", "}"));
    ///
    /// let first = cache.get_or_insert_with(key.clone(), build).unwrap();
    /// let second = cache.get_or_insert_with(key, build).unwrap();
    ///
    /// assert!(std::sync::Arc::ptr_eq(&first, &second));
    /// ```
    pub fn get_or_insert_with<E>(&self,
                                 key: CacheKey,
                                 build: impl FnOnce() -> Result<Tree, E>)
                                 -> Result<Arc<Tree>, E> {
        if let Some(tree) = self.get(&key) {
            tracing::debug!(uri = %key.uri, "tree cache hit");
            return Ok(tree);
        }

        let tree = build()?;
        tracing::debug!(uri = %key.uri, "tree cache insert");
        Ok(self.insert(key, tree))
    }

    /// Drops every cached tree for `uri`.
    pub fn invalidate(&self, uri: &str) {
        self.trees
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|key, _| key.uri != uri);
    }

    /// Returns the number of cached trees.
    #[must_use]
    pub fn len(&self) -> usize {
        self.trees.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
