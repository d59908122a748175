//! Ordered storage of layer features.

/// Insertion-ordered storage of the features of a layer.
///
/// Iteration always goes in the order the features were added, and indices are positions in that
/// order. Removing a feature shifts the indices of the features after it.
#[derive(Debug, Clone)]
pub struct FeatureStore<F> {
    features: Vec<F>,
}

impl<F> Default for FeatureStore<F> {
    fn default() -> Self {
        Self { features: vec![] }
    }
}

/// Immutable container for a feature in a [`FeatureStore`].
///
/// Reference to the container can be converted into a reference to the feature using [`AsRef`]
/// trait.
#[derive(Debug)]
pub struct FeatureContainer<'a, F> {
    feature: &'a F,
    feature_index: usize,
}

impl<F> FeatureContainer<'_, F> {
    /// Index of the feature in the store.
    pub fn index(&self) -> usize {
        self.feature_index
    }
}

impl<F> AsRef<F> for FeatureContainer<'_, F> {
    fn as_ref(&self) -> &F {
        self.feature
    }
}

impl<F> FeatureStore<F> {
    /// Creates a new store with the given feature set.
    pub fn new(features: impl IntoIterator<Item = F>) -> Self {
        Self {
            features: features.into_iter().collect(),
        }
    }

    /// Adds a new feature to the end of the store and returns its index.
    pub fn insert(&mut self, feature: F) -> usize {
        self.features.push(feature);
        self.features.len() - 1
    }

    /// Appends all the features to the end of the store.
    pub fn extend(&mut self, features: impl IntoIterator<Item = F>) {
        self.features.extend(features);
    }

    /// Returns a reference to the feature. Returns `None` if a feature with the given `index`
    /// does not exist.
    pub fn get(&self, index: usize) -> Option<&F> {
        self.features.get(index)
    }

    /// Removes the feature at the given index. Returns `None` if it does not exist.
    pub fn remove(&mut self, index: usize) -> Option<F> {
        if index < self.features.len() {
            Some(self.features.remove(index))
        } else {
            None
        }
    }

    /// Removes all features.
    pub fn clear(&mut self) {
        self.features.clear();
    }

    /// Number of features in the store.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// True if the store has no features.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Iterates over immutable containers of the features in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = FeatureContainer<'_, F>> {
        self.features
            .iter()
            .enumerate()
            .map(|(feature_index, feature)| FeatureContainer {
                feature,
                feature_index,
            })
    }

    /// Iterates over the features themselves in insertion order.
    pub fn features(&self) -> impl Iterator<Item = &F> {
        self.features.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order() {
        let mut store = FeatureStore::new(["a", "b"]);
        assert_eq!(store.insert("c"), 2);

        let order: Vec<_> = store.iter().map(|c| (c.index(), *c.as_ref())).collect();
        assert_eq!(order, vec![(0, "a"), (1, "b"), (2, "c")]);
    }

    #[test]
    fn remove_shifts_following_features() {
        let mut store = FeatureStore::new(["a", "b", "c"]);
        assert_eq!(store.remove(0), Some("a"));
        assert_eq!(store.get(0), Some(&"b"));
        assert_eq!(store.remove(5), None);
        assert_eq!(store.len(), 2);

        store.clear();
        assert!(store.is_empty());
    }
}
