//! Per-product fitted state, owned by one method instance.

use std::collections::HashMap;

use stockplan_core::ProductKey;

/// Outcome of the last `fit` call for a product.
#[derive(Debug, Clone, PartialEq)]
pub enum FitState<S> {
    Fitted(S),
    /// Empty or ill-conditioned history; the product forecasts zeros.
    Unfit,
}

/// Explicitly scoped key-value store of fitted state.
///
/// Each method instance owns one store; tests can inject a pre-populated store
/// or call [`ModelStore::clear`] between runs.
#[derive(Debug, Clone)]
pub struct ModelStore<S> {
    states: HashMap<ProductKey, FitState<S>>,
}

impl<S> ModelStore<S> {
    pub fn new() -> Self {
        Self {
            states: HashMap::new(),
        }
    }

    pub fn record_fit(&mut self, product: &ProductKey, state: S) {
        self.states.insert(product.clone(), FitState::Fitted(state));
    }

    pub fn record_unfit(&mut self, product: &ProductKey) {
        self.states.insert(product.clone(), FitState::Unfit);
    }

    /// Fitted state, if the last fit for `product` succeeded.
    pub fn fitted(&self, product: &ProductKey) -> Option<&S> {
        match self.states.get(product) {
            Some(FitState::Fitted(s)) => Some(s),
            _ => None,
        }
    }

    pub fn state(&self, product: &ProductKey) -> Option<&FitState<S>> {
        self.states.get(product)
    }

    pub fn is_fitted(&self, product: &ProductKey) -> bool {
        self.fitted(product).is_some()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }
}

impl<S> Default for ModelStore<S> {
    fn default() -> Self {
        Self::new()
    }
}
