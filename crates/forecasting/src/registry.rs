//! Ordered set of the methods a run evaluates.

use stockplan_core::{ModelName, ProductKey, TimeSeriesPoint};

use crate::error::ForecastError;
use crate::method::ForecastMethod;
use crate::methods::{BaselineMethod, HoltWinters, LinearTrend, SeasonalNaive, Statistic};

/// Closed set of method kinds the planner knows how to run.
#[derive(Debug, Clone)]
pub enum MethodKind {
    Baseline(BaselineMethod),
    LinearTrend(LinearTrend),
    SeasonalNaive(SeasonalNaive),
    HoltWinters(HoltWinters),
}

impl ForecastMethod for MethodKind {
    fn name(&self) -> ModelName {
        match self {
            MethodKind::Baseline(m) => m.name(),
            MethodKind::LinearTrend(m) => m.name(),
            MethodKind::SeasonalNaive(m) => m.name(),
            MethodKind::HoltWinters(m) => m.name(),
        }
    }

    fn fit(&mut self, history: &[TimeSeriesPoint], product: &ProductKey) -> Result<(), ForecastError> {
        match self {
            MethodKind::Baseline(m) => m.fit(history, product),
            MethodKind::LinearTrend(m) => m.fit(history, product),
            MethodKind::SeasonalNaive(m) => m.fit(history, product),
            MethodKind::HoltWinters(m) => m.fit(history, product),
        }
    }

    fn predict(&self, product: &ProductKey, periods: usize) -> Vec<f64> {
        match self {
            MethodKind::Baseline(m) => m.predict(product, periods),
            MethodKind::LinearTrend(m) => m.predict(product, periods),
            MethodKind::SeasonalNaive(m) => m.predict(product, periods),
            MethodKind::HoltWinters(m) => m.predict(product, periods),
        }
    }

    fn reset(&mut self) {
        match self {
            MethodKind::Baseline(m) => m.reset(),
            MethodKind::LinearTrend(m) => m.reset(),
            MethodKind::SeasonalNaive(m) => m.reset(),
            MethodKind::HoltWinters(m) => m.reset(),
        }
    }
}

/// Ordered registry the orchestrator iterates uniformly.
///
/// Registration order is the iteration order, which keeps runs reproducible.
#[derive(Debug, Clone, Default)]
pub struct MethodRegistry {
    methods: Vec<MethodKind>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The six methods the planner evaluates by default.
    pub fn standard() -> Self {
        Self::new()
            .with(MethodKind::Baseline(BaselineMethod::new(Statistic::Mean)))
            .with(MethodKind::Baseline(BaselineMethod::new(Statistic::Median)))
            .with(MethodKind::Baseline(BaselineMethod::new(Statistic::Last)))
            .with(MethodKind::LinearTrend(LinearTrend::new()))
            .with(MethodKind::SeasonalNaive(SeasonalNaive::weekly()))
            .with(MethodKind::HoltWinters(HoltWinters::weekly()))
    }

    /// Register a method; a method with the same name replaces the earlier one.
    pub fn with(mut self, method: MethodKind) -> Self {
        let name = method.name();
        match self.methods.iter().position(|m| m.name() == name) {
            Some(idx) => self.methods[idx] = method,
            None => self.methods.push(method),
        }
        self
    }

    pub fn names(&self) -> Vec<ModelName> {
        self.methods.iter().map(ForecastMethod::name).collect()
    }

    pub fn get_mut(&mut self, name: &ModelName) -> Option<&mut MethodKind> {
        self.methods.iter_mut().find(|m| &m.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MethodKind> {
        self.methods.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut MethodKind> {
        self.methods.iter_mut()
    }

    pub fn reset_all(&mut self) {
        self.methods.iter_mut().for_each(ForecastMethod::reset);
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}
