//! Dashboard analytics over the whole dataset

pub mod correlation;
pub mod decomposition;
pub mod summary;

pub use correlation::{CorrelationMatrix, correlation_matrix};
pub use decomposition::{
    Decomposition, DecompositionPoint, SEASONAL_PERIOD, decompose, monthly_seasonal_pattern,
};
pub use summary::{
    AnnualAggregate, DescriptiveStatistics, VariableSummary, annual_aggregates, describe,
};
