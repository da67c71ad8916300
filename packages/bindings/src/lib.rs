use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use farm_analytics_core::analysis::AnalysisInput;
use farm_analytics_core::budgets::{Budget, InMemoryBudgetStore};
use farm_analytics_core::crop_defaults::CropDefaults;

fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Units & variance
// ---------------------------------------------------------------------------

#[napi]
pub fn convert_unit(input_json: String) -> NapiResult<String> {
    let input: farm_analytics_core::units::ConversionInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = farm_analytics_core::units::convert_value(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn cost_variance(input_json: String) -> NapiResult<String> {
    let input: farm_analytics_core::costs::variance::CostVarianceInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        farm_analytics_core::costs::variance::analyze_cost_variance(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Costs & benchmarks
// ---------------------------------------------------------------------------

#[napi]
pub fn aggregate_costs(input_json: String) -> NapiResult<String> {
    let input: farm_analytics_core::costs::aggregate::AggregateInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = farm_analytics_core::costs::aggregate::aggregate_costs(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn benchmark_position(input_json: String) -> NapiResult<String> {
    let input: farm_analytics_core::benchmark::BenchmarkInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = farm_analytics_core::benchmark::evaluate_benchmarks(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Profitability
// ---------------------------------------------------------------------------

#[napi]
pub fn evaluate_profitability(input_json: String) -> NapiResult<String> {
    let input: farm_analytics_core::profitability::ProfitabilityInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        farm_analytics_core::profitability::analyze_profitability(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Crop analysis
// ---------------------------------------------------------------------------

/// The host owns budget persistence; it passes the saved budgets and the
/// crop defaults alongside the record on every call.
#[derive(Deserialize)]
struct AnalyzeCropRequest {
    analysis: AnalysisInput,
    #[serde(default)]
    budgets: Vec<Budget>,
    crop_defaults: CropDefaults,
}

#[napi]
pub fn analyze_crop(input_json: String) -> NapiResult<String> {
    let request: AnalyzeCropRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let store = InMemoryBudgetStore::with_budgets(request.budgets).map_err(to_napi_error)?;
    let output = farm_analytics_core::analysis::analyze_crop(&request.analysis, &store, &request.crop_defaults)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
