//! Drives a [`ProductionAnalytics`] engine through a scenario on a
//! simulated clock and renders dashboard rows from the result.

use std::collections::BTreeMap;

use serde::Serialize;
use shapeflow_stats::{AnalyticsConfig, DataSource, ItemKey, ProductionAnalytics, SourceKind};

use crate::error::DemoError;
use crate::scenario::Scenario;

/// Engine state after a scenario has run to completion.
#[derive(Debug)]
pub struct ScenarioRun {
    pub analytics: ProductionAnalytics,
    /// Live stored quantities at the end of the run.
    pub stored: BTreeMap<ItemKey, u64>,
    pub steps: u64,
    pub events: u64,
    /// Simulated time at which the run ended.
    pub elapsed_secs: f64,
}

/// One row of the statistics dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardRow {
    pub source: DataSource,
    pub key: ItemKey,
    /// Live stock level for `Stored` rows, last closed slice otherwise.
    pub rate: u64,
    /// `None` for `Stored`, whose values are stock levels rather than flows.
    pub per_minute: Option<f64>,
    /// Closed slices, oldest first.
    pub history: Vec<u64>,
}

/// Run `scenario` against a fresh engine built from `config`.
///
/// Each step grows the stores, emits due flow events into the open slice,
/// then hands the clock to [`ProductionAnalytics::update`].
pub fn run_scenario(config: AnalyticsConfig, scenario: &Scenario) -> Result<ScenarioRun, DemoError> {
    scenario.validate()?;

    let mut stored: BTreeMap<ItemKey, u64> = scenario
        .stores
        .iter()
        .map(|s| (ItemKey::from(s.key.as_str()), s.initial))
        .collect();
    let mut analytics = ProductionAnalytics::with_live_state(config, &stored)?;

    let steps = scenario.step_count();
    let mut events = 0u64;
    let mut now = 0.0;
    for step in 1..=steps {
        now = (step as f64 * scenario.step_secs).min(scenario.duration_secs);

        for store in &scenario.stores {
            let quantity = stored.entry(ItemKey::from(store.key.as_str())).or_default();
            *quantity = quantity.saturating_add(store.per_step);
        }
        for flow in scenario.flows.iter().filter(|f| f.fires(step, now)) {
            analytics.on_counter_event(flow.event.source(), &flow.key, flow.count)?;
            events += 1;
        }
        analytics.update(now, &stored);
    }

    tracing::info!(
        title = %scenario.title,
        steps,
        events,
        rotations = analytics.rotation_count(),
        "scenario finished"
    );

    Ok(ScenarioRun {
        analytics,
        stored,
        steps,
        events,
        elapsed_secs: now,
    })
}

/// Ranked dashboard rows for `source`, at most `limit` of them.
pub fn dashboard(
    run: &ScenarioRun,
    source: DataSource,
    limit: usize,
) -> Result<Vec<DashboardRow>, DemoError> {
    let analytics = &run.analytics;
    analytics
        .ranked_rates(source, &run.stored, limit)?
        .into_iter()
        .map(|(key, rate)| -> Result<DashboardRow, DemoError> {
            Ok(DashboardRow {
                source,
                per_minute: match source.kind() {
                    SourceKind::Counter => Some(
                        analytics
                            .rate_per_minute(source, key.as_str())?
                            .to_num::<f64>(),
                    ),
                    SourceKind::Gauge => None,
                },
                history: analytics.rate_history(source, key.as_str())?,
                key,
                rate,
            })
        })
        .collect()
}
