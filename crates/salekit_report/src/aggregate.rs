//! Scalar KPIs and grouped roll-ups over a [`Dataset`].

use std::hash::Hash;

use indexmap::IndexMap;
use log::debug;
use salekit_io_csv::{Dataset, SalesRecord};

use crate::spec::{
    EnumMeasure, SpecGroup, SpecReportOptions, SpecRollup, SpecRollupSet, SpecSalesKpis,
};

/// Share of `n_part` in `n_total`, `0.0` for an empty total.
fn derive_rate(n_part: usize, n_total: usize) -> f64 {
    if n_total == 0 {
        0.0
    } else {
        n_part as f64 / n_total as f64
    }
}

/// Compute the scalar KPIs.
///
/// Status checks are independent substring tests; one status may count as
/// both cancelled and shipped, or as neither.
pub fn compute_kpis(dataset: &Dataset, options: &SpecReportOptions) -> SpecSalesKpis {
    let records = dataset.records();
    let n_orders = records.len();

    let l_amounts: Vec<f64> = records.iter().filter_map(|record| record.amount).collect();
    let revenue_total: f64 = l_amounts.iter().sum();
    let amount_mean = (!l_amounts.is_empty()).then(|| revenue_total / l_amounts.len() as f64);

    let count_status = |marker: &str| {
        records
            .iter()
            .filter(|record| {
                record
                    .status
                    .as_deref()
                    .is_some_and(|status| status.contains(marker))
            })
            .count()
    };
    let n_highlight = records
        .iter()
        .filter(|record| record.fulfilment.as_deref() == Some(options.fulfilment_highlight.as_str()))
        .count();

    SpecSalesKpis {
        n_orders,
        revenue_total,
        amount_mean,
        qty_total: records.iter().filter_map(|record| record.qty).sum(),
        rate_cancelled: derive_rate(count_status(&options.status_cancelled), n_orders),
        rate_shipped: derive_rate(count_status(&options.status_shipped), n_orders),
        share_fulfilment_highlight: derive_rate(n_highlight, n_orders),
        period: dataset.derive_period(),
    }
}

/// Group records by `key_of` in first-appearance order.
///
/// Records whose key is missing form their own group. When every key is
/// missing the roll-up is empty.
pub fn group_records<'a, K, I, F>(records: I, key_of: F) -> SpecRollup<K>
where
    K: Clone + Eq + Hash,
    I: IntoIterator<Item = &'a SalesRecord>,
    F: Fn(&SalesRecord) -> Option<K>,
{
    let mut dict_groups: IndexMap<Option<K>, SpecGroup<K>> = IndexMap::new();
    for record in records {
        let key = key_of(record);
        let group = dict_groups
            .entry(key.clone())
            .or_insert_with(|| SpecGroup::new(key));
        group.n_records += 1;
        if let Some(amount) = record.amount {
            group.amount_sum += amount;
            group.n_amounts += 1;
        }
        if let Some(qty) = record.qty {
            group.qty_sum += qty;
        }
    }

    if dict_groups.keys().all(Option::is_none) {
        return SpecRollup::default();
    }
    SpecRollup {
        groups: dict_groups.into_values().collect(),
    }
}

/// Stable descending sort by `measure`, then keep at most `n_top` groups.
pub fn rank_rollup<K>(
    mut rollup: SpecRollup<K>,
    measure: EnumMeasure,
    n_top: Option<usize>,
) -> SpecRollup<K> {
    rollup
        .groups
        .sort_by(|a, b| b.measure(measure).total_cmp(&a.measure(measure)));
    if let Some(n_top) = n_top {
        rollup.groups.truncate(n_top);
    }
    rollup
}

/// Compute every roll-up the report renders.
pub fn compute_rollups(dataset: &Dataset, options: &SpecReportOptions) -> SpecRollupSet {
    let records = dataset.records();
    let by_text = |key_of: fn(&SalesRecord) -> Option<String>,
                   measure: EnumMeasure,
                   n_top: Option<usize>| {
        rank_rollup(group_records(records, key_of), measure, n_top)
    };

    let mut daily = group_records(records.iter().filter(|r| r.date.is_some()), |r| r.date);
    daily.groups.sort_by_key(|group| group.key);

    let rollups = SpecRollupSet {
        category: by_text(|r| r.category.clone(), EnumMeasure::Revenue, None),
        state: by_text(
            |r| r.ship_state.clone(),
            EnumMeasure::Revenue,
            Some(options.n_top_states),
        ),
        city: by_text(|r| r.ship_city.clone(), EnumMeasure::Orders, None),
        size: rank_rollup(
            group_records(
                records.iter().filter(|r| r.qty.is_some_and(|qty| qty > 0.0)),
                |r| r.size.clone(),
            ),
            EnumMeasure::Quantity,
            Some(options.n_top_sizes),
        ),
        status: by_text(
            |r| r.status.clone(),
            EnumMeasure::Orders,
            Some(options.n_top_statuses),
        ),
        fulfilment: by_text(|r| r.fulfilment.clone(), EnumMeasure::Orders, None),
        segment: rank_rollup(group_records(records, |r| r.b2b), EnumMeasure::Orders, None),
        daily,
    };

    debug!(
        "rollups: category={} state={} city={} size={} status={} fulfilment={} segment={} daily={}",
        rollups.category.len(),
        rollups.state.len(),
        rollups.city.len(),
        rollups.size.len(),
        rollups.status.len(),
        rollups.fulfilment.len(),
        rollups.segment.len(),
        rollups.daily.len()
    );
    rollups
}
