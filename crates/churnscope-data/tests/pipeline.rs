use std::{collections::BTreeSet, fs};

use churnscope_data::{
    catalog::FilterKind,
    decode,
    load::{self, Dataset, LoadError},
    metrics::SummaryMetrics,
    selection::{FilterSelection, Selection},
    store::LoadedDataset,
    table::{Cell, Column, Table},
    view::{self, ProbabilityView},
};

const HEADER: &str =
    "customerID,gender,SeniorCitizen,Contract,InternetService,PaymentMethod,tenure,MonthlyCharges,TotalCharges,Churn";

fn customers_csv(rows: &[&str]) -> String {
    let mut csv = format!("{HEADER}\n");
    for row in rows {
        csv.push_str(row);
        csv.push('\n');
    }
    csv
}

fn loaded(csv: &str, probabilities: Option<Table>) -> LoadedDataset {
    let raw = load::read_table(csv.as_bytes()).unwrap();
    let dataset = Dataset::from_tables(raw, probabilities, &decode::default_mappings()).unwrap();
    LoadedDataset::new(dataset)
}

/// Ten customers with tenure 1, 3, 5, ..., 17 plus one at 24.
fn ten_customers() -> String {
    let mut rows = (0..9)
        .map(|i| {
            let tenure = 1 + 2 * i;
            format!(
                "c{i},{},0,{},{},{},{tenure},{}.5,{},{}",
                i % 2,
                i % 3,
                i % 3,
                i % 4,
                20 + 5 * i,
                (20 + 5 * i) * tenure,
                i % 2
            )
        })
        .collect::<Vec<_>>();
    rows.push("c9,1,1,2,2,3,24,99.0, ,1".to_owned());
    customers_csv(&rows.iter().map(String::as_str).collect::<Vec<_>>())
}

fn rendered(table: &Table, column: &str) -> Vec<String> {
    table
        .column(column)
        .unwrap()
        .cells()
        .map(Cell::render)
        .collect()
}

#[test]
fn scenario_a_contract_codes_decode_to_labels() {
    let loaded = loaded(
        &customers_csv(&[
            "a,0,0,0,0,0,1,20.0,20.0,0",
            "b,1,0,1,1,1,2,30.0,60.0,0",
            "c,0,1,2,2,2,3,40.0,120.0,1",
        ]),
        None,
    );
    assert_eq!(
        rendered(loaded.dataset.customers(), "Contract"),
        vec!["Month-to-month", "One year", "Two year"]
    );
}

#[test]
fn scenario_b_unmapped_code_passes_through() {
    let loaded = loaded(
        &customers_csv(&[
            "a,0,0,0,0,0,1,20.0,20.0,0",
            "b,1,1,1,1,1,2,30.0,60.0,0",
            "c,0,2,2,2,2,3,40.0,120.0,1",
        ]),
        None,
    );
    assert_eq!(
        rendered(loaded.dataset.customers(), "SeniorCitizen"),
        vec!["No", "Yes", "2"]
    );
}

#[test]
fn scenario_c_tenure_range_is_inclusive() {
    let loaded = loaded(&ten_customers(), None);
    let mut selection = loaded.default_selection();
    selection.core.tenure = (12, 24);
    let view = loaded.apply(&selection).unwrap();

    let tenures = view
        .customers
        .column("tenure")
        .unwrap()
        .numbers()
        .collect::<Vec<_>>();
    assert_eq!(tenures, vec![13.0, 15.0, 17.0, 24.0]);
    assert!(tenures.iter().all(|t| (12.0..=24.0).contains(t)));
}

#[test]
fn scenario_d_empty_internet_selection_yields_nothing() {
    let loaded = loaded(&ten_customers(), None);
    let mut selection = loaded.default_selection();
    selection.core.internet.clear();
    // widening the other filters must not matter
    selection.core.tenure = (i64::MIN, i64::MAX);
    let view = loaded.apply(&selection).unwrap();
    assert!(view.customers.is_empty());
}

#[test]
fn scenario_e_probability_view_is_index_intersection() {
    let probabilities = Table::new(vec![Column::float(
        "churn_probability",
        [Some(0.1), Some(0.2), Some(0.3), Some(0.4), Some(0.5)],
    )])
    .select_rows(&[0, 2, 4]);
    let loaded = loaded(
        &customers_csv(&[
            "a,0,0,0,0,0,1,20.0,20.0,0",
            "b,0,0,0,0,0,2,20.0,40.0,0",
            "c,0,0,0,0,0,3,20.0,60.0,0",
            "d,0,0,0,0,0,4,20.0,80.0,0",
            "e,0,0,0,0,0,5,20.0,100.0,0",
        ]),
        Some(probabilities),
    );
    let mut selection = loaded.default_selection();
    selection.core.tenure = (2, 4);
    let view = loaded.apply(&selection).unwrap();

    assert_eq!(view.customers.row_index(), &[1, 2, 3]);
    let ProbabilityView::Loaded(probs) = &view.probabilities else {
        panic!("probability view should be loaded");
    };
    assert_eq!(probs.row_index(), &[2]);
    assert_eq!(
        probs.column("churn_probability").unwrap().get(0),
        Cell::Float(0.3)
    );
}

#[test]
fn empty_dynamic_selection_law() {
    let loaded = loaded(&ten_customers(), None);
    for spec in &loaded.catalog.dynamic {
        if matches!(spec.kind, FilterKind::DiscreteSet { .. }) {
            let selection = loaded
                .default_selection()
                .with(spec.column.clone(), Selection::Set(BTreeSet::new()));
            let view = loaded.apply(&selection).unwrap();
            assert!(view.customers.is_empty(), "filter {}", spec.column);
        }
    }
}

#[test]
fn row_alignment_law() {
    let probabilities = Table::new(vec![Column::float(
        "churn_probability",
        (0..10).map(|i| Some(f64::from(i) / 10.0)),
    )]);
    let loaded = loaded(&ten_customers(), Some(probabilities));
    let selections = [(1, 24), (5, 15), (20, 30), (30, 1)];
    for tenure in selections {
        let mut selection = loaded.default_selection();
        selection.core.tenure = tenure;
        let view = loaded.apply(&selection).unwrap();
        let probs = view.probabilities.table().unwrap();
        let ids = probs.row_index();
        let unique = ids.iter().collect::<BTreeSet<_>>();
        assert_eq!(unique.len(), ids.len());
        assert!(ids.iter().all(|id| view.customer_position(*id).is_some()));
        assert_eq!(ids, view.customers.row_index());
    }
}

#[test]
fn metric_boundary_on_empty_view() {
    let loaded = loaded(&ten_customers(), None);
    let mut selection = loaded.default_selection();
    selection.core.contract.clear();
    let view = loaded.apply(&selection).unwrap();
    let metrics = SummaryMetrics::from_table(&view.customers);
    assert_eq!(metrics.total, 0);
    assert!(metrics.churn_rate.abs() < f64::EPSILON);
    assert!(metrics.mean_monthly_charge.abs() < f64::EPSILON);
}

#[test]
fn catalog_and_selection_roundtrip_through_json() {
    let loaded = loaded(&ten_customers(), None);
    let selection = loaded.default_selection();
    let json = serde_json::to_string(&selection).unwrap();
    let parsed: FilterSelection = serde_json::from_str(&json).unwrap();
    assert_eq!(
        loaded.apply(&parsed).unwrap(),
        loaded.apply(&selection).unwrap()
    );
}

#[test]
fn load_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let customers = dir.path().join("customers.csv");
    let probabilities = dir.path().join("probabilities.csv");
    fs::write(&customers, ten_customers()).unwrap();
    let mut probs_csv = String::from("churn_probability\n");
    for i in 0..10 {
        probs_csv.push_str(&format!("0.{i}\n"));
    }
    fs::write(&probabilities, probs_csv).unwrap();

    let dataset = Dataset::load(&customers, Some(probabilities.as_path())).unwrap();
    assert_eq!(dataset.customers().row_count(), 10);
    assert_eq!(dataset.probabilities().map(Table::row_count), Some(10));
    // blank TotalCharges becomes missing
    assert_eq!(
        dataset.customers().column("TotalCharges").unwrap().get(9),
        Cell::Missing
    );

    let missing_probs = dir.path().join("nope.csv");
    let dataset = Dataset::load(&customers, Some(missing_probs.as_path())).unwrap();
    let loaded = LoadedDataset::new(dataset);
    let view = loaded.apply(&loaded.default_selection()).unwrap();
    assert!(view.probabilities.is_absent());

    let err = Dataset::load(&dir.path().join("missing.csv"), None).unwrap_err();
    assert!(matches!(err, LoadError::DatasetNotFound { .. }));
}

#[test]
fn align_rows_ignores_content() {
    let primary = Table::new(vec![Column::text("id", [Some("x"), Some("y"), Some("z")])]);
    // same content, different identities
    let secondary = Table::new(vec![Column::text("id", [Some("z"), Some("y"), Some("x")])]);
    let aligned = view::align_rows(&primary.select_rows(&[0]), &secondary);
    assert_eq!(rendered(&aligned, "id"), vec!["z"]);
}

#[test]
fn missing_tokens_are_missing_values() {
    let loaded = loaded(
        &customers_csv(&[
            "a,0,0,0,0,0,1,20.0,20.0,0",
            "b,0,0,2,0,0,2,NaN,40.0,0",
            "c,0,0,,0,0,3,30.0,60.0,0",
            "d,0,0,NA,0,0,4,30.0,80.0,0",
        ]),
        None,
    );
    let customers = loaded.dataset.customers();
    assert_eq!(
        rendered(customers, "Contract"),
        vec!["Month-to-month", "Two year", "nan", "nan"]
    );

    let metrics = SummaryMetrics::from_table(customers);
    assert_eq!(metrics.total, 4);
    assert!((metrics.mean_monthly_charge - 80.0 / 3.0).abs() < 1e-9);

    // missing contracts stay selectable through the "nan" option
    let view = loaded.apply(&loaded.default_selection()).unwrap();
    assert_eq!(view.customers.row_count(), 4);
}
