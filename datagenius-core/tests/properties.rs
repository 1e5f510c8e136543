//! Property tests for the analyses over arbitrary, possibly ragged tables.

use chrono::{TimeZone, Utc};
use datagenius_core::analysis::{
    AnalysisStamp, TOP_VALUE_LIMIT, anomaly_table, classifier::round_to, compliance_table,
    profile_table, quality_table, summary_table,
};
use datagenius_core::{AnalysisConfig, Cell, ReportContext, TableData};
use proptest::prelude::*;
use proptest::test_runner::Config;

fn context() -> ReportContext {
    ReportContext::new("App", "T").with_stamp(AnalysisStamp::at(
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
    ))
}

fn cell_strategy() -> impl Strategy<Value = Cell> {
    prop_oneof![
        "[a-zA-Z ]{0,6}".prop_map(Cell::Text),
        "-?[0-9]{1,4}(\\.[0-9]{1,2})?".prop_map(Cell::Text),
        (-1.0e6..1.0e6_f64).prop_map(Cell::Number),
        Just(Cell::Null),
        Just(Cell::Text("   ".to_string())),
    ]
}

fn table_strategy() -> impl Strategy<Value = TableData> {
    (0_usize..6).prop_flat_map(|width| {
        let headers = proptest::collection::vec("[a-z]{1,8}", width);
        // Rows may be shorter or longer than the header row
        let rows = proptest::collection::vec(
            proptest::collection::vec(cell_strategy(), 0..=width + 2),
            0..24,
        );
        (headers, rows).prop_map(|(headers, rows)| TableData { headers, rows })
    })
}

fn number(cell: &Cell) -> f64 {
    match cell {
        Cell::Number(n) => *n,
        other => panic!("expected a number, got {:?}", other),
    }
}

proptest! {
    #![proptest_config(Config::with_cases(128))]

    #[test]
    fn profile_and_quality_have_one_row_per_field(table in table_strategy()) {
        let ctx = context();
        let config = AnalysisConfig::default();

        prop_assert_eq!(profile_table(&table, &ctx).rows.len(), table.headers.len());
        prop_assert_eq!(quality_table(&table, &ctx, &config).rows.len(), table.headers.len());
        prop_assert_eq!(compliance_table(&ctx).rows.len(), 4);
    }

    #[test]
    fn completeness_matches_null_and_blank_arithmetic(table in table_strategy()) {
        let report = profile_table(&table, &context());

        for row in &report.rows {
            let total = number(&row[3]);
            let nulls = number(&row[6]);
            let blanks = number(&row[7]);
            let completeness = number(&row[5]);

            // Every null-like cell is also blank
            prop_assert!(nulls <= blanks);
            prop_assert!(blanks <= total);

            let expected = if total == 0.0 {
                0.0
            } else {
                round_to(100.0 * ((total - nulls - blanks) / total), 2)
            };
            prop_assert_eq!(completeness, expected);
            prop_assert!(completeness <= 100.0);
        }
    }

    #[test]
    fn reports_are_deterministic(table in table_strategy()) {
        let ctx = context();
        let config = AnalysisConfig::default();

        prop_assert_eq!(profile_table(&table, &ctx), profile_table(&table, &ctx));
        prop_assert_eq!(
            quality_table(&table, &ctx, &config),
            quality_table(&table, &ctx, &config)
        );
        prop_assert_eq!(
            anomaly_table(&table, &ctx, &config),
            anomaly_table(&table, &ctx, &config)
        );
    }

    #[test]
    fn identical_values_never_flag_outliers(value in -1.0e6..1.0e6_f64, count in 1_usize..40) {
        let table = TableData::new(["v"], vec![vec![Cell::Number(value)]; count]);
        let report = anomaly_table(&table, &context(), &AnalysisConfig::default());
        prop_assert!(report.rows.is_empty());
    }

    #[test]
    fn blank_only_column_reports_every_row(count in 0_usize..40) {
        let table = TableData::new(["notes"], vec![vec![Cell::text("")]; count]);
        let report = anomaly_table(&table, &context(), &AnalysisConfig::default());

        prop_assert_eq!(report.rows.len(), count);
        for row in &report.rows {
            prop_assert_eq!(&row[4], &Cell::text("Blank Value"));
        }
    }

    #[test]
    fn summary_reports_table_size_and_bounded_top_values(table in table_strategy()) {
        let report = summary_table(&table, &context());

        prop_assert_eq!(number(&report.rows[0][5]), table.row_count() as f64);
        prop_assert_eq!(number(&report.rows[1][5]), table.column_count() as f64);

        for (_, field, _) in table.columns() {
            let listed = report
                .rows
                .iter()
                .filter(|row| row[2] == Cell::text("Top Values") && row[3] == Cell::text(field))
                .count();
            // Duplicate header names share a label
            let same_name = table.headers.iter().filter(|h| h.as_str() == field).count();
            prop_assert!(listed <= TOP_VALUE_LIMIT * same_name);
        }
    }

    #[test]
    fn quality_scores_stay_in_range(table in table_strategy()) {
        let report = quality_table(&table, &context(), &AnalysisConfig::default());

        for row in &report.rows {
            let uniqueness = number(&row[5]);
            let validity = number(&row[6]);
            prop_assert!((0.0..=100.0).contains(&uniqueness));
            prop_assert!(validity == 95.0 || validity == 80.0);
        }
    }
}
