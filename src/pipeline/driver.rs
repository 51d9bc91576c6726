//! Pipeline driver: load the four sources, build the five products, report.

use chrono::Utc;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{info, instrument};

use crate::config::Config;
use crate::error::Result;
use crate::metrics::{ClassifierMetrics, PipelineMetrics};
use crate::pipeline::manifest::{
    sha256_file, write_manifest, ProductFile, ProductReport, RunReport, SecurityCounts,
    SourceSummary,
};
use crate::pipeline::products::{
    ProductSpec, SourceSpec, CLEANED_PATCH_COLUMN, COMMIT_DETAILS_PRODUCT, COMMIT_DETAILS_SOURCE,
    PULL_REQUEST_PRODUCT, PULL_REQUEST_SOURCE, REPOSITORY_PRODUCT, REPOSITORY_SOURCE,
    SECURITY_COLUMN, SECURITY_JOIN_LEFT, SECURITY_JOIN_RIGHT, SECURITY_SUMMARY_PRODUCT,
    TASK_TYPE_PRODUCT, TASK_TYPE_SOURCE,
};
use crate::pipeline::sanitize::sanitize_cell;
use crate::pipeline::security::SecurityMatcher;
use crate::pipeline::writer::write_chunked_detailed;
use crate::source::read_parquet_table;
use crate::table::{Cell, Table};

const RULE: &str = "================================================================================";

pub struct Pipeline;

impl Pipeline {
    /// Run every product in order. The first error aborts the run; products
    /// already written stay on disk.
    #[instrument(skip(config), fields(output_dir = %config.paths.output_dir.display()))]
    pub fn run(config: &Config) -> Result<RunReport> {
        config.validate()?;
        let started = Instant::now();
        let output_dir = config.paths.output_dir.as_path();
        fs::create_dir_all(output_dir)?;

        let matcher = SecurityMatcher::new(&config.security.keywords)?;

        println!("{RULE}");
        println!("PR dataset export: Tasks 1-5");
        println!("{RULE}");

        println!("\nLoading data files...");
        let mut sources = Vec::with_capacity(4);
        let pull_requests =
            Self::load_source(&config.paths.pull_request_path(), PULL_REQUEST_SOURCE, &mut sources)?;
        let repositories =
            Self::load_source(&config.paths.repository_path(), REPOSITORY_SOURCE, &mut sources)?;
        let task_types =
            Self::load_source(&config.paths.task_type_path(), TASK_TYPE_SOURCE, &mut sources)?;
        let commit_details = Self::load_source(
            &config.paths.commit_details_path(),
            COMMIT_DETAILS_SOURCE,
            &mut sources,
        )?;
        for source in &sources {
            println!("  Loaded {}: {} rows", source.name, thousands(source.rows));
        }

        let mut products = Vec::with_capacity(5);

        // Products 1 and 3 stay alive until the security summary is built.
        Self::announce(&PULL_REQUEST_PRODUCT);
        let task1 = pull_requests.into_projected(PULL_REQUEST_PRODUCT.columns)?;
        products.push(Self::write_product(&PULL_REQUEST_PRODUCT, &task1, config)?);

        Self::announce(&REPOSITORY_PRODUCT);
        let task2 = repositories.into_projected(REPOSITORY_PRODUCT.columns)?;
        products.push(Self::write_product(&REPOSITORY_PRODUCT, &task2, config)?);
        drop(task2);

        Self::announce(&TASK_TYPE_PRODUCT);
        let task3 = task_types.into_projected(TASK_TYPE_PRODUCT.columns)?;
        products.push(Self::write_product(&TASK_TYPE_PRODUCT, &task3, config)?);

        Self::announce(&COMMIT_DETAILS_PRODUCT);
        println!("  Cleaning patch data to remove special characters...");
        let task4 = build_commit_details(commit_details)?;
        products.push(Self::write_product(&COMMIT_DETAILS_PRODUCT, &task4, config)?);
        drop(task4);

        Self::announce(&SECURITY_SUMMARY_PRODUCT);
        println!("  Merging pull request and task type data...");
        println!("  Checking for security keywords in titles and bodies...");
        let (task5, counts) = build_security_summary(task1, task3, &matcher)?;
        let mut report5 = Self::write_product(&SECURITY_SUMMARY_PRODUCT, &task5, config)?;
        println!("  Security-related PRs (SECURITY=1): {}", thousands(counts.flagged));
        println!("  Non-security PRs (SECURITY=0): {}", thousands(counts.clean));
        report5.security = Some(counts);
        products.push(report5);

        println!("\n{RULE}");
        println!("SUMMARY: All Tasks Completed Successfully");
        println!("{RULE}\n");
        for product in &products {
            println!(
                "Task {}: {}/ - {} rows",
                product.task,
                output_dir.join(&product.name).display(),
                thousands(product.rows)
            );
        }

        let duration_secs = started.elapsed().as_secs_f64();
        PipelineMetrics::record_run_finished(duration_secs);

        let report = RunReport {
            generated_at: Utc::now(),
            output_dir: output_dir.display().to_string(),
            max_rows_per_file: config.output.max_rows_per_file,
            keyword_count: matcher.keyword_count(),
            sources,
            products,
            duration_secs,
        };

        if config.output.write_manifest {
            let manifest_path = write_manifest(&report, output_dir)?;
            info!("Saved run summary to {}", manifest_path.display());
        }
        println!(
            "\nAll output files saved to individual folders in {}/",
            output_dir.display()
        );
        println!("{RULE}");

        Ok(report)
    }

    fn load_source(path: &Path, spec: SourceSpec, sources: &mut Vec<SourceSummary>) -> Result<Table> {
        let started = Instant::now();
        let table = read_parquet_table(path, spec.name, spec.columns)?;
        PipelineMetrics::record_source_loaded(spec.name, table.num_rows(), started.elapsed().as_secs_f64());
        sources.push(SourceSummary {
            name: spec.name.to_string(),
            path: path.display().to_string(),
            rows: table.num_rows(),
        });
        Ok(table)
    }

    fn announce(spec: &ProductSpec) {
        println!("\n{RULE}");
        println!("TASK {}: Creating {} CSV", spec.task, spec.title);
        println!("{RULE}");
    }

    fn write_product(spec: &ProductSpec, table: &Table, config: &Config) -> Result<ProductReport> {
        let written = write_chunked_detailed(
            table,
            &spec.base_name(),
            &config.paths.output_dir,
            config.output.max_rows_per_file,
        )?;

        let mut files = Vec::with_capacity(written.paths.len());
        for (path, rows) in written.paths.iter().zip(&written.rows_per_part) {
            files.push(ProductFile {
                path: path.display().to_string(),
                rows: *rows,
                sha256: sha256_file(path)?,
            });
        }

        println!("  Rows: {}", thousands(table.num_rows()));
        println!("  Columns: {}", column_list(table.columns()));
        info!(
            product = spec.name,
            rows = table.num_rows(),
            files = files.len(),
            "Product written"
        );
        PipelineMetrics::record_product_completed(spec.name, table.num_rows(), files.len());

        Ok(ProductReport {
            task: spec.task,
            name: spec.name.to_string(),
            rows: table.num_rows(),
            columns: table.columns().to_vec(),
            files,
            security: None,
        })
    }
}

/// Product 4: commit details with the patch sanitized into `PRDIFF`.
///
/// Consumes the source table; only the cleaned patch column is newly allocated.
pub fn build_commit_details(commit_details: Table) -> Result<Table> {
    let cleaned: Vec<Cell> = commit_details.column("patch")?.map(sanitize_cell).collect();
    commit_details
        .with_column(CLEANED_PATCH_COLUMN, cleaned)?
        .into_projected(COMMIT_DETAILS_PRODUCT.columns)
}

/// Product 5: inner join of products 1 and 3 on PR id, flagged by `matcher`.
///
/// `pull_requests` and `task_types` are the projected product tables, not the
/// raw sources. Both are consumed; the join is the only step that copies cells.
pub fn build_security_summary(
    pull_requests: Table,
    task_types: Table,
    matcher: &SecurityMatcher,
) -> Result<(Table, SecurityCounts)> {
    let started = Instant::now();
    let left = pull_requests.into_projected(SECURITY_JOIN_LEFT)?;
    let right = task_types.into_projected(SECURITY_JOIN_RIGHT)?;
    let joined = left.inner_join("ID", &right, "PRID")?;

    let title_idx = joined.column_index("TITLE")?;
    let body_idx = joined.column_index("BODYSTRING")?;

    let mut counts = SecurityCounts::default();
    let flags: Vec<Cell> = joined
        .rows()
        .iter()
        .map(|row| {
            let title = row[title_idx].as_text();
            let body = row[body_idx].as_text();
            let flag = matcher.classify(title.as_deref(), body.as_deref());
            if flag == 1 {
                counts.flagged += 1;
            } else {
                counts.clean += 1;
            }
            Cell::Int(i64::from(flag))
        })
        .collect();
    ClassifierMetrics::record_classified(counts.flagged, counts.clean, started.elapsed().as_secs_f64());

    let summary = joined
        .with_column(SECURITY_COLUMN, flags)?
        .into_projected(SECURITY_SUMMARY_PRODUCT.columns)?;
    Ok((summary, counts))
}

/// `['A', 'B']`
fn column_list(columns: &[String]) -> String {
    let quoted: Vec<String> = columns.iter().map(|c| format!("'{}'", c)).collect();
    format!("[{}]", quoted.join(", "))
}

/// 1234567 -> "1,234,567"
pub(crate) fn thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_SECURITY_KEYWORDS;

    fn product1() -> Table {
        Table::new(
            "all_pull_request",
            PULL_REQUEST_PRODUCT.output_columns().iter().map(|c| c.to_string()).collect(),
            vec![
                vec![
                    Cell::text("fix xss bug"),
                    Cell::Int(1),
                    Cell::text("a"),
                    Cell::text(""),
                    Cell::Int(10),
                    Cell::text("https://example.com/r/10"),
                ],
                vec![
                    Cell::text("update docs"),
                    Cell::Int(2),
                    Cell::text("b"),
                    Cell::text(""),
                    Cell::Int(10),
                    Cell::text("https://example.com/r/10"),
                ],
            ],
        )
        .unwrap()
    }

    fn product3(rows: Vec<(i64, &str, f64)>) -> Table {
        Table::new(
            "pr_task_type",
            TASK_TYPE_PRODUCT.output_columns().iter().map(|c| c.to_string()).collect(),
            rows.into_iter()
                .map(|(id, kind, conf)| {
                    vec![
                        Cell::Int(id),
                        Cell::Null,
                        Cell::Null,
                        Cell::text(kind),
                        Cell::Float(conf),
                    ]
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_security_summary_scenario() {
        let matcher = SecurityMatcher::new(DEFAULT_SECURITY_KEYWORDS).unwrap();
        let (summary, counts) =
            build_security_summary(product1(), product3(vec![(1, "bugfix", 0.9)]), &matcher).unwrap();

        assert_eq!(
            summary.columns(),
            &["ID", "AGENT", "TYPE", "CONFIDENCE", "SECURITY"].map(String::from)
        );
        assert_eq!(
            summary.rows(),
            &[vec![
                Cell::Int(1),
                Cell::text("a"),
                Cell::text("bugfix"),
                Cell::Float(0.9),
                Cell::Int(1)
            ]]
        );
        assert_eq!(counts, SecurityCounts { flagged: 1, clean: 0 });
    }

    #[test]
    fn test_security_summary_one_row_per_matched_pair() {
        let matcher = SecurityMatcher::new(DEFAULT_SECURITY_KEYWORDS).unwrap();
        let tasks = product3(vec![(2, "docs", 0.5), (1, "bugfix", 0.9)]);
        let (summary, counts) = build_security_summary(product1(), tasks, &matcher).unwrap();
        let ids: Vec<_> = summary.column("ID").unwrap().cloned().collect();
        assert_eq!(ids, vec![Cell::Int(1), Cell::Int(2)]);
        let flags: Vec<_> = summary.column("SECURITY").unwrap().cloned().collect();
        assert_eq!(flags, vec![Cell::Int(1), Cell::Int(0)]);
        assert_eq!(counts, SecurityCounts { flagged: 1, clean: 1 });
    }

    #[test]
    fn test_null_body_is_treated_as_empty() {
        let matcher = SecurityMatcher::new(["overflow"]).unwrap();
        let prs = Table::new(
            "all_pull_request",
            PULL_REQUEST_PRODUCT.output_columns().iter().map(|c| c.to_string()).collect(),
            vec![vec![
                Cell::text("Stack overflow fix"),
                Cell::Int(7),
                Cell::text("agent"),
                Cell::Null,
                Cell::Null,
                Cell::Null,
            ]],
        )
        .unwrap();
        let (summary, _) =
            build_security_summary(prs, product3(vec![(7, "fix", 1.0)]), &matcher).unwrap();
        assert_eq!(summary.rows()[0][4], Cell::Int(1));
    }

    #[test]
    fn test_commit_details_sanitizes_patch_into_prdiff() {
        let source = Table::new(
            "pr_commit_details",
            COMMIT_DETAILS_SOURCE.columns.iter().map(|c| c.to_string()).collect(),
            vec![
                vec![
                    Cell::Int(1),
                    Cell::text("abc123"),
                    Cell::text("msg"),
                    Cell::text("src/lib.rs"),
                    Cell::text("modified"),
                    Cell::Int(3),
                    Cell::Int(1),
                    Cell::Int(4),
                    Cell::text("+ caf\u{e9}\n- old\u{0}"),
                ],
                vec![
                    Cell::Int(2),
                    Cell::text("def456"),
                    Cell::text("msg2"),
                    Cell::text("img.png"),
                    Cell::text("added"),
                    Cell::Int(0),
                    Cell::Int(0),
                    Cell::Int(0),
                    Cell::Null,
                ],
            ],
        )
        .unwrap();

        let product = build_commit_details(source).unwrap();
        assert_eq!(product.columns().len(), 9);
        assert_eq!(product.columns()[8], "PRDIFF");
        let diffs: Vec<_> = product.column("PRDIFF").unwrap().cloned().collect();
        assert_eq!(diffs, vec![Cell::text("+ caf\n- old"), Cell::text("")]);
    }

    #[test]
    fn test_commit_details_requires_patch_column() {
        let source = Table::new("pr_commit_details", vec!["pr_id".into()], vec![]).unwrap();
        assert!(build_commit_details(source).is_err());
    }

    #[test]
    fn test_thousands_and_column_list() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(25_000), "25,000");
        assert_eq!(thousands(1_234_567), "1,234,567");
        assert_eq!(column_list(&["ID".into(), "AGENT".into()]), "['ID', 'AGENT']");
    }
}
