//! Row-capped CSV writer.
//!
//! Every product lands in its own folder under the output root. Tables at or
//! under the row cap are written as a single file; larger tables are split
//! into ordered `_partN` files, each with its own header row.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;

use csv::{Terminator, WriterBuilder};
use tracing::{debug, info};

use crate::error::{ExportError, Result};
use crate::metrics::WriterMetrics;
use crate::pipeline::driver::thousands;
use crate::table::{Cell, Table};

/// Files produced for one table.
#[derive(Debug, Clone)]
pub struct ChunkResult {
    /// Written files, in row order.
    pub paths: Vec<PathBuf>,
    /// Data rows in each file (parallel to `paths`).
    pub rows_per_part: Vec<usize>,
    /// Total data rows written, excluding headers.
    pub total_rows: usize,
}

/// Write `table` under `output_root`, splitting at `max_rows_per_file`.
///
/// Returns the written file paths in ascending part order.
pub fn write_chunked(
    table: &Table,
    base_name: &str,
    output_root: &Path,
    max_rows_per_file: usize,
) -> Result<Vec<PathBuf>> {
    write_chunked_detailed(table, base_name, output_root, max_rows_per_file).map(|r| r.paths)
}

/// Like [`write_chunked`], also reporting the row count of each file.
pub fn write_chunked_detailed(
    table: &Table,
    base_name: &str,
    output_root: &Path,
    max_rows_per_file: usize,
) -> Result<ChunkResult> {
    if max_rows_per_file == 0 {
        return Err(ExportError::Config(
            "max_rows_per_file must be greater than zero".to_string(),
        ));
    }
    let (stem, extension) = split_base_name(base_name)?;
    let started = Instant::now();

    let folder = output_root.join(stem);
    fs::create_dir_all(&folder)?;
    remove_previous_output(&folder, base_name, stem, extension)?;

    let total_rows = table.num_rows();
    let mut paths = Vec::new();
    let mut rows_per_part = Vec::new();

    if total_rows <= max_rows_per_file {
        let path = folder.join(base_name);
        write_csv_file(&path, table.columns(), table.rows())?;
        println!("Saved: {}", path.display());
        info!("Saved: {}", path.display());
        paths.push(path);
        rows_per_part.push(total_rows);
    } else {
        let num_parts = total_rows.div_ceil(max_rows_per_file);
        for i in 0..num_parts {
            let start = i * max_rows_per_file;
            let end = ((i + 1) * max_rows_per_file).min(total_rows);
            let rows = table.row_range(start..end);

            let path = folder.join(format!("{}_part{}.{}", stem, i + 1, extension));
            write_csv_file(&path, table.columns(), rows)?;
            println!(
                "Saved part {}/{}: {} ({} rows)",
                i + 1,
                num_parts,
                path.display(),
                thousands(rows.len())
            );
            info!(
                "Saved part {}/{}: {} ({} rows)",
                i + 1,
                num_parts,
                path.display(),
                rows.len()
            );
            paths.push(path);
            rows_per_part.push(rows.len());
        }
    }

    WriterMetrics::record_table_written(paths.len(), total_rows, started.elapsed().as_secs_f64());

    Ok(ChunkResult {
        paths,
        rows_per_part,
        total_rows,
    })
}

/// Delete files a previous run left for this table, so a smaller rerun does
/// not leave higher-numbered parts behind. Unrelated files are kept.
fn remove_previous_output(folder: &Path, base_name: &str, stem: &str, extension: &str) -> Result<()> {
    let part_prefix = format!("{}_part", stem);
    let part_suffix = format!(".{}", extension);

    for entry in fs::read_dir(folder)? {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        let is_part = file_name
            .strip_prefix(&part_prefix)
            .and_then(|rest| rest.strip_suffix(&part_suffix))
            .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()));
        if (file_name == base_name || is_part) && entry.file_type()?.is_file() {
            fs::remove_file(entry.path())?;
            debug!(path = %entry.path().display(), "Removed previous output");
        }
    }
    Ok(())
}

/// `"pr_task_type.csv"` -> `("pr_task_type", "csv")`.
fn split_base_name(base_name: &str) -> Result<(&str, &str)> {
    match base_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() && !stem.contains(['/', '\\']) => {
            Ok((stem, ext))
        }
        _ => Err(ExportError::Config(format!(
            "output name '{}' must be a bare file name with an extension",
            base_name
        ))),
    }
}

/// Write one self-describing CSV file: header row, then `rows`.
fn write_csv_file(path: &Path, columns: &[String], rows: &[Vec<Cell>]) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(BufWriter::new(file));

    writer.write_record(columns)?;
    for row in rows {
        for cell in row {
            writer.write_field(cell.to_csv_field().as_bytes())?;
        }
        // An empty record terminates the fields written above.
        writer.write_record(None::<&[u8]>)?;
    }
    writer.flush()?;

    debug!(path = %path.display(), rows = rows.len(), "CSV file flushed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use csv::ReaderBuilder;

    fn numbered(n: usize) -> Table {
        let rows = (0..n)
            .map(|i| vec![Cell::Int(i as i64), Cell::Text(format!("row, \"{}\"\nline", i))])
            .collect();
        Table::new("numbers", vec!["N".into(), "LABEL".into()], rows).unwrap()
    }

    fn read_back(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
        let mut reader = ReaderBuilder::new().from_path(path).unwrap();
        let header = reader.headers().unwrap().iter().map(String::from).collect();
        let rows = reader
            .records()
            .map(|r| r.unwrap().iter().map(String::from).collect())
            .collect();
        (header, rows)
    }

    #[test]
    fn test_small_table_is_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_chunked(&numbered(3), "numbers.csv", dir.path(), 3).unwrap();
        assert_eq!(paths, vec![dir.path().join("numbers").join("numbers.csv")]);
        let (header, rows) = read_back(&paths[0]);
        assert_eq!(header, vec!["N", "LABEL"]);
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_empty_table_writes_header_only_file() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_chunked(&numbered(0), "numbers.csv", dir.path(), 10).unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(fs::read_to_string(&paths[0]).unwrap(), "N,LABEL\n");
    }

    #[test]
    fn test_split_part_count_and_sizes() {
        let dir = tempfile::tempdir().unwrap();
        let result = write_chunked_detailed(&numbered(10), "numbers.csv", dir.path(), 4).unwrap();
        assert_eq!(result.rows_per_part, vec![4, 4, 2]);
        assert_eq!(result.total_rows, 10);
        let names: Vec<_> = result
            .paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec!["numbers_part1.csv", "numbers_part2.csv", "numbers_part3.csv"]
        );
    }

    #[test]
    fn test_exact_multiple_has_no_trailing_empty_part() {
        let dir = tempfile::tempdir().unwrap();
        let result = write_chunked_detailed(&numbered(8), "numbers.csv", dir.path(), 4).unwrap();
        assert_eq!(result.rows_per_part, vec![4, 4]);
    }

    #[test]
    fn test_parts_concatenate_to_original_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let table = numbered(7);
        let paths = write_chunked(&table, "numbers.csv", dir.path(), 3).unwrap();

        let mut all_rows = Vec::new();
        for path in &paths {
            let (header, rows) = read_back(path);
            assert_eq!(header, vec!["N", "LABEL"]);
            assert!(rows.len() <= 3);
            all_rows.extend(rows);
        }
        let expected: Vec<Vec<String>> = table
            .rows()
            .iter()
            .map(|r| r.iter().map(|c| c.to_csv_field().into_owned()).collect())
            .collect();
        assert_eq!(all_rows, expected);
    }

    #[test]
    fn test_rerun_overwrites_existing_output() {
        let dir = tempfile::tempdir().unwrap();
        write_chunked(&numbered(5), "numbers.csv", dir.path(), 10).unwrap();
        let paths = write_chunked(&numbered(1), "numbers.csv", dir.path(), 10).unwrap();
        let (_, rows) = read_back(&paths[0]);
        assert_eq!(rows.len(), 1);
    }

    fn folder_listing(folder: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(folder)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_smaller_rerun_removes_stale_parts() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("numbers");
        write_chunked(&numbered(5), "numbers.csv", dir.path(), 2).unwrap();
        assert_eq!(folder_listing(&folder).len(), 3);

        let paths = write_chunked(&numbered(1), "numbers.csv", dir.path(), 2).unwrap();
        assert_eq!(paths, vec![folder.join("numbers.csv")]);
        assert_eq!(folder_listing(&folder), vec!["numbers.csv"]);

        write_chunked(&numbered(3), "numbers.csv", dir.path(), 2).unwrap();
        assert_eq!(
            folder_listing(&folder),
            vec!["numbers_part1.csv", "numbers_part2.csv"]
        );
    }

    #[test]
    fn test_unrelated_files_in_folder_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("numbers");
        fs::create_dir_all(&folder).unwrap();
        fs::write(folder.join("README.txt"), b"notes").unwrap();
        fs::write(folder.join("numbers_partial.csv"), b"x").unwrap();
        fs::write(folder.join("numbers_part2.txt"), b"x").unwrap();

        write_chunked(&numbered(1), "numbers.csv", dir.path(), 2).unwrap();
        assert_eq!(
            folder_listing(&folder),
            vec!["README.txt", "numbers.csv", "numbers_part2.txt", "numbers_partial.csv"]
        );
    }

    #[test]
    fn test_zero_cap_and_bad_names_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            write_chunked(&numbered(1), "numbers.csv", dir.path(), 0),
            Err(ExportError::Config(_))
        ));
        assert!(matches!(
            write_chunked(&numbered(1), "numbers", dir.path(), 5),
            Err(ExportError::Config(_))
        ));
    }

    #[test]
    fn test_unwritable_root_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"file, not a directory").unwrap();
        assert!(matches!(
            write_chunked(&numbered(1), "numbers.csv", &blocker, 5),
            Err(ExportError::Io(_))
        ));
    }
}
