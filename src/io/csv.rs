use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::DEFAULT_DELIMITER;
use crate::core::{Partition, Table, STATUS_COLUMN};
use crate::error::{MatchError, Result};
use crate::io::{RecordSink, RecordSource};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Stem suffix of the column-filtered file that feeds a cleaning run
const FILTERED_STEM_SUFFIX: &str = "_optimierte_daten";

fn decode_field(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Read a delimited file into a header row and data rows.
///
/// Invalid UTF-8 is decoded lossily so a single bad field does not abort
/// the run; the scorer rejects fields carrying U+FFFD.
fn read_raw(path: &Path, delimiter: u8) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let name = path.display().to_string();
    let file = File::open(path)
        .map_err(|e| MatchError::input_format(&name, format!("cannot open file: {}", e)))?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let mut records = reader.byte_records();

    let header = match records.next() {
        Some(record) => record.map_err(|e| MatchError::input_format(&name, e.to_string()))?,
        None => return Err(MatchError::input_format(&name, "file is empty, no header row")),
    };

    let mut headers: Vec<String> = header.iter().map(decode_field).collect();
    if let Some(first) = headers.first_mut() {
        if let Some(stripped) = first.strip_prefix('\u{FEFF}') {
            *first = stripped.to_string();
        }
    }

    let mut rows = Vec::new();
    for (row_idx, record) in records.enumerate() {
        let record = record.map_err(|e| {
            MatchError::input_format(&name, format!("row {}: {}", row_idx + 2, e))
        })?;
        rows.push(record.iter().map(decode_field).collect());
    }

    Ok((headers, rows))
}

/// Write a BOM-prefixed delimited file.
///
/// Rows go to `<stem>.csv.tmp` and are renamed to `path` once complete; a
/// failed write leaves nothing at `path`.
fn write_table(path: &Path, delimiter: u8, headers: &[String], rows: &[Vec<String>]) -> std::io::Result<()> {
    let tmp_path = path.with_extension("csv.tmp");
    if let Err(e) = write_records(&tmp_path, delimiter, headers, rows) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e);
    }
    std::fs::rename(&tmp_path, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp_path);
        e
    })
}

fn write_records(path: &Path, delimiter: u8, headers: &[String], rows: &[Vec<String>]) -> std::io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    out.write_all(UTF8_BOM)?;

    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(out);

    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// CSV record source
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    delimiter: u8,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: DEFAULT_DELIMITER as u8,
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for CsvSource {
    fn load(&self) -> Result<Table> {
        let (headers, rows) = read_raw(&self.path, self.delimiter)?;
        tracing::info!(
            "📂 Loaded {} rows with {} columns from '{}'",
            rows.len(),
            headers.len(),
            self.path.display()
        );
        Table::from_rows(&self.name(), headers, rows)
    }

    fn name(&self) -> String {
        self.path.display().to_string()
    }
}

/// CSV record sink writing `<stem>_<partition>.csv` files into one directory
#[derive(Debug, Clone)]
pub struct CsvSink {
    dir: PathBuf,
    stem: String,
    delimiter: u8,
    columns: Option<Vec<String>>,
    written: HashSet<Partition>,
}

impl CsvSink {
    pub fn new(dir: impl Into<PathBuf>, stem: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            stem: stem.into(),
            delimiter: DEFAULT_DELIMITER as u8,
            columns: None,
            written: HashSet::new(),
        }
    }

    /// Sink placing outputs next to `input`, named after its stem
    pub fn for_input(input: &Path) -> Self {
        let dir = input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        let stem = stem
            .strip_suffix(FILTERED_STEM_SUFFIX)
            .map(str::to_string)
            .unwrap_or(stem);
        Self::new(dir, stem)
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Write into `dir` instead, keeping the stem
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    /// Keep only these original columns (status column is always kept)
    pub fn with_columns(mut self, columns: Vec<String>) -> Self {
        self.columns = Some(columns);
        self
    }

    pub fn path_for(&self, partition: Partition) -> PathBuf {
        self.dir
            .join(format!("{}_{}.csv", self.stem, partition.file_suffix()))
    }

    /// Column indexes to write, in output order
    fn projection(&self, headers: &[String]) -> Option<Vec<usize>> {
        let columns = self.columns.as_ref()?;
        let mut indexes: Vec<usize> = columns
            .iter()
            .filter_map(|c| headers.iter().position(|h| h == c))
            .collect();
        if let Some(status) = headers.iter().position(|h| h == STATUS_COLUMN) {
            if !indexes.contains(&status) {
                indexes.push(status);
            }
        }
        Some(indexes)
    }
}

fn select(row: &[String], indexes: &[usize]) -> Vec<String> {
    indexes
        .iter()
        .map(|&i| row.get(i).cloned().unwrap_or_default())
        .collect()
}

impl RecordSink for CsvSink {
    fn write_partition(
        &mut self,
        partition: Partition,
        headers: &[String],
        rows: &[Vec<String>],
    ) -> Result<()> {
        let write_error = |message: String| MatchError::Write {
            partition: partition.to_string(),
            message,
        };

        if self.written.contains(&partition) {
            return Err(write_error("partition already written in this run".to_string()));
        }

        let path = self.path_for(partition);
        let result = match self.projection(headers) {
            Some(indexes) => {
                let headers = select(headers, &indexes);
                let rows: Vec<Vec<String>> = rows.iter().map(|r| select(r, &indexes)).collect();
                write_table(&path, self.delimiter, &headers, &rows)
            }
            None => write_table(&path, self.delimiter, headers, rows),
        };
        result.map_err(|e| write_error(format!("{}: {}", path.display(), e)))?;

        self.written.insert(partition);
        tracing::info!("💾 Wrote {} rows to '{}'", rows.len(), path.display());
        Ok(())
    }

    fn destination(&self, partition: Partition) -> String {
        self.path_for(partition).display().to_string()
    }
}

/// Keep only the requested columns of a delimited file.
///
/// Requested columns missing from the input are skipped; returns the kept
/// column names in output order. Fails if none of them exist.
pub fn project_columns(
    input: &Path,
    output: &Path,
    columns: &[String],
    delimiter: u8,
) -> Result<Vec<String>> {
    let (headers, rows) = read_raw(input, delimiter)?;

    let kept: Vec<(usize, String)> = columns
        .iter()
        .filter_map(|c| headers.iter().position(|h| h == c).map(|i| (i, c.clone())))
        .collect();

    if kept.is_empty() {
        return Err(MatchError::input_format(
            input.display().to_string(),
            "none of the requested columns exist",
        ));
    }

    let indexes: Vec<usize> = kept.iter().map(|(i, _)| *i).collect();
    let names: Vec<String> = kept.into_iter().map(|(_, name)| name).collect();
    let rows: Vec<Vec<String>> = rows.iter().map(|r| select(r, &indexes)).collect();

    tracing::info!("🔎 Keeping {} columns: {}", names.len(), names.join(", "));

    write_table(output, delimiter, &names, &rows).map_err(|e| MatchError::Write {
        partition: output.display().to_string(),
        message: e.to_string(),
    })?;

    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_input(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_strips_bom_and_pads_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_input(
            dir.path(),
            "input.csv",
            "\u{FEFF}KundenNr;SearchString;title;street;phone\n1;Café Central;Café Central;Bahnhofstrasse 5;044\n2;Kiosk\n"
                .as_bytes(),
        );

        let table = CsvSource::new(&path).load().unwrap();
        assert_eq!(table.headers()[0], "KundenNr");
        assert_eq!(table.len(), 2);
        assert_eq!(table.records()[1].title, "");
        assert_eq!(table.records()[0].fields[4], "044");
    }

    #[test]
    fn test_invalid_utf8_is_decoded_lossily() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_input(
            dir.path(),
            "input.csv",
            b"KundenNr;SearchString;title;street\n1;Caf\xE9;Caf\xE9;Weg 1\n",
        );

        let table = CsvSource::new(&path).load().unwrap();
        assert!(table.records()[0].title.contains('\u{FFFD}'));
    }

    #[test]
    fn test_missing_file_is_input_format_error() {
        let err = CsvSource::new("/definitely/not/here.csv").load().unwrap_err();
        assert!(matches!(err, MatchError::InputFormat { .. }));
    }

    #[test]
    fn test_empty_file_is_input_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_input(dir.path(), "empty.csv", b"");
        let err = CsvSource::new(&path).load().unwrap_err();
        assert!(err.to_string().contains("no header row"));
    }

    #[test]
    fn test_sink_paths_strip_filtered_suffix() {
        let sink = CsvSink::for_input(Path::new("/data/kunden_optimierte_daten.csv"));
        assert_eq!(
            sink.path_for(Partition::Confirmed),
            PathBuf::from("/data/kunden_eindeutig.csv")
        );
        assert_eq!(
            sink.path_for(Partition::Review),
            PathBuf::from("/data/kunden_zur_pruefung.csv")
        );
        assert_eq!(
            sink.path_for(Partition::Rejected),
            PathBuf::from("/data/kunden_aussortiert.csv")
        );
    }

    #[test]
    fn test_sink_writes_bom_and_projection() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = CsvSink::new(dir.path(), "run").with_columns(vec![
            "title".to_string(),
            "missing".to_string(),
        ]);

        let headers = vec!["KundenNr".to_string(), "title".to_string(), "Status".to_string()];
        let rows = vec![vec!["1".to_string(), "Café Central".to_string(), "OK".to_string()]];
        sink.write_partition(Partition::Confirmed, &headers, &rows).unwrap();

        let bytes = std::fs::read(sink.path_for(Partition::Confirmed)).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        assert_eq!(text, "title;Status\nCafé Central;OK\n");
    }

    #[test]
    fn test_sink_rejects_second_write() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = CsvSink::new(dir.path(), "run");
        let headers = vec!["Status".to_string()];
        sink.write_partition(Partition::Review, &headers, &[]).unwrap();
        let err = sink.write_partition(Partition::Review, &headers, &[]).unwrap_err();
        assert!(matches!(err, MatchError::Write { .. }));
    }

    #[test]
    fn test_sink_reports_unwritable_dir() {
        let mut sink = CsvSink::new("/definitely/not/here", "run");
        let err = sink
            .write_partition(Partition::Rejected, &["Status".to_string()], &[])
            .unwrap_err();
        assert!(err.to_string().contains("rejected"));
    }

    #[test]
    fn test_failed_write_leaves_no_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = CsvSink::new(dir.path(), "run");
        let path = sink.path_for(Partition::Confirmed);

        let headers = vec!["title".to_string(), "Status".to_string()];
        let rows = vec![
            vec!["Café Central".to_string(), "OK".to_string()],
            vec!["OK".to_string()],
        ];
        assert!(sink.write_partition(Partition::Confirmed, &headers, &rows).is_err());

        assert!(!path.exists());
        assert!(!path.with_extension("csv.tmp").exists());
    }

    #[test]
    fn test_project_columns() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(
            dir.path(),
            "raw.csv",
            b"KundenNr;SearchString;title;street;imageUrl\n1;Q;T;S;http://x\n",
        );
        let output = dir.path().join("filtered.csv");

        let kept = project_columns(
            &input,
            &output,
            &["street".to_string(), "KundenNr".to_string(), "website".to_string()],
            b';',
        )
        .unwrap();
        assert_eq!(kept, vec!["street", "KundenNr"]);

        let (headers, rows) = read_raw(&output, b';').unwrap();
        assert_eq!(headers, vec!["street", "KundenNr"]);
        assert_eq!(rows, vec![vec!["S".to_string(), "1".to_string()]]);
    }

    #[test]
    fn test_project_columns_none_exist() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), "raw.csv", b"a;b\n1;2\n");
        let output = dir.path().join("filtered.csv");
        assert!(project_columns(&input, &output, &["c".to_string()], b';').is_err());
        assert!(!output.exists());
    }
}
