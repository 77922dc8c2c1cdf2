use place_match::{
    CsvSink, CsvSource, MatchConfig, MatchEngine, MatchError, MemorySink, Partition,
    RecordSource,
};
use std::path::{Path, PathBuf};

const HEADER: &str = "KundenNr;SearchString;title;street;phone";

fn engine() -> MatchEngine {
    MatchEngine::new(MatchConfig::new(80.0, 15.0).unwrap())
}

fn write_input(dir: &Path, lines: &[&str]) -> PathBuf {
    let path = dir.join("kunden_optimierte_daten.csv");
    let mut content = String::from("\u{FEFF}");
    content.push_str(HEADER);
    content.push('\n');
    for line in lines {
        content.push_str(line);
        content.push('\n');
    }
    std::fs::write(&path, content).unwrap();
    path
}

/// Data lines of an output file, BOM and header removed
fn read_output(path: &Path) -> Vec<String> {
    let text = std::fs::read_to_string(path).unwrap();
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(&text);
    let mut lines = text.lines();
    assert_eq!(lines.next().unwrap(), format!("{};Status", HEADER));
    lines.map(str::to_string).collect()
}

#[test]
fn test_street_gated_customer_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        dir.path(),
        &[
            "100;Café Central, Bahnhofstrasse 5;Café Central;Bahnhofstr. 5;044 111",
            "100;Café Central, Bahnhofstrasse 5;Central Bar;Marktgasse 2;044 222",
            "200;Kiosk am See;Kiosk am See;Seeweg 1;044 333",
        ],
    );

    let mut sink = CsvSink::for_input(&input);
    let report = engine().run(&CsvSource::new(&input), &mut sink).unwrap();

    assert!(report.is_success());
    assert_eq!(report.groups, 2);
    assert_eq!(report.tiers.ok, 2);
    assert_eq!(report.tiers.rejected, 1);

    let confirmed = read_output(&dir.path().join("kunden_eindeutig.csv"));
    assert_eq!(
        confirmed,
        vec![
            "100;Café Central, Bahnhofstrasse 5;Café Central;Bahnhofstr. 5;044 111;OK",
            "200;Kiosk am See;Kiosk am See;Seeweg 1;044 333;OK",
        ]
    );

    let rejected = read_output(&dir.path().join("kunden_aussortiert.csv"));
    assert_eq!(
        rejected,
        vec!["100;Café Central, Bahnhofstrasse 5;Central Bar;Marktgasse 2;044 222;Aussortiert"]
    );

    // nothing needed review, so no file
    assert!(!dir.path().join("kunden_zur_pruefung.csv").exists());
}

#[test]
fn test_dynamic_gap_winner() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        dir.path(),
        &[
            "7;Rössli;Gasthaus Rössli;Dorfstrasse 1;",
            "7;Rössli;Kfz Werkstatt;Industrieweg 9;",
        ],
    );

    let mut sink = MemorySink::new();
    let report = engine().run(&CsvSource::new(&input), &mut sink).unwrap();

    assert_eq!(report.tiers.ok_dynamic, 1);
    assert_eq!(report.tiers.rejected, 1);

    let confirmed = sink.get(Partition::Confirmed).unwrap();
    assert_eq!(confirmed.rows.len(), 1);
    assert_eq!(confirmed.rows[0][2], "Gasthaus Rössli");
    assert_eq!(confirmed.rows[0][5], "OK (Dynamischer Schwellenwert)");
}

#[test]
fn test_larger_gap_sends_group_to_review() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        dir.path(),
        &[
            "7;Rössli;Gasthaus Rössli;Dorfstrasse 1;",
            "7;Rössli;Kfz Werkstatt;Industrieweg 9;",
        ],
    );

    let strict = MatchEngine::new(MatchConfig::new(80.0, 95.0).unwrap());
    let mut sink = MemorySink::new();
    let report = strict.run(&CsvSource::new(&input), &mut sink).unwrap();

    assert_eq!(report.tiers.review, 2);
    assert_eq!(sink.written(), vec![Partition::Review]);
    assert!(sink
        .get(Partition::Review)
        .unwrap()
        .rows
        .iter()
        .all(|r| r[5] == "Zur Prüfung"));
}

#[test]
fn test_duplicate_rows_written_once() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        dir.path(),
        &[
            "5;Central, Bahnhofstrasse 5;Central;Bahnhofstrasse 5;",
            "5;Central, Bahnhofstrasse 5;Kiosk;Seeweg 1;",
            "5;Central, Bahnhofstrasse 5;Kiosk;Seeweg 1;",
        ],
    );

    let mut sink = MemorySink::new();
    let report = engine().run(&CsvSource::new(&input), &mut sink).unwrap();

    assert_eq!(report.tiers.rejected, 2);
    assert_eq!(report.duplicates_removed, 1);
    assert_eq!(sink.get(Partition::Rejected).unwrap().rows.len(), 1);
}

#[test]
fn test_blank_customer_key_goes_to_review() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        dir.path(),
        &[
            ";Café Central;Café Central;Bahnhofstrasse 5;",
            "9;Kiosk;Kiosk;Seeweg 1;",
        ],
    );

    let mut sink = MemorySink::new();
    let report = engine().run(&CsvSource::new(&input), &mut sink).unwrap();

    assert_eq!(report.unkeyed, 1);
    assert_eq!(report.groups, 1);
    assert_eq!(sink.get(Partition::Review).unwrap().rows.len(), 1);
    assert_eq!(sink.get(Partition::Confirmed).unwrap().rows.len(), 1);
}

#[test]
fn test_missing_column_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken_optimierte_daten.csv");
    std::fs::write(&input, "KundenNr;SearchString;title\n1;Q;T\n").unwrap();

    let mut sink = CsvSink::for_input(&input);
    let err = engine().run(&CsvSource::new(&input), &mut sink).unwrap_err();

    assert!(matches!(err, MatchError::InputFormat { .. }));
    for partition in Partition::ALL {
        assert!(!sink.path_for(partition).exists());
    }
}

#[test]
fn test_overlong_row_aborts_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("wide_optimierte_daten.csv");
    std::fs::write(&input, "KundenNr;SearchString;title;street\n1;A;A;S\n2;B;B;S;extra\n").unwrap();

    let mut sink = CsvSink::for_input(&input);
    let err = engine().run(&CsvSource::new(&input), &mut sink).unwrap_err();

    assert!(matches!(err, MatchError::InputFormat { .. }));
    for partition in Partition::ALL {
        assert!(!sink.path_for(partition).exists());
    }
}

#[test]
fn test_every_record_lands_in_exactly_one_partition() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        dir.path(),
        &[
            "1;Alpenblick;Hotel Alpenblick;Dorfstrasse 3;a",
            "1;Alpenblick;Restaurant Alpenblick;Dorfstrasse 4;b",
            "2;Post, Hauptstrasse 1;Post;Bahnhofplatz 2;c",
            "2;Post, Hauptstrasse 1;Postfiliale;Marktplatz 7;d",
            "3;Migros;Migros Supermarkt;Seestrasse 10;e",
            "3;Migros;Coop;Seestrasse 12;f",
            "4;Bäckerei Huber;Bäckerei Huber;Hauptstrasse 2;g",
        ],
    );

    let source = CsvSource::new(&input);
    let records = source.load().unwrap().len();

    let mut sink = MemorySink::new();
    let report = engine().with_workers(3).run(&source, &mut sink).unwrap();

    let written: usize = Partition::ALL
        .iter()
        .filter_map(|p| sink.get(*p))
        .map(|p| p.rows.len())
        .sum();
    assert_eq!(written, records);
    assert_eq!(report.tiers.total(), records);
}
