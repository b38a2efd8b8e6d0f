use super::*;
use pretty_assertions::assert_eq;

type Mapping = (usize, usize, Option<Position>);

fn table() -> PositionTable {
    let mut table = PositionTable::new();
    table.add_file("main.go", "package main\n\nfunc main() {\n\tprintln(1)\n}\n");
    table
}

/// Run `writes` through a filter with a recording callback.
fn run(writes: &[&[u8]], positions: Option<&PositionTable>) -> (Vec<u8>, Vec<Mapping>) {
    let mut mappings = Vec::new();
    let mut out = Vec::new();
    {
        let mut filter = SourceMapFilter::new(&mut out)
            .with_callback(|line, column, pos| mappings.push((line, column, pos)));
        filter.set_positions(positions);
        for chunk in writes {
            filter
                .write_all(chunk)
                .unwrap_or_else(|e| panic!("write failed: {e}"));
        }
    }
    (out, mappings)
}

#[test]
fn marker_is_stripped_and_reported() {
    let marker = position_marker(7);
    let (out, mappings) = run(&[b"ab\ncd", &marker, b"ef"], None);

    assert_eq!(out, b"ab\ncdef");
    assert_eq!(mappings, vec![(2, 2, None)]);
}

#[test]
fn handle_resolves_against_positions() {
    let positions = table();
    // Offset 14 is the `f` of `func`, line 3 column 1.
    let mut chunk = b"x".to_vec();
    chunk.extend_from_slice(&position_marker(1 + 14));
    chunk.extend_from_slice(b"y");
    let (out, mappings) = run(&[&chunk], Some(&positions));

    assert_eq!(out, b"xy");
    assert_eq!(
        mappings,
        vec![(
            1,
            1,
            Some(Position {
                file: "main.go".to_string(),
                line: 3,
                column: 1,
            })
        )]
    );
}

#[test]
fn unknown_handle_maps_to_none() {
    let positions = table();
    let (_, mappings) = run(&[&position_marker(0)], Some(&positions));
    assert_eq!(mappings, vec![(1, 0, None)]);
}

#[test]
fn marker_split_across_writes() {
    let marker = position_marker(3);
    let (out, mappings) = run(&[b"a\n", &marker[..2], &marker[2..4], &marker[4..], b"bc"], None);

    assert_eq!(out, b"a\nbc");
    assert_eq!(mappings, vec![(2, 0, None)]);
}

#[test]
fn consecutive_markers() {
    let mut chunk = b"\n\n  ".to_vec();
    chunk.extend_from_slice(&position_marker(1));
    chunk.extend_from_slice(&position_marker(2));
    chunk.extend_from_slice(b"z\n");
    chunk.extend_from_slice(&position_marker(3));
    let (out, mappings) = run(&[&chunk], None);

    assert_eq!(out, b"\n\n  z\n");
    assert_eq!(
        mappings,
        vec![(3, 2, None), (3, 2, None), (4, 0, None)]
    );
}

#[test]
fn without_callback_bytes_pass_through() {
    let marker = position_marker(9);
    let mut chunk = b"ab".to_vec();
    chunk.extend_from_slice(&marker);

    let mut out = Vec::new();
    let mut filter = SourceMapFilter::new(&mut out);
    filter
        .write_all(&chunk)
        .unwrap_or_else(|e| panic!("write failed: {e}"));
    assert_eq!(filter.position(), (1, 7));
    drop(filter);

    assert_eq!(out, chunk);
}

#[test]
fn position_is_tracked_across_writes() {
    let mut filter = SourceMapFilter::new(Vec::new());
    for chunk in ["abc", "\n", "de\nfgh", "ij"] {
        filter
            .write_all(chunk.as_bytes())
            .unwrap_or_else(|e| panic!("write failed: {e}"));
    }
    assert_eq!(filter.position(), (3, 5));
    assert_eq!(filter.bytes_written(), 12);
    assert_eq!(filter.into_inner(), b"abc\nde\nfghij");
}

#[test]
fn write_reports_marker_bytes_consumed() {
    let mut out = Vec::new();
    let mut filter = SourceMapFilter::new(&mut out).with_callback(|_, _, _| {});
    let mut chunk = b"ab".to_vec();
    chunk.extend_from_slice(&position_marker(1));
    let n = filter
        .write(&chunk)
        .unwrap_or_else(|e| panic!("write failed: {e}"));
    assert_eq!(n, 7);
    assert_eq!(filter.bytes_written(), 2);
}

#[test]
fn sink_errors_propagate() {
    struct Full;
    impl Write for Full {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "sink full"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let mut filter = SourceMapFilter::new(Full);
    let err = filter.write_all(b"x").err();
    assert!(err.is_some_and(|e| e.to_string() == "sink full"));
}

#[test]
fn flush_forwards_incomplete_marker() {
    let mut mappings = Vec::new();
    let mut out = Vec::new();
    {
        let mut filter = SourceMapFilter::new(&mut out)
            .with_callback(|line, column, pos| mappings.push((line, column, pos)));
        filter
            .write_all(b"end\x08\x00")
            .unwrap_or_else(|e| panic!("write failed: {e}"));
        filter.flush().unwrap_or_else(|e| panic!("flush failed: {e}"));

        assert_eq!(filter.bytes_written(), 5);
        assert_eq!(filter.position(), (1, 5));
    }
    assert_eq!(out, b"end\x08\x00");
    assert!(mappings.is_empty());
}
