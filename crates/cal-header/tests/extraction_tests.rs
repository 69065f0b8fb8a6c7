//! File-level extraction tests across formats

use std::fs;
use std::io::Write;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use cal_header::{header, value_of, Header, UNDEFINED};

fn write_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn fixed_column_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "mask.r0h",
        "FILETYPE= 'MSK'\nHISTORY first line\nHISTORY second line\nEND\n",
    );
    let reduced = header(&path, &[], None).unwrap();
    assert_eq!(reduced.get("FILETYPE"), Some("MSK"));
    assert_eq!(reduced.history(), ["first line", "second line"]);
}

#[test]
fn fixed_column_data_name_reads_the_header_twin() {
    let dir = TempDir::new().unwrap();
    write_file(&dir, "mask.r0h", "FILETYPE= 'MSK'\nEND\n");
    let data_path = dir.path().join("mask.r0d");
    fs::write(&data_path, b"\x00\x01binary payload").unwrap();
    let reduced = header(&data_path, &[], None).unwrap();
    assert_eq!(reduced.get("FILETYPE"), Some("MSK"));
}

#[test]
fn tree_file_flattens_to_dotted_keys() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "exposure.yaml",
        "meta:\n  exposure:\n    type: NRS_BRIGHTOBJ\n  calibration_software_version: 0.7.0\n",
    );
    let reduced = header(&path, &[], None).unwrap();
    assert_eq!(reduced.get("META.EXPOSURE.TYPE"), Some("NRS_BRIGHTOBJ"));
    assert_eq!(
        reduced.get("META.CALIBRATION_SOFTWARE_VERSION"),
        Some("0.7.0")
    );
}

#[test]
fn structured_container_ignores_payload_blocks() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("exposure.asdf");
    let mut file = fs::File::create(&path).unwrap();
    writeln!(file, "#CONTAINER 1.0.0").unwrap();
    writeln!(file, "%YAML 1.1").unwrap();
    writeln!(file, "--- !core/container-1.0.0").unwrap();
    writeln!(file, "meta:").unwrap();
    writeln!(file, "  instrument:").unwrap();
    writeln!(file, "    name: NIRSPEC").unwrap();
    writeln!(file, "...").unwrap();
    file.write_all(b"\x00\xffopaque block").unwrap();
    drop(file);

    let reduced = header(&path, &[], None).unwrap();
    assert_eq!(reduced.get("META.INSTRUMENT.NAME"), Some("NIRSPEC"));
}

#[test]
fn original_name_overrides_an_opaque_staging_path() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "tmp_upload_0001", "FILETYPE= 'MSK'\nEND\n");
    let reduced = header(&path, &[], Some("mask.r0h")).unwrap();
    assert_eq!(reduced.get("FILETYPE"), Some("MSK"));
}

#[test]
fn value_of_defaults_missing_keywords() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "exposure.yaml", "meta:\n  a: 1\n");
    assert_eq!(value_of(&path, "META.A").unwrap(), "1");
    assert_eq!(value_of(&path, "meta.missing").unwrap(), UNDEFINED);
}

#[test]
fn missing_file_surfaces_io_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.yaml");
    assert!(header(&path, &[], None).is_err());
}

#[test]
fn malformed_tree_surfaces_format_error() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "broken.yaml", "a: [unclosed\n");
    let err = header(&path, &[], None).unwrap_err();
    assert!(matches!(err, cal_header::Error::Format { .. }));
}

#[test]
fn headers_compare_structurally() {
    let left = Header::from_pairs([("A", "1"), ("B", "2")]);
    let right = Header::from_pairs([("b", "2"), ("a", "1")]);
    assert_eq!(left, right);
}
