//! End-to-end: file on disk -> canonical header -> applicable rules

use std::fs;
use std::path::PathBuf;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use cal_header::header;
use cal_rules::{ResolverCache, RuleSource, RulesEngine};

const RECORD_LEN: usize = 2880;
const CARD_LEN: usize = 80;

fn tabular_image(cards: &[&str]) -> Vec<u8> {
    let mut bytes = Vec::new();
    for text in cards {
        let mut card = text.as_bytes().to_vec();
        card.resize(CARD_LEN, b' ');
        bytes.extend(card);
    }
    let mut end = b"END".to_vec();
    end.resize(CARD_LEN, b' ');
    bytes.extend(end);
    bytes.resize(RECORD_LEN, b' ');
    bytes
}

#[test]
fn tree_exposure_resolves_to_reftypes() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("exposure.yaml");
    fs::write(
        &path,
        "meta:\n  exposure:\n    type: FGS_DARK\n  calibration_software_version: 0.7.0\n  visit:\n    tsovisit: false\n",
    )
    .unwrap();

    let reduced = header(&path, &[], None).unwrap();
    let engine = RulesEngine::default();
    assert_eq!(
        engine.reftypes_for_header(&reduced, None).unwrap(),
        ["ipc", "linearity", "mask", "refpix", "rscd", "saturation", "superbias"]
    );
}

#[test]
fn tabular_exposure_resolves_through_its_generation() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("obs.fits");
    fs::write(
        &path,
        tabular_image(&[
            "SIMPLE  = T",
            "BITPIX  = 8",
            "NAXIS   = 0",
            "TELESCOP= 'JWST'",
            "EXP_TYPE= 'MIR_IMAGE'",
            "CAL_VER = '0.13.0'",
        ]),
    )
    .unwrap();

    let reduced = header(&path, &[], None).unwrap();
    let engine = RulesEngine::default();
    assert_eq!(
        engine.pipelines_for_header(&reduced, None).unwrap(),
        ["calwebb_detector1.cfg", "calwebb_image2.cfg"]
    );
}

#[test]
fn time_series_tree_exposure_reroutes_level2() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("exposure.yaml");
    fs::write(
        &path,
        "meta:\n  exposure:\n    type: MIR_IMAGE\n  calibration_software_version: 0.13.0\n  visit:\n    tsovisit: T\n",
    )
    .unwrap();

    let reduced = header(&path, &[], None).unwrap();
    let engine = RulesEngine::default();
    assert_eq!(
        engine.pipelines_for_header(&reduced, None).unwrap(),
        ["calwebb_detector1.cfg", "calwebb_tso-image2.cfg"]
    );
}

#[test]
fn fixed_column_exposure_flows_through_the_engine() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("old_obs.r0h");
    fs::write(
        &path,
        "EXP_TYPE= 'MIR_LRS-FIXEDSLIT'\nCAL_VER = '0.9.3'\nHISTORY reprocessed twice\nEND\n",
    )
    .unwrap();

    let reduced = header(&path, &[], None).unwrap();
    assert_eq!(reduced.history(), ["reprocessed twice"]);

    let engine = RulesEngine::default();
    let reftypes = engine.reftypes_for_header(&reduced, None).unwrap();
    assert!(reftypes.contains(&"fringe".to_string()));
    assert!(reftypes.contains(&"pathloss".to_string()));
}

#[test]
fn live_rules_override_builtins_until_they_fail() {
    let dir = TempDir::new().unwrap();
    let live_path = dir.path().join("live.yaml");
    fs::write(
        &live_path,
        "exptypes_to_pipelines:\n  MIR_IMAGE: [only]\npipelines_to_steps:\n  only: [s]\nsteps_to_reftypes:\n  s: [flat]\n",
    )
    .unwrap();

    struct FileSource(PathBuf);
    impl RuleSource for FileSource {
        fn locate(
            &self,
            _context: &str,
            _cal_ver: &str,
        ) -> Result<PathBuf, Box<dyn std::error::Error + Send + Sync>> {
            Ok(self.0.clone())
        }
    }

    let live = RulesEngine::new("0.13.0").with_live(Box::new(FileSource(live_path.clone())));
    assert_eq!(
        live.reftypes_for_exptype("MIR_IMAGE", None, None).unwrap(),
        ["flat"]
    );

    // Once the live document disappears, a fresh engine degrades to the
    // built-in generation for the same version.
    fs::remove_file(&live_path).unwrap();
    let degraded = RulesEngine::new("0.13.0")
        .with_live(Box::new(FileSource(live_path)))
        .with_cache(ResolverCache::new());
    let reftypes = degraded.reftypes_for_exptype("MIR_IMAGE", None, None).unwrap();
    assert!(reftypes.contains(&"mask".to_string()));
}

#[test]
fn needed_keys_limit_extraction_and_still_default() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("exposure.yaml");
    fs::write(&path, "meta:\n  exposure:\n    type: NRC_IMAGE\n").unwrap();

    let reduced = header(&path, &["META.EXPOSURE.TYPE", "META.INSTRUMENT.NAME"], None).unwrap();
    assert_eq!(reduced.get("META.EXPOSURE.TYPE"), Some("NRC_IMAGE"));
    assert_eq!(reduced.get("META.INSTRUMENT.NAME"), Some("UNDEFINED"));
    assert_eq!(reduced.len(), 2);
}
