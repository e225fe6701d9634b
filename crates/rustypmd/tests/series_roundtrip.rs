//! Write series through the JSON/TOML backend and read them back.

use std::collections::BTreeMap;
use std::path::Path;

use rustypmd::{
    list_series, Access, Dataset, Datatype, Error, Geometry, IterationEncoding, Series,
    UnitDimension, SCALAR,
};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Iteration 100 with a vector mesh `E`, a scalar mesh `rho`, a constant
/// mesh `B` and a species `electrons` with patches.
fn write_sample(path: &Path) {
    let mut series = Series::new(path, Access::Create).unwrap();
    series.set_author("rustypmd tests").unwrap();
    series.set_machine("ci").unwrap();

    let it = series.iterations.get_or_create(100u64).unwrap();
    it.set_time(3.5f64).unwrap().set_dt(0.5f64).unwrap();

    let e = it.meshes.get_or_create("E").unwrap();
    e.set_geometry(Geometry::Cylindrical).unwrap();
    e.set_axis_labels(&["r", "z"]).unwrap();
    e.set_unit_dimension(&BTreeMap::from([
        (UnitDimension::M, 1.0),
        (UnitDimension::L, 1.0),
        (UnitDimension::T, -3.0),
        (UnitDimension::I, -1.0),
    ]))
    .unwrap();
    for (i, axis) in ["r", "z"].into_iter().enumerate() {
        let c = e.get_or_create(axis).unwrap();
        c.reset_dataset(Dataset::new(Datatype::Double, vec![2, 3])).unwrap();
        let data: Vec<f64> = (0..6).map(|v| (v + 10 * i) as f64).collect();
        c.store_chunk(data, vec![0, 0], vec![2, 3]).unwrap();
    }

    let rho = it.meshes.get_or_create("rho").unwrap().scalar_mut().unwrap();
    rho.reset_dataset(Dataset::new(Datatype::Float, vec![4])).unwrap();
    rho.store_chunk(vec![1.0f32, 2.0], vec![0], vec![2]).unwrap();
    rho.store_chunk(vec![3.0f32, 4.0], vec![2], vec![2]).unwrap();

    let b = it.meshes.get_or_create("B").unwrap().get_or_create("x").unwrap();
    b.reset_dataset(Dataset::new(Datatype::Double, vec![5])).unwrap();
    b.make_constant(0.25f64).unwrap();

    let electrons = it.particles.get_or_create("electrons").unwrap();
    let position = electrons.get_or_create("position").unwrap();
    let x = position.get_or_create("x").unwrap();
    x.reset_dataset(Dataset::new(Datatype::Double, vec![3])).unwrap();
    x.store_chunk(vec![0.1f64, 0.2, 0.3], vec![0], vec![3]).unwrap();
    let offset = electrons
        .get_or_create("positionOffset")
        .unwrap()
        .get_or_create("x")
        .unwrap();
    offset.reset_dataset(Dataset::new(Datatype::Int32, vec![3])).unwrap();
    offset.make_constant(0i32).unwrap();

    let num = electrons
        .particle_patches
        .get_or_create("numParticles")
        .unwrap()
        .scalar_mut()
        .unwrap();
    num.reset_dataset(Dataset::new(Datatype::UInt64, vec![2])).unwrap();
    num.store(0, 1u64).unwrap();
    num.store(1, 2u64).unwrap();

    series.flush().unwrap();
}

// ---------------------------------------------------------------------------
// Group-based
// ---------------------------------------------------------------------------

#[test]
fn group_based_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sample.json");
    write_sample(&path);
    assert!(path.exists());

    let mut series = Series::new(&path, Access::ReadOnly).unwrap();
    assert_eq!(series.iteration_encoding(), IterationEncoding::GroupBased);
    assert_eq!(series.open_pmd().unwrap(), "1.1.0");
    assert_eq!(series.author().unwrap(), "rustypmd tests");
    assert_eq!(series.iterations.len(), 1);

    let it = series.iterations.get_mut(&100u64).unwrap();
    assert_eq!(it.time::<f64>().unwrap(), 3.5);
    assert_eq!(it.dt::<f64>().unwrap(), 0.5);
    assert_eq!(
        it.meshes.keys().cloned().collect::<Vec<_>>(),
        vec!["B", "E", "rho"]
    );

    let e = it.meshes.get_mut("E").unwrap();
    assert_eq!(e.geometry().unwrap(), Geometry::Cylindrical);
    assert_eq!(e.axis_labels().unwrap(), vec!["r", "z"]);
    assert_eq!(e.unit_dimension().unwrap()[&UnitDimension::T], -3.0);
    assert!(!e.is_scalar());
    let z = e.get_mut("z").unwrap();
    assert_eq!(z.extent(), &vec![2, 3]);
    assert_eq!(z.dtype(), Datatype::Double);
    assert_eq!(z.position::<f64>().unwrap(), vec![0.0]);
    let row: Vec<f64> = z.load_chunk(vec![1, 0], vec![1, 3]).unwrap();
    assert_eq!(row, vec![13.0, 14.0, 15.0]);

    let rho = it.meshes.get_mut("rho").unwrap();
    assert!(rho.is_scalar());
    let values: Vec<f32> = rho.scalar_mut().unwrap().load_chunk(vec![], vec![]).unwrap();
    assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0]);

    let b = it.meshes.get_mut("B").unwrap().get_mut("x").unwrap();
    assert!(b.is_constant());
    assert_eq!(b.extent(), &vec![5]);
    let constant: Vec<f64> = b.load_chunk(vec![1], vec![2]).unwrap();
    assert_eq!(constant, vec![0.25, 0.25]);

    let electrons = it.particles.get_mut("electrons").unwrap();
    assert!(electrons.contains("position"));
    let offset = electrons
        .get_mut("positionOffset")
        .unwrap()
        .get_mut("x")
        .unwrap();
    assert!(offset.is_constant());
    assert_eq!(offset.load_chunk::<i32>(vec![], vec![]).unwrap(), vec![0, 0, 0]);
    let x = electrons.get_mut("position").unwrap().get_mut("x").unwrap();
    assert_eq!(x.load_chunk::<f64>(vec![], vec![]).unwrap(), vec![0.1, 0.2, 0.3]);

    let num = electrons
        .particle_patches
        .get_mut("numParticles")
        .unwrap()
        .get_mut(SCALAR)
        .unwrap();
    assert_eq!(num.load::<u64>().unwrap(), vec![1, 2]);
}

#[test]
fn json_layout() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("layout.json");
    write_sample(&path);

    let text = std::fs::read_to_string(&path).unwrap();
    let v: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(v["attributes"]["openPMD"]["value"], "1.1.0");
    assert_eq!(v["attributes"]["iterationEncoding"]["value"], "groupBased");
    let it = &v["data"]["100"];
    assert!(it["meshes"]["E"]["r"]["data"].is_array());
    assert!(it["meshes"]["rho"]["data"].is_array());
    assert_eq!(it["meshes"]["B"]["x"]["attributes"]["shape"]["value"], serde_json::json!([5]));
    assert!(it["particles"]["electrons"]["particlePatches"]["numParticles"]["data"].is_array());
}

#[test]
fn read_write_appends_iteration() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("append.json");
    write_sample(&path);

    {
        let mut series = Series::new(&path, Access::ReadWrite).unwrap();
        let it = series.iterations.get_or_create(200u64).unwrap();
        it.set_time(7.0f64).unwrap();
        let rho = it.meshes.get_or_create("rho").unwrap().scalar_mut().unwrap();
        rho.reset_dataset(Dataset::new(Datatype::Int64, vec![2])).unwrap();
        rho.store_chunk(vec![5i64, 6], vec![0], vec![2]).unwrap();
        series.flush().unwrap();
    }

    let mut series = Series::new(&path, Access::ReadOnly).unwrap();
    assert_eq!(series.iterations.keys().copied().collect::<Vec<_>>(), vec![100, 200]);
    let rho = series
        .iterations
        .get_mut(&200u64)
        .unwrap()
        .meshes
        .get_mut("rho")
        .unwrap()
        .scalar_mut()
        .unwrap();
    assert_eq!(rho.load_chunk::<i64>(vec![], vec![]).unwrap(), vec![5, 6]);
    // the first iteration is untouched
    let it = series.iterations.get(&100u64).unwrap();
    assert_eq!(it.meshes.len(), 3);
}

#[test]
fn read_write_creates_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fresh.json");
    {
        let mut series = Series::new(&path, Access::ReadWrite).unwrap();
        assert_eq!(series.open_pmd().unwrap(), "1.1.0");
        series.iterations.get_or_create(1u64).unwrap();
    }
    assert!(path.exists());
    let series = Series::new(&path, Access::ReadOnly).unwrap();
    assert!(series.iterations.contains(&1u64));
}

#[test]
fn erase_removes_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("erase.json");
    write_sample(&path);

    {
        let mut series = Series::new(&path, Access::ReadWrite).unwrap();
        let it = series.iterations.get_mut(&100u64).unwrap();
        assert!(it.meshes.erase("B").unwrap());
        assert!(it.meshes.get_mut("E").unwrap().erase("z").unwrap());
        assert!(!it.meshes.erase("missing").unwrap());
    }

    let series = Series::new(&path, Access::ReadOnly).unwrap();
    let it = series.iterations.get(&100u64).unwrap();
    assert!(!it.meshes.contains("B"));
    let e = it.meshes.get("E").unwrap();
    assert_eq!(e.keys().cloned().collect::<Vec<_>>(), vec!["r"]);
}

#[test]
fn available_chunks_follow_writes() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("chunks.json");
    let mut series = Series::new(&path, Access::Create).unwrap();
    let c = series
        .iterations
        .get_or_create(0u64)
        .unwrap()
        .meshes
        .get_or_create("T")
        .unwrap()
        .scalar_mut()
        .unwrap();
    c.reset_dataset(Dataset::new(Datatype::Double, vec![2, 3])).unwrap();
    // before the first flush the whole dataset is reported
    assert_eq!(c.available_chunks().unwrap()[0].extent, vec![2, 3]);
    c.store_chunk(vec![1.0f64; 3], vec![0, 0], vec![1, 3]).unwrap();
    series.flush().unwrap();

    let c = series
        .iterations
        .get_mut(&0u64)
        .unwrap()
        .meshes
        .get_mut("T")
        .unwrap()
        .scalar_mut()
        .unwrap();
    let chunks = c.available_chunks().unwrap();
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].offset, vec![0, 0]);
    assert_eq!(chunks[0].extent, vec![1, 3]);
}

#[test]
fn dataset_grows_after_write() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("grow.json");
    let mut series = Series::new(&path, Access::Create).unwrap();
    let c = series
        .iterations
        .get_or_create(0u64)
        .unwrap()
        .meshes
        .get_or_create("n")
        .unwrap()
        .scalar_mut()
        .unwrap();
    c.reset_dataset(Dataset::new(Datatype::Int32, vec![2])).unwrap();
    c.store_chunk(vec![1i32, 2], vec![0], vec![2]).unwrap();
    series.flush().unwrap();

    let c = series
        .iterations
        .get_mut(&0u64)
        .unwrap()
        .meshes
        .get_mut("n")
        .unwrap()
        .scalar_mut()
        .unwrap();
    c.reset_dataset(Dataset::new(Datatype::Int32, vec![4])).unwrap();
    c.store_chunk(vec![3i32, 4], vec![2], vec![2]).unwrap();
    assert_eq!(c.load_chunk::<i32>(vec![], vec![]).unwrap(), vec![1, 2, 3, 4]);
    assert!(c.reset_dataset(Dataset::new(Datatype::Double, vec![8])).is_err());
}

// ---------------------------------------------------------------------------
// File-based
// ---------------------------------------------------------------------------

fn write_file_based(dir: &TempDir, pattern: &str, indices: &[u64]) {
    let mut series = Series::new(dir.path().join(pattern), Access::Create).unwrap();
    for &index in indices {
        let rho = series
            .iterations
            .get_or_create(index)
            .unwrap()
            .meshes
            .get_or_create("rho")
            .unwrap()
            .scalar_mut()
            .unwrap();
        rho.reset_dataset(Dataset::new(Datatype::UInt32, vec![2])).unwrap();
        rho.store_chunk(vec![index as u32, 2 * index as u32], vec![0], vec![2])
            .unwrap();
    }
    series.flush().unwrap();
}

#[test]
fn file_based_round_trip() {
    let dir = TempDir::new().unwrap();
    write_file_based(&dir, "data_%03T.json", &[1, 20]);
    assert!(dir.path().join("data_001.json").exists());
    assert!(dir.path().join("data_020.json").exists());

    let mut series = Series::new(dir.path().join("data_%03T.json"), Access::ReadOnly).unwrap();
    assert_eq!(series.iteration_encoding(), IterationEncoding::FileBased);
    assert_eq!(series.iterations.keys().copied().collect::<Vec<_>>(), vec![1, 20]);
    for index in [1u64, 20] {
        let rho = series
            .iterations
            .get_mut(&index)
            .unwrap()
            .meshes
            .get_mut("rho")
            .unwrap()
            .scalar_mut()
            .unwrap();
        let expected = vec![index as u32, 2 * index as u32];
        assert_eq!(rho.load_chunk::<u32>(vec![], vec![]).unwrap(), expected);
    }
}

#[test]
fn file_based_files_are_self_contained() {
    let dir = TempDir::new().unwrap();
    write_file_based(&dir, "sim%T.json", &[5, 6]);
    let text = std::fs::read_to_string(dir.path().join("sim6.json")).unwrap();
    let v: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(v["attributes"]["iterationEncoding"]["value"], "fileBased");
    assert_eq!(v["attributes"]["iterationFormat"]["value"], "sim%T");
    assert!(v["data"]["6"].is_object());
    assert!(v["data"].get("5").is_none());
}

#[test]
fn file_based_padding_must_match() {
    let dir = TempDir::new().unwrap();
    write_file_based(&dir, "f_%T.json", &[7, 1234]);
    let series = Series::new(dir.path().join("f_%04T.json"), Access::ReadOnly).unwrap();
    assert_eq!(series.iterations.keys().copied().collect::<Vec<_>>(), vec![1234]);
}

#[test]
fn file_based_missing_files() {
    let dir = TempDir::new().unwrap();
    match Series::new(dir.path().join("none_%T.json"), Access::ReadOnly) {
        Err(Error::Io(rustypmd_io::Error::NoSuchFile(_))) => {}
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn closing_an_iteration_writes_its_file() {
    let dir = TempDir::new().unwrap();
    let mut series = Series::new(dir.path().join("c%T.json"), Access::Create).unwrap();
    let it = series.iterations.get_or_create(1u64).unwrap();
    it.set_time(1.0f64).unwrap();
    series.close_iteration(1).unwrap();
    let text = std::fs::read_to_string(dir.path().join("c1.json")).unwrap();
    let v: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(v["attributes"]["iterationEncoding"]["value"], "fileBased");
    assert_eq!(v["data"]["1"]["attributes"]["time"]["value"], 1.0);

    let it = series.iterations.get_mut(&1u64).unwrap();
    assert!(it.closed());
    assert!(matches!(it.meshes.get_or_create("E"), Err(Error::WrongApiUsage(_))));

    series.iterations.get_or_create(2u64).unwrap();
    series.flush().unwrap();
    assert!(dir.path().join("c2.json").exists());
}

#[test]
fn closed_iteration_is_written_by_next_flush() {
    let dir = TempDir::new().unwrap();
    let mut series = Series::new(dir.path().join("p%T.json"), Access::Create).unwrap();
    let rho = series
        .iterations
        .get_or_create(3u64)
        .unwrap()
        .meshes
        .get_or_create("rho")
        .unwrap()
        .scalar_mut()
        .unwrap();
    rho.reset_dataset(Dataset::new(Datatype::Int32, vec![2])).unwrap();
    rho.store_chunk(vec![4i32, 5], vec![0], vec![2]).unwrap();

    series.iterations.get_mut(&3u64).unwrap().close();
    assert!(!dir.path().join("p3.json").exists());
    series.flush().unwrap();

    let text = std::fs::read_to_string(dir.path().join("p3.json")).unwrap();
    let v: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(v["data"]["3"]["meshes"]["rho"]["data"], serde_json::json!([4, 5]));
    assert!(series.iterations.get(&3u64).unwrap().closed());
    // already closed, nothing left to write
    series.flush().unwrap();
}

#[test]
fn closed_iteration_rejects_modification() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("closed.json");
    let mut series = Series::new(&path, Access::Create).unwrap();
    let rho = series
        .iterations
        .get_or_create(1u64)
        .unwrap()
        .meshes
        .get_or_create("rho")
        .unwrap()
        .scalar_mut()
        .unwrap();
    rho.reset_dataset(Dataset::new(Datatype::Double, vec![2])).unwrap();
    rho.store_chunk(vec![1.0f64, 2.0], vec![0], vec![2]).unwrap();
    series.close_iteration(1).unwrap();

    let it = series.iterations.get_mut(&1u64).unwrap();
    assert!(matches!(it.set_time(2.0f64), Err(Error::WrongApiUsage(_))));
    let mesh = it.meshes.get_mut("rho").unwrap();
    assert!(matches!(mesh.set_grid_unit_si(2.0), Err(Error::WrongApiUsage(_))));
    let rho = mesh.scalar_mut().unwrap();
    match rho.store_chunk(vec![9.0f64, 9.0], vec![0], vec![2]) {
        Err(Error::WrongApiUsage(msg)) => {
            assert_eq!(msg, "Storing a chunk is not possible in a closed iteration")
        }
        other => panic!("{other:?}"),
    }
    assert!(matches!(
        rho.reset_dataset(Dataset::new(Datatype::Double, vec![4])),
        Err(Error::WrongApiUsage(_))
    ));
    assert!(matches!(rho.make_constant(0.0f64), Err(Error::WrongApiUsage(_))));
    assert!(matches!(rho.set_attribute("x", 1i32), Err(Error::WrongApiUsage(_))));

    // other iterations stay writable
    series.iterations.get_or_create(2u64).unwrap().set_time(1.0f64).unwrap();
    series.flush().unwrap();
    drop(series);

    let mut series = Series::new(&path, Access::ReadOnly).unwrap();
    let rho = series
        .iterations
        .get_mut(&1u64)
        .unwrap()
        .meshes
        .get_mut("rho")
        .unwrap()
        .scalar_mut()
        .unwrap();
    assert_eq!(rho.load_chunk::<f64>(vec![], vec![]).unwrap(), vec![1.0, 2.0]);
}

#[test]
fn iterations_written_and_read_one_at_a_time() {
    let dir = TempDir::new().unwrap();
    let pattern = dir.path().join("step%T.json");
    {
        let mut series = Series::new(&pattern, Access::Create).unwrap();
        let mut steps = series.write_iterations();
        for index in 0..3u64 {
            let rho = steps
                .get_or_create(index)
                .unwrap()
                .meshes
                .get_or_create("rho")
                .unwrap()
                .scalar_mut()
                .unwrap();
            rho.reset_dataset(Dataset::new(Datatype::Int64, vec![1])).unwrap();
            rho.store_chunk(vec![10 * index as i64], vec![0], vec![1]).unwrap();
            if index > 0 {
                // the previous step is complete on disk
                let previous = dir.path().join(format!("step{}.json", index - 1));
                assert!(previous.exists());
            }
        }
        drop(steps);
        assert!(dir.path().join("step2.json").exists());
        assert!(series.iterations.iter().all(|(_, it)| it.closed()));
    }

    let mut series = Series::new(&pattern, Access::ReadOnly).unwrap();
    let mut seen = Vec::new();
    let mut steps = series.read_iterations();
    while let Some(step) = steps.next_iteration() {
        let (index, iteration) = step.unwrap();
        let rho = iteration
            .meshes
            .get_mut("rho")
            .unwrap()
            .scalar_mut()
            .unwrap();
        seen.push((index, rho.load_chunk::<i64>(vec![], vec![]).unwrap()));
    }
    assert_eq!(seen, vec![(0, vec![0]), (1, vec![10]), (2, vec![20])]);
}

// ---------------------------------------------------------------------------
// Access modes, TOML, listing
// ---------------------------------------------------------------------------

#[test]
fn read_only_rejects_mutation() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ro.json");
    write_sample(&path);

    let mut series = Series::new(&path, Access::ReadOnly).unwrap();
    assert!(matches!(series.set_author("x"), Err(Error::WrongApiUsage(_))));
    assert!(matches!(
        series.iterations.get_or_create(5u64),
        Err(Error::WrongApiUsage(_))
    ));
    let rho = series
        .iterations
        .get_mut(&100u64)
        .unwrap()
        .meshes
        .get_mut("rho")
        .unwrap()
        .scalar_mut()
        .unwrap();
    assert!(rho.store_chunk(vec![0.0f32], vec![0], vec![1]).is_err());
    assert!(series.flush().is_ok());
}

#[test]
fn missing_group_based_file() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        Series::new(dir.path().join("absent.json"), Access::ReadOnly),
        Err(Error::Io(_))
    ));
}

#[test]
fn toml_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("series.toml");
    {
        let mut series = Series::new(&path, Access::Create).unwrap();
        let c = series
            .iterations
            .get_or_create(3u64)
            .unwrap()
            .meshes
            .get_or_create("phi")
            .unwrap()
            .scalar_mut()
            .unwrap();
        c.reset_dataset(Dataset::new(Datatype::Double, vec![3])).unwrap();
        c.store_chunk(vec![1.5f64], vec![1], vec![1]).unwrap();
    }

    let mut series = Series::new(&path, Access::ReadOnly).unwrap();
    assert_eq!(series.backend(), "TOML");
    let c = series
        .iterations
        .get_mut(&3u64)
        .unwrap()
        .meshes
        .get_mut("phi")
        .unwrap()
        .scalar_mut()
        .unwrap();
    assert_eq!(c.load_chunk::<f64>(vec![], vec![]).unwrap(), vec![0.0, 1.5, 0.0]);
}

#[test]
fn options_select_backend() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("opts.dat");
    {
        let mut series =
            Series::with_options(&path, Access::Create, "backend = \"json\"\n[json]\nindent = 2\n")
                .unwrap();
        series.iterations.get_or_create(0u64).unwrap();
    }
    let written = dir.path().join("opts.dat.json");
    assert!(written.exists());
    assert!(std::fs::read_to_string(&written).unwrap().contains("\n  "));
}

#[test]
fn listing_of_read_series() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("list.json");
    write_sample(&path);

    let series = Series::new(&path, Access::ReadOnly).unwrap();
    let mut out = Vec::new();
    list_series(&series, true, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("openPMD series: list\n"));
    assert!(text.contains("generating machine: ci\n"));
    assert!(text.contains("number of iterations: 1 (groupBased)\n"));
    assert!(text.contains("number of meshes: 3\n"));
    assert!(text.contains("  all particle species:\n    electrons\n"));
}
