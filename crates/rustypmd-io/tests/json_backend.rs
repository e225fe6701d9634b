//! Integration tests for the JSON/TOML backend, driven through the task queue.

use rustypmd_format::{Attribute, DataBuffer, Dataset, Datatype, WrittenChunkInfo};
use rustypmd_io::{
    create_io_handler, Access, BackendConfig, Error, Format, IoTask, Parameter, SharedIoHandler,
    Writable,
};
use serde_json::Value;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn handler(dir: &TempDir, access: Access, format: Format) -> SharedIoHandler {
    create_io_handler(dir.path(), access, format, &BackendConfig::default())
        .unwrap()
        .into_shared()
}

fn enqueue(h: &SharedIoHandler, w: &Writable, p: Parameter) {
    h.borrow_mut().enqueue(IoTask::new(w, p));
}

fn run(h: &SharedIoHandler, w: &Writable, p: Parameter) -> rustypmd_io::Result<rustypmd_io::TaskOutput> {
    h.borrow_mut().run(IoTask::new(w, p))
}

fn read_json(dir: &TempDir, name: &str) -> Value {
    let text = std::fs::read_to_string(dir.path().join(name)).unwrap();
    serde_json::from_str(&text).unwrap()
}

/// Creates `name` with a group `/data/1` holding a 2x3 double dataset `E`.
fn file_with_dataset(h: &SharedIoHandler, name: &str) -> (Writable, Writable, Writable) {
    let root = Writable::root(h);
    let group = Writable::child(&root);
    let ds = Writable::child(&group);
    enqueue(h, &root, Parameter::CreateFile { name: name.into() });
    enqueue(h, &group, Parameter::CreatePath { path: "data/1".into() });
    enqueue(
        h,
        &ds,
        Parameter::CreateDataset {
            name: "E".into(),
            dataset: Dataset::new(Datatype::Double, vec![2, 3]),
        },
    );
    (root, group, ds)
}

// ---------------------------------------------------------------------------
// Files, groups, attributes
// ---------------------------------------------------------------------------

#[test]
fn layout_on_disk() {
    let dir = TempDir::new().unwrap();
    let h = handler(&dir, Access::Create, Format::Json);
    let (root, group, ds) = file_with_dataset(&h, "series");
    enqueue(
        &h,
        &root,
        Parameter::WriteAtt {
            name: "openPMD".into(),
            value: Attribute::from("1.1.0"),
        },
    );
    enqueue(
        &h,
        &ds,
        Parameter::WriteAtt {
            name: "unitSI".into(),
            value: Attribute::from(1.0f64),
        },
    );
    h.borrow_mut().flush().unwrap();
    assert!(root.written() && group.written() && ds.written());

    let v = read_json(&dir, "series.json");
    assert_eq!(v["attributes"]["openPMD"]["datatype"], "STRING");
    assert_eq!(v["attributes"]["openPMD"]["value"], "1.1.0");
    assert_eq!(v["data"]["1"]["E"]["datatype"], "DOUBLE");
    assert_eq!(
        v["data"]["1"]["E"]["data"],
        serde_json::json!([[null, null, null], [null, null, null]])
    );
    assert_eq!(v["data"]["1"]["E"]["attributes"]["unitSI"]["value"], 1.0);
    assert_eq!(v["platform_byte_widths"]["DOUBLE"], 8);
}

#[test]
fn listing_and_reading_back() {
    let dir = TempDir::new().unwrap();
    {
        let h = handler(&dir, Access::Create, Format::Json);
        let (root, _group, _ds) = file_with_dataset(&h, "series");
        let sub = Writable::child(&root);
        enqueue(&h, &sub, Parameter::CreatePath { path: "data/2".into() });
        enqueue(
            &h,
            &root,
            Parameter::WriteAtt {
                name: "spacing".into(),
                value: Attribute::from(vec![0.5f32, 0.25]),
            },
        );
        h.borrow_mut().flush().unwrap();
    }

    let h = handler(&dir, Access::ReadOnly, Format::Json);
    let root = Writable::root(&h);
    run(&h, &root, Parameter::OpenFile { name: "series".into() }).unwrap();
    let attrs = run(&h, &root, Parameter::ListAtts).unwrap().into_names().unwrap();
    assert_eq!(attrs, vec!["spacing".to_string()]);
    let a = run(&h, &root, Parameter::ReadAtt { name: "spacing".into() })
        .unwrap()
        .into_attribute()
        .unwrap();
    assert_eq!(a, Attribute::VecFloat(vec![0.5, 0.25]));

    let data = Writable::child(&root);
    run(&h, &data, Parameter::OpenPath { path: "data".into() }).unwrap();
    let mut paths = run(&h, &data, Parameter::ListPaths).unwrap().into_names().unwrap();
    paths.sort();
    assert_eq!(paths, vec!["1".to_string(), "2".to_string()]);

    let one = Writable::child(&data);
    run(&h, &one, Parameter::OpenPath { path: "1".into() }).unwrap();
    assert!(run(&h, &one, Parameter::ListPaths).unwrap().into_names().unwrap().is_empty());
    let datasets = run(&h, &one, Parameter::ListDatasets).unwrap().into_names().unwrap();
    assert_eq!(datasets, vec!["E".to_string()]);

    let e = Writable::child(&one);
    let (dtype, extent) = run(&h, &e, Parameter::OpenDataset { name: "E".into() })
        .unwrap()
        .into_dataset_info()
        .unwrap();
    assert_eq!((dtype, extent), (Datatype::Double, vec![2, 3]));

    let missing = run(&h, &root, Parameter::ReadAtt { name: "nope".into() });
    assert!(matches!(missing, Err(Error::NoSuchAttribute(_))));
}

#[test]
fn read_only_rejects_modification() {
    let dir = TempDir::new().unwrap();
    let h = handler(&dir, Access::ReadOnly, Format::Json);
    let root = Writable::root(&h);
    let err = run(&h, &root, Parameter::CreateFile { name: "x".into() }).unwrap_err();
    assert!(matches!(err, Error::ReadOnly(_)));
}

#[test]
fn read_write_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    {
        let h = handler(&dir, Access::Create, Format::Json);
        let root = Writable::root(&h);
        run(&h, &root, Parameter::CreateFile { name: "x".into() }).unwrap();
        h.borrow_mut().flush().unwrap();
    }
    let h = handler(&dir, Access::ReadWrite, Format::Json);
    let root = Writable::root(&h);
    match run(&h, &root, Parameter::CreateFile { name: "x".into() }) {
        Err(Error::WrongUsage(msg)) => {
            assert_eq!(msg, "Can only overwrite existing file in CREATE mode.")
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn open_in_missing_directory() {
    let dir = TempDir::new().unwrap();
    let h = create_io_handler(
        dir.path().join("absent"),
        Access::ReadOnly,
        Format::Json,
        &BackendConfig::default(),
    )
    .unwrap()
    .into_shared();
    let root = Writable::root(&h);
    match run(&h, &root, Parameter::OpenFile { name: "x".into() }) {
        Err(Error::NoSuchFile(msg)) => assert!(msg.starts_with("Supplied directory is not valid")),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn attribute_deletion() {
    let dir = TempDir::new().unwrap();
    let h = handler(&dir, Access::Create, Format::Json);
    let root = Writable::root(&h);
    enqueue(&h, &root, Parameter::CreateFile { name: "a".into() });
    enqueue(
        &h,
        &root,
        Parameter::WriteAtt {
            name: "comment".into(),
            value: Attribute::from("temporary"),
        },
    );
    enqueue(&h, &root, Parameter::DeleteAtt { name: "comment".into() });
    let attrs = run(&h, &root, Parameter::ListAtts).unwrap().into_names().unwrap();
    assert!(attrs.is_empty());
}

#[test]
fn group_deletion() {
    let dir = TempDir::new().unwrap();
    let h = handler(&dir, Access::Create, Format::Json);
    let root = Writable::root(&h);
    let data = Writable::child(&root);
    let it = Writable::child(&data);
    enqueue(&h, &root, Parameter::CreateFile { name: "g".into() });
    enqueue(&h, &data, Parameter::CreatePath { path: "data".into() });
    enqueue(&h, &it, Parameter::CreatePath { path: "7".into() });
    enqueue(&h, &it, Parameter::DeletePath { path: ".".into() });
    let paths = run(&h, &data, Parameter::ListPaths).unwrap().into_names().unwrap();
    assert!(paths.is_empty());
    assert!(!it.written());

    let err = run(&h, &root, Parameter::DeletePath { path: ".".into() }).unwrap_err();
    assert!(matches!(err, Error::WrongUsage(_)));
    let err = run(&h, &data, Parameter::DeletePath { path: "/data".into() }).unwrap_err();
    assert!(matches!(err, Error::WrongUsage(_)));
}

// ---------------------------------------------------------------------------
// Datasets
// ---------------------------------------------------------------------------

#[test]
fn chunk_write_and_read() {
    let dir = TempDir::new().unwrap();
    let h = handler(&dir, Access::Create, Format::Json);
    let (_root, _group, ds) = file_with_dataset(&h, "chunks");
    enqueue(
        &h,
        &ds,
        Parameter::WriteDataset {
            offset: vec![1, 1],
            extent: vec![1, 2],
            data: DataBuffer::from(vec![5.0f64, 6.0]),
        },
    );
    let buf = run(
        &h,
        &ds,
        Parameter::ReadDataset {
            offset: vec![0, 0],
            extent: vec![2, 3],
            dtype: Datatype::Double,
        },
    )
    .unwrap()
    .into_buffer()
    .unwrap();
    let values = buf.into_vec::<f64>().unwrap();
    assert!(values[..4].iter().all(|v| v.is_nan()));
    assert_eq!(&values[4..], &[5.0, 6.0]);

    let chunks = run(&h, &ds, Parameter::AvailableChunks).unwrap().into_chunks().unwrap();
    assert_eq!(chunks, vec![WrittenChunkInfo::new(vec![1, 1], vec![1, 2])]);
}

#[test]
fn request_verification() {
    let dir = TempDir::new().unwrap();
    let h = handler(&dir, Access::Create, Format::Json);
    let (_root, _group, ds) = file_with_dataset(&h, "verify");
    h.borrow_mut().flush().unwrap();

    let cases = [
        (vec![0], vec![2], DataBuffer::from(vec![0.0f64; 2]), "dimension"),
        (vec![1, 2], vec![1, 2], DataBuffer::from(vec![0.0f64; 2]), "size"),
        (vec![0, 0], vec![1, 2], DataBuffer::from(vec![0i32; 2]), "type"),
        (vec![0, u64::MAX], vec![1, 1], DataBuffer::from(vec![0.0f64]), "size"),
    ];
    for (offset, extent, data, what) in cases {
        match run(&h, &ds, Parameter::WriteDataset { offset, extent, data }) {
            Err(Error::DatasetMismatch(msg)) => {
                assert!(msg.starts_with("[JSON] "), "{msg}");
                assert!(msg.contains(what), "{msg}");
            }
            other => panic!("expected mismatch on {what}, got {other:?}"),
        }
    }
}

#[test]
fn extend_keeps_data() {
    let dir = TempDir::new().unwrap();
    let h = handler(&dir, Access::Create, Format::Json);
    let (_root, _group, ds) = file_with_dataset(&h, "extend");
    enqueue(
        &h,
        &ds,
        Parameter::WriteDataset {
            offset: vec![0, 0],
            extent: vec![2, 3],
            data: DataBuffer::from(vec![1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0]),
        },
    );
    enqueue(&h, &ds, Parameter::ExtendDataset { extent: vec![3, 3] });
    let chunks = run(&h, &ds, Parameter::AvailableChunks).unwrap().into_chunks().unwrap();
    assert_eq!(chunks, vec![WrittenChunkInfo::new(vec![0, 0], vec![2, 3])]);

    let err = run(&h, &ds, Parameter::ExtendDataset { extent: vec![2, 3] }).unwrap_err();
    match err {
        Error::WrongUsage(msg) => assert_eq!(msg, "Cannot shrink the extent of a dataset"),
        other => panic!("{other}"),
    }
    let err = run(&h, &ds, Parameter::ExtendDataset { extent: vec![9] }).unwrap_err();
    match err {
        Error::WrongUsage(msg) => assert_eq!(msg, "Cannot change dimensionality of a dataset"),
        other => panic!("{other}"),
    }
}

// ---------------------------------------------------------------------------
// TOML dialect
// ---------------------------------------------------------------------------

#[test]
fn toml_round_trip() {
    let dir = TempDir::new().unwrap();
    {
        let h = handler(&dir, Access::Create, Format::Toml);
        let (root, _group, ds) = file_with_dataset(&h, "series");
        enqueue(
            &h,
            &ds,
            Parameter::WriteDataset {
                offset: vec![0, 0],
                extent: vec![1, 3],
                data: DataBuffer::from(vec![1.0f64, 2.0, 3.0]),
            },
        );
        enqueue(
            &h,
            &root,
            Parameter::WriteAtt {
                name: "dims".into(),
                value: Attribute::ArrDbl7([1.0, 0.0, -1.0, 0.0, 0.0, 0.0, 0.0]),
            },
        );
        h.borrow_mut().flush().unwrap();
    }
    assert!(dir.path().join("series.toml").exists());

    let h = handler(&dir, Access::ReadOnly, Format::Toml);
    let root = Writable::root(&h);
    run(&h, &root, Parameter::OpenFile { name: "series.toml".into() }).unwrap();
    let dims = run(&h, &root, Parameter::ReadAtt { name: "dims".into() })
        .unwrap()
        .into_attribute()
        .unwrap();
    assert_eq!(dims, Attribute::ArrDbl7([1.0, 0.0, -1.0, 0.0, 0.0, 0.0, 0.0]));

    let data = Writable::child(&root);
    run(&h, &data, Parameter::OpenPath { path: "data/1".into() }).unwrap();
    let e = Writable::child(&data);
    run(&h, &e, Parameter::OpenDataset { name: "E".into() }).unwrap();
    let values = run(
        &h,
        &e,
        Parameter::ReadDataset {
            offset: vec![0, 0],
            extent: vec![2, 3],
            dtype: Datatype::Double,
        },
    )
    .unwrap()
    .into_buffer()
    .unwrap()
    .into_vec::<f64>()
    .unwrap();
    // TOML datasets are zero-initialized
    assert_eq!(values, vec![1.0, 2.0, 3.0, 0.0, 0.0, 0.0]);
}

#[test]
fn toml_errors_name_their_backend() {
    let dir = TempDir::new().unwrap();
    let h = handler(&dir, Access::Create, Format::Toml);
    let (_root, _group, ds) = file_with_dataset(&h, "verify");
    h.borrow_mut().flush().unwrap();

    let err = run(
        &h,
        &ds,
        Parameter::ReadDataset {
            offset: vec![u64::MAX, 0],
            extent: vec![2, 3],
            dtype: Datatype::Double,
        },
    )
    .unwrap_err();
    match err {
        Error::DatasetMismatch(msg) => {
            assert_eq!(msg, "[TOML] Read/Write request exceeds the dataset's size")
        }
        other => panic!("{other}"),
    }
}
