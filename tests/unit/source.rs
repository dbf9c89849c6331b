use super::*;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("mosaic_source_{}_{name}", std::process::id()))
}

#[test]
fn vec_source_indexes_units_and_stays_exhausted() {
    let mut src = VecSource::new(vec![vec![1, 2], vec![3]]);
    let a = src.next_unit().unwrap().unwrap();
    let b = src.next_unit().unwrap().unwrap();
    assert_eq!((a.index(), a.data()), (0, &[1u8, 2][..]));
    assert_eq!((b.index(), b.data()), (1, &[3u8][..]));
    assert!(src.next_unit().unwrap().is_none());
    assert!(src.next_unit().unwrap().is_none());
}

#[test]
fn chunk_source_drops_short_tail() {
    let path = temp_path("chunks.raw");
    std::fs::write(&path, [0u8, 1, 2, 3, 4, 5, 6]).unwrap();

    let mut src = FrameChunkSource::open(&path, 3).unwrap();
    assert_eq!(src.next_unit().unwrap().unwrap().data(), &[0, 1, 2]);
    let second = src.next_unit().unwrap().unwrap();
    assert_eq!(second.index(), 1);
    assert_eq!(second.data(), &[3, 4, 5]);
    assert!(src.next_unit().unwrap().is_none());
    assert!(src.next_unit().unwrap().is_none());

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn chunk_source_rejects_bad_input() {
    assert!(FrameChunkSource::open(temp_path("missing.raw"), 4).is_err());
    let path = temp_path("zero.raw");
    std::fs::write(&path, [0u8; 4]).unwrap();
    assert!(FrameChunkSource::open(&path, 0).is_err());
    std::fs::remove_file(&path).unwrap();
}
