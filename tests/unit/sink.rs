use super::*;

#[test]
fn memory_sink_shares_bytes_through_handle() {
    let mut sink = MemorySink::new();
    let handle = sink.handle();
    sink.append(b"ab").unwrap();
    sink.append(b"c").unwrap();
    sink.flush().unwrap();
    sink.close().unwrap();
    assert_eq!(&*handle.lock().unwrap(), b"abc");
    assert_eq!(sink.appends(), 2);
    assert!(sink.append(b"d").is_err());
}

#[test]
fn file_sink_creates_parent_and_rejects_append_after_close() {
    let dir = std::env::temp_dir().join(format!("mosaic_sink_{}", std::process::id()));
    let path = dir.join("nested").join("out.bin");
    let mut sink = FileSink::create(&path).unwrap();
    sink.append(&[1, 2, 3]).unwrap();
    sink.append(&[4]).unwrap();
    assert_eq!(sink.bytes_written(), 4);
    sink.close().unwrap();
    sink.close().unwrap();
    assert!(sink.append(&[5]).is_err());
    assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3, 4]);
    std::fs::remove_dir_all(&dir).unwrap();
}
