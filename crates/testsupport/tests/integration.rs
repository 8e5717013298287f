//! Integration tests demonstrating testsupport usage.

use std::io::SeekFrom;

use pagecache::{OpenOptions, PageCache};
use testsupport::prelude::*;

#[test]
fn fixtures_round_trip_through_the_cache() {
    let content = patterned(1000);
    let (_dir, path) = temp_file_with(&content);
    let mut cache = PageCache::new(small_config(256, 2));
    let handle = cache.open(&path, OpenOptions::new().read(true)).unwrap();

    let mut buf = vec![0u8; 1000];
    assert_eq!(cache.read(handle, &mut buf).unwrap(), 1000);
    assert_eq!(buf, content);

    cache.close(handle).unwrap();
}

#[test]
fn distinct_handles_keep_distinct_positions() {
    let (_dir_a, path_a) = temp_file_with(&patterned(512));
    let (_dir_b, path_b) = temp_path();
    let mut cache = PageCache::new(small_config(256, 2));

    let reader = cache.open(&path_a, OpenOptions::new().read(true)).unwrap();
    let writer = cache
        .open(&path_b, OpenOptions::new().write(true).create(true))
        .unwrap();

    let mut buf = [0u8; 100];
    assert_eq!(cache.read(reader, &mut buf).unwrap(), 100);
    cache.write(writer, b"interleaved").unwrap();
    assert_eq!(cache.read(reader, &mut buf).unwrap(), 100);

    assert_eq!(cache.seek(reader, SeekFrom::Current(0)).unwrap(), 200);
    assert_eq!(cache.seek(writer, SeekFrom::Current(0)).unwrap(), 11);

    cache.close(reader).unwrap();
    cache.close(writer).unwrap();

    assert_file_bytes(&path_b, b"interleaved");
}

#[test]
fn mirror_model_tracks_gap_writes() {
    let mut model = MirrorFile::new();
    model.seek(SeekFrom::Start(10));
    model.write(b"xy");

    assert_eq!(model.len(), 12);
    assert!(model.bytes()[..10].iter().all(|&b| b == 0));
    assert_eq!(&model.bytes()[10..], b"xy");
}

#[test]
fn mirror_model_rejects_negative_seeks() {
    let mut model = MirrorFile::from_bytes(patterned(64));
    assert_eq!(model.seek(SeekFrom::End(-65)), None);
    assert_eq!(model.position(), 0);
    assert_eq!(model.seek(SeekFrom::End(-64)), Some(0));
}
