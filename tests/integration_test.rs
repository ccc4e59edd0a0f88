use std::fs;
use std::path::Path;

use tempfile::tempdir;
use zpak::codec::CodecRegistry;
use zpak::{Archive, CompressionLevel, Decoder, EncodeOptions, Encoder, Error};

fn encoder(algorithm: &str, level: CompressionLevel) -> Encoder {
    Encoder::new(EncodeOptions {
        algorithm: algorithm.to_owned(),
        level,
    })
}

fn write_tree(root: &Path, files: &[(&str, &[u8])]) {
    for (rel, bytes) in files {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, bytes).unwrap();
    }
}

#[test]
fn hello_roundtrip_lz4_medium() {
    let input = tempdir().unwrap();
    let out = tempdir().unwrap();
    write_tree(input.path(), &[("a.txt", b"hello")]);
    let archive_path = out.path().join("hello.zpak");

    encoder("lz4", CompressionLevel::Medium)
        .encode(input.path(), &archive_path)
        .unwrap();
    assert!(fs::metadata(&archive_path).unwrap().len() < 1024);

    let archive = Decoder::with_algorithm("lz4")
        .read_archive(&archive_path)
        .unwrap();
    assert_eq!(archive.manifest.entries.len(), 1);
    let entry = &archive.manifest.entries[0];
    assert_eq!(entry.original_path, "a.txt");
    assert_eq!(entry.encoded_path, "offset:0");
    assert_eq!(entry.original_size, 5);
    assert_eq!(entry.checksum, 0x3610_A686);

    let extracted = out.path().join("tree");
    Decoder::new().decode(&archive_path, &extracted).unwrap();
    assert_eq!(
        fs::read(extracted.join("a.txt")).unwrap(),
        [0x68, 0x65, 0x6c, 0x6c, 0x6f]
    );
}

#[test]
fn two_binary_files_zstd_high() {
    let input = tempdir().unwrap();
    let out = tempdir().unwrap();
    let zeros = vec![0x00u8; 1024];
    let ones = vec![0xFFu8; 1024];
    write_tree(input.path(), &[("a.bin", &zeros), ("b.bin", &ones)]);
    let archive_path = out.path().join("two.zpak");

    encoder("zstd", CompressionLevel::High)
        .encode(input.path(), &archive_path)
        .unwrap();

    let archive = Decoder::new().read_archive(&archive_path).unwrap();
    let entries = &archive.manifest.entries;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].original_path, "a.bin");
    assert_eq!(entries[1].original_path, "b.bin");
    assert_eq!(entries[1].encoded_path, "offset:1024");
    assert_eq!(entries[0].checksum, crc32fast::hash(&zeros));
    assert_eq!(entries[1].checksum, crc32fast::hash(&ones));
}

#[test]
fn nested_tree_roundtrips_for_every_codec() {
    let files: &[(&str, &[u8])] = &[
        ("top.txt", b"top level"),
        ("sub/mid.txt", b"middle"),
        ("sub/deeper/leaf.bin", &[0u8, 1, 2, 3, 255]),
        ("sub/deeper/zero.bin", b""),
    ];
    for algo in ["lz4", "zstd", "lzma", "brotli"] {
        let input = tempdir().unwrap();
        let out = tempdir().unwrap();
        write_tree(input.path(), files);
        let archive_path = out.path().join("nested.zpak");

        encoder(algo, CompressionLevel::Medium)
            .encode(input.path(), &archive_path)
            .unwrap();

        let archive = Decoder::new().read_archive(&archive_path).unwrap();
        assert!(
            archive
                .manifest
                .entries
                .iter()
                .any(|e| e.original_path == "sub/deeper/leaf.bin"),
            "{algo}: manifest paths must use forward slashes"
        );

        let extracted = out.path().join("tree");
        let count = Decoder::new().decode(&archive_path, &extracted).unwrap();
        assert_eq!(count, files.len(), "{algo}");
        for (rel, bytes) in files {
            assert_eq!(
                fs::read(extracted.join(rel)).unwrap(),
                *bytes,
                "{algo}: {rel}"
            );
        }
    }
}

#[test]
fn entry_order_follows_alphabetical_walk() {
    let input = tempdir().unwrap();
    let out = tempdir().unwrap();
    write_tree(
        input.path(),
        &[
            ("zeta.txt", b"z"),
            ("alpha.txt", b"a"),
            ("mid/beta.txt", b"b"),
        ],
    );
    let archive_path = out.path().join("order.zpak");
    encoder("zstd", CompressionLevel::Low)
        .encode(input.path(), &archive_path)
        .unwrap();

    let archive = Decoder::new().read_archive(&archive_path).unwrap();
    let paths: Vec<&str> = archive
        .manifest
        .entries
        .iter()
        .map(|e| e.original_path.as_str())
        .collect();
    assert_eq!(paths, ["alpha.txt", "mid/beta.txt", "zeta.txt"]);
}

#[test]
fn empty_directory_roundtrips() {
    let input = tempdir().unwrap();
    let out = tempdir().unwrap();
    let archive_path = out.path().join("empty.zpak");

    let summary = encoder("zstd", CompressionLevel::Medium)
        .encode(input.path(), &archive_path)
        .unwrap();
    assert_eq!(summary.entries, 0);

    let extracted = out.path().join("tree");
    let count = Decoder::new().decode(&archive_path, &extracted).unwrap();
    assert_eq!(count, 0);
    assert_eq!(fs::read_dir(&extracted).unwrap().count(), 0);
}

#[test]
fn chunk_boundary_file_roundtrips() {
    // Exactly one streaming-codec output chunk (64 KiB).
    let input = tempdir().unwrap();
    let out = tempdir().unwrap();
    let data = vec![0x5Au8; 64 * 1024];
    write_tree(input.path(), &[("block.bin", &data)]);
    let archive_path = out.path().join("block.zpak");

    encoder("lzma", CompressionLevel::Medium)
        .encode(input.path(), &archive_path)
        .unwrap();

    let extracted = out.path().join("tree");
    Decoder::new().decode(&archive_path, &extracted).unwrap();
    assert_eq!(fs::read(extracted.join("block.bin")).unwrap(), data);
}

#[cfg(unix)]
#[test]
fn symlinks_are_skipped() {
    let input = tempdir().unwrap();
    let out = tempdir().unwrap();
    write_tree(input.path(), &[("real.txt", b"contents")]);
    std::os::unix::fs::symlink(input.path().join("real.txt"), input.path().join("link.txt"))
        .unwrap();

    let archive_path = out.path().join("links.zpak");
    let summary = encoder("lz4", CompressionLevel::Medium)
        .encode(input.path(), &archive_path)
        .unwrap();
    assert_eq!(summary.entries, 1);
}

#[test]
fn truncated_container_is_invalid() {
    let mut ar = Archive::new(2);
    ar.add_file("a.txt", b"hello").unwrap();
    let bytes = ar.serialize();
    assert!(matches!(
        Archive::parse(&bytes[..4]),
        Err(Error::InvalidArchive(_))
    ));
}

#[test]
fn truncated_file_on_disk_fails_without_panicking() {
    let input = tempdir().unwrap();
    let out = tempdir().unwrap();
    write_tree(input.path(), &[("a.txt", b"hello")]);
    let archive_path = out.path().join("short.zpak");
    encoder("zstd", CompressionLevel::Medium)
        .encode(input.path(), &archive_path)
        .unwrap();

    let bytes = fs::read(&archive_path).unwrap();
    fs::write(&archive_path, &bytes[..4]).unwrap();
    assert!(Decoder::new().decode(&archive_path, out.path()).is_err());
}

#[test]
fn corrupted_manifest_byte_is_detected() {
    let mut ar = Archive::new(1);
    ar.add_file("a.txt", b"hello world").unwrap();
    ar.add_file("b.txt", b"more bytes here").unwrap();
    let mut bytes = ar.serialize();
    bytes[8 + 16] = !bytes[8 + 16];
    assert!(matches!(
        Archive::parse(&bytes),
        Err(Error::CorruptedData(_) | Error::InvalidArchive(_))
    ));
}

#[test]
fn recompressed_archive_decodes_by_detection() {
    // Encode with brotli, then re-wrap the identical inner bytes in a zstd
    // frame.  Identification keys off the payload, not the stored id.
    let input = tempdir().unwrap();
    let out = tempdir().unwrap();
    write_tree(input.path(), &[("a.txt", b"codec identity test")]);
    let archive_path = out.path().join("brotli.zpak");
    encoder("brotli", CompressionLevel::Medium)
        .encode(input.path(), &archive_path)
        .unwrap();

    let registry = CodecRegistry::new();
    let brotli = registry.by_name("brotli").unwrap();
    let zstd = registry.by_name("zstd").unwrap();
    let inner = brotli
        .decompress(&fs::read(&archive_path).unwrap(), None)
        .unwrap();
    let rewrapped = zstd.compress(&inner, CompressionLevel::Medium).unwrap();
    let rewrapped_path = out.path().join("rewrapped.zpak");
    fs::write(&rewrapped_path, rewrapped).unwrap();

    let archive = Decoder::new().read_archive(&rewrapped_path).unwrap();
    // The manifest still records brotli; decoding succeeded through zstd.
    assert_eq!(archive.manifest.algorithm_id, Some(4));
    let extracted = out.path().join("tree");
    Decoder::new().decode(&rewrapped_path, &extracted).unwrap();
    assert_eq!(
        fs::read(extracted.join("a.txt")).unwrap(),
        b"codec identity test"
    );
}

#[test]
fn brotli_archive_decodes_via_trial_loop() {
    // Brotli has no magic bytes, so decoding without a hint exercises the
    // sniff-and-try fallback end to end.
    let input = tempdir().unwrap();
    let out = tempdir().unwrap();
    write_tree(input.path(), &[("data.bin", &[0xA5u8; 4096])]);
    let archive_path = out.path().join("trial.zpak");
    encoder("brotli", CompressionLevel::High)
        .encode(input.path(), &archive_path)
        .unwrap();

    let extracted = out.path().join("tree");
    Decoder::new().decode(&archive_path, &extracted).unwrap();
    assert_eq!(
        fs::read(extracted.join("data.bin")).unwrap(),
        vec![0xA5u8; 4096]
    );
}

#[test]
fn legacy_archive_without_algorithm_id_decodes() {
    // Simulate pre-versioned tooling: strip the algorithm id, re-serialize,
    // compress with a detectable codec.
    let out = tempdir().unwrap();
    let mut ar = Archive::new(2);
    ar.add_file("old.txt", b"from older tooling").unwrap();
    ar.manifest.algorithm_id = None;

    let registry = CodecRegistry::new();
    let zstd = registry.by_name("zstd").unwrap();
    let payload = zstd
        .compress(&ar.serialize(), CompressionLevel::Medium)
        .unwrap();
    let archive_path = out.path().join("legacy.zpak");
    fs::write(&archive_path, payload).unwrap();

    let archive = Decoder::new().read_archive(&archive_path).unwrap();
    assert_eq!(archive.manifest.algorithm_id, None);
    let extracted = out.path().join("tree");
    Decoder::new().decode(&archive_path, &extracted).unwrap();
    assert_eq!(
        fs::read(extracted.join("old.txt")).unwrap(),
        b"from older tooling"
    );
}

#[test]
fn wrong_forced_algorithm_fails() {
    let input = tempdir().unwrap();
    let out = tempdir().unwrap();
    write_tree(input.path(), &[("a.txt", b"hello")]);
    let archive_path = out.path().join("z.zpak");
    encoder("zstd", CompressionLevel::Medium)
        .encode(input.path(), &archive_path)
        .unwrap();

    let err = Decoder::with_algorithm("lzma")
        .decode(&archive_path, out.path())
        .unwrap_err();
    assert!(matches!(err, Error::DecompressionFailed(_)));
}
