#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Write a jar containing `entries` (name, bytes) in the given order
pub fn create_test_jar(path: &Path, entries: &[(&str, &[u8])]) {
    let file = File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    // Stored entries keep the payload bytes verbatim in the file
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored);

    for (name, bytes) in entries {
        if name.ends_with('/') {
            zip.add_directory(name.trim_end_matches('/'), options).unwrap();
        } else {
            zip.start_file(*name, options).unwrap();
            zip.write_all(bytes).unwrap();
        }
    }

    zip.finish().unwrap();
}

/// Create the files of `entries` under `root`, making parent directories
pub fn write_tree(root: &Path, entries: &[(&str, &[u8])]) {
    for (name, bytes) in entries {
        let path = root.join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, bytes).unwrap();
    }
}

/// Flip the first byte of `payload` where it is stored in the archive file
pub fn damage_stored_payload(jar: &Path, payload: &[u8]) {
    let mut bytes = std::fs::read(jar).unwrap();
    let at = bytes
        .windows(payload.len())
        .position(|w| w == payload)
        .unwrap();
    bytes[at] ^= 0xFF;
    std::fs::write(jar, bytes).unwrap();
}

/// Rewrite the fixed 46-byte central directory header of entry `name`
pub fn patch_central_header(jar: &Path, name: &str, patch: impl FnOnce(&mut [u8])) {
    let mut bytes = std::fs::read(jar).unwrap();
    let start = (0..bytes.len() - 46)
        .find(|&i| {
            let name_len = u16::from_le_bytes([bytes[i + 28], bytes[i + 29]]) as usize;
            bytes[i..i + 4] == *b"PK\x01\x02"
                && bytes.get(i + 46..i + 46 + name_len) == Some(name.as_bytes())
        })
        .unwrap();
    patch(&mut bytes[start..start + 46]);
    std::fs::write(jar, bytes).unwrap();
}
