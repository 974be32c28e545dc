//! # Compression Containers
//!
//! Transparent decompression around the streaming (CSV / JSON) readers.

use std::{
    fs::File,
    io::{Cursor, Read},
    path::Path,
};

use crate::{
    errors::{TCResult, TokencountError},
    formats::{Compression, FileEntry},
};

/// A boxed, decompressed byte stream.
pub type BoxRead = Box<dyn Read + Send>;

/// Open the decompressed byte stream of `entry`.
///
/// * gzip, bzip2, and xz are multi-member / multi-stream aware.
/// * zip reads the first file entry of the archive into memory.
pub fn open_reader(entry: &FileEntry) -> TCResult<BoxRead> {
    let file = File::open(&entry.path)?;
    Ok(match entry.compression {
        Compression::None => Box::new(file),
        Compression::Gzip => Box::new(flate2::read::MultiGzDecoder::new(file)),
        Compression::Bzip2 => Box::new(bzip2::read::MultiBzDecoder::new(file)),
        Compression::Xz => Box::new(xz2::read::XzDecoder::new_multi_decoder(file)),
        Compression::Zip => Box::new(Cursor::new(read_first_zip_entry(file, &entry.path)?)),
    })
}

fn read_first_zip_entry(
    file: File,
    path: &Path,
) -> TCResult<Vec<u8>> {
    let mut archive = zip::ZipArchive::new(file)?;
    for idx in 0..archive.len() {
        let mut member = archive.by_index(idx)?;
        // Finder metadata; never data.
        if member.is_dir() || member.name().starts_with("__MACOSX/") {
            continue;
        }

        log::trace!("{}: reading zip member {:?}", path.display(), member.name());

        let mut buf = Vec::with_capacity(member.size() as usize);
        member.read_to_end(&mut buf)?;
        return Ok(buf);
    }

    Err(TokencountError::EmptyArchive(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempdir::TempDir;

    use super::*;

    const PAYLOAD: &str = "{\"text\": \"hello\"}\n{\"text\": \"world\"}\n";

    fn read_all(entry: &FileEntry) -> TCResult<String> {
        let mut text = String::new();
        open_reader(entry)?.read_to_string(&mut text)?;
        Ok(text)
    }

    #[test]
    fn test_plain_and_gzip() -> TCResult<()> {
        let tmpdir = TempDir::new("tokencount-containers")?;

        let plain = tmpdir.path().join("rows.jsonl");
        std::fs::write(&plain, PAYLOAD)?;
        assert_eq!(read_all(&FileEntry::new(&plain))?, PAYLOAD);

        // Two gzip members, as written by `cat a.gz b.gz`.
        let gz = tmpdir.path().join("rows.jsonl.gz");
        let mut bytes = Vec::new();
        for part in PAYLOAD.split_inclusive('\n') {
            let mut enc =
                flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
            enc.write_all(part.as_bytes())?;
            bytes.extend(enc.finish()?);
        }
        std::fs::write(&gz, bytes)?;
        assert_eq!(read_all(&FileEntry::new(&gz))?, PAYLOAD);

        Ok(())
    }

    #[test]
    fn test_bzip2_and_xz() -> TCResult<()> {
        let tmpdir = TempDir::new("tokencount-containers")?;

        let bz = tmpdir.path().join("rows.jsonl.bz2");
        let mut enc = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
        enc.write_all(PAYLOAD.as_bytes())?;
        std::fs::write(&bz, enc.finish()?)?;
        assert_eq!(read_all(&FileEntry::new(&bz))?, PAYLOAD);

        let xz = tmpdir.path().join("rows.jsonl.xz");
        let mut enc = xz2::write::XzEncoder::new(Vec::new(), 6);
        enc.write_all(PAYLOAD.as_bytes())?;
        std::fs::write(&xz, enc.finish()?)?;
        assert_eq!(read_all(&FileEntry::new(&xz))?, PAYLOAD);

        Ok(())
    }

    #[test]
    fn test_zip() -> TCResult<()> {
        let tmpdir = TempDir::new("tokencount-containers")?;

        let path = tmpdir.path().join("rows.jsonl.zip");
        let mut writer = zip::ZipWriter::new(File::create(&path)?);
        writer.add_directory("nested/", zip::write::SimpleFileOptions::default())?;
        writer.start_file("nested/rows.jsonl", zip::write::SimpleFileOptions::default())?;
        writer.write_all(PAYLOAD.as_bytes())?;
        writer.finish()?;
        assert_eq!(read_all(&FileEntry::new(&path))?, PAYLOAD);

        let empty = tmpdir.path().join("empty.jsonl.zip");
        zip::ZipWriter::new(File::create(&empty)?).finish()?;
        assert!(matches!(
            open_reader(&FileEntry::new(&empty)),
            Err(TokencountError::EmptyArchive(_))
        ));

        Ok(())
    }
}
