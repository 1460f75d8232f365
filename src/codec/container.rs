//! Map files are normally gzip-wrapped; some tools also save them raw.

use std::io::{BufRead, BufReader, Read};

use flate2::read::GzDecoder;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Wrap `source` so that reads yield the raw map stream, decompressing
/// when the data starts with the gzip magic and passing it through
/// otherwise.
pub fn open_container<'a, R: Read + 'a>(source: R) -> std::io::Result<Box<dyn Read + 'a>> {
    let mut buffered = BufReader::new(source);
    let head = buffered.fill_buf()?;
    if head.starts_with(&GZIP_MAGIC) {
        tracing::trace!("gzip container detected");
        Ok(Box::new(GzDecoder::new(buffered)))
    } else {
        Ok(Box::new(buffered))
    }
}

/// True when `data` looks like a gzip stream
pub fn is_compressed(data: &[u8]) -> bool {
    data.starts_with(&GZIP_MAGIC)
}
