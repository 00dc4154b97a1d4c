// src/payload/materialize.rs

use std::io::{self, Read, Write};
use std::path::PathBuf;

use tracing::{debug, info};

use crate::errors::{LauncherError, Result};
use crate::host::{AssetSource, FileStore};

/// Size of each read/write step when copying the payload.
pub const CHUNK_SIZE: usize = 4096;

/// Where the payload ended up and how many bytes were written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Materialized {
    pub path: PathBuf,
    pub bytes: u64,
}

/// Copy `reader` into `writer` in [`CHUNK_SIZE`] steps until the reader is
/// exhausted, then flush.
///
/// Interrupted reads are retried; every other error is returned as-is.
pub fn copy_chunked<R, W>(reader: &mut R, writer: &mut W) -> io::Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buf = [0u8; CHUNK_SIZE];
    let mut total: u64 = 0;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&buf[..n])?;
        total += n as u64;
    }

    writer.flush()?;
    Ok(total)
}

/// Copy the asset `asset_name` into `store`, overwriting any earlier copy.
///
/// Both streams live only for the duration of this call and are released on
/// every path out of it. A failed copy may leave a truncated file behind.
pub fn materialize_payload(
    assets: &dyn AssetSource,
    store: &dyn FileStore,
    asset_name: &str,
) -> Result<Materialized> {
    let path = store.payload_path(asset_name);
    let wrap = |source: io::Error| LauncherError::Materialize {
        asset: asset_name.to_string(),
        path: path.clone(),
        source,
    };

    debug!(asset = %asset_name, path = ?path, "materializing payload");

    let bytes = {
        let mut reader = assets.open(asset_name).map_err(wrap)?;
        let mut writer = store.create(&path).map_err(wrap)?;
        copy_chunked(&mut reader, &mut writer).map_err(wrap)?
    };

    info!(asset = %asset_name, path = ?path, bytes, "payload materialized");

    Ok(Materialized { path, bytes })
}
