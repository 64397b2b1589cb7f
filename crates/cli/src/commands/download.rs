//! Download command.

#![allow(clippy::print_stdout)] // command output goes to stdout

use std::path::Path;

use ddm_core::ListingId;

use super::connect;

/// Decrypt a listing's pointer and save the file.
pub async fn download(id: u64, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let market = connect()?;
    let file = market.download(ListingId::new(id)).await?;

    let path = output.map_or_else(|| Path::new(&file.file_name).to_path_buf(), Path::to_path_buf);
    std::fs::write(&path, &file.bytes)?;

    println!(
        "Saved {} bytes to {} ({})",
        file.bytes.len(),
        path.display(),
        file.content_type
    );
    Ok(())
}
