//! Decode a PVR container back to an image file.

use std::path::Path;

use etcpak::container::load_container;
use etcpak::image_io::save_image;
use tracing::info;

use crate::error::CliError;

/// Run the view command: decode the base level of `input` into `output`.
pub fn run(input: &Path, output: &Path) -> Result<(), CliError> {
    let texture = load_container(input)?;
    info!(
        format = %texture.format(),
        width = texture.width(),
        height = texture.height(),
        levels = texture.level_count(),
        "Loaded texture"
    );
    save_image(output, &texture.decode())?;
    Ok(())
}
