//! Version command

use anyhow::Result;

use crate::output::OutputContext;

/// Show version and platform information
pub fn version(out: &OutputContext) -> Result<()> {
    out.print_kv(&[
        ("Name", env!("CARGO_PKG_NAME").to_string()),
        ("Version", env!("CARGO_PKG_VERSION").to_string()),
        (
            "OS/Arch",
            format!("{}/{}", std::env::consts::OS, std::env::consts::ARCH),
        ),
    ])
}
