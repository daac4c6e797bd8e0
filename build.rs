//! Renders the `flowframe(1)` manual page.
//!
//! The page is generated from the clap definition in `src/cli.rs` and written
//! to `target/generated-man/flowframe.1` for packaging.

use std::{fs, path::PathBuf};

use clap::CommandFactory;
use clap_mangen::Man;

#[path = "src/cli.rs"]
#[allow(dead_code, reason = "only the command definition is rendered")]
mod cli;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=src/cli.rs");

    let man_dir = PathBuf::from("target/generated-man");
    fs::create_dir_all(&man_dir)?;

    let mut page = Vec::new();
    Man::new(cli::Cli::command()).render(&mut page)?;
    fs::write(man_dir.join("flowframe.1"), page)?;

    Ok(())
}
