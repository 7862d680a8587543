// Copyright 2025 Logan Magee
//
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use saneprep::Manifest;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
struct Args {
    /// Generation directory to copy build inputs into (its src/ and
    /// include/ subdirectories must already exist)
    #[arg(long, value_name = "PATH")]
    gen_dir: PathBuf,

    /// Vendored backend source tree to patch and read from
    #[arg(long, value_name = "PATH")]
    source_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    saneprep::install(&Manifest::sane_backends(), &args.source_dir, &args.gen_dir).with_context(
        || {
            format!(
                "Failed to prepare '{}' from '{}'",
                args.gen_dir.display(),
                args.source_dir.display(),
            )
        },
    )?;

    Ok(())
}
