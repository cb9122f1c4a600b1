//! # Media Types Subcommand
//!
//! Lists every media type with a built-in schema.

use std::io::Write;

use anyhow::Result;
use clap::Args;

use imgidx_core::MediaType;
use imgidx_schema::schema_document;

use crate::EXIT_OK;

/// Arguments for the `imgidx media-types` subcommand.
#[derive(Args, Debug)]
pub struct MediaTypesArgs {
    /// Print only the full identifiers, one per line.
    #[arg(long, short)]
    pub quiet: bool,
}

pub fn run_media_types(args: &MediaTypesArgs) -> Result<u8> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_media_types(args, &mut out)?;
    out.flush()?;
    Ok(EXIT_OK)
}

/// One row per media type: short name, identifier, schema document.
pub fn write_media_types(args: &MediaTypesArgs, out: &mut impl Write) -> std::io::Result<()> {
    for mt in MediaType::ALL {
        if args.quiet {
            writeln!(out, "{}", mt.as_str())?;
        } else {
            writeln!(
                out,
                "{:<14} {:<50} {}",
                mt.short_name(),
                mt.as_str(),
                schema_document(mt)
            )?;
        }
    }
    Ok(())
}
