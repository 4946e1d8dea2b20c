use std::io::{self, Write};

use anyhow::Result;
use studio_core::catalog::{
    CatalogEntry, CHANNELS, CHAT_MODELS, DEFAULT_CHAT_MODEL_ID, DEFAULT_IMAGE_MODEL_ID, HEROES,
    IMAGE_MODELS,
};

pub fn run() -> Result<()> {
    write_catalogs(&mut io::stdout().lock())?;
    Ok(())
}

fn write_catalogs(out: &mut impl Write) -> io::Result<()> {
    write_section(out, "Image models", IMAGE_MODELS, Some(DEFAULT_IMAGE_MODEL_ID))?;
    write_section(out, "Chat models", CHAT_MODELS, Some(DEFAULT_CHAT_MODEL_ID))?;
    write_section(out, "Heroes", HEROES, None)?;
    write_section(out, "Channels", CHANNELS, None)
}

fn write_section(
    out: &mut impl Write,
    title: &str,
    entries: &[CatalogEntry],
    default_id: Option<&str>,
) -> io::Result<()> {
    writeln!(out, "{title}:")?;
    for entry in entries {
        let marker = if Some(entry.id) == default_id { " (default)" } else { "" };
        writeln!(out, "  {:<38} {}{}", entry.id, entry.name, marker)?;
    }
    writeln!(out)
}
