//! The remote metadata query flow.
//!
//! Runs once per invocation, before the first file is split: search the
//! metadata server, let the user pick a result, fetch it into the working
//! directory as a cddb file for the split to consume.

use std::io::{BufRead, Write};

use anyhow::{Result, bail};
use comfy_table::{Table, presets::UTF8_FULL};

use crate::engine::Engine;
use crate::interactive;
use crate::query::QueryDescriptor;

/// Metadata file the fetched result is written to and the split reads from.
pub const QUERY_CDDB_FILE: &str = "query.cddb";

pub fn run_query(
    descriptor: &QueryDescriptor,
    engine: &dyn Engine,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> Result<()> {
    print_server_summary(descriptor, out)?;

    let search_string = match &descriptor.search_string {
        Some(given) => given.clone(),
        None => read_search_string(input, out)?,
    };

    writeln!(out, "\n  Search string: {search_string}")?;
    writeln!(
        out,
        "\nSearching from {} on port {} using {} ...",
        descriptor.search.host,
        descriptor.search.port,
        descriptor.search.protocol.name()
    )?;

    let results = engine.freedb_search(&search_string, &descriptor.search)?;
    if results.is_empty() {
        bail!("no results found for '{search_string}'");
    }

    let selected = match descriptor.chosen_result {
        Some(index) if index < results.len() => index,
        // an out-of-range preselection falls back to the first result
        Some(_) => 0,
        None => {
            interactive::browse_results(&results, input, out)?;
            interactive::select_result(results.len(), input, out)?
        }
    };

    writeln!(
        out,
        "\nGetting file from {} on port {} using {} ...",
        descriptor.get.host,
        descriptor.get.port,
        descriptor.get.protocol.name()
    )?;
    engine.freedb_fetch(results[selected].id, &descriptor.get, QUERY_CDDB_FILE)?;

    Ok(())
}

fn print_server_summary(descriptor: &QueryDescriptor, out: &mut dyn Write) -> Result<()> {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["", "Type", "Site", "Port"]);
    table.add_row(vec![
        "Search".to_string(),
        descriptor.search.protocol.name().to_string(),
        descriptor.search.host.clone(),
        descriptor.search.port.to_string(),
    ]);
    table.add_row(vec![
        "Get".to_string(),
        descriptor.get.protocol.name().to_string(),
        descriptor.get.host.clone(),
        descriptor.get.port.to_string(),
    ]);
    writeln!(out, "{table}")?;
    Ok(())
}

/// Prompt until the user types a non-empty search string.
fn read_search_string(input: &mut dyn BufRead, out: &mut dyn Write) -> Result<String> {
    writeln!(out, "CDDB QUERY. Insert album and artist informations to find cd.")?;

    let mut first_time = true;
    loop {
        if !first_time {
            writeln!(out, "\nPlease search something ...")?;
        }
        first_time = false;

        write!(out, "\n Search: ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            bail!("console input closed while waiting for a search string");
        }
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if !trimmed.is_empty() {
            return Ok(trimmed.to_string());
        }
    }
}
