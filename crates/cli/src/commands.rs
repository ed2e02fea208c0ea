//! File conversion commands
//!
//! Each mode reads the source fully into memory, decodes it, optionally
//! prints it, re-encodes it and writes the destination. With `verify` the
//! written bytes are decoded again and compared against the source.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, ensure, Context, Result};
use riot_bin::Document;
use riot_wad::Wad;
use tracing::{debug, info};

/// Which codec a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// WAD archive chunk table
    Wad,
    /// BIN property tree
    Inibin,
}

/// Inputs of a single conversion.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub mode: Mode,
    pub src: PathBuf,
    pub dst: PathBuf,
    /// Print the decoded structure to the output writer.
    pub print: bool,
    /// Decode the written bytes again and compare with the source.
    pub verify: bool,
}

/// Outcome of a successful conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub input_len: usize,
    pub output_len: usize,
    pub verified: bool,
}

/// Run one conversion, printing to `out`.
pub fn run(options: &RunOptions, out: &mut dyn Write) -> Result<RunReport> {
    let src = &options.src;
    let input = fs::read(src).with_context(|| format!("failed to read {}", src.display()))?;
    info!(src = %src.display(), len = input.len(), mode = ?options.mode, "read source");

    let output = match options.mode {
        Mode::Inibin => convert_bin(&input, options, out),
        Mode::Wad => convert_wad(&input, options, out),
    }
    .with_context(|| format!("failed to convert {}", src.display()))?;

    let dst = &options.dst;
    fs::write(dst, &output).with_context(|| format!("failed to write {}", dst.display()))?;
    info!(dst = %dst.display(), len = output.len(), "wrote destination");

    Ok(RunReport {
        input_len: input.len(),
        output_len: output.len(),
        verified: options.verify,
    })
}

fn convert_bin(input: &[u8], options: &RunOptions, out: &mut dyn Write) -> Result<Vec<u8>> {
    let doc = Document::read(input).context("failed to decode BIN document")?;
    debug!(
        version = doc.version(),
        entries = doc.entry_count(),
        patches = doc.patch_count(),
        "decoded document"
    );
    if options.print {
        write!(out, "{}", doc.display())?;
    }

    let output = doc.write().context("failed to encode BIN document")?;
    if options.verify {
        let reread = Document::read(&output).context("failed to decode written document")?;
        ensure!(reread == doc, "written document differs from the source");
        debug!("verified document");
    }
    Ok(output)
}

fn convert_wad(input: &[u8], options: &RunOptions, out: &mut dyn Write) -> Result<Vec<u8>> {
    let wad = Wad::read(input).context("failed to read WAD chunk table")?;
    let (major, minor) = wad.version();
    debug!(major, minor, chunks = wad.chunk_count(), "read chunk table");
    if options.print {
        write!(out, "{wad}")?;
    }

    let output = wad.write(input).context("failed to write WAD archive")?;
    if options.verify {
        verify_wad(&wad, input, &output)?;
        debug!("verified archive");
    }
    Ok(output)
}

/// Same chunk records up to data offsets, and the same payload bytes
fn verify_wad(source: &Wad, input: &[u8], output: &[u8]) -> Result<()> {
    let written = Wad::read(output).context("failed to read written archive")?;
    ensure!(
        written.chunk_count() == source.chunk_count(),
        "written archive has {} chunks, source has {}",
        written.chunk_count(),
        source.chunk_count()
    );
    for (old, new) in source.chunks().iter().zip(written.chunks()) {
        if new.with_data_offset(old.data_offset) != *old {
            bail!("chunk {:#018x} changed: {old} became {new}", old.path_hash);
        }
        let before = Wad::chunk_data(input, old)?;
        let after = Wad::chunk_data(output, new)?;
        ensure!(
            before == after,
            "payload of chunk {:#018x} changed",
            old.path_hash
        );
    }
    Ok(())
}
