use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::scan::HostReport;

pub fn write_jsonl(path: &Path, items: &[HostReport]) -> anyhow::Result<()> {
    let mut f = OpenOptions::new().write(true).create(true).truncate(true).open(path)?;
    write_jsonl_to(&mut f, items)
}

pub fn write_jsonl_to<W: Write>(out: &mut W, items: &[HostReport]) -> anyhow::Result<()> {
    for it in items {
        let line = serde_json::to_string(it)?;
        out.write_all(line.as_bytes())?;
        out.write_all(b"\n")?;
    }
    Ok(())
}
