use crate::scan::HostReport;
use csv::Writer;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// One row per endpoint verdict.
pub fn write_csv(path: &Path, items: &[HostReport]) -> anyhow::Result<()> {
    let f = File::create(path)?;
    write_csv_to(f, items)
}

pub fn write_csv_to<W: Write>(out: W, items: &[HostReport]) -> anyhow::Result<()> {
    let mut w = Writer::from_writer(out);
    w.write_record(["host", "endpoint", "valid", "technologies"])?;
    for it in items {
        let techs = it.detected.join(",");
        for v in &it.endpoints {
            w.write_record([v.host.as_str(), v.endpoint.as_str(), if v.valid { "true" } else { "false" }, techs.as_str()])?;
        }
    }
    w.flush()?;
    Ok(())
}
