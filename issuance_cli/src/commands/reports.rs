use anyhow::Result;

use crate::output::{print_report_ids, OutputFormat};

pub fn run(format: &OutputFormat) -> Result<()> {
    print_report_ids(format)
}
