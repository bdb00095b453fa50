use std::io::Write;

use flexi_logger::{DeferredNow, style};
use log::Record;

/// `level: message`, level coloured.
pub fn cli_format(
    w: &mut dyn Write,
    _now: &mut DeferredNow,
    record: &Record,
) -> std::io::Result<()> {
    let level = record.level();
    write!(
        w,
        "{}: {}",
        style(level).paint(level.as_str().to_lowercase()),
        record.args()
    )
}
