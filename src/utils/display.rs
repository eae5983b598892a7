//! Display and formatting utilities

const BYTE_UNITS: [&str; 9] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB", "ZiB", "YiB"];
const UNIT_STEP: f64 = 1024.0;

/// Human-readable binary size, e.g. `size(1050, 2) == "1.03 KiB"`.
///
/// Anything past yobibytes stays in `YiB`.
pub fn size(bytes: u128, precision: u32) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= UNIT_STEP && unit < BYTE_UNITS.len() - 1 {
        value /= UNIT_STEP;
        unit += 1;
    }
    format!("{:.*} {}", precision as usize, value, BYTE_UNITS[unit])
}
