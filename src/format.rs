//! Fixed-width number renderers shared by the dumps and the REPL

/// Zero-padded decimal
pub fn dec_str(value: usize, width: usize) -> String {
    format!("{:0>width$}", value, width = width)
}

/// Zero-padded binary
pub fn bin_str(value: usize, width: usize) -> String {
    format!("{:0>width$b}", value, width = width)
}

/// Zero-padded upper-case hexadecimal
pub fn hex_str(value: usize, width: usize) -> String {
    format!("{:0>width$X}", value, width = width)
}

/// Space-separated two-digit hex bytes
pub fn hex_bytes(data: &[u8]) -> String {
    data.iter()
        .map(|byte| hex_str(*byte as usize, 2))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Number of decimal digits needed to print `value`
pub fn dec_width(value: usize) -> usize {
    value.to_string().len()
}
