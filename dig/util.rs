use encoding8::ascii;

const WIDTH: usize = 16;

/// Formats the slice as rows of hex, each followed by its printable ascii.
pub fn hexdump_string(slice: &[u8]) -> String {
    let mut out = String::new();

    for (n, row) in slice.chunks(WIDTH).enumerate() {
        let row_hex: String = row.iter().map(|x| format!("{0:02X} ", x)).collect();

        // For each byte on this row, only print out the ascii printable ones.
        let row_str: String = row
            .iter()
            .map(|x| {
                if ascii::is_printable(*x) {
                    *x as char
                } else {
                    '.'
                }
            })
            .collect();

        out.push_str(&format!(
            "{0:>08x}: {1:<48} {2:}\n",
            n * WIDTH,
            row_hex,
            row_str
        ));
    }

    out
}

// Dumps out the slice in a pretty way
pub fn hexdump(slice: &[u8]) {
    print!("{}", hexdump_string(slice))
}
