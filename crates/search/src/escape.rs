/// Decodes the backslash sequences understood by the "extended" search mode.
///
/// Supported: `\n`, `\r`, `\t`, `\0`, `\\` and the numeric forms `\bNNNNNNNN`
/// (binary), `\oNNN` (octal), `\dNNN` (decimal), `\xNN` and `\uNNNN` (hex).
/// Unknown or malformed sequences are kept verbatim, backslash included.
pub fn convert_extended(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;

    while i < chars.len() {
        let current = chars[i];
        if current != '\\' || i + 1 >= chars.len() {
            out.push(current);
            i += 1;
            continue;
        }

        let code = chars[i + 1];
        i += 2;
        match code {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            '0' => out.push('\0'),
            '\\' => out.push('\\'),
            'b' | 'o' | 'd' | 'x' | 'u' => {
                let (size, radix) = match code {
                    'b' => (8, 2),
                    'o' => (3, 8),
                    'd' => (3, 10),
                    'x' => (2, 16),
                    _ => (4, 16),
                };
                match read_number(&chars[i..], size, radix) {
                    Some(decoded) => {
                        out.push(decoded);
                        i += size;
                    }
                    None => {
                        out.push('\\');
                        out.push(code);
                    }
                }
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    out
}

fn read_number(digits: &[char], size: usize, radix: u32) -> Option<char> {
    let digits = digits.get(..size)?;
    let mut value = 0u32;
    for digit in digits {
        value = value * radix + digit.to_digit(radix)?;
    }
    char::from_u32(value)
}
