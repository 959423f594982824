//! Plain-text extraction from RTF documents.
//!
//! Only what the history needs: the visible text of the body, with
//! paragraph and tab breaks. Formatting, tables of fonts/colors, pictures and
//! other destinations are dropped.

const IGNORED_DESTINATIONS: &[&str] = &[
    "fonttbl",
    "colortbl",
    "stylesheet",
    "info",
    "pict",
    "object",
    "header",
    "footer",
    "headerl",
    "headerr",
    "footerl",
    "footerr",
    "themedata",
    "datastore",
    "latentstyles",
    "listtable",
    "listoverridetable",
    "rsidtbl",
    "generator",
    "xmlnstbl",
    "expandedcolortbl",
    "filetbl",
    "revtbl",
];

// Windows-1252 code points for 0x80..=0x9F; zero marks an unassigned byte.
const CP1252_HIGH: [u32; 32] = [
    0x20AC, 0, 0x201A, 0x0192, 0x201E, 0x2026, 0x2020, 0x2021, 0x02C6, 0x2030, 0x0160, 0x2039,
    0x0152, 0, 0x017D, 0, 0, 0x2018, 0x2019, 0x201C, 0x201D, 0x2022, 0x2013, 0x2014, 0x02DC,
    0x2122, 0x0161, 0x203A, 0x0153, 0, 0x017E, 0x0178,
];

#[derive(Clone, Copy)]
struct Group {
    skip: bool,
    unicode_skip: usize,
}

/// Returns the document's text, or `None` when `data` is not a single
/// balanced `{\rtf ...}` group.
pub fn extract_plain_text(data: &[u8]) -> Option<String> {
    let start = data.iter().position(|b| !b.is_ascii_whitespace())?;
    let data = &data[start..];
    if !data.starts_with(b"{\\rtf") {
        return None;
    }

    let mut out = String::new();
    let mut stack: Vec<Group> = Vec::new();
    let mut current = Group {
        skip: false,
        unicode_skip: 1,
    };
    let mut pending_skip = 0usize;
    let mut closed = false;
    let mut i = 0;

    while i < data.len() {
        let b = data[i];
        if closed {
            if !(b.is_ascii_whitespace() || b == 0) {
                return None;
            }
            i += 1;
            continue;
        }

        match b {
            b'{' => {
                stack.push(current);
                i += 1;
            }
            b'}' => {
                current = stack.pop()?;
                if stack.is_empty() {
                    closed = true;
                }
                i += 1;
            }
            b'\\' => {
                let next = *data.get(i + 1)?;
                if next.is_ascii_alphabetic() {
                    let (word, param, consumed) = read_control_word(&data[i + 1..]);
                    i += 1 + consumed;
                    handle_control_word(word, param, &mut current, &mut pending_skip, &mut out);
                    continue;
                }
                i += 2;
                match next {
                    b'\'' => {
                        let hex = data.get(i..i + 2)?;
                        let byte = u8::from_str_radix(std::str::from_utf8(hex).ok()?, 16).ok()?;
                        i += 2;
                        emit(decode_cp1252(byte), &current, &mut pending_skip, &mut out);
                    }
                    b'*' => current.skip = true,
                    b'\\' | b'{' | b'}' => {
                        emit(next as char, &current, &mut pending_skip, &mut out)
                    }
                    b'~' => emit('\u{a0}', &current, &mut pending_skip, &mut out),
                    b'_' => emit('-', &current, &mut pending_skip, &mut out),
                    b'\n' | b'\r' => emit('\n', &current, &mut pending_skip, &mut out),
                    _ => {}
                }
            }
            b'\r' | b'\n' => i += 1,
            _ => {
                emit(decode_cp1252(b), &current, &mut pending_skip, &mut out);
                i += 1;
            }
        }
    }

    if closed {
        Some(out)
    } else {
        None
    }
}

fn read_control_word(data: &[u8]) -> (&str, Option<i32>, usize) {
    let mut end = 0;
    while end < data.len() && data[end].is_ascii_alphabetic() {
        end += 1;
    }
    // Letters only, so this cannot fail.
    let word = std::str::from_utf8(&data[..end]).unwrap_or_default();

    let mut pos = end;
    let negative = data.get(pos) == Some(&b'-');
    if negative {
        pos += 1;
    }
    let digits_start = pos;
    while pos < data.len() && data[pos].is_ascii_digit() {
        pos += 1;
    }
    let param = if pos > digits_start {
        std::str::from_utf8(&data[digits_start..pos])
            .ok()
            .and_then(|s| s.parse::<i32>().ok())
            .map(|n| if negative { -n } else { n })
    } else {
        if negative {
            pos -= 1;
        }
        None
    };

    if data.get(pos) == Some(&b' ') {
        pos += 1;
    }
    (word, param, pos)
}

fn handle_control_word(
    word: &str,
    param: Option<i32>,
    current: &mut Group,
    pending_skip: &mut usize,
    out: &mut String,
) {
    if IGNORED_DESTINATIONS.contains(&word) {
        current.skip = true;
        return;
    }
    match word {
        "par" | "line" | "sect" | "page" => emit('\n', current, pending_skip, out),
        "tab" => emit('\t', current, pending_skip, out),
        "emdash" => emit('\u{2014}', current, pending_skip, out),
        "endash" => emit('\u{2013}', current, pending_skip, out),
        "bullet" => emit('\u{2022}', current, pending_skip, out),
        "lquote" => emit('\u{2018}', current, pending_skip, out),
        "rquote" => emit('\u{2019}', current, pending_skip, out),
        "ldblquote" => emit('\u{201C}', current, pending_skip, out),
        "rdblquote" => emit('\u{201D}', current, pending_skip, out),
        "uc" => current.unicode_skip = param.unwrap_or(1).max(0) as usize,
        "u" => {
            if let Some(mut code) = param {
                if code < 0 {
                    code += 65536;
                }
                let ch = char::from_u32(code as u32).unwrap_or('\u{FFFD}');
                emit(ch, current, pending_skip, out);
                *pending_skip = current.unicode_skip;
            }
        }
        _ => {}
    }
}

fn emit(ch: char, current: &Group, pending_skip: &mut usize, out: &mut String) {
    if *pending_skip > 0 {
        *pending_skip -= 1;
        return;
    }
    if !current.skip {
        out.push(ch);
    }
}

fn decode_cp1252(byte: u8) -> char {
    match byte {
        0x80..=0x9F => match CP1252_HIGH[(byte - 0x80) as usize] {
            0 => '\u{FFFD}',
            code => char::from_u32(code).unwrap_or('\u{FFFD}'),
        },
        _ => byte as char,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_body_text_and_skips_tables() {
        let rtf = br"{\rtf1\ansi\ansicpg1252\cocoartf2709
{\fonttbl\f0\fswiss\fcharset0 Helvetica;}
{\colortbl;\red255\green255\blue255;}
\pard\tx560\f0\fs24 \cf0 Hello \b bold\b0  world\par
second line}";
        assert_eq!(
            extract_plain_text(rtf).as_deref(),
            Some("Hello bold world\nsecond line")
        );
    }

    #[test]
    fn decodes_escapes_and_unicode() {
        let rtf = br"{\rtf1 caf\'e9 \{x\} \u8364? end}";
        assert_eq!(extract_plain_text(rtf).as_deref(), Some("caf\u{e9} {x} \u{20ac} end"));
    }

    #[test]
    fn ignorable_destinations_are_dropped() {
        let rtf = br"{\rtf1{\*\generator Riched20;}visible\tab text}";
        assert_eq!(extract_plain_text(rtf).as_deref(), Some("visible\ttext"));
    }

    #[test]
    fn rejects_non_rtf_and_unbalanced_input() {
        assert_eq!(extract_plain_text(b"plain words"), None);
        assert_eq!(extract_plain_text(br"{\rtf1 never closed"), None);
        assert_eq!(extract_plain_text(br"{\rtf1 ok} trailing"), None);
        assert_eq!(extract_plain_text(b""), None);
    }
}
