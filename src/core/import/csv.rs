//! Minimal RFC 4180 record splitter

/// Split CSV text into records of fields.
///
/// Handles quoted fields with `""` escapes and embedded newlines, CRLF line
/// endings and a leading UTF-8 BOM. Blank lines are dropped. Fields are not
/// trimmed; callers decide.
///
/// # Errors
/// Returns a message if a quoted field is never closed or the text holds no
/// records at all.
pub fn parse_records(text: &str) -> Result<Vec<Vec<String>>, String> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                record.push(std::mem::take(&mut field));
                push_record(&mut records, std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err("unterminated quoted field".to_string());
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        push_record(&mut records, record);
    }
    if records.is_empty() {
        return Err("no records".to_string());
    }
    Ok(records)
}

fn push_record(records: &mut Vec<Vec<String>>, record: Vec<String>) {
    let blank = record.iter().all(|f| f.trim().is_empty());
    if !blank {
        records.push(record);
    }
}

/// Index of the first header matching any of `names` (trimmed, ASCII case-insensitive)
#[must_use]
pub fn find_column(headers: &[String], names: &[&str]) -> Option<usize> {
    headers.iter().position(|header| {
        let header = header.trim();
        names.iter().any(|name| header.eq_ignore_ascii_case(name))
    })
}
