/// Line-oriented text encoding of point records
///
/// A record reads `[{x}][{y}] z = {z}, x = {x}, y = {y}`. Several records may
/// share a line, separated by `;`. Values are written with the invariant `.`
/// decimal separator; `,` is still accepted on input.
use crate::point::PointRecord;
use constants::sampling::RECORD_SEPARATOR;

pub fn encode_record(record: &PointRecord) -> String {
    format!(
        "[{x}][{y}] z = {z}, x = {x}, y = {y}",
        x = record.x,
        y = record.y,
        z = record.z
    )
}

/// Encode a batch as one physical line, without the trailing newline.
pub fn encode_line(records: &[PointRecord]) -> String {
    let mut line = String::with_capacity(records.len() * 40);
    for (i, record) in records.iter().enumerate() {
        if i > 0 {
            line.push(RECORD_SEPARATOR);
        }
        line.push_str(&encode_record(record));
    }
    line
}

/// Parse one record. Missing or unreadable fields drop the record.
pub fn parse_record(text: &str) -> Option<PointRecord> {
    let z = field(text, "z = ")?;
    let x = field(text, "x = ")?;
    let y = field(text, "y = ")?;
    let record = PointRecord::new(x, y, z);
    record.is_finite().then_some(record)
}

/// Parse every recoverable record of `line` into `out`, returning how many
/// record slots were dropped. Lines not starting with `[` are noise.
pub fn parse_line_into(line: &str, out: &mut Vec<PointRecord>) -> usize {
    let line = line.trim();
    if !line.starts_with('[') {
        return 0;
    }

    let mut dropped = 0;
    for chunk in line.split(RECORD_SEPARATOR) {
        let chunk = chunk.trim();
        if chunk.is_empty() {
            continue;
        }
        match parse_record(chunk) {
            Some(record) => out.push(record),
            None => dropped += 1,
        }
    }
    dropped
}

pub fn parse_line(line: &str) -> Vec<PointRecord> {
    let mut records = Vec::new();
    parse_line_into(line, &mut records);
    records
}

fn field(text: &str, key: &str) -> Option<f32> {
    let start = text.find(key)? + key.len();
    let token = number_prefix(&text[start..])?;
    token.replace(',', ".").parse().ok()
}

/// Longest prefix shaped like `-12`, `3.25`, `3,25` or `1.5e-3`. A comma only
/// counts as a decimal separator when a digit follows it.
fn number_prefix(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'-' | b'+')) {
        end += 1;
    }
    let int_start = end;
    end += count_digits(&bytes[end..]);
    if end == int_start {
        return None;
    }

    if matches!(bytes.get(end), Some(b'.' | b',')) && bytes.get(end + 1).is_some_and(u8::is_ascii_digit) {
        end += 1;
        end += count_digits(&bytes[end..]);
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'-' | b'+')) {
            exp_end += 1;
        }
        let digits = count_digits(&bytes[exp_end..]);
        if digits > 0 {
            end = exp_end + digits;
        }
    }

    Some(&text[..end])
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}
