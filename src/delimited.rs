//! Quote-aware record parsing for delimited text (CSV/TSV).
//!
//! Every field character keeps the physical (line, column) it came from so
//! matches inside a field can be reported at their position in the file.

/// Quoted records longer than this are treated as an unterminated quote.
const MAX_RECORD_LINES: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Malformation {
    UnterminatedQuote,
    TextAfterQuote,
    FieldCount { expected: usize, found: usize },
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Field {
    /// Unescaped field content.
    pub content: Vec<char>,
    /// `(line index, column)` of each content char, both 0-based.
    pub positions: Vec<(usize, usize)>,
    /// Last raw column each content char occupies on its line. Differs from
    /// the start column only for an escaped `""`.
    pub ends: Vec<usize>,
}

impl Field {
    fn push(&mut self, ch: char, line: usize, column: usize) {
        self.push_raw(ch, line, column, column);
    }

    fn push_raw(&mut self, ch: char, line: usize, start: usize, end: usize) {
        self.content.push(ch);
        self.positions.push((line, start));
        self.ends.push(end);
    }

    pub fn text(&self) -> String {
        self.content.iter().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub index: usize,
    pub first_line: usize,
    pub line_count: usize,
    pub fields: Vec<Field>,
    pub malformed: Option<Malformation>,
}

impl Record {
    pub fn lines(&self) -> std::ops::Range<usize> {
        self.first_line..self.first_line + self.line_count
    }
}

enum State {
    FieldStart,
    Unquoted,
    Quoted,
    QuoteInQuoted,
}

/// Parses logical lines into records. Blank lines are skipped. The first
/// well-formed record fixes the expected field count.
pub fn parse_records(lines: &[&str], delimiter: char) -> Vec<Record> {
    let mut records = Vec::new();
    let mut expected = None;
    let mut line = 0;

    while line < lines.len() {
        if lines[line].is_empty() {
            line += 1;
            continue;
        }

        let mut record = parse_record(lines, line, delimiter, records.len());
        if record.malformed.is_none() {
            let found = record.fields.len();
            match expected {
                None => expected = Some(found),
                Some(expected) if expected != found => {
                    record.malformed = Some(Malformation::FieldCount { expected, found });
                }
                Some(_) => {}
            }
        }
        line += record.line_count;
        records.push(record);
    }

    records
}

fn parse_record(lines: &[&str], start: usize, delimiter: char, index: usize) -> Record {
    let mut fields = Vec::new();
    let mut field = Field::default();
    let mut state = State::FieldStart;
    let mut malformed = None;
    let mut opening_quote = 0;
    let mut line_idx = start;

    loop {
        let text = lines[line_idx];
        let mut width = 0;
        for (col, ch) in text.chars().enumerate() {
            width = col + 1;
            state = match state {
                State::FieldStart if ch == '"' => State::Quoted,
                State::FieldStart | State::Unquoted if ch == delimiter => {
                    fields.push(std::mem::take(&mut field));
                    State::FieldStart
                }
                State::FieldStart | State::Unquoted => {
                    field.push(ch, line_idx, col);
                    State::Unquoted
                }
                State::Quoted if ch == '"' => {
                    opening_quote = col;
                    State::QuoteInQuoted
                }
                State::Quoted => {
                    field.push(ch, line_idx, col);
                    State::Quoted
                }
                State::QuoteInQuoted if ch == '"' => {
                    field.push_raw('"', line_idx, opening_quote, col);
                    State::Quoted
                }
                State::QuoteInQuoted if ch == delimiter => {
                    fields.push(std::mem::take(&mut field));
                    State::FieldStart
                }
                State::QuoteInQuoted => {
                    malformed.get_or_insert(Malformation::TextAfterQuote);
                    field.push(ch, line_idx, col);
                    State::Unquoted
                }
            };
        }

        if let State::Quoted = state {
            let spanned = line_idx + 1 - start;
            if line_idx + 1 < lines.len() && spanned < MAX_RECORD_LINES {
                field.push('\n', line_idx, width);
                line_idx += 1;
                continue;
            }
            return Record {
                index,
                first_line: start,
                line_count: 1,
                fields: Vec::new(),
                malformed: Some(Malformation::UnterminatedQuote),
            };
        }

        fields.push(field);
        break;
    }

    Record {
        index,
        first_line: start,
        line_count: line_idx - start + 1,
        fields,
        malformed,
    }
}
