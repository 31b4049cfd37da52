// ============================================================
// CSV TOKENIZER
// ============================================================
// Split CSV text into rows of raw fields with quote handling,
// delimiter/newline detection and comment/blank-line skipping

use crate::domain::csv::{ParseError, ParseOptions, SkipEmptyLines, DELIMITER_CANDIDATES};

/// Rows sampled per candidate during delimiter detection
const DELIMITER_SAMPLE_ROWS: usize = 10;

/// Delimiter used when detection finds no viable candidate
const FALLBACK_DELIMITER: &str = ",";

/// Rows and diagnostics produced by the tokenizer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenizedText {
    /// Emitted rows, each an ordered list of raw field strings
    pub rows: Vec<Vec<String>>,

    /// Structural errors, tagged with the 1-based emitted row
    pub errors: Vec<ParseError>,

    /// Delimiter used for splitting
    pub delimiter: String,

    /// Line terminator used for splitting
    pub newline: String,

    /// More rows followed the preview limit
    pub truncated: bool,
}

/// Dialect resolved for a single scan
struct Dialect<'a> {
    delimiter: &'a str,
    newline: &'a str,
    quote: char,
    escape: char,
    comments: Option<&'a str>,
    skip_empty_lines: SkipEmptyLines,
}

#[derive(Default)]
struct Scan {
    rows: Vec<Vec<String>>,
    errors: Vec<ParseError>,
    truncated: bool,
}

/// CSV tokenizer configured from parse options
pub struct CsvTokenizer<'a> {
    options: &'a ParseOptions,
}

impl<'a> CsvTokenizer<'a> {
    pub fn new(options: &'a ParseOptions) -> Self {
        Self { options }
    }

    /// Tokenize the whole input
    pub fn tokenize(&self, text: &str) -> TokenizedText {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let newline = if self.options.newline.is_empty() {
            self.detect_newline(text)
        } else {
            self.options.newline.clone()
        };

        let mut errors = Vec::new();
        let delimiter = if !self.options.delimiter.is_empty() {
            self.options.delimiter.clone()
        } else {
            match self.detect_delimiter(text, &newline) {
                Some(delimiter) => delimiter.to_string(),
                None => {
                    if !text.trim().is_empty() {
                        errors.push(ParseError::undetectable_delimiter(FALLBACK_DELIMITER));
                    }
                    FALLBACK_DELIMITER.to_string()
                }
            }
        };

        // The header row does not count against the preview limit
        let limit = match self.options.preview {
            0 => None,
            preview if self.options.header => Some(preview + 1),
            preview => Some(preview),
        };

        let scan = scan(text, &self.dialect(&delimiter, &newline, self.options.skip_empty_lines), limit);
        errors.extend(scan.errors);

        TokenizedText {
            rows: scan.rows,
            errors,
            delimiter,
            newline,
            truncated: scan.truncated,
        }
    }

    /// Detect the line terminator: the first `\n` outside quoted spans
    /// decides between `\r\n` and `\n`; a text with only `\r` uses `\r`.
    ///
    /// Quoted spans open only at a field start, as in the scanner. Before the
    /// delimiter is known every candidate counts as a field boundary.
    pub fn detect_newline(&self, text: &str) -> String {
        let quote = self.options.quote_char;
        let escape = self.options.escape_char;
        let boundaries: Vec<&str> = if self.options.delimiter.is_empty() {
            DELIMITER_CANDIDATES.to_vec()
        } else {
            vec![self.options.delimiter.as_str()]
        };

        let mut in_quotes = false;
        let mut field_start = true;
        let mut saw_cr = false;
        let mut chars = text.char_indices().peekable();

        while let Some((offset, c)) = chars.next() {
            if in_quotes {
                if c == escape && chars.peek().map(|&(_, next)| next) == Some(quote) {
                    chars.next();
                } else if c == quote {
                    in_quotes = false;
                }
                continue;
            }

            match c {
                '\n' => {
                    return if text[..offset].ends_with('\r') { "\r\n" } else { "\n" }.to_string();
                }
                '\r' => {
                    saw_cr = true;
                    field_start = true;
                }
                c if c == quote && field_start => {
                    in_quotes = true;
                    field_start = false;
                }
                c => {
                    let seen = &text[..offset + c.len_utf8()];
                    field_start = boundaries.iter().any(|b| seen.ends_with(b));
                }
            }
        }

        let newline = if saw_cr { "\r" } else { "\n" };
        newline.to_string()
    }

    /// Detect the delimiter from a sample of rows.
    ///
    /// A candidate is viable when it splits some sampled row. The viable
    /// candidate whose field counts vary least between successive rows wins;
    /// ties keep the earlier candidate. A candidate that splits some rows but
    /// leaves others whole is not viable while another candidate reads every
    /// row as a single field.
    pub fn detect_delimiter(&self, text: &str, newline: &str) -> Option<&'static str> {
        let mut viable = Vec::new();
        let mut single_column = false;

        for candidate in DELIMITER_CANDIDATES {
            let dialect = self.dialect(candidate, newline, SkipEmptyLines::Greedy);
            let sample = scan(text, &dialect, Some(DELIMITER_SAMPLE_ROWS));

            let field_counts: Vec<usize> = sample.rows.iter().map(Vec::len).collect();
            if field_counts.is_empty() {
                continue;
            }
            if field_counts.iter().all(|&count| count == 1) {
                single_column = true;
                continue;
            }

            let delta: usize = field_counts
                .windows(2)
                .map(|pair| pair[0].abs_diff(pair[1]))
                .sum();
            let partial = field_counts.contains(&1);
            viable.push((candidate, delta, partial));
        }

        viable
            .into_iter()
            .filter(|&(_, _, partial)| !(partial && single_column))
            .min_by_key(|&(_, delta, _)| delta)
            .map(|(delimiter, _, _)| delimiter)
    }

    fn dialect<'d>(
        &'d self,
        delimiter: &'d str,
        newline: &'d str,
        skip_empty_lines: SkipEmptyLines,
    ) -> Dialect<'d> {
        Dialect {
            delimiter,
            newline,
            quote: self.options.quote_char,
            escape: self.options.escape_char,
            comments: self.options.comments.as_deref(),
            skip_empty_lines,
        }
    }
}

/// Scan rows until the input ends or `limit` rows were emitted
fn scan(text: &str, dialect: &Dialect<'_>, limit: Option<usize>) -> Scan {
    let mut scanner = Scanner {
        text,
        pos: 0,
        dialect,
    };
    let mut scan = Scan::default();

    while !scanner.at_end() {
        if scanner.at_comment() {
            scanner.skip_line();
            continue;
        }

        let row = scan.rows.len() + 1;
        let (fields, errors) = scanner.read_row(row);

        // Rows with structural errors are always kept
        if errors.is_empty() && is_skippable(dialect.skip_empty_lines, &fields) {
            continue;
        }
        if limit.is_some_and(|limit| scan.rows.len() >= limit) {
            scan.truncated = true;
            break;
        }

        scan.rows.push(fields);
        scan.errors.extend(errors);
    }

    scan
}

fn is_skippable(mode: SkipEmptyLines, fields: &[String]) -> bool {
    match mode {
        SkipEmptyLines::Never => false,
        SkipEmptyLines::Empty => fields.iter().all(String::is_empty),
        SkipEmptyLines::Greedy => fields.iter().all(|f| f.trim().is_empty()),
    }
}

struct Scanner<'t, 'd> {
    text: &'t str,
    pos: usize,
    dialect: &'d Dialect<'d>,
}

impl<'t, 'd> Scanner<'t, 'd> {
    fn rest(&self) -> &'t str {
        &self.text[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn at_comment(&self) -> bool {
        match self.dialect.comments {
            Some(prefix) => self
                .rest()
                .trim_start_matches([' ', '\t'])
                .starts_with(prefix),
            None => false,
        }
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn skip_line(&mut self) {
        match self.rest().find(self.dialect.newline) {
            Some(offset) => self.pos += offset + self.dialect.newline.len(),
            None => self.pos = self.text.len(),
        }
    }

    fn read_row(&mut self, row: usize) -> (Vec<String>, Vec<ParseError>) {
        let mut fields = Vec::new();
        let mut errors = Vec::new();

        loop {
            let field = fields.len();
            let value = if self.rest().starts_with(self.dialect.quote) {
                self.read_quoted(row, field, &mut errors)
            } else {
                self.read_unquoted()
            };
            fields.push(value);

            if self.eat(self.dialect.delimiter) {
                continue;
            }
            self.eat(self.dialect.newline);
            break;
        }

        (fields, errors)
    }

    /// Read up to the next delimiter, line break or end of input
    fn read_unquoted(&mut self) -> String {
        let rest = self.rest();
        let end = rest
            .char_indices()
            .map(|(offset, _)| offset)
            .find(|&offset| {
                let tail = &rest[offset..];
                tail.starts_with(self.dialect.delimiter) || tail.starts_with(self.dialect.newline)
            })
            .unwrap_or(rest.len());

        self.pos += end;
        rest[..end].to_string()
    }

    /// Read a quoted span starting at the opening quote
    fn read_quoted(&mut self, row: usize, field: usize, errors: &mut Vec<ParseError>) -> String {
        let quote = self.dialect.quote;
        let escape = self.dialect.escape;
        self.pos += quote.len_utf8();

        let mut value = String::new();
        loop {
            let mut chars = self.rest().chars();
            let Some(c) = chars.next() else {
                errors.push(ParseError::missing_quotes(row, field));
                return value;
            };

            if c == escape && chars.next() == Some(quote) {
                value.push(quote);
                self.pos += c.len_utf8() + quote.len_utf8();
                continue;
            }

            self.pos += c.len_utf8();
            if c == quote {
                break;
            }
            value.push(c);
        }

        // Anything between the closing quote and the next separator is malformed
        let trailing = self.read_unquoted();
        if !trailing.is_empty() {
            errors.push(ParseError::invalid_quotes(row, field));
            value.push_str(&trailing);
        }

        value
    }
}
