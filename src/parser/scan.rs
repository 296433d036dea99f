// Lexical pre-pass for the pattern-based extractor
//
// Produces a copy of the source where comment text and string contents are
// blanked out, so declaration patterns never match inside them, together with
// brace depths and line offsets. The masked copy has the same byte offsets as
// the source, so a match position can be used to slice the original text.

use crate::parser::patterns::{BlockStyle, Syntax};
use std::ops::Range;

#[derive(Debug)]
pub(crate) struct Scan {
    /// Source with comments and string contents replaced by spaces
    pub code: String,
    /// Source with comments replaced by spaces, strings intact
    pub text: String,
    /// Brace depth in effect before each byte (one extra entry for end of input)
    depth: Vec<u32>,
    line_starts: Vec<usize>,
    block_style: BlockStyle,
    /// Braces still open at end of input
    pub unclosed: u32,
    /// Line of the first closing brace with no opener
    pub stray_close: Option<usize>,
}

impl Scan {
    pub fn new(source: &str, syntax: &Syntax) -> Self {
        let code = mask(source, syntax, true);
        let text = mask(source, syntax, false);
        let bytes = code.as_bytes();

        let mut line_starts = vec![0];
        let mut depth = Vec::with_capacity(bytes.len() + 1);
        let mut current: u32 = 0;
        let mut stray_at = None;

        for (i, &b) in bytes.iter().enumerate() {
            depth.push(current);
            match b {
                b'{' => current += 1,
                b'}' if current == 0 => {
                    stray_at.get_or_insert(i);
                }
                b'}' => current -= 1,
                b'\n' => line_starts.push(i + 1),
                _ => {}
            }
        }
        depth.push(current);

        let mut scan = Self {
            code,
            text,
            depth,
            line_starts,
            block_style: syntax.blocks,
            unclosed: current,
            stray_close: None,
        };
        scan.stray_close = stray_at.map(|offset| scan.line_of(offset));
        scan
    }

    /// Brace depth in effect at a byte offset
    pub fn depth_at(&self, offset: usize) -> u32 {
        self.depth[offset.min(self.depth.len() - 1)]
    }

    /// 1-based line number of a byte offset
    pub fn line_of(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(i) => i + 1,
            Err(i) => i,
        }
    }

    pub fn line_count(&self) -> usize {
        if self.code.is_empty() {
            0
        } else if self.code.ends_with('\n') {
            self.line_starts.len() - 1
        } else {
            self.line_starts.len()
        }
    }

    fn line_start(&self, offset: usize) -> usize {
        self.line_starts[self.line_of(offset) - 1]
    }

    fn line_end(&self, offset: usize) -> usize {
        self.code[offset..]
            .find('\n')
            .map(|i| offset + i)
            .unwrap_or(self.code.len())
    }

    /// Body of a declaration.
    ///
    /// For brace languages `open` is the offset of the opening brace and the
    /// body runs to its matching close. For keyword-terminated languages the
    /// body runs from the end of the declaration line to the `end` line at the
    /// same indentation.
    pub fn body(&self, decl: usize, open: Option<usize>) -> Option<Range<usize>> {
        match (self.block_style, open) {
            (BlockStyle::Braces, Some(open)) => Some(open + 1..self.brace_end(open)),
            (BlockStyle::Braces, None) => None,
            (BlockStyle::EndKeyword, _) => Some(self.keyword_body(decl)),
        }
    }

    /// Depth of code directly inside a body
    pub fn body_depth(&self, body: &Range<usize>) -> u32 {
        self.depth_at(body.start)
    }

    fn brace_end(&self, open: usize) -> usize {
        let inner = self.depth_at(open) + 1;
        let bytes = self.code.as_bytes();
        (open + 1..bytes.len())
            .find(|&i| bytes[i] == b'}' && self.depth[i] == inner)
            .unwrap_or(bytes.len())
    }

    fn keyword_body(&self, decl: usize) -> Range<usize> {
        let start = self.line_start(decl);
        let end_of_decl = self.line_end(decl);
        let indent = indentation(&self.code[start..end_of_decl]);

        let decl_line = self.code[start..end_of_decl].trim_end();
        if decl_line.ends_with(" end") || decl_line.ends_with(";end") {
            return end_of_decl..end_of_decl;
        }

        let mut cursor = (end_of_decl + 1).min(self.code.len());
        while cursor < self.code.len() {
            let line_end = self.line_end(cursor);
            let line = &self.code[cursor..line_end];
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                let line_indent = indentation(line);
                if line_indent == indent && is_end_keyword(trimmed) {
                    return (end_of_decl + 1).min(cursor)..cursor;
                }
                if line_indent < indent {
                    return (end_of_decl + 1).min(cursor)..cursor;
                }
            }
            cursor = line_end + 1;
        }
        (end_of_decl + 1).min(self.code.len())..self.code.len()
    }
}

fn indentation(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '\t']).len()
}

fn is_end_keyword(trimmed: &str) -> bool {
    trimmed == "end"
        || trimmed
            .strip_prefix("end")
            .and_then(|rest| rest.chars().next())
            .is_some_and(|c| !c.is_alphanumeric() && c != '_')
}

/// Blank out comments, and string contents when asked, keeping quotes and newlines
fn mask(source: &str, syntax: &Syntax, strings: bool) -> String {
    let bytes = source.as_bytes();
    let n = bytes.len();
    let mut out = bytes.to_vec();
    let mut i = 0;

    let blank = |out: &mut Vec<u8>, range: Range<usize>| {
        for b in &mut out[range] {
            if *b != b'\n' {
                *b = b' ';
            }
        }
    };

    while i < n {
        let rest = &bytes[i..];

        if syntax
            .line_comments
            .iter()
            .any(|marker| rest.starts_with(marker.as_bytes()))
        {
            let end = rest.iter().position(|&b| b == b'\n').map_or(n, |p| i + p);
            blank(&mut out, i..end);
            i = end;
            continue;
        }

        if let Some((open, close)) = syntax.block_comment {
            if rest.starts_with(open.as_bytes()) {
                let body = i + open.len();
                let end = find(&bytes[body..], close.as_bytes()).map_or(n, |p| body + p + close.len());
                blank(&mut out, i..end);
                i = end;
                continue;
            }
        }

        let b = bytes[i];
        if syntax.quotes.contains(&b) {
            if syntax.triple_quotes && rest.len() >= 3 && rest[1] == b && rest[2] == b {
                let body = i + 3;
                let close = [b, b, b];
                let end = find(&bytes[body..], &close).map_or(n, |p| body + p);
                if strings {
                    blank(&mut out, body..end);
                }
                i = (end + 3).min(n);
                continue;
            }

            let raw = b == b'`';
            let mut j = i + 1;
            while j < n {
                let c = bytes[j];
                if c == b'\\' && !raw {
                    j += 2;
                    continue;
                }
                if c == b || (c == b'\n' && !raw) {
                    break;
                }
                j += 1;
            }
            let j = j.min(n);
            if strings {
                blank(&mut out, i + 1..j);
            }
            i = if j < n && bytes[j] == b { j + 1 } else { j };
            continue;
        }

        // Character literals in languages where `'` is not a string quote
        if b == b'\'' && !syntax.quotes.contains(&b'\'') {
            if rest.len() >= 3 && rest[1] != b'\\' && rest[2] == b'\'' {
                if strings {
                    blank(&mut out, i + 1..i + 2);
                }
                i += 3;
                continue;
            }
            if rest.len() >= 4 && rest[1] == b'\\' && rest[3] == b'\'' {
                if strings {
                    blank(&mut out, i + 1..i + 3);
                }
                i += 4;
                continue;
            }
        }

        i += 1;
    }

    // Only ASCII bytes were overwritten, and only with ASCII, so the result is
    // still UTF-8 unless a multi-byte character was partially blanked.
    String::from_utf8(out).unwrap_or_else(|e| {
        e.into_bytes()
            .into_iter()
            .map(|b| if b.is_ascii() { b as char } else { ' ' })
            .collect()
    })
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
