//! N-Triples reader and writer.
//!
//! One statement per line. Supported: IRIs with `\u`/`\U` escapes, blank
//! node labels, plain / language-tagged / typed literals with the full
//! ECHAR and UCHAR escape sets, `#` comments, and blank lines.

use std::fmt::Write as _;

use ldpc_types::{BlankId, Graph, Literal, Term, Triple};
use ldpc_vocab::xsd;

use crate::error::{CodecError, CodecResult};

/// Parse an N-Triples document into a graph.
pub fn parse(input: &str) -> CodecResult<Graph> {
    let mut graph = Graph::new();
    for (idx, line) in input.lines().enumerate() {
        if let Some(triple) = LineParser::new(line, idx + 1).statement()? {
            graph.insert(triple);
        }
    }
    Ok(graph)
}

/// Serialize a graph as N-Triples, one sorted line per triple.
///
/// Blank-node labels are written as they are; this is a display form,
/// not the canonical form.
pub fn serialize(graph: &Graph) -> String {
    let mut lines: Vec<String> = graph.iter().map(write_triple).collect();
    lines.sort();
    let mut out = String::new();
    for line in lines {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// Write a single triple as an N-Triples line (without newline).
pub fn write_triple(triple: &Triple) -> String {
    format!(
        "{} {} {} .",
        write_term(triple.subject()),
        write_term(triple.predicate()),
        write_term(triple.object())
    )
}

/// Write a term in N-Triples syntax.
pub fn write_term(term: &Term) -> String {
    let mut out = String::new();
    match term {
        Term::Iri(iri) => write_iri(&mut out, iri),
        Term::Blank(id) => {
            out.push_str("_:");
            out.push_str(id.as_str());
        }
        Term::Literal(lit) => {
            out.push('"');
            escape_literal(&mut out, lit.lexical());
            out.push('"');
            if let Some(lang) = lit.language() {
                out.push('@');
                out.push_str(lang);
            } else if lit.datatype() != xsd::STRING {
                out.push_str("^^");
                write_iri(&mut out, lit.datatype());
            }
        }
    }
    out
}

fn write_iri(out: &mut String, iri: &str) {
    out.push('<');
    for c in iri.chars() {
        if is_iri_forbidden(c) {
            let _ = write!(out, "\\u{:04X}", c as u32);
        } else {
            out.push(c);
        }
    }
    out.push('>');
}

fn escape_literal(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c if (c as u32) < 0x20 || c == '\u{7F}' => {
                let _ = write!(out, "\\u{:04X}", c as u32);
            }
            c => out.push(c),
        }
    }
}

fn is_iri_forbidden(c: char) -> bool {
    (c as u32) <= 0x20 || matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\')
}

struct LineParser<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> LineParser<'a> {
    fn new(src: &'a str, line: usize) -> Self {
        Self { src, pos: 0, line }
    }

    fn statement(mut self) -> CodecResult<Option<Triple>> {
        self.skip_ws();
        if self.at_end_or_comment() {
            return Ok(None);
        }
        let subject = self.subject()?;
        self.skip_ws();
        let predicate = Term::iri(self.iri()?);
        self.skip_ws();
        let object = self.object()?;
        self.skip_ws();
        self.expect('.')?;
        self.skip_ws();
        if !self.at_end_or_comment() {
            return Err(self.error("unexpected content after '.'"));
        }
        Triple::new(subject, predicate, object)
            .map(Some)
            .map_err(|e| self.error(e.to_string()))
    }

    fn subject(&mut self) -> CodecResult<Term> {
        match self.peek() {
            Some('<') => Ok(Term::iri(self.iri()?)),
            Some('_') => Ok(Term::Blank(self.blank()?)),
            _ => Err(self.error("expected IRI or blank node subject")),
        }
    }

    fn object(&mut self) -> CodecResult<Term> {
        match self.peek() {
            Some('<') => Ok(Term::iri(self.iri()?)),
            Some('_') => Ok(Term::Blank(self.blank()?)),
            Some('"') => Ok(Term::Literal(self.literal()?)),
            _ => Err(self.error("expected IRI, blank node, or literal object")),
        }
    }

    fn iri(&mut self) -> CodecResult<String> {
        self.expect('<')?;
        let mut iri = String::new();
        loop {
            match self.bump() {
                Some('>') => break,
                Some('\\') => match self.bump() {
                    Some('u') => iri.push(self.hex_char(4)?),
                    Some('U') => iri.push(self.hex_char(8)?),
                    _ => return Err(self.error("invalid escape in IRI")),
                },
                Some(c) if is_iri_forbidden(c) => {
                    return Err(self.error(format!("character {c:?} not allowed in IRI")))
                }
                Some(c) => iri.push(c),
                None => return Err(self.error("unterminated IRI")),
            }
        }
        if iri.is_empty() {
            return Err(self.error("empty IRI"));
        }
        Ok(iri)
    }

    fn blank(&mut self) -> CodecResult<BlankId> {
        self.expect('_')?;
        self.expect(':')?;
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || matches!(c, '_' | '-' | '.') {
                self.bump();
            } else {
                break;
            }
        }
        // A trailing '.' terminates the statement, not the label.
        while self.src[start..self.pos].ends_with('.') {
            self.pos -= 1;
        }
        BlankId::try_new(&self.src[start..self.pos]).map_err(|e| self.error(e.to_string()))
    }

    fn literal(&mut self) -> CodecResult<Literal> {
        self.expect('"')?;
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('"') => break,
                Some('\\') => {
                    let c = match self.bump() {
                        Some('t') => '\t',
                        Some('b') => '\u{8}',
                        Some('n') => '\n',
                        Some('r') => '\r',
                        Some('f') => '\u{C}',
                        Some('"') => '"',
                        Some('\'') => '\'',
                        Some('\\') => '\\',
                        Some('u') => self.hex_char(4)?,
                        Some('U') => self.hex_char(8)?,
                        _ => return Err(self.error("invalid escape in literal")),
                    };
                    value.push(c);
                }
                Some(c) => value.push(c),
                None => return Err(self.error("unterminated literal")),
            }
        }
        match self.peek() {
            Some('@') => {
                self.bump();
                let start = self.pos;
                while let Some(c) = self.peek() {
                    if c.is_ascii_alphanumeric() || c == '-' {
                        self.bump();
                    } else {
                        break;
                    }
                }
                let lang = &self.src[start..self.pos];
                if lang.is_empty() || !lang.starts_with(|c: char| c.is_ascii_alphabetic()) {
                    return Err(self.error("invalid language tag"));
                }
                Ok(Literal::lang_string(value, lang))
            }
            Some('^') => {
                self.bump();
                self.expect('^')?;
                let datatype = self.iri()?;
                Ok(Literal::typed(value, datatype))
            }
            _ => Ok(Literal::string(value)),
        }
    }

    fn hex_char(&mut self, digits: usize) -> CodecResult<char> {
        let end = self.pos + digits;
        let hex = self
            .src
            .get(self.pos..end)
            .ok_or_else(|| self.error("truncated unicode escape"))?;
        let code =
            u32::from_str_radix(hex, 16).map_err(|_| self.error("invalid unicode escape"))?;
        self.pos = end;
        char::from_u32(code).ok_or_else(|| self.error("escape is not a unicode scalar value"))
    }

    fn expect(&mut self, expected: char) -> CodecResult<()> {
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(self.error(format!("expected {expected:?}, found {c:?}"))),
            None => Err(self.error(format!("expected {expected:?}, found end of line"))),
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t' | '\r')) {
            self.bump();
        }
    }

    fn at_end_or_comment(&self) -> bool {
        matches!(self.peek(), None | Some('#'))
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> CodecError {
        CodecError::parse(self.line, format!("column {}: {}", self.pos + 1, message.into()))
    }
}
