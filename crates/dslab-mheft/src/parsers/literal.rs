//! Literal values of the persisted format: quoted strings, integers, tuples, lists and dicts.

use itertools::Itertools;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Literal {
    Str(String),
    Int(i64),
    /// Tuple or list.
    Seq(Vec<Literal>),
    Dict(Vec<(Literal, Literal)>),
}

impl Literal {
    pub fn as_seq(&self) -> Option<&Vec<Literal>> {
        match self {
            Literal::Seq(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Vec<(Literal, Literal)>> {
        match self {
            Literal::Dict(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Literal::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Node labels are strings, integer labels are accepted as their decimal form.
    pub fn as_label(&self) -> Option<String> {
        match self {
            Literal::Str(s) => Some(s.clone()),
            Literal::Int(value) => Some(value.to_string()),
            _ => None,
        }
    }
}

struct Parser<'a> {
    chars: Vec<char>,
    pos: usize,
    source: &'a str,
}

impl<'a> Parser<'a> {
    fn skip_whitespace(&mut self) {
        while self.pos < self.chars.len() && self.chars[self.pos].is_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_whitespace();
        self.chars.get(self.pos).copied()
    }

    fn expect(&mut self, c: char) -> Result<(), String> {
        match self.peek() {
            Some(next) if next == c => {
                self.pos += 1;
                Ok(())
            }
            Some(next) => Err(format!("expected '{}' at {} in {}, found '{}'", c, self.pos, self.source, next)),
            None => Err(format!("expected '{}' at the end of {}", c, self.source)),
        }
    }

    fn value(&mut self) -> Result<Literal, String> {
        match self.peek() {
            Some('(') => self.sequence('(', ')'),
            Some('[') => self.sequence('[', ']'),
            Some('{') => self.dict(),
            Some(q @ ('\'' | '"')) => self.string(q),
            Some(c) if c == '-' || c.is_ascii_digit() => self.int(),
            Some(c) => Err(format!("unexpected '{}' at {} in {}", c, self.pos, self.source)),
            None => Err(format!("unexpected end of {}", self.source)),
        }
    }

    fn sequence(&mut self, open: char, close: char) -> Result<Literal, String> {
        self.expect(open)?;
        let mut items = Vec::new();
        loop {
            if self.peek() == Some(close) {
                self.pos += 1;
                return Ok(Literal::Seq(items));
            }
            items.push(self.value()?);
            match self.peek() {
                Some(',') => self.pos += 1,
                _ => {
                    self.expect(close)?;
                    return Ok(Literal::Seq(items));
                }
            }
        }
    }

    fn dict(&mut self) -> Result<Literal, String> {
        self.expect('{')?;
        let mut items = Vec::new();
        loop {
            if self.peek() == Some('}') {
                self.pos += 1;
                return Ok(Literal::Dict(items));
            }
            let key = self.value()?;
            self.expect(':')?;
            let value = self.value()?;
            items.push((key, value));
            match self.peek() {
                Some(',') => self.pos += 1,
                _ => {
                    self.expect('}')?;
                    return Ok(Literal::Dict(items));
                }
            }
        }
    }

    fn string(&mut self, quote: char) -> Result<Literal, String> {
        self.expect(quote)?;
        let mut result = String::new();
        while let Some(&c) = self.chars.get(self.pos) {
            self.pos += 1;
            if c == quote {
                return Ok(Literal::Str(result));
            }
            if c == '\\' {
                match self.chars.get(self.pos) {
                    Some(&escaped) => {
                        self.pos += 1;
                        result.push(escaped);
                    }
                    None => break,
                }
            } else {
                result.push(c);
            }
        }
        Err(format!("unterminated string in {}", self.source))
    }

    fn int(&mut self) -> Result<Literal, String> {
        let start = self.pos;
        if self.chars[self.pos] == '-' {
            self.pos += 1;
        }
        while self.pos < self.chars.len() && self.chars[self.pos].is_ascii_digit() {
            self.pos += 1;
        }
        let digits = self.chars[start..self.pos].iter().collect::<String>();
        digits
            .parse::<i64>()
            .map(Literal::Int)
            .map_err(|e| format!("invalid integer {} in {}: {}", digits, self.source, e))
    }
}

/// Parses a single literal, trailing characters are an error.
pub fn parse_literal(s: &str) -> Result<Literal, String> {
    let mut parser = Parser {
        chars: s.chars().collect(),
        pos: 0,
        source: s,
    };
    let value = parser.value()?;
    match parser.peek() {
        None => Ok(value),
        Some(c) => Err(format!("unexpected '{}' after value in {}", c, s)),
    }
}

pub fn quote(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 2);
    result.push('\'');
    for c in s.chars() {
        if c == '\'' || c == '\\' {
            result.push('\\');
        }
        result.push(c);
    }
    result.push('\'');
    result
}

/// Renders items as a tuple, a single item gets a trailing comma.
pub fn tuple<I: IntoIterator<Item = String>>(items: I) -> String {
    let items = items.into_iter().collect::<Vec<_>>();
    if items.len() == 1 {
        format!("({},)", items[0])
    } else {
        format!("({})", items.iter().join(", "))
    }
}

pub fn list<I: IntoIterator<Item = String>>(items: I) -> String {
    format!("[{}]", items.into_iter().join(", "))
}

pub fn dict<I: IntoIterator<Item = (String, String)>>(items: I) -> String {
    format!(
        "{{{}}}",
        items.into_iter().map(|(key, value)| format!("{}: {}", key, value)).join(", ")
    )
}
