//! Parser for `.layout` description files
//!
//! One node per line: a keyword, an optional quoted string, then
//! `key=value` attributes. Containers open a `{ ... }` block of children.
//! `--` starts a comment that runs to the end of the line.
//!
//! ```text
//! column width=fill height=30% background=cyan arrange=space-evenly {
//!     text "Hello" size=16
//!     row border=5:#000000 padding=5 {
//!         spacer width=20
//!     }
//! }
//! ```

use thiserror::Error;

use crate::ast::*;
use crate::sandbox::MAX_NESTING_DEPTH;

pub struct Parser<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    col: usize,
    /// Open `{` blocks around the current position
    depth: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Parse error at {line}:{col}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub col: usize,
}

type Result<T> = std::result::Result<T, ParseError>;

/// Where a value started, for errors raised after it was read
#[derive(Debug, Clone, Copy)]
struct Mark {
    line: usize,
    col: usize,
}

impl Mark {
    fn error(self, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            line: self.line,
            col: self.col,
        }
    }
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            col: 1,
            depth: 0,
        }
    }

    /// Parse a whole file. It must hold exactly one root node.
    pub fn parse(mut self) -> Result<Node> {
        self.skip_whitespace_and_comments();
        if self.peek().is_none() {
            return Err(self.error("Expected a root node, found end of input"));
        }
        let root = self.parse_node()?;
        self.skip_whitespace_and_comments();
        if let Some(c) = self.peek() {
            return Err(self.error(&format!("Unexpected '{}' after the root node", c)));
        }
        Ok(root)
    }

    fn parse_node(&mut self) -> Result<Node> {
        self.skip_whitespace_and_comments();
        let start = self.mark();
        let keyword = self.parse_identifier()?;
        self.skip_horizontal_whitespace();

        let content = if self.peek() == Some('"') {
            let s = self.parse_string_literal()?;
            self.skip_horizontal_whitespace();
            Some((start, s))
        } else {
            None
        };

        let attrs = self.parse_attributes()?;

        match keyword.as_str() {
            "column" | "row" => {
                reject_content(&content, &keyword)?;
                let mut container = if keyword == "column" {
                    Container::column()
                } else {
                    Container::row()
                };
                for attr in attrs {
                    container = apply_container_attr(container, attr)?;
                }
                if self.peek() == Some('{') {
                    container.children = self.parse_children()?;
                }
                Ok(container.into())
            }
            "text" => {
                let Some((_, content)) = content else {
                    return Err(start.error("text needs a quoted string"));
                };
                let mut text = Text::new(content);
                for attr in attrs {
                    text = match attr.key.as_str() {
                        "color" => text.color(attr.color()?),
                        "size" => text.size(attr.positive_number()?),
                        _ => return Err(attr.unknown("text")),
                    };
                }
                self.reject_block("text")?;
                Ok(text.into())
            }
            "spacer" => {
                reject_content(&content, &keyword)?;
                let mut spacer = Spacer::default();
                for attr in attrs {
                    match attr.key.as_str() {
                        "width" => spacer.width = attr.non_negative_number()?,
                        "height" => spacer.height = attr.non_negative_number()?,
                        _ => return Err(attr.unknown("spacer")),
                    }
                }
                self.reject_block("spacer")?;
                Ok(spacer.into())
            }
            "image_card" => {
                reject_content(&content, &keyword)?;
                let mut image = None;
                let mut title = String::new();
                let mut description = String::new();
                let mut height = ImageCard::DEFAULT_HEIGHT;
                for attr in attrs {
                    match attr.key.as_str() {
                        "image" => image = Some(attr.value.clone()),
                        "title" => title = attr.value.clone(),
                        "description" => description = attr.value.clone(),
                        "height" => height = attr.positive_number()?,
                        _ => return Err(attr.unknown("image_card")),
                    }
                }
                let image = image.ok_or_else(|| start.error("image_card needs image=\"...\""))?;
                self.reject_block("image_card")?;
                Ok(ImageCard::new(image, description, title).height(height).into())
            }
            _ => Err(start.error(format!("Unknown node kind: {}", keyword))),
        }
    }

    fn parse_children(&mut self) -> Result<Vec<Node>> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.error(&format!("Nesting deeper than {} levels", MAX_NESTING_DEPTH)));
        }
        self.expect('{')?;
        self.depth += 1;
        self.skip_whitespace_and_comments();

        let mut children = vec![];
        while self.peek() != Some('}') {
            if self.peek().is_none() {
                return Err(self.error("Expected '}', found end of input"));
            }
            children.push(self.parse_node()?);
            self.skip_whitespace_and_comments();
        }

        self.expect('}')?;
        self.depth -= 1;
        Ok(children)
    }

    /// Attributes up to the end of the line, a `{`, or a `}`.
    fn parse_attributes(&mut self) -> Result<Vec<Attribute>> {
        let mut attrs = vec![];
        loop {
            self.skip_horizontal_whitespace();
            match self.peek() {
                None | Some('\n') | Some('\r') | Some('{') | Some('}') => break,
                Some('-') if self.input[self.pos..].starts_with("--") => break,
                _ => {}
            }

            let key_mark = self.mark();
            let key = self.parse_identifier()?;
            if self.peek() != Some('=') {
                return Err(key_mark.error(format!("Expected '=' after attribute '{}'", key)));
            }
            self.advance();

            let value_mark = self.mark();
            let value = if self.peek() == Some('"') {
                self.parse_string_literal()?
            } else {
                self.parse_bare_value()
            };
            if value.is_empty() {
                return Err(value_mark.error(format!("Missing value for '{}'", key)));
            }
            attrs.push(Attribute {
                key,
                value,
                mark: value_mark,
            });
        }
        Ok(attrs)
    }

    fn parse_bare_value(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c == '{' || c == '}' || c == '"' {
                break;
            }
            self.advance();
        }
        self.input[start..self.pos].to_string()
    }

    fn reject_block(&mut self, kind: &str) -> Result<()> {
        if self.peek() == Some('{') {
            return Err(self.error(&format!("{} cannot have children", kind)));
        }
        Ok(())
    }

    fn parse_string_literal(&mut self) -> Result<String> {
        self.expect('"')?;
        let mut s = String::new();
        while let Some(c) = self.peek() {
            if c == '"' {
                break;
            }
            if c == '\n' {
                return Err(self.error("Unterminated string"));
            }
            self.advance();
            if c == '\\' {
                match self.advance() {
                    Some('n') => s.push('\n'),
                    Some('t') => s.push('\t'),
                    Some(c) => s.push(c),
                    None => return Err(self.error("Unexpected end of input in string")),
                }
            } else {
                s.push(c);
            }
        }
        self.expect('"')?;
        Ok(s)
    }

    fn parse_identifier(&mut self) -> Result<String> {
        let start = self.pos;
        match self.peek() {
            Some(c) if c.is_alphabetic() || c == '_' => {
                self.advance();
            }
            Some(c) => return Err(self.error(&format!("Expected identifier, found '{}'", c))),
            None => return Err(self.error("Expected identifier, found end of input")),
        }

        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }

        Ok(self.input[start..self.pos].to_string())
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.input[self.pos..].chars().next()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        match self.peek() {
            Some(c) if c == expected => {
                self.advance();
                Ok(())
            }
            Some(c) => Err(self.error(&format!("Expected '{}', found '{}'", expected, c))),
            None => Err(self.error(&format!("Expected '{}', found end of input", expected))),
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            self.skip_horizontal_whitespace();

            while self.peek() == Some('\n') || self.peek() == Some('\r') {
                self.advance();
                self.skip_horizontal_whitespace();
            }

            if self.input[self.pos..].starts_with("--") {
                self.skip_line();
            } else {
                break;
            }
        }
    }

    fn skip_horizontal_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c == ' ' || c == '\t' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.peek() {
            self.advance();
            if c == '\n' {
                break;
            }
        }
    }

    fn mark(&self) -> Mark {
        Mark {
            line: self.line,
            col: self.col,
        }
    }

    fn error(&self, message: &str) -> ParseError {
        self.mark().error(message)
    }
}

fn reject_content(content: &Option<(Mark, String)>, kind: &str) -> Result<()> {
    match content {
        Some((mark, _)) => Err(mark.error(format!("{} does not take a quoted string", kind))),
        None => Ok(()),
    }
}

fn apply_container_attr(container: Container, attr: Attribute) -> Result<Container> {
    Ok(match attr.key.as_str() {
        "width" => container.width(attr.length()?),
        "height" => container.height(attr.length()?),
        "arrange" => container.arrange(
            Arrangement::from_name(&attr.value)
                .ok_or_else(|| attr.mark.error(format!("Unknown arrangement: {}", attr.value)))?,
        ),
        "align" => container.align(
            Alignment::from_name(&attr.value)
                .ok_or_else(|| attr.mark.error(format!("Unknown alignment: {}", attr.value)))?,
        ),
        "background" => container.background(attr.color()?),
        "border" => {
            let (width, color) = attr
                .value
                .split_once(':')
                .ok_or_else(|| attr.mark.error("Border must be WIDTH:COLOR"))?;
            let width = attr.parse_number(width)?;
            let color = attr.parse_color(color)?;
            container.border(width, color)
        }
        "padding" => container.decorate(Decoration::Padding(attr.insets()?)),
        _ => return Err(attr.unknown("container")),
    })
}

/// A `key=value` pair with the position of its value
struct Attribute {
    key: String,
    value: String,
    mark: Mark,
}

impl Attribute {
    fn unknown(&self, kind: &str) -> ParseError {
        self.mark.error(format!("Unknown {} attribute: {}", kind, self.key))
    }

    fn parse_number(&self, s: &str) -> Result<f32> {
        match s.trim().parse::<f32>() {
            Ok(n) if n.is_finite() => Ok(n),
            _ => Err(self.mark.error(format!("Invalid number for '{}': {}", self.key, s))),
        }
    }

    fn non_negative_number(&self) -> Result<f32> {
        let n = self.parse_number(&self.value)?;
        if n < 0.0 {
            return Err(self.mark.error(format!("'{}' cannot be negative", self.key)));
        }
        Ok(n)
    }

    fn positive_number(&self) -> Result<f32> {
        let n = self.parse_number(&self.value)?;
        if n <= 0.0 {
            return Err(self.mark.error(format!("'{}' must be positive", self.key)));
        }
        Ok(n)
    }

    fn parse_color(&self, s: &str) -> Result<Color> {
        let color = if s.starts_with('#') {
            Color::from_hex(s)
        } else {
            Color::from_name(s)
        };
        color.ok_or_else(|| self.mark.error(format!("Invalid color: {}", s)))
    }

    fn color(&self) -> Result<Color> {
        self.parse_color(&self.value)
    }

    /// `fill`, `wrap`, `120` or `30%`.
    fn length(&self) -> Result<Length> {
        match self.value.as_str() {
            "fill" => Ok(Length::FILL),
            "wrap" => Ok(Length::Wrap),
            v => match v.strip_suffix('%') {
                Some(pct) => Ok(Length::Fraction(self.parse_number(pct)? / 100.0)),
                None => {
                    let n = self.non_negative_number()?;
                    Ok(Length::Fixed(n))
                }
            },
        }
    }

    /// `all`, `vertical,horizontal` or `top,right,bottom,left`.
    fn insets(&self) -> Result<Insets> {
        let parts = self
            .value
            .split(',')
            .map(|p| self.parse_number(p))
            .collect::<Result<Vec<f32>>>()?;
        if parts.iter().any(|p| *p < 0.0) {
            return Err(self.mark.error("Padding cannot be negative"));
        }
        match parts.as_slice() {
            [all] => Ok(Insets::all(*all)),
            [v, h] => Ok(Insets::symmetric(*v, *h)),
            [t, r, b, l] => Ok(Insets::new(*t, *r, *b, *l)),
            _ => Err(self.mark.error("Padding takes 1, 2 or 4 numbers")),
        }
    }
}

pub fn parse(input: &str) -> Result<Node> {
    Parser::new(input).parse()
}
