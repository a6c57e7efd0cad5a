use crate::error::ValueError;
use std::fmt;
use std::str::FromStr;

/// One step of a [`ValuePath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    Field(String),
    Index(usize),
}

/// Absolute or relative location inside a configuration tree.
///
/// Paths render as `a.b[0].c`. Labels that contain `.`, `[`, `]` or are empty
/// are quoted (`a."x.y"`) so that rendering and parsing agree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ValuePath {
    selectors: Vec<Selector>,
}

impl ValuePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_selectors(selectors: Vec<Selector>) -> Self {
        Self { selectors }
    }

    pub fn parse(input: &str) -> Result<Self, ValueError> {
        let invalid = |reason: &str| ValueError::InvalidPath {
            path: input.to_string(),
            reason: reason.to_string(),
        };

        if input.trim().is_empty() {
            return Ok(Self::root());
        }

        let mut selectors = Vec::new();
        let mut chars = input.chars().peekable();
        let mut expect_segment = true;
        while let Some(&ch) = chars.peek() {
            match ch {
                '[' => {
                    chars.next();
                    let mut digits = String::new();
                    loop {
                        match chars.next() {
                            Some(']') => break,
                            Some(c) if c.is_ascii_digit() => digits.push(c),
                            _ => return Err(invalid("malformed list index")),
                        }
                    }
                    let index = digits
                        .parse::<usize>()
                        .map_err(|_| invalid("empty list index"))?;
                    selectors.push(Selector::Index(index));
                    expect_segment = false;
                }
                '.' => {
                    if expect_segment {
                        return Err(invalid("empty field label"));
                    }
                    chars.next();
                    expect_segment = true;
                }
                '"' => {
                    if !expect_segment {
                        return Err(invalid("missing '.' before quoted label"));
                    }
                    chars.next();
                    let mut label = String::new();
                    loop {
                        match chars.next() {
                            Some('"') => break,
                            Some(c) => label.push(c),
                            None => return Err(invalid("unterminated quoted label")),
                        }
                    }
                    selectors.push(Selector::Field(label));
                    expect_segment = false;
                }
                _ => {
                    if !expect_segment {
                        return Err(invalid("missing '.' between labels"));
                    }
                    let mut label = String::new();
                    while let Some(&c) = chars.peek() {
                        if c == '.' || c == '[' {
                            break;
                        }
                        label.push(c);
                        chars.next();
                    }
                    selectors.push(Selector::Field(label));
                    expect_segment = false;
                }
            }
        }

        if expect_segment {
            return Err(invalid("path ends with '.'"));
        }
        Ok(Self { selectors })
    }

    pub fn selectors(&self) -> &[Selector] {
        &self.selectors
    }

    pub fn is_root(&self) -> bool {
        self.selectors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    pub fn child(&self, label: &str) -> Self {
        let mut selectors = self.selectors.clone();
        selectors.push(Selector::Field(label.to_string()));
        Self { selectors }
    }

    pub fn index(&self, index: usize) -> Self {
        let mut selectors = self.selectors.clone();
        selectors.push(Selector::Index(index));
        Self { selectors }
    }

    pub fn join(&self, other: &ValuePath) -> Self {
        let mut selectors = self.selectors.clone();
        selectors.extend(other.selectors.iter().cloned());
        Self { selectors }
    }

    /// First selector plus the remaining relative path.
    pub fn split_first(&self) -> Option<(&Selector, ValuePath)> {
        let (first, rest) = self.selectors.split_first()?;
        Some((first, ValuePath::from_selectors(rest.to_vec())))
    }

    /// Short name of the node: the last field label, or the list index.
    pub fn last_fragment(&self) -> Option<String> {
        self.selectors.last().map(|selector| match selector {
            Selector::Field(label) => label.clone(),
            Selector::Index(index) => index.to_string(),
        })
    }

    /// Rendered path, with `(root)` standing in for the empty path.
    pub fn describe(&self) -> String {
        if self.is_root() {
            "(root)".to_string()
        } else {
            self.to_string()
        }
    }
}

fn needs_quotes(label: &str) -> bool {
    label.is_empty() || label.contains(['.', '[', ']'])
}

impl fmt::Display for ValuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, selector) in self.selectors.iter().enumerate() {
            match selector {
                Selector::Field(label) => {
                    if position > 0 {
                        write!(f, ".")?;
                    }
                    if needs_quotes(label) {
                        write!(f, "\"{}\"", label)?;
                    } else {
                        write!(f, "{}", label)?;
                    }
                }
                Selector::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

impl FromStr for ValuePath {
    type Err = ValueError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ValuePath::parse(value)
    }
}
