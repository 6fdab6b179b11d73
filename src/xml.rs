//! Structural XML decoder
//!
//! The remote query API answers with namespace-free XML in which every
//! collection is encoded as repeated sibling `<item>` tags, reusing the same
//! tag name at every nesting depth and carrying no length markers. A naive
//! first-match scan cannot tell a sibling `<item>` from a nested one, so this
//! module parses the whole document into an [`Element`] tree with a small
//! recursive-descent parser and lets callers project typed records out of it.
//!
//! The parser is deliberately lenient: declarations, comments, DOCTYPE and
//! attributes are skipped, unknown entities pass through verbatim, and
//! malformed or truncated input yields a partial tree (or `None`) instead of
//! an error. Callers treat "nothing found" as "does not exist yet" because
//! the remote side can return empty success bodies for not-yet-propagated
//! state.

/// A single parsed XML element: tag name, direct text content, child elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    /// First direct child with the given tag name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Trimmed text of the first direct child with the given tag name,
    /// `None` if the child is absent or empty.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name)
            .map(|c| c.text.as_str())
            .filter(|t| !t.is_empty())
    }

    /// All direct children named `item` — the wire encoding of a collection.
    pub fn items(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter(|c| c.name == "item")
    }

    /// Depth-first search for the first element with the given tag name,
    /// not including `self`.
    pub fn descendant(&self, name: &str) -> Option<&Element> {
        for child in &self.children {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.descendant(name) {
                return Some(found);
            }
        }
        None
    }
}

/// Parse a document into its root element.
///
/// Returns `None` when no element can be found at all. Truncated documents
/// parse into partial trees rather than failing.
pub fn parse(input: &str) -> Option<Element> {
    let mut parser = Parser { src: input, pos: 0 };
    parser.skip_misc();
    parser.parse_element()
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn starts_with(&self, pat: &str) -> bool {
        self.rest().starts_with(pat)
    }

    /// Advance past the next occurrence of `pat`. On a missing terminator the
    /// position moves to the end of input and `false` is returned.
    fn skip_past(&mut self, pat: &str) -> bool {
        match self.rest().find(pat) {
            Some(i) => {
                self.pos += i + pat.len();
                true
            }
            None => {
                self.pos = self.src.len();
                false
            }
        }
    }

    /// Skip whitespace, the XML declaration, comments and DOCTYPE before the
    /// root element.
    fn skip_misc(&mut self) {
        loop {
            let trimmed = self.rest().trim_start();
            self.pos = self.src.len() - trimmed.len();
            if self.starts_with("<?") {
                self.skip_past("?>");
            } else if self.starts_with("<!--") {
                self.skip_past("-->");
            } else if self.starts_with("<!") {
                self.skip_past(">");
            } else {
                break;
            }
        }
    }

    fn read_name(&mut self) -> String {
        let rest = self.rest();
        let end = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ':' | '.')))
            .unwrap_or(rest.len());
        let name = rest[..end].to_string();
        self.pos += end;
        name
    }

    /// Consume the remainder of an opening tag (attributes included),
    /// honoring quoted attribute values. Returns whether the tag was
    /// self-closing, or `None` if the input ended inside the tag.
    fn skip_tag_rest(&mut self) -> Option<bool> {
        let bytes = self.src.as_bytes();
        let start = self.pos;
        let mut quote: Option<u8> = None;
        let mut i = start;
        while i < bytes.len() {
            let b = bytes[i];
            match quote {
                Some(q) => {
                    if b == q {
                        quote = None;
                    }
                }
                None => match b {
                    b'"' | b'\'' => quote = Some(b),
                    b'>' => {
                        let self_closing = i > start && bytes[i - 1] == b'/';
                        self.pos = i + 1;
                        return Some(self_closing);
                    }
                    _ => {}
                },
            }
            i += 1;
        }
        self.pos = bytes.len();
        None
    }

    /// Parse one element starting at `<`. Returns `None` when the position
    /// does not hold a parseable opening tag.
    fn parse_element(&mut self) -> Option<Element> {
        if !self.starts_with("<") {
            return None;
        }
        self.pos += 1;
        let name = self.read_name();
        if name.is_empty() {
            return None;
        }
        let self_closing = self.skip_tag_rest()?;
        let mut element = Element {
            name,
            text: String::new(),
            children: Vec::new(),
        };
        if self_closing {
            return Some(element);
        }

        loop {
            let rest = self.rest();
            let Some(lt) = rest.find('<') else {
                // Truncated document: keep what we have.
                element.text.push_str(&decode_entities(rest.trim()));
                self.pos = self.src.len();
                return Some(element);
            };
            if lt > 0 {
                let text = rest[..lt].trim();
                if !text.is_empty() {
                    element.text.push_str(&decode_entities(text));
                }
                self.pos += lt;
            }

            if self.starts_with("</") {
                // Lenient: any close tag ends the current element, matching
                // name or not.
                self.skip_past(">");
                return Some(element);
            }
            if self.starts_with("<!--") {
                self.skip_past("-->");
                continue;
            }
            if self.starts_with("<![CDATA[") {
                self.pos += "<![CDATA[".len();
                let rest = self.rest();
                match rest.find("]]>") {
                    Some(i) => {
                        element.text.push_str(&rest[..i]);
                        self.pos += i + 3;
                    }
                    None => {
                        element.text.push_str(rest);
                        self.pos = self.src.len();
                        return Some(element);
                    }
                }
                continue;
            }
            if self.starts_with("<?") {
                self.skip_past("?>");
                continue;
            }

            match self.parse_element() {
                Some(child) => element.children.push(child),
                // Stray `<` that opens nothing parseable; parse_element has
                // already stepped past it, so the walk still advances.
                None => {}
            }
        }
    }
}

/// Decode the five predefined XML entities; anything else passes through.
fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(i) = rest.find('&') {
        out.push_str(&rest[..i]);
        rest = &rest[i..];
        let decoded = rest.find(';').filter(|&j| j <= 6).and_then(|j| {
            let c = match &rest[1..j] {
                "lt" => '<',
                "gt" => '>',
                "amp" => '&',
                "quot" => '"',
                "apos" => '\'',
                _ => return None,
            };
            Some((c, j + 1))
        });
        match decoded {
            Some((c, len)) => {
                out.push(c);
                rest = &rest[len..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
