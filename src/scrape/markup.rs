// Tolerant markup parser.
// Builds an element tree from real-world HTML without ever failing, keeping byte spans
// so callers can rewrite parts of the source in place.

use std::ops::Range;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

/// Elements whose start tag closes an open `p`.
const CLOSES_PARAGRAPH: &[&str] = &[
    "address", "article", "aside", "blockquote", "div", "dl", "fieldset", "footer", "form", "h1",
    "h2", "h3", "h4", "h5", "h6", "header", "hr", "main", "nav", "ol", "p", "pre", "section",
    "table", "ul",
];

/// Index of a node in its [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeKind {
    Root,
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<usize>,
    children: Vec<usize>,
    /// Start tag (or the whole text run).
    open: Range<usize>,
    /// Content between the start tag and the end tag.
    inner: Range<usize>,
}

/// Parsed document.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    /// Parse `source`. Malformed markup is repaired, never rejected.
    pub fn parse(source: &str) -> Self {
        Parser::new(source).run()
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Tag name (lowercase) of an element.
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].kind {
            NodeKind::Element { tag, .. } => Some(tag.as_str()),
            _ => None,
        }
    }

    pub fn is_element(&self, node: NodeId, tag: &str) -> bool {
        self.tag(node) == Some(tag)
    }

    pub fn attrs(&self, node: NodeId) -> &[(String, String)] {
        match &self.nodes[node.0].kind {
            NodeKind::Element { attrs, .. } => attrs,
            _ => &[],
        }
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.attrs(node)
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.attr(node, "class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent.map(NodeId)
    }

    /// Every descendant of `node` in document order, `node` excluded.
    pub fn descendants(&self, node: NodeId) -> Descendants<'_> {
        let mut stack: Vec<usize> = self.nodes[node.0].children.clone();
        stack.reverse();
        Descendants { doc: self, stack }
    }

    /// Descendant elements of `node` in document order.
    pub fn elements(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.descendants(node).filter(|&n| self.tag(n).is_some())
    }

    /// Descendant elements named `tag`.
    pub fn elements_named<'a>(
        &'a self,
        node: NodeId,
        tag: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.descendants(node).filter(move |&n| self.is_element(n, tag))
    }

    /// First descendant element matching `predicate`.
    pub fn find(&self, node: NodeId, predicate: impl Fn(NodeId) -> bool) -> Option<NodeId> {
        self.elements(node).find(|&n| predicate(n))
    }

    /// First element in the document with the given id.
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.find(self.root(), |n| self.attr(n, "id") == Some(id))
    }

    /// Text content with whitespace runs collapsed and ends trimmed.
    pub fn text(&self, node: NodeId) -> String {
        let mut raw = String::new();
        if let NodeKind::Text(text) = &self.nodes[node.0].kind {
            raw.push_str(text);
        }
        for descendant in self.descendants(node) {
            if let NodeKind::Text(text) = &self.nodes[descendant.0].kind {
                raw.push_str(text);
            }
        }
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Byte span of the element's start tag in the parsed source.
    pub fn open_span(&self, node: NodeId) -> Range<usize> {
        self.nodes[node.0].open.clone()
    }

    /// Byte span of the element's content in the parsed source.
    pub fn inner_span(&self, node: NodeId) -> Range<usize> {
        self.nodes[node.0].inner.clone()
    }
}

/// Pre-order walk over a subtree.
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<usize>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let index = self.stack.pop()?;
        self.stack
            .extend(self.doc.nodes[index].children.iter().rev().copied());
        Some(NodeId(index))
    }
}

struct Parser<'a> {
    source: &'a str,
    pos: usize,
    nodes: Vec<Node>,
    /// Open elements, root first.
    open: Vec<usize>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        let root = Node {
            kind: NodeKind::Root,
            parent: None,
            children: Vec::new(),
            open: 0..0,
            inner: 0..source.len(),
        };
        Self {
            source,
            pos: 0,
            nodes: vec![root],
            open: vec![0],
        }
    }

    fn run(mut self) -> Document {
        while self.pos < self.source.len() {
            let rest = &self.source[self.pos..];
            if rest.starts_with("<!--") {
                self.pos = match rest[4..].find("-->") {
                    Some(end) => self.pos + 4 + end + 3,
                    None => self.source.len(),
                };
            } else if rest.starts_with("</") {
                self.close_tag();
            } else if rest.starts_with("<!") || rest.starts_with("<?") {
                self.pos = match rest.find('>') {
                    Some(end) => self.pos + end + 1,
                    None => self.source.len(),
                };
            } else if rest.starts_with('<')
                && rest[1..].starts_with(|c: char| c.is_ascii_alphabetic())
            {
                self.open_tag();
            } else {
                self.text();
            }
        }

        // Unclosed elements end where the source ends.
        while self.open.len() > 1 {
            self.pop(self.source.len());
        }

        Document { nodes: self.nodes }
    }

    fn text(&mut self) {
        let start = self.pos;
        let rest = &self.source[start..];
        // A stray '<' that does not start a tag is text.
        let skip = usize::from(rest.starts_with('<'));
        let end = rest[skip..]
            .find('<')
            .map_or(self.source.len(), |i| start + skip + i);
        self.pos = end;
        self.push_text(start..end);
    }

    fn push_text(&mut self, span: Range<usize>) {
        if span.is_empty() {
            return;
        }
        let text = decode_entities(&self.source[span.clone()]);
        self.push_node(NodeKind::Text(text), span.clone(), span.end..span.end);
    }

    fn push_node(&mut self, kind: NodeKind, open: Range<usize>, inner: Range<usize>) -> usize {
        let parent = self.current();
        let index = self.nodes.len();
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
            open,
            inner,
        });
        self.nodes[parent].children.push(index);
        index
    }

    fn current(&self) -> usize {
        self.open.last().copied().unwrap_or(0)
    }

    fn current_tag(&self) -> Option<&str> {
        match &self.nodes[self.current()].kind {
            NodeKind::Element { tag, .. } => Some(tag.as_str()),
            _ => None,
        }
    }

    /// Pop the innermost open element, ending its content at `end`.
    fn pop(&mut self, end: usize) {
        if let Some(index) = self.open.pop() {
            let node = &mut self.nodes[index];
            node.inner.end = end.max(node.inner.start);
        }
    }

    fn open_tag(&mut self) {
        let start = self.pos;
        let (tag, attrs, self_closing, end) = parse_start_tag(self.source, start);
        self.pos = end;

        self.close_implied(&tag);

        let void = VOID_ELEMENTS.contains(&tag.as_str());
        let raw = RAW_TEXT_ELEMENTS.contains(&tag.as_str());
        let index = self.push_node(
            NodeKind::Element {
                tag: tag.clone(),
                attrs,
            },
            start..end,
            end..end,
        );

        if void || self_closing {
            return;
        }

        if raw {
            let content_end = find_ci(self.source, end, &format!("</{}", tag))
                .unwrap_or(self.source.len());
            self.open.push(index);
            self.push_text(end..content_end);
            self.pop(content_end);
            self.pos = match self.source[content_end..].find('>') {
                Some(i) => content_end + i + 1,
                None => self.source.len(),
            };
            return;
        }

        self.open.push(index);
    }

    fn close_implied(&mut self, tag: &str) {
        let start = self.pos;
        match tag {
            "li" => {
                let scope = self.open.iter().rposition(|&i| {
                    matches!(&self.nodes[i].kind, NodeKind::Element { tag, .. } if tag == "ul" || tag == "ol")
                });
                let open_li = self.open.iter().rposition(|&i| {
                    matches!(&self.nodes[i].kind, NodeKind::Element { tag, .. } if tag == "li")
                });
                if let Some(li) = open_li {
                    if scope.is_none_or(|s| li > s) {
                        while self.open.len() > li {
                            self.pop(start);
                        }
                    }
                }
            }
            _ if CLOSES_PARAGRAPH.contains(&tag) => {
                if self.current_tag() == Some("p") {
                    self.pop(start);
                }
            }
            _ => {}
        }
    }

    fn close_tag(&mut self) {
        let start = self.pos;
        let rest = &self.source[start + 2..];
        let name_len = rest
            .find(|c: char| c.is_whitespace() || c == '>')
            .unwrap_or(rest.len());
        let name = rest[..name_len].to_ascii_lowercase();
        self.pos = match rest.find('>') {
            Some(i) => start + 2 + i + 1,
            None => self.source.len(),
        };

        // Stray end tags are ignored.
        let Some(depth) = self.open.iter().rposition(|&i| {
            matches!(&self.nodes[i].kind, NodeKind::Element { tag, .. } if *tag == name)
        }) else {
            return;
        };
        while self.open.len() > depth {
            self.pop(start);
        }
    }
}

/// Parse a start tag at `start` (which points at `<`).
/// Returns the lowercase tag name, attributes, self-closing flag and end offset.
fn parse_start_tag(source: &str, start: usize) -> (String, Vec<(String, String)>, bool, usize) {
    let bytes = source.as_bytes();
    let mut pos = start + 1;

    let name_start = pos;
    while pos < bytes.len() && !is_tag_break(bytes[pos]) {
        pos += 1;
    }
    let tag = source[name_start..pos].to_ascii_lowercase();

    let mut attrs: Vec<(String, String)> = Vec::new();
    let mut self_closing = false;

    loop {
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos >= bytes.len() {
            break;
        }
        match bytes[pos] {
            b'>' => {
                pos += 1;
                break;
            }
            b'/' => {
                pos += 1;
                if bytes.get(pos) == Some(&b'>') {
                    self_closing = true;
                }
                continue;
            }
            _ => {}
        }

        let key_start = pos;
        while pos < bytes.len() && !is_tag_break(bytes[pos]) && bytes[pos] != b'=' {
            pos += 1;
        }
        let key = source[key_start..pos].to_ascii_lowercase();
        if key.is_empty() {
            // Unparseable byte; skip it.
            pos += 1;
            continue;
        }

        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        let mut value = String::new();
        if bytes.get(pos) == Some(&b'=') {
            pos += 1;
            while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
                pos += 1;
            }
            match bytes.get(pos) {
                Some(&quote) if quote == b'"' || quote == b'\'' => {
                    let value_start = pos + 1;
                    let value_end = source[value_start..]
                        .find(quote as char)
                        .map_or(source.len(), |i| value_start + i);
                    value = decode_entities(&source[value_start..value_end]);
                    pos = (value_end + 1).min(source.len());
                }
                _ => {
                    let value_start = pos;
                    while pos < bytes.len()
                        && !bytes[pos].is_ascii_whitespace()
                        && bytes[pos] != b'>'
                    {
                        pos += 1;
                    }
                    value = decode_entities(&source[value_start..pos]);
                }
            }
        }

        if !attrs.iter().any(|(existing, _)| *existing == key) {
            attrs.push((key, value));
        }
    }

    (tag, attrs, self_closing, pos)
}

fn is_tag_break(byte: u8) -> bool {
    byte.is_ascii_whitespace() || byte == b'>' || byte == b'/'
}

/// Case-insensitive search for an ASCII `needle` from `from`.
fn find_ci(haystack: &str, from: usize, needle: &str) -> Option<usize> {
    let hay = haystack.as_bytes();
    let needle = needle.as_bytes();
    if needle.len() > hay.len() {
        return None;
    }
    (from..=hay.len() - needle.len()).find(|&i| hay[i..i + needle.len()].eq_ignore_ascii_case(needle))
}

/// Decode the common named entities and numeric references. Unknown entities are kept.
pub fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest[1..].find(';').filter(|&i| i <= 10).and_then(|semi| {
            let entity = &rest[1..1 + semi];
            decode_entity(entity).map(|c| (c, semi + 2))
        });

        match decoded {
            Some((c, consumed)) => {
                out.push(c);
                rest = &rest[consumed..];
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

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let number = entity.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}
