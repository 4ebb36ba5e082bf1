use std::io::{self, Write};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::document::{Document, NodeId};
use crate::error::{TreeError, TreeResult};

const XML_VERSION: &str = "1.0";
const XML_ENCODING: &str = "utf-8";

impl Document {
    /// Parses `input` into a document. Comments, processing instructions and
    /// doctype declarations are dropped, as is whitespace-only text between
    /// elements.
    pub fn parse(input: &str) -> TreeResult<Self> {
        let mut reader = Reader::from_str(input);
        let mut doc = Document::new();
        let mut open: Vec<NodeId> = Vec::new();

        loop {
            let position = reader.buffer_position() as u64;
            let event = reader
                .read_event()
                .map_err(|source| TreeError::Syntax { position, source })?;

            match event {
                Event::Start(start) => {
                    let id = open_element(&mut doc, &open, &start, position)?;
                    open.push(id);
                }
                Event::Empty(start) => {
                    open_element(&mut doc, &open, &start, position)?;
                }
                Event::End(end) => {
                    let qname = end.name();
                    let found = decode_name(qname.as_ref())?;
                    let Some(id) = open.pop() else {
                        return Err(TreeError::UnexpectedClose(found.to_string()));
                    };
                    let expected = doc.name(id).unwrap_or_default();
                    if expected != found {
                        return Err(TreeError::MismatchedTag {
                            expected: expected.to_string(),
                            found: found.to_string(),
                        });
                    }
                    close_element(&mut doc, id);
                }
                Event::Text(text) => {
                    if let Some(id) = open.last() {
                        let text = text
                            .unescape()
                            .map_err(|source| TreeError::Syntax { position, source })?;
                        doc.append_text(*id, &text);
                    }
                }
                Event::CData(data) => {
                    if let Some(id) = open.last() {
                        let raw = data.into_inner();
                        doc.append_text(*id, &String::from_utf8_lossy(&raw));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !open.is_empty() {
            return Err(TreeError::Unclosed(open.len()));
        }

        Ok(doc)
    }

    /// Writes the document as pretty-printed UTF-8 XML, indenting nested
    /// elements by `indent` spaces.
    pub fn write_to<W: Write>(&self, sink: W, indent: usize) -> TreeResult<()> {
        let mut writer = Writer::new_with_indent(sink, b' ', indent);
        writer
            .write_event(Event::Decl(BytesDecl::new(
                XML_VERSION,
                Some(XML_ENCODING),
                None,
            )))
            .map_err(into_io)?;

        if let Some(root) = self.root() {
            write_element(&mut writer, self, root)?;
        }

        writer.get_mut().write_all(b"\n")?;
        writer.get_mut().flush()?;
        Ok(())
    }

    pub fn to_xml_string(&self, indent: usize) -> TreeResult<String> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer, indent)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

fn open_element(
    doc: &mut Document,
    open: &[NodeId],
    start: &BytesStart<'_>,
    position: u64,
) -> TreeResult<NodeId> {
    let qname = start.name();
    let name = decode_name(qname.as_ref())?;
    let id = match open.last() {
        Some(parent) => doc.create_child(*parent, name, None),
        None => {
            if doc.root().is_some() {
                return Err(TreeError::MultipleRoots);
            }
            let id = doc.create_detached(name);
            doc.attach_root(id);
            id
        }
    };

    for attribute in start.attributes() {
        let attribute = attribute.map_err(|err| TreeError::Syntax {
            position,
            source: err.into(),
        })?;
        let key = decode_name(attribute.key.as_ref())?;
        let value = attribute
            .unescape_value()
            .map_err(|source| TreeError::Syntax { position, source })?;
        doc.set_attribute(id, key, &value);
    }

    Ok(id)
}

fn close_element(doc: &mut Document, id: NodeId) {
    let blank = doc
        .text(id)
        .map_or(true, |text| text.trim().is_empty());
    if blank && !doc.children(id).is_empty() {
        doc.clear_text(id);
    }
}

fn decode_name(raw: &[u8]) -> TreeResult<&str> {
    std::str::from_utf8(raw).map_err(|_| TreeError::InvalidName)
}

fn write_element<W: Write>(writer: &mut Writer<W>, doc: &Document, id: NodeId) -> TreeResult<()> {
    let name = doc.name(id).unwrap_or_default();
    let mut start = BytesStart::new(name);
    for (key, value) in doc.attributes(id) {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    let children = doc.children(id);
    let text = doc
        .text(id)
        .filter(|text| children.is_empty() || !text.trim().is_empty())
        .unwrap_or_default();
    if text.is_empty() && children.is_empty() {
        writer.write_event(Event::Empty(start)).map_err(into_io)?;
        return Ok(());
    }

    writer.write_event(Event::Start(start)).map_err(into_io)?;
    if !text.is_empty() {
        writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(into_io)?;
    }
    for child in children {
        write_element(writer, doc, *child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(into_io)?;
    Ok(())
}

fn into_io<E>(err: E) -> io::Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    io::Error::new(io::ErrorKind::Other, err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_whitespace_between_elements_but_keeps_leaf_text() {
        let doc = Document::parse("<A>\n  <B> padded </B>\n  <C/>\n</A>").unwrap();
        let root = doc.root().unwrap();
        assert_eq!(doc.text(root), Some(""));
        let b = doc.children(root)[0];
        assert_eq!(doc.text(b), Some(" padded "));
    }

    #[test]
    fn rejects_unbalanced_input() {
        assert!(Document::parse("<A><B></A>").is_err());
        assert!(matches!(
            Document::parse("<A><B>"),
            Err(TreeError::Unclosed(_))
        ));
    }

    #[test]
    fn unescapes_entities() {
        let doc = Document::parse("<A>Fish &amp; Chips</A>").unwrap();
        let root = doc.root().unwrap();
        assert_eq!(doc.content(root).as_deref(), Some("Fish & Chips"));
    }

    #[test]
    fn blank_container_gaining_a_child_renders_stably() {
        let mut doc = Document::parse("<A>\n  <B>\n  </B>\n</A>").unwrap();
        let root = doc.root().unwrap();
        let b = doc.children(root)[0];
        doc.create_child(b, "C", Some("x"));

        let first = doc.to_xml_string(2).unwrap();
        assert!(first.contains("  <B>\n    <C>x</C>\n  </B>\n"));
        let second = Document::parse(&first).unwrap().to_xml_string(2).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_input_has_no_root() {
        let doc = Document::parse("").unwrap();
        assert!(doc.root().is_none());
    }
}
