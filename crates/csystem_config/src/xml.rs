//! XML rendering of [`ConfigTree`]s
//!
//! ```xml
//! <csystem>
//!   <config>
//!     <item type="text">Title</item>
//!     <item type="dict">
//!       <entry key="k">0</entry>
//!     </item>
//!     <item type="binary">00 AB</item>
//!   </config>
//!   <data1 type="list_data">
//!     <value>1</value>
//!   </data1>
//! </csystem>
//! ```

use std::io::Write;

use csystem_arc::hex::{from_hex, to_hex};
use quick_xml::{
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
    Reader, Writer,
};

use crate::{
    dict::{DictEntry, DictionaryMapping},
    error::{Error, Result},
    resource::MAX_DATA_BLOCKS,
    tree::{ConfigNode, ConfigTree},
};

const ROOT: &str = "csystem";
const CONFIG: &str = "config";
const ITEM: &str = "item";
const ENTRY: &str = "entry";
const VALUE: &str = "value";

fn data_name(index: usize) -> String {
    format!("data{}", index + 1)
}

impl ConfigTree {
    /// Render the tree as an XML document
    pub fn to_xml(&self) -> Result<String> {
        let mut output = Vec::new();
        let mut writer = Writer::new_with_indent(&mut output, b' ', 2);

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        writer.write_event(Event::Start(BytesStart::new(ROOT)))?;

        writer.write_event(Event::Start(BytesStart::new(CONFIG)))?;
        for node in &self.items {
            write_node(&mut writer, ITEM, node)?;
        }
        writer.write_event(Event::End(BytesEnd::new(CONFIG)))?;

        for (index, node) in self.data.iter().enumerate() {
            if let Some(node) = node {
                write_node(&mut writer, &data_name(index), node)?;
            }
        }

        writer.write_event(Event::End(BytesEnd::new(ROOT)))?;

        let mut xml = String::from_utf8_lossy(&output).into_owned();
        xml.push('\n');
        Ok(xml)
    }

    /// Parse a tree from an XML document
    pub fn from_xml(content: &str) -> Result<ConfigTree> {
        let root = Element::parse(content)?;
        if root.name != ROOT {
            return Err(Error::InvalidRoot(root.name));
        }

        let config = root
            .child(CONFIG)
            .ok_or_else(|| Error::MissingElement(CONFIG.into()))?;
        let items = config
            .children(ITEM)
            .map(read_node)
            .collect::<Result<Vec<_>>>()?;

        let mut data: [Option<ConfigNode>; MAX_DATA_BLOCKS] = Default::default();
        for (index, slot) in data.iter_mut().enumerate() {
            *slot = root.child(&data_name(index)).map(read_node).transpose()?;
        }

        Ok(ConfigTree { items, data })
    }
}

fn write_text<W: Write>(writer: &mut Writer<W>, elem: BytesStart, text: &str) -> Result<()> {
    let end = elem.to_end().into_owned();
    writer.write_event(Event::Start(elem))?;
    // an explicit text event keeps the writer from indenting the closing tag
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(end))?;
    Ok(())
}

fn write_entries<W: Write>(writer: &mut Writer<W>, mapping: &DictionaryMapping) -> Result<()> {
    for entry in mapping {
        let mut elem = BytesStart::new(ENTRY);
        elem.push_attribute(("key", entry.key.as_str()));
        write_text(writer, elem, &entry.value.to_string())?;
    }
    Ok(())
}

fn write_node<W: Write>(writer: &mut Writer<W>, name: &str, node: &ConfigNode) -> Result<()> {
    let mut elem = BytesStart::new(name);
    elem.push_attribute(("type", node.type_name()));

    match node {
        ConfigNode::Binary(bytes) => write_text(writer, elem, &to_hex(bytes)),
        ConfigNode::Text(text) => write_text(writer, elem, text),
        ConfigNode::Dict(mapping) | ConfigNode::DictData(mapping) => {
            writer.write_event(Event::Start(elem))?;
            write_entries(writer, mapping)?;
            writer.write_event(Event::End(BytesEnd::new(name)))?;
            Ok(())
        }
        ConfigNode::ListData(values) => {
            writer.write_event(Event::Start(elem))?;
            for value in values {
                write_text(writer, BytesStart::new(VALUE), &value.to_string())?;
            }
            writer.write_event(Event::End(BytesEnd::new(name)))?;
            Ok(())
        }
    }
}

fn read_node(elem: &Element) -> Result<ConfigNode> {
    let kind = elem.attribute("type").unwrap_or_default();
    match kind {
        "binary" => Ok(ConfigNode::Binary(from_hex(&elem.text)?)),
        "text" => Ok(ConfigNode::Text(elem.text.clone())),
        "dict" => Ok(ConfigNode::Dict(read_entries(elem)?)),
        "dict_data" => Ok(ConfigNode::DictData(read_entries(elem)?)),
        "list_data" => Ok(ConfigNode::ListData(
            elem.children(VALUE)
                .map(|v| parse_int(&v.text))
                .collect::<Result<Vec<_>>>()?,
        )),
        other => Err(Error::UnrecognizedType(other.into())),
    }
}

fn read_entries(elem: &Element) -> Result<DictionaryMapping> {
    elem.children(ENTRY)
        .map(|entry| -> Result<DictEntry> {
            let key = entry
                .attribute("key")
                .ok_or_else(|| Error::MissingAttribute {
                    element: ENTRY.into(),
                    attribute: "key".into(),
                })?;
            Ok(DictEntry::new(key.into(), parse_int(&entry.text)?))
        })
        .collect::<Result<Vec<_>>>()
        .map(DictionaryMapping::new)
}

fn parse_int(text: &str) -> Result<i32> {
    text.trim()
        .parse()
        .map_err(|_| Error::InvalidInteger(text.into()))
}

/// Minimal element tree, enough to look elements up by name
#[derive(Debug, Default)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    fn from_start(e: &BytesStart) -> Result<Element> {
        let mut attributes = Vec::new();
        for attr in e.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            attributes.push((
                String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                attr.unescape_value()?.into_owned(),
            ));
        }

        Ok(Element {
            name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
            attributes,
            ..Default::default()
        })
    }

    fn parse(content: &str) -> Result<Element> {
        let mut reader = Reader::from_str(content);
        // whitespace inside text items is significant
        reader.trim_text(false);

        let mut stack: Vec<Element> = Vec::new();
        loop {
            match reader.read_event()? {
                Event::Start(e) => stack.push(Element::from_start(&e)?),
                Event::Empty(e) => {
                    let elem = Element::from_start(&e)?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(elem),
                        None => return Ok(elem),
                    }
                }
                Event::End(_) => {
                    let Some(elem) = stack.pop() else {
                        continue;
                    };
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(elem),
                        None => return Ok(elem),
                    }
                }
                Event::Text(e) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&e.unescape()?);
                    }
                }
                Event::CData(e) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                    }
                }
                Event::Eof => return Err(Error::MissingElement(ROOT.into())),
                _ => {}
            }
        }
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    fn children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }
}
