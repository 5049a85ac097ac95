use std::rc::Rc;

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;

use markup5ever_rcdom::{Node, NodeData, RcDom};

/// Which parser a markup entry goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Markup {
    Html,
    // Self-closing tags like `<title/>` only close under XML rules.
    Xhtml,
}

impl Markup {
    pub fn from_entry_name(name: &str) -> Option<Markup> {
        if name.ends_with(".xhtml") {
            Some(Markup::Xhtml)
        } else if name.ends_with(".html") {
            Some(Markup::Html)
        } else {
            None
        }
    }
}

// Parses a string containing HTML and returns the document node.
pub fn get_document_node(content: &str) -> Rc<Node> {
    let rc_dom = parse_document(RcDom::default(), Default::default()).one(content);
    rc_dom.document
}

// Parses a string containing XHTML with the XML tokenizer and returns the document node.
pub fn get_xml_document_node(content: &str) -> Rc<Node> {
    let rc_dom = xml5ever::driver::parse_document(RcDom::default(), Default::default()).one(content);
    rc_dom.document
}

// Gets all descendant text nodes from a node in document order.
// Comments, processing instructions and doctypes have no text children, so they drop out.
pub fn get_text_nodes(node: &Rc<Node>) -> Vec<Rc<Node>> {
    let mut text_nodes = Vec::new();

    match &node.data {
        NodeData::Text { .. } => {
            text_nodes.push(node.clone());
        }
        NodeData::Comment { .. } | NodeData::ProcessingInstruction { .. } => {}
        _ => {
            for child in node.children.borrow().iter() {
                text_nodes.extend(get_text_nodes(child));
            }
        }
    }

    text_nodes
}

/// Strips every tag, attribute, comment and processing instruction from `content` and
/// returns the concatenated character data. Whitespace is kept as the parser reports it.
pub fn strip_markup(content: &str, markup: Markup) -> String {
    let document = match markup {
        Markup::Html => get_document_node(content),
        Markup::Xhtml => get_xml_document_node(content),
    };

    let mut text = String::new();
    for node in get_text_nodes(&document) {
        if let NodeData::Text { contents } = &node.data {
            text.push_str(&contents.borrow());
        }
    }
    text
}
