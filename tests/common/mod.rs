//! Minimal readers for the files written by `pvtk`, used to check the output byte for byte
#![allow(dead_code)]

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use std::collections::HashMap;
use std::path::Path;

const APPENDED_START: &[u8] = b"<AppendedData encoding=\"raw\">_";
const DOCUMENT_END: &[u8] = b"\n  </AppendedData>\n</VTKFile>\n";

/// A `DataArray` element of an XML header
#[derive(Debug, Clone, PartialEq)]
pub struct DeclaredArray {
    /// name of the element the array is declared in (`Points`, `PointData`, ...)
    pub section: String,
    pub name: String,
    pub type_name: String,
    pub components: usize,
    pub offset: usize,
}

/// A serial XML file split into its declared arrays and its appended section
#[derive(Debug)]
pub struct XmlFile {
    pub header: String,
    pub arrays: Vec<DeclaredArray>,
    pub appended: Vec<u8>,
}

impl XmlFile {
    pub fn read(path: &Path) -> Self {
        let bytes = std::fs::read(path).unwrap();
        Self::parse(&bytes)
    }

    pub fn parse(bytes: &[u8]) -> Self {
        let start = find(bytes, APPENDED_START).expect("no appended section");
        assert!(bytes.ends_with(DOCUMENT_END), "unexpected document tail");

        let header = String::from_utf8(bytes[..start].to_vec()).unwrap();
        let payload_start = start + APPENDED_START.len();
        let appended = bytes[payload_start..bytes.len() - DOCUMENT_END.len()].to_vec();

        let arrays = declared_arrays(&header);

        Self {
            header,
            arrays,
            appended,
        }
    }

    pub fn array(&self, name: &str) -> &DeclaredArray {
        self.arrays
            .iter()
            .find(|array| array.name == name)
            .unwrap_or_else(|| panic!("array `{name}` not declared"))
    }

    /// the payload of the record found at the declared offset of `name`
    pub fn record(&self, name: &str) -> &[u8] {
        let offset = self.array(name).offset;
        let len = u32::from_le_bytes(self.appended[offset..offset + 4].try_into().unwrap());
        &self.appended[offset + 4..offset + 4 + len as usize]
    }

    pub fn floats(&self, name: &str) -> Vec<f32> {
        assert_eq!(self.array(name).type_name, "Float32");
        f32_le(self.record(name))
    }

    pub fn ints(&self, name: &str) -> Vec<i32> {
        assert_eq!(self.array(name).type_name, "Int32");
        i32_le(self.record(name))
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

pub fn attributes(element: &BytesStart) -> HashMap<String, String> {
    element
        .attributes()
        .map(|attribute| {
            let attribute = attribute.unwrap();
            (
                String::from_utf8(attribute.key.as_ref().to_vec()).unwrap(),
                attribute.unescape_value().unwrap().into_owned(),
            )
        })
        .collect()
}

fn element_name(element: &BytesStart) -> String {
    String::from_utf8(element.name().as_ref().to_vec()).unwrap()
}

/// every `DataArray` of a header, in document order
pub fn declared_arrays(header: &str) -> Vec<DeclaredArray> {
    let mut reader = Reader::from_str(header);
    reader.trim_text(true);

    let mut stack = Vec::new();
    let mut arrays = Vec::new();

    loop {
        match reader.read_event().unwrap() {
            Event::Start(element) => stack.push(element_name(&element)),
            Event::End(_) => {
                stack.pop();
            }
            Event::Empty(element) if element_name(&element) == "DataArray" => {
                let attributes = attributes(&element);
                arrays.push(DeclaredArray {
                    section: stack.last().cloned().unwrap_or_default(),
                    name: attributes["Name"].clone(),
                    type_name: attributes["type"].clone(),
                    components: attributes["NumberOfComponents"].parse().unwrap(),
                    offset: attributes
                        .get("offset")
                        .map(|offset| offset.parse().unwrap())
                        .unwrap_or_default(),
                });
            }
            Event::Eof => break,
            _ => (),
        }
    }

    arrays
}

/// name and attributes of every element of a document, in document order
pub fn elements(document: &str) -> Vec<(String, HashMap<String, String>)> {
    let mut reader = Reader::from_str(document);
    reader.trim_text(true);

    let mut elements = Vec::new();

    loop {
        match reader.read_event().unwrap() {
            Event::Start(element) | Event::Empty(element) => {
                elements.push((element_name(&element), attributes(&element)));
            }
            Event::Eof => break,
            _ => (),
        }
    }

    elements
}

pub fn f32_le(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes(chunk.try_into().unwrap()))
        .collect()
}

pub fn i32_le(bytes: &[u8]) -> Vec<i32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| i32::from_le_bytes(chunk.try_into().unwrap()))
        .collect()
}

pub fn f32_be(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_be_bytes(chunk.try_into().unwrap()))
        .collect()
}

pub fn i32_be(bytes: &[u8]) -> Vec<i32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| i32::from_be_bytes(chunk.try_into().unwrap()))
        .collect()
}

/// Walks a legacy file front to back, the way a legacy reader does
pub struct LegacyScanner {
    bytes: Vec<u8>,
    position: usize,
}

impl LegacyScanner {
    pub fn read(path: &Path) -> Self {
        Self {
            bytes: std::fs::read(path).unwrap(),
            position: 0,
        }
    }

    pub fn is_done(&self) -> bool {
        self.position == self.bytes.len()
    }

    pub fn line(&mut self) -> String {
        let rest = &self.bytes[self.position..];
        let end = rest.iter().position(|&b| b == b'\n').expect("unterminated line");
        let line = String::from_utf8(rest[..end].to_vec()).unwrap();
        self.position += end + 1;
        line
    }

    /// a keyword line split on whitespace
    pub fn keyword(&mut self) -> Vec<String> {
        self.line().split_whitespace().map(str::to_string).collect()
    }

    /// `values` 4 byte values followed by the newline closing the block
    pub fn block(&mut self, values: usize) -> Vec<u8> {
        let end = self.position + values * 4;
        let block = self.bytes[self.position..end].to_vec();
        assert_eq!(self.bytes[end], b'\n', "block not followed by a newline");
        self.position = end + 1;
        block
    }
}
