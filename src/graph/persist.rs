//! Graph persistence
//!
//! Two encodings with exact round-trip of nodes, edges and integer weights:
//!
//! - **Binary**: a versioned bincode record, compact and fast to load.
//! - **GraphML**: human-inspectable markup, compatible with common graph
//!   tooling. Edges without a weight attribute load with weight 1.

use crate::errors::{RecommendError, Result};
use crate::graph::cooccurrence::GraphSet;
use crate::graph::csr::CsrGraph;
use crate::types::Granularity;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::path::{Path, PathBuf};

/// Binary format version - increment when the record layout changes
pub const FORMAT_VERSION: u32 = 1;

/// Encoding used to save and load graphs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphFormat {
    /// bincode record
    Binary,
    /// GraphML markup
    GraphMl,
}

impl GraphFormat {
    /// File extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            GraphFormat::Binary => "bin",
            GraphFormat::GraphMl => "graphml",
        }
    }

    /// Pick a format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("graphml") | Some("xml") => Ok(GraphFormat::GraphMl),
            Some("bin") => Ok(GraphFormat::Binary),
            _ => Err(RecommendError::serialization(format!(
                "cannot infer graph format from {}",
                path.display()
            ))),
        }
    }
}

/// Serialized graph record
#[derive(Debug, Serialize, Deserialize)]
struct PersistedGraph {
    version: u32,
    granularity: Granularity,
    nodes: Vec<String>,
    edges: Vec<(String, String, u32)>,
}

impl PersistedGraph {
    fn from_graph(graph: &CsrGraph) -> Self {
        Self {
            version: FORMAT_VERSION,
            granularity: graph.granularity(),
            nodes: graph.entities().to_vec(),
            edges: graph
                .edges()
                .map(|(a, b, w)| (graph.entity(a).to_string(), graph.entity(b).to_string(), w))
                .collect(),
        }
    }

    fn into_graph(self) -> Result<CsrGraph> {
        CsrGraph::from_edges(self.granularity, self.nodes, &self.edges)
    }
}

/// Serialize a graph
pub fn save(graph: &CsrGraph, format: GraphFormat) -> Result<Vec<u8>> {
    match format {
        GraphFormat::Binary => to_binary(graph),
        GraphFormat::GraphMl => Ok(to_graphml(graph)?.into_bytes()),
    }
}

/// Deserialize a graph
pub fn load(bytes: &[u8], format: GraphFormat) -> Result<CsrGraph> {
    match format {
        GraphFormat::Binary => from_binary(bytes),
        GraphFormat::GraphMl => {
            let xml = std::str::from_utf8(bytes)
                .map_err(|e| RecommendError::serialization(e.to_string()))?;
            from_graphml(xml)
        }
    }
}

/// Encode a graph as a bincode record
pub fn to_binary(graph: &CsrGraph) -> Result<Vec<u8>> {
    Ok(bincode::serialize(&PersistedGraph::from_graph(graph))?)
}

/// Decode a bincode record
pub fn from_binary(bytes: &[u8]) -> Result<CsrGraph> {
    let record: PersistedGraph = bincode::deserialize(bytes)?;
    if record.version != FORMAT_VERSION {
        return Err(RecommendError::serialization(format!(
            "graph format version mismatch: expected {}, got {}",
            FORMAT_VERSION, record.version
        )));
    }
    record.into_graph()
}

/// Escape text for XML attribute and element content
fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Encode a graph as GraphML
pub fn to_graphml(graph: &CsrGraph) -> Result<String> {
    let mut xml = String::new();

    writeln!(xml, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(
        xml,
        r#"<graphml xmlns="http://graphml.graphdrawing.org/xmlns" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:schemaLocation="http://graphml.graphdrawing.org/xmlns http://graphml.graphdrawing.org/xmlns/1.0/graphml.xsd">"#
    )?;
    writeln!(
        xml,
        r#"  <key id="d0" for="edge" attr.name="weight" attr.type="long" />"#
    )?;
    writeln!(
        xml,
        r#"  <key id="g0" for="graph" attr.name="granularity" attr.type="string" />"#
    )?;
    writeln!(
        xml,
        r#"  <graph id="{}" edgedefault="undirected">"#,
        graph.granularity()
    )?;
    writeln!(xml, r#"    <data key="g0">{}</data>"#, graph.granularity())?;

    for entity in graph.entities() {
        writeln!(xml, r#"    <node id="{}" />"#, xml_escape(entity))?;
    }
    for (a, b, weight) in graph.edges() {
        writeln!(
            xml,
            r#"    <edge source="{}" target="{}">"#,
            xml_escape(graph.entity(a)),
            xml_escape(graph.entity(b))
        )?;
        writeln!(xml, r#"      <data key="d0">{}</data>"#, weight)?;
        writeln!(xml, r#"    </edge>"#)?;
    }

    writeln!(xml, "  </graph>")?;
    writeln!(xml, "</graphml>")?;
    Ok(xml)
}

/// Where a `<data>` element was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DataOwner {
    Graph,
    Edge,
}

/// Incremental GraphML parse state
#[derive(Debug, Default)]
struct GraphMlState {
    weight_keys: Vec<String>,
    granularity_keys: Vec<String>,
    granularity: Option<Granularity>,
    nodes: Vec<String>,
    edges: Vec<(String, String, u32)>,
    /// (source, target, weight) of the edge being read
    open_edge: Option<(String, String, u32)>,
    /// Key and owner of the `<data>` being read
    open_data: Option<(String, DataOwner)>,
}

fn attributes(element: &BytesStart<'_>) -> Result<Vec<(String, String)>> {
    let mut attrs = Vec::new();
    for attr in element.attributes() {
        let attr = attr.map_err(|e| RecommendError::serialization(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attrs.push((key, value));
    }
    Ok(attrs)
}

fn attribute<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

/// Parse an integral weight, accepting float spellings such as `"3.0"`
fn parse_weight(text: &str) -> Result<u32> {
    let text = text.trim();
    if let Ok(w) = text.parse::<u32>() {
        return Ok(w);
    }
    match text.parse::<f64>() {
        Ok(w) if w.fract() == 0.0 && w >= 0.0 && w <= u32::MAX as f64 => Ok(w as u32),
        _ => Err(RecommendError::serialization(format!(
            "edge weight '{text}' is not a non-negative integer"
        ))),
    }
}

impl GraphMlState {
    fn start(&mut self, element: &BytesStart<'_>, empty: bool) -> Result<()> {
        let attrs = attributes(element)?;
        match element.local_name().as_ref() {
            b"key" => {
                let id = attribute(&attrs, "id").unwrap_or_default().to_string();
                match attribute(&attrs, "attr.name") {
                    Some("weight") => self.weight_keys.push(id),
                    Some("granularity") => self.granularity_keys.push(id),
                    _ => {}
                }
            }
            b"graph" => {
                if self.granularity.is_none() {
                    self.granularity = attribute(&attrs, "id").and_then(|id| id.parse().ok());
                }
            }
            b"node" => {
                let id = attribute(&attrs, "id")
                    .ok_or_else(|| RecommendError::serialization("node without id"))?;
                self.nodes.push(id.to_string());
            }
            b"edge" => {
                let (Some(source), Some(target)) =
                    (attribute(&attrs, "source"), attribute(&attrs, "target"))
                else {
                    return Err(RecommendError::serialization("edge without endpoints"));
                };
                let edge = (source.to_string(), target.to_string(), 1);
                if empty {
                    self.edges.push(edge);
                } else {
                    self.open_edge = Some(edge);
                }
            }
            b"data" if !empty => {
                let key = attribute(&attrs, "key").unwrap_or_default().to_string();
                let owner = if self.open_edge.is_some() {
                    DataOwner::Edge
                } else {
                    DataOwner::Graph
                };
                self.open_data = Some((key, owner));
            }
            _ => {}
        }
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<()> {
        let Some((key, owner)) = &self.open_data else {
            return Ok(());
        };
        match owner {
            DataOwner::Edge if self.weight_keys.contains(key) => {
                let weight = parse_weight(text)?;
                if let Some(edge) = self.open_edge.as_mut() {
                    edge.2 = weight;
                }
            }
            DataOwner::Graph if self.granularity_keys.contains(key) => {
                self.granularity = Some(text.parse()?);
            }
            _ => {}
        }
        Ok(())
    }

    fn end(&mut self, local_name: &[u8]) {
        match local_name {
            b"data" => self.open_data = None,
            b"edge" => {
                if let Some(edge) = self.open_edge.take() {
                    self.edges.push(edge);
                }
            }
            _ => {}
        }
    }
}

/// Decode GraphML.
///
/// The granularity is read from a `granularity` graph attribute or the graph id,
/// defaulting to sentence when neither is present.
pub fn from_graphml(xml: &str) -> Result<CsrGraph> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut state = GraphMlState::default();
    loop {
        match reader.read_event()? {
            Event::Start(e) => state.start(&e, false)?,
            Event::Empty(e) => state.start(&e, true)?,
            Event::Text(t) => {
                let text = t.unescape()?;
                state.text(&text)?;
            }
            Event::End(e) => state.end(e.local_name().as_ref()),
            Event::Eof => break,
            _ => {}
        }
    }

    let granularity = state.granularity.unwrap_or_default();
    CsrGraph::from_edges(granularity, state.nodes, &state.edges)
}

/// Write a graph to a file, choosing the format from the extension
pub fn save_to_path(graph: &CsrGraph, path: &Path) -> Result<()> {
    let format = GraphFormat::from_path(path)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, save(graph, format)?)?;
    Ok(())
}

/// Read a graph from a file, choosing the format from the extension
pub fn load_from_path(path: &Path) -> Result<CsrGraph> {
    let format = GraphFormat::from_path(path)?;
    let bytes = std::fs::read(path)?;
    load(&bytes, format)
}

/// File name of one granularity inside a graph-set directory
pub fn graph_file_name(granularity: Granularity, format: GraphFormat) -> String {
    format!("{}_network.{}", granularity, format.extension())
}

fn graph_path(dir: &Path, granularity: Granularity, format: GraphFormat) -> PathBuf {
    dir.join(graph_file_name(granularity, format))
}

/// Write all three graphs into `dir`
pub fn save_graph_set(graphs: &GraphSet, dir: &Path, format: GraphFormat) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    for (granularity, graph) in graphs.iter() {
        std::fs::write(graph_path(dir, granularity, format), save(graph, format)?)?;
    }
    tracing::debug!(dir = %dir.display(), ?format, "saved graph set");
    Ok(())
}

/// Read all three graphs from `dir`
pub fn load_graph_set(dir: &Path, format: GraphFormat) -> Result<GraphSet> {
    let read = |granularity: Granularity| -> Result<CsrGraph> {
        let bytes = std::fs::read(graph_path(dir, granularity, format))?;
        let graph = load(&bytes, format)?;
        if graph.granularity() != granularity {
            return Err(RecommendError::serialization(format!(
                "expected a {} graph, found {}",
                granularity,
                graph.granularity()
            )));
        }
        Ok(graph)
    };

    let graphs = GraphSet {
        sentence: read(Granularity::Sentence)?,
        paragraph: read(Granularity::Paragraph)?,
        page: read(Granularity::Page)?,
    };
    for (granularity, graph) in graphs.iter() {
        tracing::debug!(
            granularity = %granularity,
            nodes = graph.num_nodes,
            edges = graph.num_edges(),
            "loaded graph"
        );
    }
    Ok(graphs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::builder::GraphBuilder;

    fn sample_graph() -> CsrGraph {
        let mut builder =
            GraphBuilder::with_nodes(["haleem", "pista_house", "charminar", "lonely"]);
        builder.increment_pair("haleem", "pista_house", 7);
        builder.increment_pair("charminar", "pista_house", 2);
        builder.increment_pair("charminar", "haleem", 1);
        CsrGraph::from_builder(&builder, Granularity::Paragraph)
    }

    #[test]
    fn test_binary_roundtrip() {
        let graph = sample_graph();
        let bytes = save(&graph, GraphFormat::Binary).unwrap();
        let back = load(&bytes, GraphFormat::Binary).unwrap();
        assert_eq!(back, graph);
    }

    #[test]
    fn test_graphml_roundtrip() {
        let graph = sample_graph();
        let xml = to_graphml(&graph).unwrap();
        assert!(xml.contains(r#"<node id="lonely" />"#));
        assert!(xml.contains(r#"<data key="d0">7</data>"#));
        let back = from_graphml(&xml).unwrap();
        assert_eq!(back, graph);
        assert_eq!(back.granularity(), Granularity::Paragraph);
    }

    #[test]
    fn test_graphml_escapes_ids() {
        let mut builder = GraphBuilder::new();
        builder.increment_pair("ohri's", "a&b <cafe>", 1);
        let graph = CsrGraph::from_builder(&builder, Granularity::Page);
        let back = from_graphml(&to_graphml(&graph).unwrap()).unwrap();
        assert_eq!(back, graph);
    }

    #[test]
    fn test_graphml_external_weights() {
        // Float weights and a missing weight (defaults to 1), no granularity attribute
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<graphml xmlns="http://graphml.graphdrawing.org/xmlns">
  <key id="d0" for="edge" attr.name="weight" attr.type="double"/>
  <graph edgedefault="undirected">
    <node id="Haleem"/>
    <node id="Pista House"/>
    <node id="Charminar"/>
    <edge source="Haleem" target="Pista House"><data key="d0">3.0</data></edge>
    <edge source="Charminar" target="Haleem"/>
  </graph>
</graphml>"#;
        let graph = from_graphml(xml).unwrap();
        assert_eq!(graph.granularity(), Granularity::Sentence);
        assert_eq!(graph.edge_weight_between("Haleem", "Pista House"), Some(3));
        assert_eq!(graph.edge_weight_between("Haleem", "Charminar"), Some(1));
    }

    #[test]
    fn test_graphml_rejects_fractional_weight() {
        let xml = r#"<graphml><key id="w" for="edge" attr.name="weight"/>
<graph id="page"><node id="a"/><node id="b"/>
<edge source="a" target="b"><data key="w">1.5</data></edge></graph></graphml>"#;
        assert!(from_graphml(xml).is_err());
    }

    #[test]
    fn test_binary_version_mismatch() {
        let record = PersistedGraph {
            version: FORMAT_VERSION + 1,
            granularity: Granularity::Sentence,
            nodes: vec![],
            edges: vec![],
        };
        let bytes = bincode::serialize(&record).unwrap();
        assert!(from_binary(&bytes).is_err());
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            GraphFormat::from_path(Path::new("x/sentence_network.graphml")).unwrap(),
            GraphFormat::GraphMl
        );
        assert_eq!(
            GraphFormat::from_path(Path::new("page_network.bin")).unwrap(),
            GraphFormat::Binary
        );
        assert!(GraphFormat::from_path(Path::new("graph.pkl")).is_err());
        assert_eq!(
            graph_file_name(Granularity::Page, GraphFormat::GraphMl),
            "page_network.graphml"
        );
    }
}
