use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use itertools::Itertools;

use crate::error::ParseError;
use crate::graph::{Position, TaskGraph, TaskId};
use crate::parsers::literal::{dict, list, parse_literal, quote, tuple, Literal};

fn parse_number<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T, ParseError>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ParseError::invalid(field, format!("{}: {}", value, e)))
}

fn parse_label(field: &'static str, literal: &Literal) -> Result<String, ParseError> {
    literal
        .as_label()
        .ok_or_else(|| ParseError::invalid(field, format!("expected node label, got {:?}", literal)))
}

fn parse_position(value: &str) -> Result<Position, ParseError> {
    let inner = value
        .trim()
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(|| ParseError::invalid("Links", format!("bad position {}", value)))?;
    let parts = inner
        .split(',')
        .map(|part| parse_number::<usize>("Links", part))
        .collect::<Result<Vec<_>, _>>()?;
    if parts.len() != 3 {
        return Err(ParseError::invalid("Links", format!("position {} must have 3 components", value)));
    }
    Ok(Position::new(parts[0], parts[1], parts[2]))
}

fn parse_cost(value: &str) -> Result<u64, ParseError> {
    let inner = value
        .trim()
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(|| ParseError::invalid("Links", format!("bad cost {}", value)))?;
    parse_number("Links", inner)
}

fn field<'a>(fields: &HashMap<&str, &'a str>, name: &'static str) -> Result<&'a str, ParseError> {
    fields.get(name).copied().ok_or(ParseError::MissingField(name))
}

fn literal_field(fields: &HashMap<&str, &str>, name: &'static str) -> Result<Literal, ParseError> {
    parse_literal(field(fields, name)?).map_err(|reason| ParseError::invalid(name, reason))
}

impl TaskGraph {
    /// Reads a graph from its text representation.
    ///
    /// Fields are located by their key. Ranks are computed for the stored number of processors,
    /// lowerbound and deadline are kept as stored.
    pub fn from_representation(data: &str) -> Result<Self, ParseError> {
        let mut fields: HashMap<&str, &str> = HashMap::new();
        for line in data.lines() {
            let line = line.trim();
            if line.is_empty() || line == "}" || line.starts_with("Graph") && line.ends_with('{') {
                continue;
            }
            if let Some((key, value)) = line.split_once(':') {
                fields.insert(key.trim(), value.trim());
            }
        }

        let id = field(&fields, "Id")?;
        let processors = parse_number::<usize>("Processors", field(&fields, "Processors")?)?;
        let mut graph = TaskGraph::new(id, processors);

        let nodes = literal_field(&fields, "Nodes")?;
        let nodes = nodes
            .as_seq()
            .ok_or_else(|| ParseError::invalid("Nodes", "expected a tuple of labels"))?
            .iter()
            .map(|node| parse_label("Nodes", node))
            .collect::<Result<Vec<_>, _>>()?;

        let costs = literal_field(&fields, "NodeCosts")?;
        let mut costs_by_node: HashMap<String, Vec<u64>> = HashMap::new();
        for (node, node_costs) in costs
            .as_dict()
            .ok_or_else(|| ParseError::invalid("NodeCosts", "expected a dict"))?
            .iter()
        {
            let node_costs = node_costs
                .as_seq()
                .ok_or_else(|| ParseError::invalid("NodeCosts", "expected a tuple of costs"))?
                .iter()
                .map(|cost| {
                    cost.as_int()
                        .and_then(|cost| u64::try_from(cost).ok())
                        .ok_or_else(|| ParseError::invalid("NodeCosts", format!("bad cost {:?}", cost)))
                })
                .collect::<Result<Vec<_>, _>>()?;
            costs_by_node.insert(parse_label("NodeCosts", node)?, node_costs);
        }

        let mut tasks: HashMap<String, TaskId> = HashMap::new();
        for node in nodes.iter() {
            if tasks.contains_key(node) {
                return Err(ParseError::invalid("Nodes", format!("duplicate node {}", node)));
            }
            let node_costs = costs_by_node
                .remove(node)
                .ok_or_else(|| ParseError::invalid("NodeCosts", format!("no costs for node {}", node)))?;
            tasks.insert(node.clone(), graph.add_task(node, node_costs));
        }

        let levels = literal_field(&fields, "Levels")?;
        for level in levels
            .as_seq()
            .ok_or_else(|| ParseError::invalid("Levels", "expected a list of levels"))?
            .iter()
        {
            let mut blocks = Vec::new();
            for block in level
                .as_seq()
                .ok_or_else(|| ParseError::invalid("Levels", "expected a list of blocks"))?
                .iter()
            {
                let block = block
                    .as_seq()
                    .ok_or_else(|| ParseError::invalid("Levels", "expected a list of nodes"))?
                    .iter()
                    .map(|node| {
                        let label = parse_label("Levels", node)?;
                        tasks
                            .get(&label)
                            .copied()
                            .ok_or_else(|| ParseError::invalid("Levels", format!("unknown node {}", label)))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                blocks.push(block);
            }
            graph.add_level(blocks)?;
        }

        let links = field(&fields, "Links")?;
        for link in links.split(';').map(|link| link.trim()).filter(|link| !link.is_empty()) {
            let parts = link.split('|').collect::<Vec<_>>();
            if parts.len() != 3 {
                return Err(ParseError::invalid("Links", format!("bad link {}", link)));
            }
            graph.add_link(parse_position(parts[0])?, parse_position(parts[1])?, parse_cost(parts[2])?)?;
        }

        graph.set_lower_bound(parse_number("LowerBound", field(&fields, "LowerBound")?)?);
        graph.set_deadline(parse_number("Deadline", field(&fields, "Deadline")?)?);
        graph.refresh_ranks()?;
        Ok(graph)
    }

    /// Reads a graph from a file in the text representation.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self, ParseError> {
        let path = file.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_representation(&data)
    }

    /// Renders the graph in the text representation.
    pub fn to_representation(&self) -> String {
        let nodes = tuple(self.nodes().iter().map(|node| quote(node)));
        let costs = dict((0..self.task_count()).map(|task| {
            (
                quote(self.task_name(task)),
                tuple(self.costs(task).iter().map(|cost| cost.to_string())),
            )
        }));
        let levels = list(self.levels().iter().map(|blocks| {
            list(
                blocks
                    .iter()
                    .map(|block| list(block.iter().map(|&task| quote(self.task_name(task))))),
            )
        }));
        let links = self
            .links()
            .iter()
            .map(|link| format!("{}|{}|({})", link.orig, link.dest, link.cost))
            .join(";");

        let mut result = String::from("Graph {\n");
        result.push_str(&format!("\tId: {}\n", self.id()));
        result.push_str(&format!("\tProcessors: {}\n", self.processors()));
        result.push_str(&format!("\tNodes: {}\n", nodes));
        result.push_str(&format!("\tNodeCosts: {}\n", costs));
        result.push_str(&format!("\tLevels: {}\n", levels));
        result.push_str(&format!("\tLinks: {}\n", links));
        result.push_str(&format!("\tLowerBound: {}\n", self.lowerbound()));
        result.push_str(&format!("\tDeadline: {}\n", self.deadline()));
        result.push_str("}\n");
        result
    }

    /// Saves the graph to a file in the text representation.
    pub fn save_to_file<P: AsRef<Path>>(&self, file: P) -> std::io::Result<()> {
        let mut file = File::create(file)?;
        file.write_all(self.to_representation().as_bytes())
    }
}
