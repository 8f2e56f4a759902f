use super::{Block, InputKind, InputRef, VariableModel, WorkspaceSource};
use crate::codegen::format::format_number;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;

/// Block types that return a value and therefore own an output connection.
const VALUE_BLOCK_TYPES: &[&str] = &[
    "logic_compare",
    "logic_operation",
    "logic_negate",
    "logic_boolean",
    "logic_null",
    "logic_ternary",
    "math_number",
    "math_arithmetic",
    "math_single",
    "math_round",
    "math_trig",
    "math_constant",
    "math_number_property",
    "math_on_list",
    "math_modulo",
    "math_constrain",
    "math_random_int",
    "math_random_float",
    "math_atan2",
    "text",
    "text_length",
    "text_isEmpty",
    "text_indexOf",
    "text_getSubstring",
    "text_changeCase",
    "variables_get",
    "variables_get_dynamic",
    "procedures_callreturn",
];

/// Block types that inject statement prefix/suffix code on their own.
const SELF_PREFIXING_BLOCK_TYPES: &[&str] =
    &["controls_if", "controls_ifelse", "controls_flow_statements"];

const PROCEDURE_DEFINITION_TYPES: &[&str] = &["procedures_defreturn", "procedures_defnoreturn"];

/// An owned block with its subtree.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockNode {
    id: String,
    block_type: String,
    fields: Vec<(String, String)>,
    inputs: Vec<Input>,
    next: Option<Box<BlockNode>>,
    has_output: bool,
    output_connected: bool,
    comment: Option<String>,
    enabled: bool,
    vars: Vec<String>,
    mutations: FxHashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Input {
    pub name: String,
    pub kind: InputKind,
    pub target: Option<Box<BlockNode>>,
}

impl BlockNode {
    pub fn new(block_type: impl Into<String>) -> Self {
        let block_type = block_type.into();
        let has_output = VALUE_BLOCK_TYPES.contains(&block_type.as_str());
        Self {
            id: String::new(),
            block_type,
            fields: Vec::new(),
            inputs: Vec::new(),
            next: None,
            has_output,
            output_connected: false,
            comment: None,
            enabled: true,
            vars: Vec::new(),
            mutations: FxHashMap::default(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(field) => field.1 = value,
            None => self.fields.push((name, value)),
        }
        self
    }

    /// Plugs `child` into the value input `name`, creating the input if needed.
    pub fn with_value(self, name: impl Into<String>, mut child: BlockNode) -> Self {
        child.has_output = true;
        child.output_connected = true;
        self.with_input(name, InputKind::Value, Some(child))
    }

    /// Attaches a statement chain to the statement input `name`.
    pub fn with_statement(self, name: impl Into<String>, child: BlockNode) -> Self {
        self.with_input(name, InputKind::Statement, Some(child))
    }

    /// Adds (or replaces) an input, optionally leaving it unconnected.
    pub fn with_input(
        mut self,
        name: impl Into<String>,
        kind: InputKind,
        target: Option<BlockNode>,
    ) -> Self {
        let name = name.into();
        let target = target.map(Box::new);
        match self.inputs.iter_mut().find(|input| input.name == name) {
            Some(input) => {
                input.kind = kind;
                input.target = target;
            }
            None => self.inputs.push(Input { name, kind, target }),
        }
        self
    }

    /// Appends `next` to the end of this block's statement chain.
    pub fn with_next(mut self, next: BlockNode) -> Self {
        let tail = match self.next.take() {
            Some(existing) => (*existing).with_next(next),
            None => next,
        };
        self.next = Some(Box::new(tail));
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_output(mut self, has_output: bool) -> Self {
        self.has_output = has_output;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn with_vars<I, S>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.vars = vars.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_mutation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.mutations.insert(key.into(), value.into());
        self
    }

    pub fn block_inputs(&self) -> &[Input] {
        &self.inputs
    }

    pub fn next(&self) -> Option<&BlockNode> {
        self.next.as_deref()
    }
}

impl Block for BlockNode {
    fn id(&self) -> &str {
        &self.id
    }

    fn block_type(&self) -> &str {
        &self.block_type
    }

    fn field_value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    fn inputs(&self) -> Vec<InputRef<'_>> {
        self.inputs
            .iter()
            .map(|input| InputRef {
                name: &input.name,
                kind: input.kind,
                target: input.target.as_deref().map(|b| b as &dyn Block),
            })
            .collect()
    }

    fn next_block(&self) -> Option<&dyn Block> {
        self.next.as_deref().map(|b| b as &dyn Block)
    }

    fn has_output(&self) -> bool {
        self.has_output
    }

    fn is_output_connected(&self) -> bool {
        self.output_connected
    }

    fn comment_text(&self) -> Option<&str> {
        self.comment.as_deref().filter(|c| !c.is_empty())
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn suppresses_prefix_suffix(&self) -> bool {
        SELF_PREFIXING_BLOCK_TYPES.contains(&self.block_type.as_str())
    }

    fn vars(&self) -> Vec<String> {
        self.vars.clone()
    }

    fn mutation(&self, key: &str) -> Option<String> {
        self.mutations.get(key).cloned()
    }
}

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("invalid workspace JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// An ordered collection of top-level blocks plus the variable table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workspace {
    blocks: Vec<BlockNode>,
    variables: Vec<VariableModel>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_block(mut self, block: BlockNode) -> Self {
        self.blocks.push(block);
        self
    }

    pub fn with_variable(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.variables.push(VariableModel::new(id, name));
        self
    }

    pub fn push_block(&mut self, block: BlockNode) {
        self.blocks.push(block);
    }

    pub fn blocks(&self) -> &[BlockNode] {
        &self.blocks
    }

    /// Loads a workspace saved with the block editor's JSON serializer.
    pub fn from_json(source: &str) -> Result<Self, WorkspaceError> {
        let json: WorkspaceJson = serde_json::from_str(source)?;
        let blocks = json
            .blocks
            .map(|b| b.blocks)
            .unwrap_or_default()
            .into_iter()
            .map(|block| block.into_node(false))
            .collect::<Vec<_>>();
        let variables = json
            .variables
            .into_iter()
            .map(|v| VariableModel::new(v.id, v.name))
            .collect();
        tracing::debug!("Loaded workspace with {} top-level block(s)", blocks.len());
        Ok(Self { blocks, variables })
    }
}

impl WorkspaceSource for Workspace {
    fn top_blocks(&self) -> Vec<&dyn Block> {
        self.blocks.iter().map(|b| b as &dyn Block).collect()
    }

    fn variables(&self) -> Vec<VariableModel> {
        self.variables.clone()
    }

    fn procedure_names(&self) -> Vec<String> {
        self.blocks
            .iter()
            .filter(|b| PROCEDURE_DEFINITION_TYPES.contains(&b.block_type.as_str()))
            .filter_map(|b| b.field_value("NAME").map(str::to_string))
            .collect()
    }
}

/// Statement inputs follow fixed naming across the block library.
fn infer_input_kind(name: &str) -> InputKind {
    let is_do = name
        .strip_prefix("DO")
        .is_some_and(|rest| rest.chars().all(|c| c.is_ascii_digit()));
    if is_do || name == "ELSE" || name == "STACK" {
        InputKind::Statement
    } else {
        InputKind::Value
    }
}

#[derive(Deserialize)]
struct WorkspaceJson {
    #[serde(default)]
    blocks: Option<BlockListJson>,
    #[serde(default)]
    variables: Vec<VariableJson>,
}

#[derive(Deserialize)]
struct BlockListJson {
    #[serde(default)]
    blocks: Vec<BlockJson>,
}

#[derive(Deserialize)]
struct VariableJson {
    id: String,
    name: String,
}

#[derive(Deserialize)]
struct BlockJson {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    id: String,
    #[serde(default)]
    fields: IndexMap<String, FieldJson>,
    #[serde(default)]
    inputs: IndexMap<String, ConnectionJson>,
    #[serde(default)]
    next: Option<ConnectionJson>,
    #[serde(default = "default_enabled")]
    enabled: bool,
    #[serde(default)]
    comment: Option<serde_json::Value>,
    #[serde(default)]
    icons: Option<serde_json::Value>,
    #[serde(default, rename = "extraState")]
    extra_state: Option<serde_json::Value>,
}

fn default_enabled() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FieldJson {
    Text(String),
    Number(f64),
    Bool(bool),
    Variable { id: String },
}

impl FieldJson {
    fn into_value(self) -> String {
        match self {
            FieldJson::Text(text) => text,
            FieldJson::Number(n) => format_number(n),
            FieldJson::Bool(true) => "TRUE".to_string(),
            FieldJson::Bool(false) => "FALSE".to_string(),
            FieldJson::Variable { id } => id,
        }
    }
}

#[derive(Deserialize)]
struct ConnectionJson {
    #[serde(default)]
    block: Option<Box<BlockJson>>,
    #[serde(default)]
    shadow: Option<Box<BlockJson>>,
}

impl ConnectionJson {
    fn into_block(self) -> Option<BlockJson> {
        self.block.or(self.shadow).map(|b| *b)
    }
}

impl BlockJson {
    fn into_node(self, connected_as_value: bool) -> BlockNode {
        let mut node = BlockNode::new(self.block_type).with_id(self.id);
        node.enabled = self.enabled;
        if connected_as_value {
            node.has_output = true;
            node.output_connected = true;
        }
        node.comment = comment_from_json(self.comment.as_ref(), self.icons.as_ref());

        for (name, value) in self.fields {
            node.fields.push((name, value.into_value()));
        }
        if let Some(state) = &self.extra_state {
            apply_extra_state(&mut node, state);
        }

        for (name, connection) in self.inputs {
            let kind = infer_input_kind(&name);
            let target = connection
                .into_block()
                .map(|child| Box::new(child.into_node(kind == InputKind::Value)));
            node.inputs.push(Input { name, kind, target });
        }
        if matches!(node.block_type.as_str(), "controls_if" | "controls_ifelse") {
            normalize_if_inputs(&mut node);
        }

        node.next = self
            .next
            .and_then(ConnectionJson::into_block)
            .map(|next| Box::new(next.into_node(false)));
        node
    }
}

fn comment_from_json(
    comment: Option<&serde_json::Value>,
    icons: Option<&serde_json::Value>,
) -> Option<String> {
    let from_icon = icons
        .and_then(|icons| icons.get("comment"))
        .and_then(|c| c.get("text"))
        .and_then(|t| t.as_str());
    let legacy = comment.and_then(|c| c.as_str().or_else(|| c.get("text")?.as_str()));
    from_icon.or(legacy).map(str::to_string)
}

/// Copies mutator state onto the node. Procedure blocks keep their
/// parameter names in `params`; call blocks also carry the callee name.
fn apply_extra_state(node: &mut BlockNode, state: &serde_json::Value) {
    match state {
        serde_json::Value::Object(map) => {
            for (key, value) in map {
                match (key.as_str(), value) {
                    ("params", serde_json::Value::Array(params)) => {
                        node.vars = params
                            .iter()
                            .filter_map(|p| {
                                p.as_str()
                                    .or_else(|| p.get("name").and_then(|n| n.as_str()))
                                    .map(str::to_string)
                            })
                            .collect();
                    }
                    (_, serde_json::Value::String(s)) => {
                        node.mutations.insert(key.clone(), s.clone());
                    }
                    (_, serde_json::Value::Bool(b)) => {
                        node.mutations.insert(key.clone(), b.to_string());
                    }
                    (_, serde_json::Value::Number(n)) => {
                        node.mutations.insert(key.clone(), n.to_string());
                    }
                    _ => {}
                }
            }
        }
        serde_json::Value::String(xml) => apply_xml_mutation(node, xml),
        _ => {}
    }

    if node.field_value("NAME").is_none() {
        if let Some(name) = node.mutations.get("name").cloned() {
            node.fields.push(("NAME".to_string(), name));
        }
    }
}

/// Older serializers store mutator state as an XML string, e.g.
/// `<mutation name="f"><arg name="x"></arg></mutation>`.
fn apply_xml_mutation(node: &mut BlockNode, xml: &str) {
    for element in xml.split('<').skip(1) {
        let tag = element.split_whitespace().next().unwrap_or_default();
        match tag {
            "arg" => {
                if let Some(name) = xml_attribute(element, "name") {
                    node.vars.push(name);
                }
            }
            "mutation" => {
                for key in ["name", "value", "elseif", "else"] {
                    if let Some(value) = xml_attribute(element, key) {
                        node.mutations.insert(key.to_string(), value);
                    }
                }
            }
            _ => {}
        }
    }
}

fn xml_attribute(element: &str, name: &str) -> Option<String> {
    let needle = format!("{name}=\"");
    let start = element.find(&needle)? + needle.len();
    let end = element[start..].find('"')? + start;
    Some(element[start..end].to_string())
}

/// Rebuilds the `IF<n>`/`DO<n>`/`ELSE` input list of an if block: the
/// serializer omits unconnected inputs, but the generator relies on their
/// presence to know how many arms exist.
fn normalize_if_inputs(node: &mut BlockNode) {
    let else_ifs = node
        .mutations
        .get("elseIfCount")
        .or_else(|| node.mutations.get("elseif"))
        .and_then(|n| n.parse::<usize>().ok())
        .unwrap_or(0);
    let has_else = node.block_type == "controls_ifelse"
        || node
            .mutations
            .get("hasElse")
            .or_else(|| node.mutations.get("else"))
            .is_some_and(|v| v == "true" || v == "1");

    let mut old: Vec<Input> = std::mem::take(&mut node.inputs);
    let mut take = |name: String, kind: InputKind| match old.iter().position(|i| i.name == name) {
        Some(pos) => old.remove(pos),
        None => Input {
            name,
            kind,
            target: None,
        },
    };

    let arms = (0..=else_ifs)
        .flat_map(|n| {
            [
                (format!("IF{n}"), InputKind::Value),
                (format!("DO{n}"), InputKind::Statement),
            ]
        })
        .collect::<Vec<_>>();
    let mut inputs = arms
        .into_iter()
        .map(|(name, kind)| take(name, kind))
        .collect::<Vec<_>>();
    if has_else {
        inputs.push(take("ELSE".to_string(), InputKind::Statement));
    }
    node.inputs = inputs;
}
