//! Header text parsing.
//!
//! Only the declaration forms that appear in interface headers are
//! understood. Anything else at statement level is skipped with a warning.

use super::expr::{DefineExpr, DefineTable};
use crate::error::{InterfaceError, Result};
use crate::interface::{
    Define, DefineGroup, InterfaceVariable, SamplerBinding, ShaderInterface, StructType,
};
use crate::layout::{BlockLayout, BlockMember, UniformBlock};
use crate::types::{GlslType, Precision};

/// A `#define` with a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDefine {
    pub name: String,
    pub expr: DefineExpr,
    /// Taken from the closest preceding `// ... locations` heading.
    pub group: DefineGroup,
    pub line: usize,
}

/// A `layout(location = X) in|out TYPE NAME;` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedVariable {
    pub name: String,
    pub ty: GlslType,
    pub location: DefineExpr,
    pub line: usize,
}

/// A `layout(binding = X) uniform [prec] sampler2D NAME;` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSampler {
    pub name: String,
    pub ty: GlslType,
    pub binding: DefineExpr,
    pub precision: Option<Precision>,
    pub line: usize,
}

/// A `layout(...) uniform NAME { ... } [instance];` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedBlock {
    pub name: String,
    pub instance_name: Option<String>,
    pub binding: DefineExpr,
    pub layout: BlockLayout,
    pub members: Vec<BlockMember>,
    pub line: usize,
}

/// Declarations read from a header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderDocument {
    pub defines: Vec<ParsedDefine>,
    pub structs: Vec<StructType>,
    pub samplers: Vec<ParsedSampler>,
    pub blocks: Vec<ParsedBlock>,
    pub inputs: Vec<ParsedVariable>,
    pub outputs: Vec<ParsedVariable>,
    /// Lines of statements that were not understood.
    pub ignored: Vec<usize>,
}

/// A statement being collected across lines.
struct Pending {
    text: String,
    line: usize,
    depth: i32,
}

impl HeaderDocument {
    pub fn parse(text: &str) -> Result<Self> {
        let mut doc = Self::default();
        let mut group = DefineGroup::In;
        let mut pending: Option<Pending> = None;

        for (index, raw) in text.lines().enumerate() {
            let line_no = index + 1;
            let (code, comment) = match raw.split_once("//") {
                Some((code, comment)) => (code.trim(), Some(comment.trim())),
                None => (raw.trim(), None),
            };

            if pending.is_none() {
                if let Some(heading) = comment.filter(|_| code.is_empty()).and_then(group_heading) {
                    group = heading;
                }
            }
            if code.is_empty() {
                continue;
            }

            if pending.is_none() && code.starts_with('#') {
                doc.directive(code, line_no, group)?;
                continue;
            }

            let statement = pending.get_or_insert_with(|| Pending {
                text: String::new(),
                line: line_no,
                depth: 0,
            });
            if !statement.text.is_empty() {
                statement.text.push(' ');
            }
            statement.text.push_str(code);
            for c in code.chars() {
                match c {
                    '{' => statement.depth += 1,
                    '}' => statement.depth -= 1,
                    _ => {}
                }
            }
            if statement.depth < 0 {
                return Err(parse_error(statement.line, "unbalanced '}'"));
            }
            if statement.depth == 0 && statement.text.ends_with(';') {
                if let Some(done) = pending.take() {
                    doc.statement(&done.text, done.line)?;
                }
            }
        }

        if let Some(unterminated) = pending {
            return Err(parse_error(unterminated.line, "unterminated declaration"));
        }
        if !doc.ignored.is_empty() {
            log::warn!(
                "Header parsed with {} ignored statement(s) at lines {:?}",
                doc.ignored.len(),
                doc.ignored
            );
        }
        Ok(doc)
    }

    fn directive(&mut self, code: &str, line: usize, group: DefineGroup) -> Result<()> {
        let body = code[1..].trim_start();
        let (keyword, rest) = body
            .split_once(char::is_whitespace)
            .map_or((body, ""), |(k, r)| (k, r.trim()));

        match keyword {
            "define" => {
                let (name, value) = rest
                    .split_once(char::is_whitespace)
                    .map_or((rest, ""), |(n, v)| (n, v.trim()));
                if name.is_empty() {
                    return Err(parse_error(line, "#define without a name"));
                }
                // Valueless defines are include guards.
                if value.is_empty() {
                    return Ok(());
                }
                let expr =
                    DefineExpr::parse(value).map_err(|err| parse_error(line, &err.to_string()))?;
                self.defines.push(ParsedDefine {
                    name: name.to_string(),
                    expr,
                    group,
                    line,
                });
                Ok(())
            }
            "version" | "ifndef" | "ifdef" | "if" | "else" | "endif" | "undef" | "extension" => {
                Ok(())
            }
            other => Err(parse_error(line, &format!("unsupported directive #{other}"))),
        }
    }

    fn statement(&mut self, text: &str, line: usize) -> Result<()> {
        let text = text.trim_end_matches(';').trim();

        if let Some(rest) = text.strip_prefix("struct") {
            let (name, body, tail) = split_braces(rest, line)?;
            if !tail.is_empty() {
                return Err(parse_error(line, "struct declares an instance"));
            }
            let mut ty = StructType::new(name);
            for member in parse_members(body, line)? {
                if member.array_len.is_some() {
                    return Err(parse_error(line, "array members in varying structs"));
                }
                ty = ty.with_member(member.ty, member.name);
            }
            self.structs.push(ty);
            return Ok(());
        }

        let Some(after_layout) = text.strip_prefix("layout") else {
            self.ignored.push(line);
            return Ok(());
        };
        let (qualifiers, rest) = split_qualifiers(after_layout.trim_start(), line)?;
        let mut words = rest.split_whitespace();
        match words.next() {
            Some("uniform") if rest.contains('{') => self.block(&qualifiers, rest, line),
            Some("uniform") => self.sampler(&qualifiers, words.collect(), line),
            Some(direction @ ("in" | "out")) => {
                let words: Vec<&str> = words.collect();
                let [ty, name] = words.as_slice() else {
                    return Err(parse_error(line, &format!("expected `{direction} TYPE NAME`")));
                };
                let variable = ParsedVariable {
                    name: name.to_string(),
                    ty: GlslType::parse(ty),
                    location: qualifiers.required("location", line)?,
                    line,
                };
                if direction == "in" {
                    self.inputs.push(variable);
                } else {
                    self.outputs.push(variable);
                }
                Ok(())
            }
            _ => {
                self.ignored.push(line);
                Ok(())
            }
        }
    }

    fn sampler(&mut self, qualifiers: &Qualifiers, words: Vec<&str>, line: usize) -> Result<()> {
        let (precision, ty, name) = match words.as_slice() {
            [prec, ty, name] => {
                let precision = Precision::parse(prec)
                    .ok_or_else(|| parse_error(line, &format!("unknown precision '{prec}'")))?;
                (Some(precision), *ty, *name)
            }
            [ty, name] => (None, *ty, *name),
            _ => return Err(parse_error(line, "expected `uniform [precision] TYPE NAME`")),
        };
        let ty = GlslType::parse(ty);
        if !ty.is_sampler() {
            return Err(parse_error(
                line,
                &format!("uniform '{name}' outside a block must be a sampler"),
            ));
        }
        self.samplers.push(ParsedSampler {
            name: name.to_string(),
            ty,
            binding: qualifiers.required("binding", line)?,
            precision,
            line,
        });
        Ok(())
    }

    fn block(&mut self, qualifiers: &Qualifiers, rest: &str, line: usize) -> Result<()> {
        let head = rest.trim_start().trim_start_matches("uniform");
        let (name, body, tail) = split_braces(head, line)?;
        // Tolerate `uniform std140 NAME` as well as the qualifier form.
        let name = name.rsplit(char::is_whitespace).next().unwrap_or(name);
        let layout = if qualifiers.std140 || head.split_whitespace().any(|w| w == "std140") {
            BlockLayout::Std140
        } else {
            BlockLayout::Shared
        };
        self.blocks.push(ParsedBlock {
            name: name.to_string(),
            instance_name: (!tail.is_empty()).then(|| tail.to_string()),
            binding: qualifiers.required("binding", line)?,
            layout,
            members: parse_members(body, line)?,
            line,
        });
        Ok(())
    }

    /// All defines in the header plus externally supplied values.
    pub fn define_table(&self) -> DefineTable {
        let mut table = DefineTable::new();
        for define in &self.defines {
            table.insert(define.name.clone(), define.expr.clone());
        }
        table
    }

    /// Resolve every qualifier and build an interface.
    ///
    /// `externals` supply symbols the header references but does not define.
    /// They are added to the interface as struct-group defines.
    pub fn to_interface(
        &self,
        name: &str,
        directory: &str,
        externals: &[(&str, i64)],
    ) -> Result<ShaderInterface> {
        let table = with_externals(self.define_table(), externals);
        let mut iface = ShaderInterface::new(name, directory);

        for (symbol, value) in externals {
            if table.get(symbol).is_none() {
                iface.defines.push(Define {
                    name: symbol.to_string(),
                    expr: DefineExpr::Literal(*value),
                    group: DefineGroup::Struct,
                });
            }
        }
        iface.defines.extend(self.defines.iter().map(|d| Define {
            name: d.name.clone(),
            expr: d.expr.clone(),
            group: d.group,
        }));
        iface.structs = self.structs.clone();

        for sampler in &self.samplers {
            let (binding, symbol) = resolve(&table, &sampler.binding, &sampler.name)?;
            iface.samplers.push(SamplerBinding {
                name: sampler.name.clone(),
                binding,
                symbol,
                precision: sampler.precision,
            });
        }
        for block in &self.blocks {
            let (binding, symbol) = resolve(&table, &block.binding, &block.name)?;
            iface.uniform_blocks.push(UniformBlock {
                name: block.name.clone(),
                instance_name: block.instance_name.clone(),
                binding,
                binding_symbol: symbol,
                layout: block.layout,
                members: block.members.clone(),
            });
        }
        for (parsed, target) in [
            (&self.inputs, &mut iface.inputs),
            (&self.outputs, &mut iface.outputs),
        ] {
            for variable in parsed {
                let (location, symbol) = resolve(&table, &variable.location, &variable.name)?;
                target.push(InterfaceVariable {
                    name: variable.name.clone(),
                    ty: variable.ty.clone(),
                    location,
                    symbol,
                });
            }
        }
        Ok(iface)
    }
}

/// Check that header text agrees with an interface table.
///
/// Every define in the header must evaluate to the table's value, and every
/// variable, sampler and block of the table must appear in the header at
/// the same location or binding. Defines that only the table has are
/// allowed; they stand in for externally supplied symbols.
pub fn verify_header(
    text: &str,
    interface: &ShaderInterface,
    externals: &[(&str, i64)],
) -> Result<()> {
    let doc = HeaderDocument::parse(text)?;
    let table = with_externals(doc.define_table(), externals);

    let compare = |name: &str, expected: u32, found: i64| {
        if found == i64::from(expected) {
            Ok(())
        } else {
            Err(InterfaceError::SymbolMismatch {
                name: name.to_string(),
                expected: expected.into(),
                found,
            })
        }
    };

    for define in &doc.defines {
        let expected = interface
            .define(&define.name)
            .ok_or_else(|| InterfaceError::UnknownSymbol(define.name.clone()))
            .and_then(|_| interface.define_value(&define.name))?;
        compare(&define.name, expected, table.evaluate(&define.name)?)?;
    }

    let missing = |name: &str| InterfaceError::UnknownSymbol(name.to_string());
    for variable in &interface.inputs {
        let parsed = doc
            .inputs
            .iter()
            .find(|v| v.name == variable.name)
            .ok_or_else(|| missing(&variable.name))?;
        compare(&variable.name, variable.location, eval(&table, &parsed.location)?)?;
    }
    for variable in &interface.outputs {
        let parsed = doc
            .outputs
            .iter()
            .find(|v| v.name == variable.name)
            .ok_or_else(|| missing(&variable.name))?;
        compare(&variable.name, variable.location, eval(&table, &parsed.location)?)?;
    }
    for sampler in &interface.samplers {
        let parsed = doc
            .samplers
            .iter()
            .find(|s| s.name == sampler.name)
            .ok_or_else(|| missing(&sampler.name))?;
        compare(&sampler.name, sampler.binding, eval(&table, &parsed.binding)?)?;
    }
    for block in &interface.uniform_blocks {
        let parsed = doc
            .blocks
            .iter()
            .find(|b| b.name == block.name)
            .ok_or_else(|| missing(&block.name))?;
        compare(&block.name, block.binding, eval(&table, &parsed.binding)?)?;
    }

    log::debug!("Header matches interface '{}'", interface.name);
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

fn parse_error(line: usize, message: &str) -> InterfaceError {
    InterfaceError::HeaderParse {
        line,
        message: message.to_string(),
    }
}

fn group_heading(comment: &str) -> Option<DefineGroup> {
    match comment.to_ascii_lowercase().as_str() {
        "uniform locations" => Some(DefineGroup::Uniform),
        "in locations" => Some(DefineGroup::In),
        "out locations" => Some(DefineGroup::Out),
        "struct locations" => Some(DefineGroup::Struct),
        _ => None,
    }
}

fn with_externals(mut table: DefineTable, externals: &[(&str, i64)]) -> DefineTable {
    for (name, value) in externals {
        table = table.with_external(*name, *value);
    }
    table
}

fn eval(table: &DefineTable, expr: &DefineExpr) -> Result<i64> {
    table.evaluate_expr(expr)
}

/// Evaluate a qualifier value. Plain symbols are kept for re-emission.
fn resolve(table: &DefineTable, expr: &DefineExpr, owner: &str) -> Result<(u32, Option<String>)> {
    let value = eval(table, expr)?;
    let number = u32::try_from(value).map_err(|_| InterfaceError::NegativeLocation {
        name: owner.to_string(),
        value,
    })?;
    let symbol = match expr {
        DefineExpr::Symbol(name) => Some(name.clone()),
        _ => None,
    };
    Ok((number, symbol))
}

/// Parsed contents of a `layout(...)` qualifier list.
#[derive(Default)]
struct Qualifiers {
    std140: bool,
    values: Vec<(String, DefineExpr)>,
}

impl Qualifiers {
    fn required(&self, key: &str, line: usize) -> Result<DefineExpr> {
        self.values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .ok_or_else(|| parse_error(line, &format!("missing `{key}` qualifier")))
    }
}

/// Split `(q, ...) rest` into qualifiers and the remaining text.
fn split_qualifiers(text: &str, line: usize) -> Result<(Qualifiers, &str)> {
    let inner_start = text
        .strip_prefix('(')
        .ok_or_else(|| parse_error(line, "expected '(' after layout"))?;

    let mut depth = 1;
    let mut close = None;
    for (i, c) in inner_start.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(i);
                    break;
                }
            }
            _ => {}
        }
    }
    let close = close.ok_or_else(|| parse_error(line, "unclosed layout qualifier"))?;
    let inner = &inner_start[..close];
    let rest = inner_start[close + 1..].trim();

    let mut qualifiers = Qualifiers::default();
    for part in inner.split(',').map(str::trim) {
        match part.split_once('=') {
            Some((key, value)) => {
                let key = key.trim();
                if key.is_empty() || key.contains(char::is_whitespace) {
                    return Err(parse_error(line, &format!("malformed qualifier '{part}'")));
                }
                let expr = DefineExpr::parse(value)
                    .map_err(|err| parse_error(line, &format!("qualifier '{key}': {err}")))?;
                qualifiers.values.push((key.to_string(), expr));
            }
            None if part == "std140" => qualifiers.std140 = true,
            None if part == "shared" || part == "packed" => {}
            None => {
                return Err(parse_error(line, &format!("malformed qualifier '{part}'")));
            }
        }
    }
    Ok((qualifiers, rest))
}

/// Split `NAME { body } tail` into its three parts.
fn split_braces(text: &str, line: usize) -> Result<(&str, &str, &str)> {
    let open = text
        .find('{')
        .ok_or_else(|| parse_error(line, "expected '{'"))?;
    let close = text
        .rfind('}')
        .filter(|&close| close > open)
        .ok_or_else(|| parse_error(line, "expected '}'"))?;

    let name = text[..open].trim();
    if name.is_empty() {
        return Err(parse_error(line, "missing name before '{'"));
    }
    Ok((name, &text[open + 1..close], text[close + 1..].trim()))
}

fn parse_members(body: &str, line: usize) -> Result<Vec<BlockMember>> {
    body.split(';')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(|member| {
            let words: Vec<&str> = member.split_whitespace().collect();
            let (ty, name) = match words.as_slice() {
                [ty, name] => (*ty, *name),
                [prec, ty, name] if Precision::parse(prec).is_some() => (*ty, *name),
                _ => return Err(parse_error(line, &format!("malformed member '{member}'"))),
            };
            let ty = GlslType::parse(ty);
            match name.split_once('[') {
                Some((name, len)) => {
                    let len = len
                        .strip_suffix(']')
                        .and_then(|len| len.trim().parse::<u32>().ok())
                        .ok_or_else(|| {
                            parse_error(
                                line,
                                &format!("array length of '{name}' must be a literal"),
                            )
                        })?;
                    Ok(BlockMember::array(name, ty, len))
                }
                None => Ok(BlockMember::new(name, ty)),
            }
        })
        .collect()
}
