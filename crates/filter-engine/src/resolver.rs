use crate::{
    context::QueryContext,
    error::{CompileError, Result},
    fold::fold_constant,
};
use model::core::value::Value;
use search_syntax::ast::{
    expr::{Expression, ExpressionKind},
    variable::Variable,
};
use std::fmt::Write;

/// One step of a resolved attribute path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Name(String),
    Offset(u64),
}

/// Attribute path rooted at the document loop variable, outermost
/// segment first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributePath {
    segments: Vec<Segment>,
}

impl AttributePath {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Render the path the way the index names fields: names joined with
    /// dots, offsets in brackets with no preceding dot (`a.b[23].c`).
    pub fn field_name(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Name(name) => {
                    if !out.is_empty() {
                        out.push('.');
                    }
                    out.push_str(name);
                }
                Segment::Offset(n) => {
                    // render errors on String are impossible
                    let _ = write!(out, "[{n}]");
                }
            }
        }
        out
    }
}

/// Cheap structural check: is `expr` an access chain rooted at `doc_var`
/// with at least one step? Offsets are not resolved here.
pub fn is_attribute_access(expr: &Expression, doc_var: &Variable) -> bool {
    match &expr.kind {
        ExpressionKind::AttributeAccess { object, .. } => is_chain_root(object, doc_var),
        ExpressionKind::IndexedAccess { object, .. } => is_chain_root(object, doc_var),
        _ => false,
    }
}

fn is_chain_root(expr: &Expression, doc_var: &Variable) -> bool {
    match &expr.kind {
        ExpressionKind::Variable(v) => v == doc_var,
        ExpressionKind::AttributeAccess { object, .. } => is_chain_root(object, doc_var),
        ExpressionKind::IndexedAccess { object, .. } => is_chain_root(object, doc_var),
        _ => false,
    }
}

/// Resolve an access chain into a flat path, folding constant offset
/// expressions through the environment when needed.
pub fn resolve_attribute_path(expr: &Expression, ctx: &QueryContext) -> Result<AttributePath> {
    let mut segments = Vec::new();
    collect_segments(expr, ctx, &mut segments)?;
    segments.reverse();
    if segments.is_empty() {
        return Err(CompileError::UnsupportedShape(format!(
            "expected an attribute access on '{}', got the variable itself",
            ctx.doc_var
        )));
    }
    Ok(AttributePath { segments })
}

fn collect_segments(
    expr: &Expression,
    ctx: &QueryContext,
    out: &mut Vec<Segment>,
) -> Result<()> {
    match &expr.kind {
        ExpressionKind::Variable(v) if v == ctx.doc_var => Ok(()),
        ExpressionKind::Variable(v) => Err(CompileError::UnsupportedShape(format!(
            "attribute access is rooted at '{}', expected '{}'",
            v, ctx.doc_var
        ))),
        ExpressionKind::AttributeAccess { object, name } => {
            out.push(Segment::Name(name.clone()));
            collect_segments(object, ctx, out)
        }
        ExpressionKind::IndexedAccess { object, index } => {
            out.push(index_segment(index, ctx)?);
            collect_segments(object, ctx, out)
        }
        ExpressionKind::Expansion(_) => Err(CompileError::UnsupportedShape(
            "array expansion is not a translatable attribute access".to_string(),
        )),
        _ => Err(CompileError::UnsupportedShape(
            "malformed attribute access".to_string(),
        )),
    }
}

fn index_segment(index: &Expression, ctx: &QueryContext) -> Result<Segment> {
    let value = fold_constant(ctx, index).ok_or_else(|| {
        CompileError::UnsupportedShape("array offset is not a constant".to_string())
    })?;
    match value {
        Value::Int(n) if n >= 0 => Ok(Segment::Offset(n as u64)),
        Value::Int(n) => Err(CompileError::UnsupportedShape(format!(
            "negative array offset {n}"
        ))),
        Value::String(name) => Ok(Segment::Name(name)),
        other => Err(CompileError::UnsupportedShape(format!(
            "array offset must be an integer or a string, got {other}"
        ))),
    }
}
