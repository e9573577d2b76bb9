//! Import and call-edge extraction (`spec.md` §4.2).

use crate::services::extractors::syntax_table::{table_for, SyntaxTable};
use crate::services::parser_pool::ParsedTree;
use std::path::Path;
use tree_sitter::Node;

/// A call site as written: the enclosing function scope id (or the file
/// path itself for a module-level call) and the callee name as it
/// appears in source, unresolved.
#[derive(Debug, Clone)]
pub struct CallSite {
    pub caller_scope: String,
    pub callee_name: String,
    pub line: u32,
}

pub fn extract_imports(parsed: &ParsedTree) -> Vec<String> {
    let table = table_for(parsed.language);
    let mut out = Vec::new();
    walk_imports(parsed.tree.root_node(), &table, parsed, &mut out);
    out
}

fn walk_imports(node: Node, table: &SyntaxTable, parsed: &ParsedTree, out: &mut Vec<String>) {
    if table.import_kinds.contains(&node.kind()) {
        out.push(parsed.text(node).trim().to_string());
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk_imports(child, table, parsed, out);
    }
}

pub fn extract_calls(parsed: &ParsedTree, path: &Path) -> Vec<CallSite> {
    let table = table_for(parsed.language);
    let mut out = Vec::new();
    let file_scope = path.display().to_string();
    walk_calls(parsed.tree.root_node(), &table, parsed, &file_scope, &mut out);
    out
}

fn walk_calls(
    node: Node,
    table: &SyntaxTable,
    parsed: &ParsedTree,
    current_scope: &str,
    out: &mut Vec<CallSite>,
) {
    let next_scope: String = if table.function_kinds.contains(&node.kind()) {
        let name = node
            .child_by_field_name(table.name_field)
            .map(|n| parsed.text(n))
            .unwrap_or("<anonymous>");
        format!("{current_scope}:{name}")
    } else {
        current_scope.to_string()
    };

    if table.call_kinds.contains(&node.kind()) {
        if let Some(callee) = callee_name(node, table, parsed) {
            out.push(CallSite {
                caller_scope: current_scope.to_string(),
                callee_name: callee,
                line: node.start_position().row as u32 + 1,
            });
        }
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk_calls(child, table, parsed, &next_scope, out);
    }
}

fn callee_name(node: Node, table: &SyntaxTable, parsed: &ParsedTree) -> Option<String> {
    let target = node
        .child_by_field_name("function")
        .or_else(|| node.child_by_field_name("method"))
        .or_else(|| node.child(0))?;

    // Strip a receiver chain (`obj.method(...)`) down to the trailing name.
    let mut cursor = target.walk();
    let last_identifier = target
        .children(&mut cursor)
        .filter(|c| table.identifier_kinds.contains(&c.kind()))
        .last();

    let name_node = last_identifier.unwrap_or(target);
    let text = parsed.text(name_node).trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
