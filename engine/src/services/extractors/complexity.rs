//! Shared complexity extraction: cyclomatic, cognitive, nesting, and
//! function-boundary discovery (`spec.md` §4.2).

use crate::models::class::ClassRecord;
use crate::models::file::Language;
use crate::models::function::FunctionRecord;
use crate::services::extractors::syntax_table::{table_for, SyntaxTable};
use crate::services::parser_pool::ParsedTree;
use std::collections::BTreeSet;
use std::path::Path;
use tree_sitter::Node;

fn node_name<'a>(node: Node<'a>, table: &SyntaxTable, parsed: &'a ParsedTree) -> Option<&'a str> {
    node.child_by_field_name(table.name_field)
        .map(|n| parsed.text(n))
        .filter(|s| !s.is_empty())
}

/// Whether `node` has a direct child whose kind is one of the language's
/// visibility-modifier node kinds (e.g. Rust's `pub`/`pub(crate)`).
fn has_visibility_modifier(node: Node, table: &SyntaxTable) -> bool {
    if table.visibility_kinds.is_empty() {
        return false;
    }
    let mut cursor = node.walk();
    let found = node.children(&mut cursor)
        .any(|child| table.visibility_kinds.contains(&child.kind()));
    found
}

fn param_count(node: Node, table: &SyntaxTable) -> u32 {
    let Some(params) = node
        .child_by_field_name("parameters")
        .or_else(|| node.child_by_field_name("parameter_list"))
    else {
        return 0;
    };
    let mut count = 0u32;
    let mut cursor = params.walk();
    for child in params.children(&mut cursor) {
        if table.identifier_kinds.contains(&child.kind())
            || child.kind().ends_with("parameter")
            || child.kind() == "self_parameter"
        {
            count += 1;
        }
    }
    count
}

/// Cyclomatic/cognitive/nesting walk scoped to a single function body: it
/// stops at (does not descend into) nested function nodes, which get
/// their own independent `FunctionRecord`.
struct ScopedWalk<'a> {
    table: &'a SyntaxTable,
    cyclomatic: u32,
    cognitive: u32,
    nesting_max: u32,
    jump_count: u32,
    last_bool_op: Option<&'static str>,
}

impl<'a> ScopedWalk<'a> {
    fn new(table: &'a SyntaxTable) -> Self {
        Self {
            table,
            cyclomatic: 1,
            cognitive: 0,
            nesting_max: 0,
            jump_count: 0,
            last_bool_op: None,
        }
    }

    fn walk(&mut self, node: Node, depth: u32, is_root: bool) {
        let kind = node.kind();

        if !is_root && self.table.function_kinds.contains(&kind) {
            // Nested function: counted as its own record, not folded in.
            return;
        }

        let mut next_depth = depth;
        let mut structural = false;

        if self.table.if_kinds.contains(&kind) {
            self.cyclomatic += 1;
            self.cognitive += 1 + depth;
            structural = true;
        } else if self.table.loop_kinds.contains(&kind) {
            self.cyclomatic += 1;
            self.cognitive += 1 + depth;
            structural = true;
        } else if self.table.case_kinds.contains(&kind) {
            self.cyclomatic += 1;
        } else if self.table.ternary_kinds.contains(&kind) {
            self.cyclomatic += 1;
            self.cognitive += 1 + depth;
        } else if self.table.catch_kinds.contains(&kind) {
            self.cyclomatic += 1;
            self.cognitive += 1 + depth;
            structural = true;
        } else if self.table.jump_kinds.contains(&kind) {
            self.jump_count += 1;
            if self.jump_count > 1 {
                self.cyclomatic += 1;
            }
            if kind.contains("break") || kind.contains("continue") {
                self.cognitive += 1;
            }
        }

        if structural {
            next_depth = depth + 1;
            self.nesting_max = self.nesting_max.max(next_depth);
        }

        if kind == "binary_expression" || kind == "boolean_operator" {
            if let Some(op_node) = node.child(1) {
                let op = op_node.kind();
                let this_kind = if self.table.bool_and_kinds.contains(&op) {
                    Some("and")
                } else if self.table.bool_or_kinds.contains(&op) {
                    Some("or")
                } else {
                    None
                };
                if let Some(this_kind) = this_kind {
                    self.cyclomatic += 1;
                    if self.last_bool_op != Some(this_kind) {
                        self.cognitive += 1;
                    }
                    self.last_bool_op = Some(this_kind);
                }
            }
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk(child, next_depth, false);
        }
    }
}

pub fn compute_metrics(node: Node, table: &SyntaxTable) -> (u32, u32, u32) {
    let mut walk = ScopedWalk::new(table);
    walk.walk(node, 0, true);
    (walk.cyclomatic, walk.cognitive, walk.nesting_max)
}

/// Collects every function/method node in the tree, scoped correctly
/// (nested closures each get their own record, per `spec.md` §3).
pub fn extract_functions(parsed: &ParsedTree, path: &Path) -> Vec<FunctionRecord> {
    let table = table_for(parsed.language);
    let is_test_file = Language::is_test_path(path);
    let mut out = Vec::new();
    walk_for_functions(parsed.tree.root_node(), &table, parsed, path, is_test_file, &mut out);
    out
}

fn walk_for_functions(
    node: Node,
    table: &SyntaxTable,
    parsed: &ParsedTree,
    path: &Path,
    is_test_file: bool,
    out: &mut Vec<FunctionRecord>,
) {
    if table.function_kinds.contains(&node.kind()) {
        let name = node_name(node, table, parsed)
            .unwrap_or("<anonymous>")
            .to_string();
        let (cyclomatic, cognitive, nesting_max) = compute_metrics(node, table);
        out.push(FunctionRecord {
            file: path.to_path_buf(),
            name,
            line_start: node.start_position().row as u32 + 1,
            line_end: node.end_position().row as u32 + 1,
            param_count: param_count(node, table),
            cyclomatic: cyclomatic.max(1),
            cognitive,
            nesting_max,
            is_test: is_test_file,
            is_public: has_visibility_modifier(node, table),
        });
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk_for_functions(child, table, parsed, path, is_test_file, out);
    }
}

/// Same traversal as [`extract_functions`], but keeps each function's raw
/// source text alongside its record for duplicate detection (`spec.md`
/// §4.4, "Duplicates (MinHash/LSH)").
pub fn extract_function_bodies<'a>(
    parsed: &'a ParsedTree,
    path: &Path,
) -> Vec<(FunctionRecord, &'a str)> {
    let table = table_for(parsed.language);
    let is_test_file = Language::is_test_path(path);
    let mut out = Vec::new();
    walk_for_bodies(parsed.tree.root_node(), &table, parsed, path, is_test_file, &mut out);
    out
}

fn walk_for_bodies<'a>(
    node: Node<'a>,
    table: &SyntaxTable,
    parsed: &'a ParsedTree,
    path: &Path,
    is_test_file: bool,
    out: &mut Vec<(FunctionRecord, &'a str)>,
) {
    if table.function_kinds.contains(&node.kind()) {
        let name = node_name(node, table, parsed)
            .unwrap_or("<anonymous>")
            .to_string();
        let (cyclomatic, cognitive, nesting_max) = compute_metrics(node, table);
        out.push((
            FunctionRecord {
                file: path.to_path_buf(),
                name,
                line_start: node.start_position().row as u32 + 1,
                line_end: node.end_position().row as u32 + 1,
                param_count: param_count(node, table),
                cyclomatic: cyclomatic.max(1),
                cognitive,
                nesting_max,
                is_test: is_test_file,
                is_public: has_visibility_modifier(node, table),
            },
            parsed.text(node),
        ));
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk_for_bodies(child, table, parsed, path, is_test_file, out);
    }
}

/// Class/struct/interface shape extraction (`spec.md` §4.2, "Class shape").
pub fn extract_classes(parsed: &ParsedTree, path: &Path) -> Vec<ClassRecord> {
    let table = table_for(parsed.language);
    let mut out = Vec::new();
    walk_for_classes(parsed.tree.root_node(), &table, parsed, path, &mut out);
    out
}

fn walk_for_classes(
    node: Node,
    table: &SyntaxTable,
    parsed: &ParsedTree,
    path: &Path,
    out: &mut Vec<ClassRecord>,
) {
    if table.class_kinds.contains(&node.kind()) {
        let name = node_name(node, table, parsed)
            .unwrap_or("<anonymous>")
            .to_string();

        let mut methods = Vec::new();
        let mut fields = BTreeSet::new();
        let mut referenced_types = BTreeSet::new();
        let mut bases = Vec::new();
        let mut method_field_accesses = std::collections::BTreeMap::new();

        collect_methods_and_fields(node, table, parsed, &mut methods, &mut fields, &mut method_field_accesses);
        collect_referenced_types(node, table, parsed, &mut referenced_types);

        for base_clause_kind in table.base_clause_kinds {
            if let Some(clause) = find_child_of_kind(node, base_clause_kind) {
                collect_identifiers(clause, table, parsed, &mut bases);
            }
        }

        out.push(ClassRecord {
            file: path.to_path_buf(),
            name,
            line_start: node.start_position().row as u32 + 1,
            line_end: node.end_position().row as u32 + 1,
            methods,
            fields,
            bases,
            referenced_types,
            method_field_accesses,
        });
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk_for_classes(child, table, parsed, path, out);
    }
}

fn find_child_of_kind<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|c| c.kind() == kind);
    found
}

fn collect_identifiers(node: Node, table: &SyntaxTable, parsed: &ParsedTree, out: &mut Vec<String>) {
    if table.identifier_kinds.contains(&node.kind()) {
        out.push(parsed.text(node).to_string());
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_identifiers(child, table, parsed, out);
    }
}

fn collect_methods_and_fields(
    node: Node,
    table: &SyntaxTable,
    parsed: &ParsedTree,
    methods: &mut Vec<String>,
    fields: &mut BTreeSet<String>,
    method_field_accesses: &mut std::collections::BTreeMap<String, BTreeSet<String>>,
) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if table.function_kinds.contains(&child.kind()) {
            let name = node_name(child, table, parsed).unwrap_or("<anonymous>").to_string();
            let mut accesses = BTreeSet::new();
            collect_field_accesses(child, table, parsed, fields, &mut accesses);
            methods.push(name.clone());
            method_field_accesses.insert(name, accesses);
        } else if table.field_kinds.contains(&child.kind()) {
            if let Some(name) = node_name(child, table, parsed) {
                fields.insert(name.to_string());
            }
        } else {
            collect_methods_and_fields(child, table, parsed, methods, fields, method_field_accesses);
        }
    }
}

fn collect_field_accesses(
    node: Node,
    table: &SyntaxTable,
    parsed: &ParsedTree,
    known_fields: &BTreeSet<String>,
    out: &mut BTreeSet<String>,
) {
    if table.identifier_kinds.contains(&node.kind()) {
        let text = parsed.text(node);
        if known_fields.contains(text) {
            out.insert(text.to_string());
        }
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_field_accesses(child, table, parsed, known_fields, out);
    }
}

fn collect_referenced_types(
    node: Node,
    table: &SyntaxTable,
    parsed: &ParsedTree,
    out: &mut BTreeSet<String>,
) {
    if node.kind().contains("type") && table.identifier_kinds.contains(&node.kind()) {
        out.insert(parsed.text(node).to_string());
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_referenced_types(child, table, parsed, out);
    }
}
