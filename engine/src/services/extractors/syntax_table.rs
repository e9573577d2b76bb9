//! Per-language node-kind tables (`spec.md` §9, "Graph builder polymorphism").
//!
//! `Language` is a closed enum (`models::file::Language`); this module is
//! the table of per-language `tree-sitter` node-kind strings the shared
//! extractors dispatch on, plus the handful of post-processing functions
//! each language needs. No open class hierarchy, no per-language trait
//! objects — just data and free functions, as the design notes ask for.

use crate::models::file::Language;

pub struct SyntaxTable {
    pub function_kinds: &'static [&'static str],
    pub class_kinds: &'static [&'static str],
    pub if_kinds: &'static [&'static str],
    pub else_kinds: &'static [&'static str],
    pub loop_kinds: &'static [&'static str],
    pub case_kinds: &'static [&'static str],
    pub switch_kinds: &'static [&'static str],
    pub ternary_kinds: &'static [&'static str],
    pub catch_kinds: &'static [&'static str],
    pub jump_kinds: &'static [&'static str],
    pub bool_and_kinds: &'static [&'static str],
    pub bool_or_kinds: &'static [&'static str],
    pub import_kinds: &'static [&'static str],
    pub call_kinds: &'static [&'static str],
    pub identifier_kinds: &'static [&'static str],
    pub field_kinds: &'static [&'static str],
    pub base_clause_kinds: &'static [&'static str],
    /// Node kinds marking a declaration as publicly visible (e.g. Rust's
    /// `visibility_modifier` for `pub`/`pub(crate)`). Empty where the
    /// language has no such dedicated node (export-ness is name-based).
    pub visibility_kinds: &'static [&'static str],
    pub name_field: &'static str,
}

pub fn table_for(language: Language) -> SyntaxTable {
    match language {
        Language::Rust => SyntaxTable {
            function_kinds: &["function_item", "closure_expression"],
            class_kinds: &["struct_item", "enum_item", "trait_item", "impl_item"],
            if_kinds: &["if_expression", "if_let_expression"],
            else_kinds: &["else_clause"],
            loop_kinds: &["for_expression", "while_expression", "loop_expression"],
            case_kinds: &["match_arm"],
            switch_kinds: &["match_expression"],
            ternary_kinds: &[],
            catch_kinds: &[],
            jump_kinds: &["break_expression", "continue_expression", "return_expression"],
            bool_and_kinds: &["&&"],
            bool_or_kinds: &["||"],
            import_kinds: &["use_declaration"],
            call_kinds: &["call_expression", "macro_invocation"],
            identifier_kinds: &["identifier", "field_identifier", "type_identifier"],
            field_kinds: &["field_declaration"],
            base_clause_kinds: &["trait_bounds"],
            visibility_kinds: &["visibility_modifier"],
            name_field: "name",
        },
        Language::Go => SyntaxTable {
            function_kinds: &["function_declaration", "method_declaration", "func_literal"],
            class_kinds: &["type_declaration", "struct_type", "interface_type"],
            if_kinds: &["if_statement"],
            else_kinds: &["else"],
            loop_kinds: &["for_statement"],
            case_kinds: &["communication_case", "expression_case", "type_case"],
            switch_kinds: &["expression_switch_statement", "type_switch_statement", "select_statement"],
            ternary_kinds: &[],
            catch_kinds: &[],
            jump_kinds: &["break_statement", "continue_statement", "return_statement", "goto_statement"],
            bool_and_kinds: &["&&"],
            bool_or_kinds: &["||"],
            import_kinds: &["import_declaration"],
            call_kinds: &["call_expression"],
            identifier_kinds: &["identifier", "field_identifier", "type_identifier"],
            field_kinds: &["field_declaration"],
            base_clause_kinds: &[],
            visibility_kinds: &[],
            name_field: "name",
        },
        Language::Python => SyntaxTable {
            function_kinds: &["function_definition", "lambda"],
            class_kinds: &["class_definition"],
            if_kinds: &["if_statement", "elif_clause"],
            else_kinds: &["else_clause"],
            loop_kinds: &["for_statement", "while_statement"],
            case_kinds: &["case_clause"],
            switch_kinds: &["match_statement"],
            ternary_kinds: &["conditional_expression"],
            catch_kinds: &["except_clause"],
            jump_kinds: &["break_statement", "continue_statement", "return_statement"],
            bool_and_kinds: &["and"],
            bool_or_kinds: &["or"],
            import_kinds: &["import_statement", "import_from_statement"],
            call_kinds: &["call"],
            identifier_kinds: &["identifier"],
            field_kinds: &["assignment"],
            base_clause_kinds: &["argument_list"],
            visibility_kinds: &[],
            name_field: "name",
        },
        Language::TypeScript | Language::Tsx | Language::JavaScript | Language::Jsx => SyntaxTable {
            function_kinds: &[
                "function_declaration",
                "method_definition",
                "arrow_function",
                "function_expression",
            ],
            class_kinds: &["class_declaration", "interface_declaration"],
            if_kinds: &["if_statement"],
            else_kinds: &["else_clause"],
            loop_kinds: &["for_statement", "for_in_statement", "while_statement", "do_statement"],
            case_kinds: &["switch_case", "switch_default"],
            switch_kinds: &["switch_statement"],
            ternary_kinds: &["ternary_expression"],
            catch_kinds: &["catch_clause"],
            jump_kinds: &["break_statement", "continue_statement", "return_statement"],
            bool_and_kinds: &["&&"],
            bool_or_kinds: &["||"],
            import_kinds: &["import_statement"],
            call_kinds: &["call_expression"],
            identifier_kinds: &["identifier", "property_identifier", "type_identifier"],
            field_kinds: &["public_field_definition"],
            base_clause_kinds: &["class_heritage", "extends_clause"],
            visibility_kinds: &[],
            name_field: "name",
        },
        Language::Java => SyntaxTable {
            function_kinds: &["method_declaration", "constructor_declaration", "lambda_expression"],
            class_kinds: &["class_declaration", "interface_declaration", "enum_declaration"],
            if_kinds: &["if_statement"],
            else_kinds: &["else"],
            loop_kinds: &["for_statement", "enhanced_for_statement", "while_statement", "do_statement"],
            case_kinds: &["switch_block_statement_group", "switch_rule"],
            switch_kinds: &["switch_expression"],
            ternary_kinds: &["ternary_expression"],
            catch_kinds: &["catch_clause"],
            jump_kinds: &["break_statement", "continue_statement", "return_statement"],
            bool_and_kinds: &["&&"],
            bool_or_kinds: &["||"],
            import_kinds: &["import_declaration"],
            call_kinds: &["method_invocation", "object_creation_expression"],
            identifier_kinds: &["identifier", "type_identifier"],
            field_kinds: &["field_declaration"],
            base_clause_kinds: &["superclass", "super_interfaces"],
            visibility_kinds: &[],
            name_field: "name",
        },
        Language::C => SyntaxTable {
            function_kinds: &["function_definition"],
            class_kinds: &["struct_specifier", "union_specifier"],
            if_kinds: &["if_statement"],
            else_kinds: &["else"],
            loop_kinds: &["for_statement", "while_statement", "do_statement"],
            case_kinds: &["case_statement"],
            switch_kinds: &["switch_statement"],
            ternary_kinds: &["conditional_expression"],
            catch_kinds: &[],
            jump_kinds: &["break_statement", "continue_statement", "return_statement", "goto_statement"],
            bool_and_kinds: &["&&"],
            bool_or_kinds: &["||"],
            import_kinds: &["preproc_include"],
            call_kinds: &["call_expression"],
            identifier_kinds: &["identifier", "field_identifier", "type_identifier"],
            field_kinds: &["field_declaration"],
            base_clause_kinds: &[],
            visibility_kinds: &[],
            name_field: "declarator",
        },
        Language::Cpp => SyntaxTable {
            function_kinds: &["function_definition", "lambda_expression"],
            class_kinds: &["class_specifier", "struct_specifier"],
            if_kinds: &["if_statement"],
            else_kinds: &["else"],
            loop_kinds: &["for_statement", "for_range_loop", "while_statement", "do_statement"],
            case_kinds: &["case_statement"],
            switch_kinds: &["switch_statement"],
            ternary_kinds: &["conditional_expression"],
            catch_kinds: &["catch_clause"],
            jump_kinds: &["break_statement", "continue_statement", "return_statement", "goto_statement"],
            bool_and_kinds: &["&&"],
            bool_or_kinds: &["||"],
            import_kinds: &["preproc_include"],
            call_kinds: &["call_expression"],
            identifier_kinds: &["identifier", "field_identifier", "type_identifier"],
            field_kinds: &["field_declaration"],
            base_clause_kinds: &["base_class_clause"],
            visibility_kinds: &[],
            name_field: "declarator",
        },
        Language::CSharp => SyntaxTable {
            function_kinds: &["method_declaration", "constructor_declaration", "lambda_expression"],
            class_kinds: &["class_declaration", "interface_declaration", "struct_declaration"],
            if_kinds: &["if_statement"],
            else_kinds: &["else_clause"],
            loop_kinds: &["for_statement", "foreach_statement", "while_statement", "do_statement"],
            case_kinds: &["switch_section"],
            switch_kinds: &["switch_statement", "switch_expression"],
            ternary_kinds: &["conditional_expression"],
            catch_kinds: &["catch_clause"],
            jump_kinds: &["break_statement", "continue_statement", "return_statement", "goto_statement"],
            bool_and_kinds: &["&&"],
            bool_or_kinds: &["||"],
            import_kinds: &["using_directive"],
            call_kinds: &["invocation_expression", "object_creation_expression"],
            identifier_kinds: &["identifier"],
            field_kinds: &["field_declaration"],
            base_clause_kinds: &["base_list"],
            visibility_kinds: &[],
            name_field: "name",
        },
        Language::Ruby => SyntaxTable {
            function_kinds: &["method", "singleton_method", "lambda", "block"],
            class_kinds: &["class", "module"],
            if_kinds: &["if", "elsif"],
            else_kinds: &["else"],
            loop_kinds: &["for", "while", "until"],
            case_kinds: &["when"],
            switch_kinds: &["case"],
            ternary_kinds: &["ternary"],
            catch_kinds: &["rescue"],
            jump_kinds: &["break", "next", "return"],
            bool_and_kinds: &["&&", "and"],
            bool_or_kinds: &["||", "or"],
            import_kinds: &["call"],
            call_kinds: &["call", "method_call"],
            identifier_kinds: &["identifier", "constant"],
            field_kinds: &["instance_variable"],
            base_clause_kinds: &["superclass"],
            visibility_kinds: &[],
            name_field: "name",
        },
        Language::Php => SyntaxTable {
            function_kinds: &["function_definition", "method_declaration", "anonymous_function_creation_expression"],
            class_kinds: &["class_declaration", "interface_declaration"],
            if_kinds: &["if_statement"],
            else_kinds: &["else_clause"],
            loop_kinds: &["for_statement", "foreach_statement", "while_statement", "do_statement"],
            case_kinds: &["case_statement"],
            switch_kinds: &["switch_statement"],
            ternary_kinds: &["conditional_expression"],
            catch_kinds: &["catch_clause"],
            jump_kinds: &["break_statement", "continue_statement", "return_statement"],
            bool_and_kinds: &["&&", "and"],
            bool_or_kinds: &["||", "or"],
            import_kinds: &["namespace_use_declaration"],
            call_kinds: &["function_call_expression", "member_call_expression"],
            identifier_kinds: &["name"],
            field_kinds: &["property_declaration"],
            base_clause_kinds: &["base_clause", "class_interface_clause"],
            visibility_kinds: &[],
            name_field: "name",
        },
    }
}
