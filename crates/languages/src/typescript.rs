//! TypeScript support: JavaScript's registry extended with interfaces, type
//! aliases, enums, namespaces, and decorators (`SPEC_FULL.md` §4.4.1).
//!
//! Everything a `.ts`/`.tsx` file shares with plain JavaScript - functions,
//! classes, methods, variables, imports, calls, member access - reuses
//! `javascript`'s scope extractor, metadata extractor, and handlers
//! unchanged. Only the constructs TypeScript adds get their own entries,
//! folded into the JS table via `HandlerTableBuilder::extend`.

use crate::capture::Capture;
use crate::context::ProcessingContext;
use crate::definition_builder::{detect_export, DefinitionBuilder, HandlerFn, HandlerTable};
use crate::extractors::{MetadataExtractor, ReceiverInfo, ScopeBoundary, ScopeBoundaryExtractor};
use crate::javascript::{JsMetadataExtractor, JsScopeExtractor};
use crate::node_ext::{has_child_of_kind, node_location, node_text, require_field};
use crate::LanguageRegistry;
use codesearch_core::capture::Category;
use codesearch_core::definitions::{EnumMember, InterfaceMethod, PropertyDefinition};
use codesearch_core::error::Result;
use codesearch_core::references::TypeInfo;
use codesearch_core::IndexerConfig;
use tree_sitter::Node;

pub const QUERY: &str = r#"
(function_declaration name: (identifier) @definition.function) @scope.function
(generator_function_declaration name: (identifier) @definition.function) @scope.function
(class_declaration name: (type_identifier) @definition.class) @scope.class
(method_definition name: (property_identifier) @definition.method) @scope.method
(function_expression) @scope.function
(arrow_function) @scope.function
(public_field_definition name: (property_identifier) @definition.property)
(variable_declarator name: (identifier) @definition.variable)
(interface_declaration name: (type_identifier) @definition.interface) @scope.interface
(method_signature name: (property_identifier) @definition.interface.method)
(property_signature name: (property_identifier) @definition.interface.property)
(enum_declaration name: (identifier) @definition.enum) @scope.enum
(enum_assignment name: (property_identifier) @definition.enum.member)
(internal_module name: (identifier) @definition.namespace) @scope.namespace
(type_alias_declaration name: (type_identifier) @definition.type_alias)
((comment) @definition.function.documentation . (function_declaration))
((comment) @definition.function.documentation . (generator_function_declaration))
((comment) @definition.function.documentation . (export_statement declaration: (function_declaration)))
((comment) @definition.function.documentation . (export_statement declaration: (generator_function_declaration)))
((comment) @definition.method.documentation . (method_definition))
(import_statement) @import.named
(decorator) @decorator.attach
(call_expression) @reference.call
(new_expression) @reference.call.constructor
(member_expression) @reference.property
(assignment_expression) @assignment.write
(return_statement) @return.value
(if_statement consequence: (statement_block) @scope.block)
(if_statement alternative: (else_clause (statement_block) @scope.block))
(for_statement body: (statement_block) @scope.block)
(for_in_statement body: (statement_block) @scope.block)
(while_statement body: (statement_block) @scope.block)
(do_statement body: (statement_block) @scope.block)
(try_statement body: (statement_block) @scope.block)
(catch_clause body: (statement_block) @scope.block)
"#;

/// Scope-bearing node kinds for TypeScript: everything JavaScript has, plus
/// `interface_declaration`/`enum_declaration`/`internal_module`. Interface
/// *method signatures* are deliberately absent - §3's resolved Open
/// Question gives a signature no body and therefore no scope at all.
fn is_body_boundary(node: Node) -> bool {
    matches!(
        node.kind(),
        "function_declaration"
            | "function_expression"
            | "arrow_function"
            | "generator_function_declaration"
            | "method_definition"
            | "class_declaration"
            | "class"
            | "object"
            | "array"
            | "interface_declaration"
            | "enum_declaration"
            | "internal_module"
    )
}

pub struct TsScopeExtractor;

impl ScopeBoundaryExtractor for TsScopeExtractor {
    fn extract(&self, node: Node, source: &str, file_path: &str) -> Result<ScopeBoundary> {
        match node.kind() {
            "interface_declaration" => {
                let name_node = require_field(node, "name")?;
                let body = require_field(node, "body")?;
                Ok(ScopeBoundary {
                    symbol_location: node_location(name_node, file_path),
                    scope_location: node_location(body, file_path),
                    name: Some(node_text(name_node, source).to_string()),
                })
            }
            "enum_declaration" => {
                let name_node = require_field(node, "name")?;
                let body = require_field(node, "body")?;
                Ok(ScopeBoundary {
                    symbol_location: node_location(name_node, file_path),
                    scope_location: node_location(body, file_path),
                    name: Some(node_text(name_node, source).to_string()),
                })
            }
            "internal_module" => {
                let name_node = require_field(node, "name")?;
                let body = require_field(node, "body")?;
                Ok(ScopeBoundary {
                    symbol_location: node_location(name_node, file_path),
                    scope_location: node_location(body, file_path),
                    name: Some(node_text(name_node, source).to_string()),
                })
            }
            _ => JsScopeExtractor.extract(node, source, file_path),
        }
    }
}

pub struct TsMetadataExtractor;

impl MetadataExtractor for TsMetadataExtractor {
    fn extract_type_from_annotation(&self, node: Node, source: &str) -> Option<TypeInfo> {
        JsMetadataExtractor.extract_type_from_annotation(node, source)
    }

    fn extract_receiver_info(&self, node: Node, source: &str, file_path: &str) -> Option<ReceiverInfo> {
        JsMetadataExtractor.extract_receiver_info(node, source, file_path)
    }

    fn extract_call_receiver(&self, node: Node, file_path: &str) -> Option<codesearch_core::ids::Location> {
        JsMetadataExtractor.extract_call_receiver(node, file_path)
    }

    fn extract_property_chain(&self, node: Node, source: &str) -> Option<codesearch_core::references::PropertyChain> {
        JsMetadataExtractor.extract_property_chain(node, source)
    }

    fn extract_assignment_parts(&self, node: Node, file_path: &str) -> crate::extractors::AssignmentParts {
        JsMetadataExtractor.extract_assignment_parts(node, file_path)
    }

    fn extract_construct_target(&self, node: Node, file_path: &str) -> Option<codesearch_core::ids::Location> {
        JsMetadataExtractor.extract_construct_target(node, file_path)
    }

    fn extract_type_arguments(&self, node: Node, source: &str) -> Option<Vec<String>> {
        let args = node.child_by_field_name("type_arguments")?;
        let mut cursor = args.walk();
        let args: Vec<String> = args
            .named_children(&mut cursor)
            .map(|a| node_text(a, source).to_string())
            .collect();
        if args.is_empty() {
            None
        } else {
            Some(args)
        }
    }

    fn extract_is_optional_chain(&self, node: Node) -> bool {
        JsMetadataExtractor.extract_is_optional_chain(node)
    }

    fn is_method_call(&self, node: Node) -> bool {
        JsMetadataExtractor.is_method_call(node)
    }
}

/// Reads a `: Type` annotation verbatim, including generics, unions, and
/// function types - SPEC_FULL.md §4.4 calls for the type text to be kept
/// exactly as written rather than normalized.
fn annotation_text(node: Node, source: &str) -> Option<String> {
    let type_node = node.child_by_field_name("type")?;
    Some(node_text(type_node, source).trim_start_matches(':').trim().to_string())
}

fn extract_type_parameters(node: Node, source: &str) -> Vec<String> {
    let Some(params) = node.child_by_field_name("type_parameters") else {
        return Vec::new();
    };
    let mut cursor = params.walk();
    params.named_children(&mut cursor).map(|p| node_text(p, source).to_string()).collect()
}

fn extract_heritage(node: Node, source: &str, keyword: &str) -> Vec<String> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .filter(|c| c.kind() == "class_heritage" || c.kind() == "extends_type_clause" || c.kind() == "extends_clause")
        .flat_map(|clause| {
            let mut inner_cursor = clause.walk();
            clause
                .named_children(&mut inner_cursor)
                .filter(|n| n.kind() == "type_identifier" || n.kind() == "generic_type" || n.kind() == "identifier")
                .map(|n| node_text(n, source).to_string())
                .collect::<Vec<_>>()
        })
        .filter(|name| name != keyword)
        .collect()
}

fn handle_interface(capture: &Capture, ctx: &ProcessingContext, builder: &mut DefinitionBuilder, source: &str, _config: &IndexerConfig) -> Result<()> {
    let name_node = capture.node;
    let name = node_text(name_node, source).to_string();
    let node = crate::node_ext::require_parent(name_node)?;
    let body_scope_id = ctx.get_child_scope_with_symbol_name(&ctx.get_scope_id(&capture.location)?, &name)?;
    let extends = extract_heritage(node, source, &name);
    let type_parameters = extract_type_parameters(node, source);
    let export = crate::javascript::export_info_for(node);
    builder.add_interface(ctx, name, capture.location.clone(), body_scope_id, extends, type_parameters, export)?;
    Ok(())
}

fn handle_interface_method(capture: &Capture, ctx: &ProcessingContext, builder: &mut DefinitionBuilder, source: &str, _config: &IndexerConfig) -> Result<()> {
    let name_node = capture.node;
    let name = node_text(name_node, source).to_string();
    let node = crate::node_ext::require_parent(name_node)?;
    let params = require_field(node, "parameters")?;
    let signature = codesearch_core::definitions::FunctionSignature {
        parameters: crate::javascript::extract_parameters(params, source),
        return_type: annotation_text(node, source),
    };
    let interface_node = crate::node_ext::find_ancestor(node, |n| n.kind() == "interface_declaration")
        .ok_or_else(|| codesearch_core::error::Error::unrecognized_scope_node("typescript", "method_signature outside interface"))?;
    let interface_name_node = require_field(interface_node, "name")?;
    let interface_name = node_text(interface_name_node, source).to_string();
    let interface_name_location = node_location(interface_name_node, &capture.location.file_path);
    let enclosing = ctx.get_scope_id(&interface_name_location)?;
    let body_scope_id = ctx.get_child_scope_with_symbol_name(&enclosing, &interface_name)?;
    builder.add_method_to_interface(
        &body_scope_id,
        InterfaceMethod {
            name,
            location: capture.location.clone(),
            signature,
        },
    )?;
    Ok(())
}

fn handle_interface_property(capture: &Capture, ctx: &ProcessingContext, builder: &mut DefinitionBuilder, source: &str, _config: &IndexerConfig) -> Result<()> {
    let name_node = capture.node;
    let name = node_text(name_node, source).to_string();
    let node = crate::node_ext::require_parent(name_node)?;
    let interface_node = crate::node_ext::find_ancestor(node, |n| n.kind() == "interface_declaration")
        .ok_or_else(|| codesearch_core::error::Error::unrecognized_scope_node("typescript", "property_signature outside interface"))?;
    let interface_name_node = require_field(interface_node, "name")?;
    let interface_name = node_text(interface_name_node, source).to_string();
    let interface_name_location = node_location(interface_name_node, &capture.location.file_path);
    let enclosing = ctx.get_scope_id(&interface_name_location)?;
    let body_scope_id = ctx.get_child_scope_with_symbol_name(&enclosing, &interface_name)?;
    let symbol_id = codesearch_core::ids::SymbolId::new("property", &capture.location.file_path, &name, &capture.location.start);
    builder.add_property_to_interface(
        &body_scope_id,
        PropertyDefinition {
            symbol_id,
            name,
            location: capture.location.clone(),
            defining_scope_id: body_scope_id.clone(),
            type_annotation: annotation_text(node, source),
            is_static: false,
            decorators: Vec::new(),
        },
    )?;
    Ok(())
}

fn handle_enum(capture: &Capture, ctx: &ProcessingContext, builder: &mut DefinitionBuilder, source: &str, _config: &IndexerConfig) -> Result<()> {
    let name_node = capture.node;
    let name = node_text(name_node, source).to_string();
    let node = crate::node_ext::require_parent(name_node)?;
    let body_scope_id = ctx.get_child_scope_with_symbol_name(&ctx.get_scope_id(&capture.location)?, &name)?;
    let is_const = has_child_of_kind(node, "const");
    let export = crate::javascript::export_info_for(node);
    builder.add_enum(ctx, name, capture.location.clone(), Some(body_scope_id), is_const, export)?;
    Ok(())
}

fn handle_enum_member(capture: &Capture, ctx: &ProcessingContext, builder: &mut DefinitionBuilder, source: &str, _config: &IndexerConfig) -> Result<()> {
    let name_node = capture.node;
    let name = node_text(name_node, source).to_string();
    let node = crate::node_ext::require_parent(name_node)?;
    let value = node.child_by_field_name("value").map(|v| node_text(v, source).to_string());

    let enum_node = crate::node_ext::find_ancestor(node, |n| n.kind() == "enum_declaration")
        .ok_or_else(|| codesearch_core::error::Error::unrecognized_scope_node("typescript", "enum member outside enum"))?;
    let enum_name_node = require_field(enum_node, "name")?;
    let enum_name = node_text(enum_name_node, source).to_string();
    let enum_name_location = node_location(enum_name_node, &capture.location.file_path);
    let enclosing = ctx.get_scope_id(&enum_name_location)?;
    let body_scope_id = ctx.get_child_scope_with_symbol_name(&enclosing, &enum_name)?;

    builder.add_member_to_enum_by_scope(
        &body_scope_id,
        EnumMember {
            name,
            location: capture.location.clone(),
            value,
        },
    )?;
    Ok(())
}

fn handle_namespace(capture: &Capture, ctx: &ProcessingContext, builder: &mut DefinitionBuilder, source: &str, _config: &IndexerConfig) -> Result<()> {
    let name_node = capture.node;
    let name = node_text(name_node, source).to_string();
    let node = crate::node_ext::require_parent(name_node)?;
    let body_scope_id = ctx.get_child_scope_with_symbol_name(&ctx.get_scope_id(&capture.location)?, &name)?;
    let export = crate::javascript::export_info_for(node);
    builder.add_namespace(ctx, name, capture.location.clone(), body_scope_id, export)?;
    Ok(())
}

fn handle_type_alias(capture: &Capture, ctx: &ProcessingContext, builder: &mut DefinitionBuilder, source: &str, _config: &IndexerConfig) -> Result<()> {
    let name_node = capture.node;
    let name = node_text(name_node, source).to_string();
    let node = crate::node_ext::require_parent(name_node)?;
    let type_parameters = extract_type_parameters(node, source);
    let underlying_type = node
        .child_by_field_name("value")
        .map(|v| node_text(v, source).to_string())
        .unwrap_or_default();
    let export = crate::javascript::export_info_for(node);
    builder.add_type_alias(ctx, name, capture.location.clone(), type_parameters, underlying_type, export)?;
    Ok(())
}

/// Attaches a decorator to whichever class/method/property it immediately
/// precedes, walking forward past other decorators to find the decorated
/// declaration (§4.4's decorator sub-pass runs after every other capture).
fn handle_decorator(capture: &Capture, ctx: &ProcessingContext, builder: &mut DefinitionBuilder, source: &str, _config: &IndexerConfig) -> Result<()> {
    let node = capture.node;
    let text = node_text(node, source).to_string();

    let Some(parent) = node.parent() else { return Ok(()) };
    let mut sibling = node.next_sibling();
    let target = loop {
        match sibling {
            Some(n) if n.kind() == "decorator" => sibling = n.next_sibling(),
            Some(n) => break Some(n),
            None => break None,
        }
    };
    let Some(target) = target else { return Ok(()) };

    match (parent.kind(), target.kind()) {
        (_, "class_declaration") => {
            let name_node = require_field(target, "name")?;
            let name = node_text(name_node, source).to_string();
            let body_scope_id = ctx.get_child_scope_with_symbol_name(&ctx.get_scope_id(&capture.location)?, &name)?;
            builder.attach_decorator_to_class(&body_scope_id, text)?;
        }
        (_, "method_definition") => {
            let class_node = crate::node_ext::find_ancestor(target, |n| n.kind() == "class_declaration");
            if let Some(class_node) = class_node {
                let class_name_node = require_field(class_node, "name")?;
                let class_name = node_text(class_name_node, source).to_string();
                let class_name_location = node_location(class_name_node, &capture.location.file_path);
                let enclosing = ctx.get_scope_id(&class_name_location)?;
                let body_scope_id = ctx.get_child_scope_with_symbol_name(&enclosing, &class_name)?;
                let method_name_node = require_field(target, "name")?;
                let method_name = node_text(method_name_node, source).to_string();
                builder.attach_decorator_to_method(&body_scope_id, &method_name, text)?;
            }
        }
        (_, "public_field_definition") => {
            let class_node = crate::node_ext::find_ancestor(target, |n| n.kind() == "class_declaration");
            if let Some(class_node) = class_node {
                let class_name_node = require_field(class_node, "name")?;
                let class_name = node_text(class_name_node, source).to_string();
                let class_name_location = node_location(class_name_node, &capture.location.file_path);
                let enclosing = ctx.get_scope_id(&class_name_location)?;
                let body_scope_id = ctx.get_child_scope_with_symbol_name(&enclosing, &class_name)?;
                let property_name_node = require_field(target, "name")?;
                let property_name = node_text(property_name_node, source).to_string();
                builder.attach_decorator_to_property(&body_scope_id, &property_name, text)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn handle_property(capture: &Capture, ctx: &ProcessingContext, builder: &mut DefinitionBuilder, source: &str, _config: &IndexerConfig) -> Result<()> {
    let name_node = capture.node;
    let name = node_text(name_node, source).to_string();
    let node = crate::node_ext::require_parent(name_node)?;
    let is_static = has_child_of_kind(node, "static");

    let class_node = crate::node_ext::find_ancestor(node, |n| n.kind() == "class_declaration");
    let Some(class_node) = class_node else {
        return Err(codesearch_core::error::Error::unrecognized_scope_node("typescript", "public_field_definition outside class"));
    };
    let class_name_node = require_field(class_node, "name")?;
    let class_name = node_text(class_name_node, source).to_string();
    let class_name_location = node_location(class_name_node, &capture.location.file_path);
    let enclosing = ctx.get_scope_id(&class_name_location)?;
    let body_scope_id = ctx.get_child_scope_with_symbol_name(&enclosing, &class_name)?;

    let symbol_id = codesearch_core::ids::SymbolId::new("property", &capture.location.file_path, &name, &capture.location.start);
    builder.add_property_to_class(
        &body_scope_id,
        PropertyDefinition {
            symbol_id,
            name,
            location: capture.location.clone(),
            defining_scope_id: body_scope_id.clone(),
            type_annotation: annotation_text(node, source),
            is_static,
            decorators: Vec::new(),
        },
    )?;
    Ok(())
}

pub struct TsRegistry {
    handlers: HandlerTable,
}

impl TsRegistry {
    pub fn new() -> Self {
        let handlers = HandlerTable::builder()
            .on(Category::Definition, "interface", handle_interface as HandlerFn)
            .on_subtag(Category::Definition, "interface", "method", handle_interface_method as HandlerFn)
            .on_subtag(Category::Definition, "interface", "property", handle_interface_property as HandlerFn)
            .on(Category::Definition, "enum", handle_enum as HandlerFn)
            .on_subtag(Category::Definition, "enum", "member", handle_enum_member as HandlerFn)
            .on(Category::Definition, "namespace", handle_namespace as HandlerFn)
            .on(Category::Definition, "type_alias", handle_type_alias as HandlerFn)
            .on(Category::Definition, "property", handle_property as HandlerFn)
            .on(Category::Decorator, "attach", handle_decorator as HandlerFn)
            .extend(crate::javascript::build_handler_table())
            .build();
        Self { handlers }
    }
}

impl Default for TsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageRegistry for TsRegistry {
    fn query(&self) -> &'static str {
        QUERY
    }

    fn scope_boundary_extractor(&self) -> &dyn ScopeBoundaryExtractor {
        &TsScopeExtractor
    }

    fn metadata_extractor(&self) -> &dyn MetadataExtractor {
        &TsMetadataExtractor
    }

    fn handler_table(&self) -> &HandlerTable {
        &self.handlers
    }
}

pub fn registry() -> TsRegistry {
    TsRegistry::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> tree_sitter::Tree {
        let language: tree_sitter::Language = tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into();
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&language).expect("set language");
        parser.parse(source, None).expect("parse")
    }

    #[test]
    fn scope_extractor_reports_interface_body_as_scope() {
        let source = "interface Foo { bar(): void; }";
        let tree = parse(source);
        let iface = tree.root_node().named_child(0).expect("interface_declaration");
        let boundary = TsScopeExtractor.extract(iface, source, "f.ts").expect("extract");
        assert_eq!(boundary.name.as_deref(), Some("Foo"));
    }

    #[test]
    fn method_signature_is_not_a_scope_boundary() {
        let source = "interface Foo { bar(): void; }";
        let tree = parse(source);
        let iface = tree.root_node().named_child(0).expect("interface_declaration");
        let body = iface.child_by_field_name("body").expect("body");
        let mut cursor = body.walk();
        let signature = body
            .named_children(&mut cursor)
            .find(|c| c.kind() == "method_signature")
            .expect("method_signature");
        assert!(!is_body_boundary(signature));
    }
}
