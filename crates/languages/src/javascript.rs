//! JavaScript support: query, scope boundaries, metadata extraction, and the
//! definition-builder handler table (`SPEC_FULL.md` §4.6).

use crate::capture::Capture;
use crate::context::ProcessingContext;
use crate::definition_builder::{derived_from, detect_export, HandlerFn, HandlerTable};
use crate::extractors::{AssignmentParts, MetadataExtractor, ReceiverInfo, ScopeBoundary, ScopeBoundaryExtractor};
use crate::node_ext::{has_child_of_kind, node_location, node_text, require_field};
use crate::LanguageRegistry;
use codesearch_core::capture::Category;
use codesearch_core::definitions::{ExportInfo, FunctionSignature, MethodDefinition, Parameter, PropertyDefinition, VariableKindTag};
use codesearch_core::error::{Error, Result};
use codesearch_core::ids::Location;
use codesearch_core::references::{PropertyChain, SelfKeyword, TypeCertainty, TypeInfo};
use codesearch_core::IndexerConfig;
use tree_sitter::Node;

pub const QUERY: &str = r#"
(function_declaration name: (identifier) @definition.function) @scope.function
(generator_function_declaration name: (identifier) @definition.function) @scope.function
(class_declaration name: (identifier) @definition.class) @scope.class
(method_definition name: (property_identifier) @definition.method) @scope.method
((comment) @definition.function.documentation . (function_declaration))
((comment) @definition.function.documentation . (generator_function_declaration))
((comment) @definition.function.documentation . (export_statement declaration: (function_declaration)))
((comment) @definition.function.documentation . (export_statement declaration: (generator_function_declaration)))
((comment) @definition.method.documentation . (method_definition))
(function_expression) @scope.function
(arrow_function) @scope.function
(field_definition property: (property_identifier) @definition.property)
(field_definition property: (private_property_identifier) @definition.property)
((comment) @definition.property.documentation . (field_definition))
(variable_declarator name: (identifier) @definition.variable)
(import_statement) @import.named
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

/// Scope-bearing node kinds, used by both the boundary extractor and the
/// export-detection boundary predicate.
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
    )
}

pub struct JsScopeExtractor;

impl ScopeBoundaryExtractor for JsScopeExtractor {
    fn extract(&self, node: Node, source: &str, file_path: &str) -> Result<ScopeBoundary> {
        match node.kind() {
            "function_declaration" | "generator_function_declaration" | "method_definition" => {
                let name_node = require_field(node, "name")?;
                let body = require_field(node, "body")?;
                Ok(ScopeBoundary {
                    symbol_location: node_location(name_node, file_path),
                    scope_location: node_location(body, file_path),
                    name: Some(node_text(name_node, source).to_string()),
                })
            }
            "class_declaration" => {
                let name_node = require_field(node, "name")?;
                let body = require_field(node, "body")?;
                Ok(ScopeBoundary {
                    symbol_location: node_location(name_node, file_path),
                    scope_location: node_location(body, file_path),
                    name: Some(node_text(name_node, source).to_string()),
                })
            }
            // Named function expression (§4.2 exception): the name lives
            // inside its own scope for self-reference, so the scope spans
            // from just past `function` to the body's end rather than
            // excluding the name like a declaration does.
            "function_expression" => {
                let body = require_field(node, "body")?;
                match node.child_by_field_name("name") {
                    Some(name_node) => {
                        let start = name_node.start_position();
                        let end = body.end_position();
                        Ok(ScopeBoundary {
                            symbol_location: node_location(name_node, file_path),
                            scope_location: Location::new(
                                file_path.to_string(),
                                codesearch_core::ids::Position::from_zero_based(start.row, start.column),
                                codesearch_core::ids::Position::from_zero_based(end.row, end.column),
                            ),
                            name: Some(node_text(name_node, source).to_string()),
                        })
                    }
                    // Anonymous function expression: symbol == scope.
                    None => Ok(ScopeBoundary {
                        symbol_location: node_location(node, file_path),
                        scope_location: node_location(body, file_path),
                        name: None,
                    }),
                }
            }
            "arrow_function" => {
                let body = require_field(node, "body")?;
                let params = node
                    .child_by_field_name("parameters")
                    .or_else(|| node.child_by_field_name("parameter"))
                    .unwrap_or(node);
                Ok(ScopeBoundary {
                    symbol_location: node_location(params, file_path),
                    scope_location: node_location(body, file_path),
                    name: None,
                })
            }
            "statement_block" => Ok(ScopeBoundary {
                symbol_location: node_location(node, file_path),
                scope_location: node_location(node, file_path),
                name: None,
            }),
            other => Err(Error::unrecognized_scope_node("javascript", other)),
        }
    }
}

pub struct JsMetadataExtractor;

/// Builds the property chain for a (possibly nested) `member_expression` or
/// `call_expression` whose callee is a member expression, ending with the
/// final accessed/called name (§4.5.2's property-chain grammar).
fn build_property_chain(node: Node, source: &str) -> (PropertyChain, Option<Node>) {
    let mut chain = Vec::new();
    let mut current = node;
    loop {
        match current.kind() {
            "member_expression" => {
                let Some(property) = current.child_by_field_name("property") else { break };
                chain.push(node_text(property, source).to_string());
                let Some(object) = current.child_by_field_name("object") else { break };
                current = object;
            }
            "subscript_expression" => {
                let Some(index) = current.child_by_field_name("index") else { break };
                chain.push(node_text(index, source).trim_matches(|c| c == '"' || c == '\'').to_string());
                let Some(object) = current.child_by_field_name("object") else { break };
                current = object;
            }
            "identifier" | "this" | "super" => break,
            _ => break,
        }
    }
    chain.reverse();
    (chain, Some(current))
}

impl MetadataExtractor for JsMetadataExtractor {
    fn extract_type_from_annotation(&self, node: Node, source: &str) -> Option<TypeInfo> {
        let type_node = node.child_by_field_name("type")?;
        let text = node_text(type_node, source);
        Some(TypeInfo {
            type_name: text.trim_start_matches(':').trim().to_string(),
            certainty: TypeCertainty::Declared,
            is_nullable: text.contains("null") || text.contains('?'),
            type_arguments: None,
        })
    }

    fn extract_receiver_info(&self, node: Node, source: &str, file_path: &str) -> Option<ReceiverInfo> {
        let callee = match node.kind() {
            "call_expression" => node.child_by_field_name("function")?,
            "member_expression" => node,
            _ => return None,
        };
        if callee.kind() != "member_expression" {
            return None;
        }
        let object = callee.child_by_field_name("object")?;
        let (mut chain, root) = build_property_chain(callee, source);
        let property = callee.child_by_field_name("property")?;
        if chain.last().map(String::as_str) != Some(node_text(property, source)) {
            chain.push(node_text(property, source).to_string());
        }
        let is_self = matches!(object.kind(), "this" | "super");
        let self_keyword = match object.kind() {
            "this" => Some(SelfKeyword::This),
            "super" => Some(SelfKeyword::Super),
            _ => None,
        };
        Some(ReceiverInfo {
            receiver_location: root.map(|r| node_location(r, file_path)),
            property_chain: chain,
            is_self_reference: is_self,
            self_keyword,
        })
    }

    fn extract_call_receiver(&self, node: Node, file_path: &str) -> Option<Location> {
        let callee = node.child_by_field_name("function")?;
        let object = callee.child_by_field_name("object")?;
        Some(node_location(object, file_path))
    }

    fn extract_property_chain(&self, node: Node, source: &str) -> Option<PropertyChain> {
        let (chain, _) = build_property_chain(node, source);
        if chain.is_empty() {
            None
        } else {
            Some(chain)
        }
    }

    fn extract_assignment_parts(&self, node: Node, file_path: &str) -> AssignmentParts {
        AssignmentParts {
            source: node.child_by_field_name("right").map(|n| node_location(n, file_path)),
            target: node.child_by_field_name("left").map(|n| node_location(n, file_path)),
        }
    }

    fn extract_construct_target(&self, node: Node, file_path: &str) -> Option<Location> {
        let parent = node.parent()?;
        match parent.kind() {
            "variable_declarator" => parent.child_by_field_name("name").map(|n| node_location(n, file_path)),
            "assignment_expression" => parent.child_by_field_name("left").map(|n| node_location(n, file_path)),
            _ => None,
        }
    }

    fn extract_is_optional_chain(&self, node: Node) -> bool {
        let mut cursor = node.walk();
        node.children(&mut cursor).any(|c| c.kind() == "?.")
    }

    fn is_method_call(&self, node: Node) -> bool {
        node.child_by_field_name("function").map(|f| f.kind() == "member_expression").unwrap_or(false)
    }
}

fn is_export_statement(node: Node) -> Option<ExportInfo> {
    if node.kind() != "export_statement" {
        return None;
    }
    let is_default = has_child_of_kind(node, "default");
    let is_reexport = node.child_by_field_name("source").is_some();
    Some(ExportInfo {
        exported_name: None,
        is_default,
        is_reexport,
    })
}

pub fn export_info_for(node: Node) -> Option<ExportInfo> {
    detect_export(node, is_body_boundary, is_export_statement)
}

pub fn extract_parameters(params_node: Node, source: &str) -> Vec<Parameter> {
    let mut cursor = params_node.walk();
    params_node
        .named_children(&mut cursor)
        .filter_map(|p| match p.kind() {
            "identifier" => Some(Parameter {
                name: node_text(p, source).to_string(),
                type_annotation: None,
                default_value: None,
                is_variadic: false,
            }),
            "rest_pattern" => p.named_child(0).map(|inner| Parameter {
                name: node_text(inner, source).to_string(),
                type_annotation: None,
                default_value: None,
                is_variadic: true,
            }),
            "assignment_pattern" => {
                let left = p.child_by_field_name("left")?;
                let right = p.child_by_field_name("right")?;
                Some(Parameter {
                    name: node_text(left, source).to_string(),
                    type_annotation: None,
                    default_value: Some(node_text(right, source).to_string()),
                    is_variadic: false,
                })
            }
            _ => None,
        })
        .collect()
}

/// Extracts `T` out of a JSDoc `@tag {T}` marker anywhere in `comment_text`
/// (§4.4.5) - e.g. `@returns {number}` or `@type {string}`. Works directly
/// on the raw, un-stripped comment text `take_pending_doc` hands back.
fn jsdoc_tag(comment_text: &str, tag: &str) -> Option<String> {
    let marker = format!("@{tag}");
    let after = comment_text.find(&marker).map(|i| &comment_text[i + marker.len()..])?;
    let open = after.find('{')?;
    let close = after[open..].find('}')? + open;
    let value = after[open + 1..close].trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn handle_function(capture: &Capture, ctx: &ProcessingContext, builder: &mut crate::definition_builder::DefinitionBuilder, source: &str, config: &IndexerConfig) -> Result<()> {
    // `@definition.function` binds to the `name:` identifier, not the
    // enclosing declaration - recover the declaration via its parent before
    // reaching for any other field (§4.4.1).
    let name_node = capture.node;
    let name = node_text(name_node, source).to_string();
    let node = crate::node_ext::require_parent(name_node)?;
    let params = require_field(node, "parameters")?;
    // TypeScript's function_declaration carries its return-type annotation
    // under the `type` field (same field `annotation_text` reads for
    // TS-specific nodes); plain JS has no such field and this is simply
    // `None`. Falls back to a JSDoc `@returns {T}` in the preceding comment.
    let annotated_return_type = node.child_by_field_name("type").map(|t| node_text(t, source).trim_start_matches(':').trim().to_string());
    let docstring = builder.take_pending_doc(&capture.location);
    let return_type = annotated_return_type.or_else(|| {
        config
            .mine_jsdoc_types
            .then(|| docstring.as_deref().and_then(|d| jsdoc_tag(d, "returns")))
            .flatten()
    });
    let signature = FunctionSignature {
        parameters: extract_parameters(params, source),
        return_type,
    };
    let is_async = has_child_of_kind(node, "async");
    let export = export_info_for(node);
    builder.add_function(ctx, name, capture.location.clone(), signature, docstring, is_async, export)?;
    Ok(())
}

fn handle_class(capture: &Capture, ctx: &ProcessingContext, builder: &mut crate::definition_builder::DefinitionBuilder, source: &str, _config: &IndexerConfig) -> Result<()> {
    let name_node = capture.node;
    let name = node_text(name_node, source).to_string();
    let node = crate::node_ext::require_parent(name_node)?;
    let body_scope_id = ctx.get_child_scope_with_symbol_name(&ctx.get_scope_id(&capture.location)?, &name)?;
    let extends = node
        .child_by_field_name("heritage")
        .map(|h| vec![node_text(h, source).trim_start_matches("extends").trim().to_string()])
        .unwrap_or_default();
    let export = export_info_for(node);
    builder.add_class(ctx, name, capture.location.clone(), body_scope_id, extends, Vec::new(), Vec::new(), None, export)?;
    Ok(())
}

fn handle_method(capture: &Capture, ctx: &ProcessingContext, builder: &mut crate::definition_builder::DefinitionBuilder, source: &str, config: &IndexerConfig) -> Result<()> {
    let name_node = capture.node;
    let name = node_text(name_node, source).to_string();
    let node = crate::node_ext::require_parent(name_node)?;
    let params = require_field(node, "parameters")?;
    let is_static = has_child_of_kind(node, "static");
    let is_async = has_child_of_kind(node, "async");
    let docstring = builder.take_pending_doc(&capture.location);
    let annotated_return_type = node.child_by_field_name("type").map(|t| node_text(t, source).trim_start_matches(':').trim().to_string());
    let return_type = annotated_return_type.or_else(|| {
        config
            .mine_jsdoc_types
            .then(|| docstring.as_deref().and_then(|d| jsdoc_tag(d, "returns")))
            .flatten()
    });
    let signature = FunctionSignature {
        parameters: extract_parameters(params, source),
        return_type,
    };

    let class_node = crate::node_ext::find_ancestor(node, |n| n.kind() == "class_declaration");
    let Some(class_node) = class_node else {
        return Err(Error::unrecognized_scope_node("javascript", "method_definition outside class"));
    };
    let class_name_node = require_field(class_node, "name")?;
    let class_name = node_text(class_name_node, source).to_string();
    let class_name_location = node_location(class_name_node, &capture.location.file_path);
    let enclosing = ctx.get_scope_id(&class_name_location)?;
    let body_scope_id = ctx.get_child_scope_with_symbol_name(&enclosing, &class_name)?;

    let symbol_id = codesearch_core::ids::SymbolId::new(
        "method",
        &capture.location.file_path,
        &name,
        &capture.location.start,
    );
    let method = MethodDefinition {
        symbol_id,
        name: name.clone(),
        location: capture.location.clone(),
        defining_scope_id: body_scope_id.clone(),
        signature,
        docstring,
        is_static,
        is_abstract: false,
        is_async,
        decorators: Vec::new(),
    };
    if name == "constructor" {
        builder.set_constructor_for_class(&body_scope_id, method)?;
    } else {
        builder.add_method_to_class(&body_scope_id, method)?;
    }
    Ok(())
}

/// Records a preceding `/** ... */` or `//` comment so the handler for the
/// declaration it's attached to can pick it up via `take_pending_doc` (§4.4.4).
/// The anchor is the declaration's name-token location, matching exactly what
/// the `definition.function`/`definition.method` capture's own location will
/// be when that handler runs later in the same pass.
fn handle_doc_comment(capture: &Capture, _ctx: &ProcessingContext, builder: &mut crate::definition_builder::DefinitionBuilder, source: &str, config: &IndexerConfig) -> Result<()> {
    if !config.extract_documentation {
        return Ok(());
    }
    let Some(mut target) = capture.node.next_named_sibling() else {
        return Ok(());
    };
    if target.kind() == "export_statement" {
        let Some(declaration) = target.child_by_field_name("declaration") else {
            return Ok(());
        };
        target = declaration;
    }
    let name_node = match target.kind() {
        "function_declaration" | "generator_function_declaration" | "method_definition" => target.child_by_field_name("name"),
        "field_definition" => target.child_by_field_name("property"),
        _ => None,
    };
    let Some(name_node) = name_node else {
        return Ok(());
    };
    let anchor = node_location(name_node, &capture.location.file_path);
    let text = node_text(capture.node, source).to_string();
    builder.record_pending_doc(anchor, text);
    Ok(())
}

fn handle_property(capture: &Capture, ctx: &ProcessingContext, builder: &mut crate::definition_builder::DefinitionBuilder, source: &str, config: &IndexerConfig) -> Result<()> {
    let name_node = capture.node;
    let name = node_text(name_node, source).to_string();
    let node = crate::node_ext::require_parent(name_node)?;
    let is_static = has_child_of_kind(node, "static");

    let class_node = crate::node_ext::find_ancestor(node, |n| n.kind() == "class_declaration");
    let Some(class_node) = class_node else {
        return Err(Error::unrecognized_scope_node("javascript", "field_definition outside class"));
    };
    let class_name_node = require_field(class_node, "name")?;
    let class_name = node_text(class_name_node, source).to_string();
    let class_name_location = node_location(class_name_node, &capture.location.file_path);
    let enclosing = ctx.get_scope_id(&class_name_location)?;
    let body_scope_id = ctx.get_child_scope_with_symbol_name(&enclosing, &class_name)?;

    // Plain JS fields carry no type annotation of their own (§4.4.5); the
    // only source of a type is a preceding JSDoc `@type {T}` comment.
    let doc = builder.take_pending_doc(&capture.location);
    let type_annotation = config.mine_jsdoc_types.then(|| doc.as_deref().and_then(|d| jsdoc_tag(d, "type"))).flatten();

    let symbol_id = codesearch_core::ids::SymbolId::new("property", &capture.location.file_path, &name, &capture.location.start);
    builder.add_property_to_class(
        &body_scope_id,
        PropertyDefinition {
            symbol_id,
            name,
            location: capture.location.clone(),
            defining_scope_id: body_scope_id.clone(),
            type_annotation,
            is_static,
            decorators: Vec::new(),
        },
    )?;
    Ok(())
}

fn handle_variable(capture: &Capture, ctx: &ProcessingContext, builder: &mut crate::definition_builder::DefinitionBuilder, source: &str, _config: &IndexerConfig) -> Result<()> {
    // `@definition.variable` binds to the `name:` identifier; its parent is
    // the `variable_declarator` holding the initializer, and that
    // declarator's own parent is the `const`/`let`/`var` statement.
    let name_node = capture.node;
    let name = node_text(name_node, source).to_string();
    let node = crate::node_ext::require_parent(name_node)?;

    let kind_tag = node
        .parent()
        .map(|outer| match node_text(outer, source).split_whitespace().next() {
            Some("const") => VariableKindTag::Const,
            Some("let") => VariableKindTag::Let,
            _ => VariableKindTag::Var,
        })
        .unwrap_or(VariableKindTag::Var);

    let derived_from_name = node
        .child_by_field_name("value")
        .and_then(|init| derived_from(init, source, &["call_expression"], &["member_expression"], "object"));

    let export = export_info_for(node);
    builder.add_variable(ctx, name, capture.location.clone(), kind_tag, None, derived_from_name, export)?;
    Ok(())
}

fn handle_import(capture: &Capture, ctx: &ProcessingContext, builder: &mut crate::definition_builder::DefinitionBuilder, source: &str, _config: &IndexerConfig) -> Result<()> {
    let node = capture.node;
    let source_node = require_field(node, "source")?;
    let import_path = node_text(source_node, source).trim_matches(|c| c == '"' || c == '\'').to_string();

    let mut cursor = node.walk();
    let clause = node.children(&mut cursor).find(|c| c.kind() == "import_clause");
    match clause {
        None => {
            builder.add_import(
                ctx,
                import_path.clone(),
                capture.location.clone(),
                import_path,
                codesearch_core::definitions::ImportKind::SideEffect,
                None,
                None,
            )?;
        }
        Some(clause) => {
            let mut clause_cursor = clause.walk();
            for child in clause.children(&mut clause_cursor) {
                match child.kind() {
                    "identifier" => {
                        let name = node_text(child, source).to_string();
                        builder.add_import(
                            ctx,
                            name,
                            node_location(child, &capture.location.file_path),
                            import_path.clone(),
                            codesearch_core::definitions::ImportKind::Default,
                            None,
                            None,
                        )?;
                    }
                    "namespace_import" => {
                        if let Some(alias) = child.named_child(0) {
                            let name = node_text(alias, source).to_string();
                            builder.add_import(
                                ctx,
                                name,
                                node_location(child, &capture.location.file_path),
                                import_path.clone(),
                                codesearch_core::definitions::ImportKind::Namespace,
                                None,
                                None,
                            )?;
                        }
                    }
                    "named_imports" => {
                        let mut spec_cursor = child.walk();
                        for spec in child.named_children(&mut spec_cursor).filter(|s| s.kind() == "import_specifier") {
                            let imported = spec.child_by_field_name("name");
                            let alias = spec.child_by_field_name("alias");
                            let local = alias.or(imported);
                            let Some(local) = local else { continue };
                            let name = node_text(local, source).to_string();
                            let imported_name = alias.and(imported).map(|n| node_text(n, source).to_string());
                            builder.add_import(
                                ctx,
                                name,
                                node_location(spec, &capture.location.file_path),
                                import_path.clone(),
                                codesearch_core::definitions::ImportKind::Named,
                                imported_name,
                                None,
                            )?;
                        }
                    }
                    _ => {}
                }
            }
        }
    }
    Ok(())
}

pub struct JsRegistry {
    handlers: HandlerTable,
}

/// Builds the JavaScript handler table. Exposed so TypeScript's registry can
/// fold these entries into its own via `HandlerTableBuilder::extend` (§4.4.1).
pub fn build_handler_table() -> HandlerTable {
    HandlerTable::builder()
        .on(Category::Definition, "function", handle_function as HandlerFn)
        .on(Category::Definition, "class", handle_class as HandlerFn)
        .on(Category::Definition, "method", handle_method as HandlerFn)
        .on(Category::Definition, "variable", handle_variable as HandlerFn)
        .on(Category::Definition, "property", handle_property as HandlerFn)
        .on_subtag(Category::Definition, "function", "documentation", handle_doc_comment as HandlerFn)
        .on_subtag(Category::Definition, "method", "documentation", handle_doc_comment as HandlerFn)
        .on_subtag(Category::Definition, "property", "documentation", handle_doc_comment as HandlerFn)
        .on(Category::Import, "named", handle_import as HandlerFn)
        .on(Category::Import, "default", handle_import as HandlerFn)
        .build()
}

impl JsRegistry {
    pub fn new() -> Self {
        Self { handlers: build_handler_table() }
    }
}

impl Default for JsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageRegistry for JsRegistry {
    fn query(&self) -> &'static str {
        QUERY
    }

    fn scope_boundary_extractor(&self) -> &dyn ScopeBoundaryExtractor {
        &JsScopeExtractor
    }

    fn metadata_extractor(&self) -> &dyn MetadataExtractor {
        &JsMetadataExtractor
    }

    fn handler_table(&self) -> &HandlerTable {
        &self.handlers
    }
}

pub fn registry() -> JsRegistry {
    JsRegistry::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> tree_sitter::Tree {
        let language: tree_sitter::Language = tree_sitter_javascript::LANGUAGE.into();
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&language).expect("set language");
        parser.parse(source, None).expect("parse")
    }

    #[test]
    fn scope_extractor_reports_function_body_as_scope() {
        let source = "function foo(a, b) { return a + b; }";
        let tree = parse(source);
        let function_node = tree.root_node().named_child(0).expect("function_declaration");
        let boundary = JsScopeExtractor.extract(function_node, source, "f.js").expect("extract");
        assert_eq!(boundary.name.as_deref(), Some("foo"));
        assert!(boundary.scope_location.start.column > boundary.symbol_location.end.column || boundary.scope_location.start.line > boundary.symbol_location.start.line);
    }

    #[test]
    fn property_chain_builder_orders_outer_to_inner() {
        let source = "api.users.list();";
        let tree = parse(source);
        let call = tree.root_node().named_child(0).expect("expression_statement").named_child(0).expect("call_expression");
        let callee = call.child_by_field_name("function").expect("function field");
        let (chain, _) = build_property_chain(callee, source);
        assert_eq!(chain, vec!["api".to_string(), "users".to_string(), "list".to_string()]);
    }
}
